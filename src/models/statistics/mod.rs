//! 统计与仪表盘

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::assignments::entities::Assignment;

/// 统计查询参数，日期格式为 `YYYY-MM-DD`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticsParams {
    pub subject: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
}

/// 存储层使用的统计过滤条件，按创建时间过滤，`to` 为开区间
#[derive(Debug, Clone, Default)]
pub struct StatisticsFilter {
    pub subject: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub include_archived: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssignmentStatistics {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub overdue: u64,
    pub completed_on_time: u64,
    /// 按时完成率 (百分比)
    pub on_time_completion_rate: f64,
}

impl AssignmentStatistics {
    pub fn from_assignments<'a, I>(assignments: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Assignment>,
    {
        let mut stats = Self::default();
        for a in assignments {
            stats.total += 1;
            if a.is_completed {
                stats.completed += 1;
                if a.completed_at.is_some_and(|at| at <= a.due_date) {
                    stats.completed_on_time += 1;
                }
            } else {
                stats.pending += 1;
                if a.is_overdue(now) {
                    stats.overdue += 1;
                }
            }
        }
        if stats.completed > 0 {
            stats.on_time_completion_rate =
                stats.completed_on_time as f64 / stats.completed as f64 * 100.0;
        }
        stats
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectStatistics {
    pub subject: String,
    #[serde(flatten)]
    pub stats: AssignmentStatistics,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsResponse {
    #[serde(flatten)]
    pub overall: AssignmentStatistics,
    pub subjects: Vec<SubjectStatistics>,
}

impl StatisticsResponse {
    /// 汇总整体统计并按科目分组，未填写科目的作业只计入整体
    pub fn from_assignments(assignments: &[Assignment], now: DateTime<Utc>) -> Self {
        let overall = AssignmentStatistics::from_assignments(assignments, now);

        let mut by_subject: BTreeMap<&str, Vec<&Assignment>> = BTreeMap::new();
        for a in assignments.iter().filter(|a| !a.subject.is_empty()) {
            by_subject.entry(a.subject.as_str()).or_default().push(a);
        }

        let subjects = by_subject
            .into_iter()
            .map(|(subject, items)| SubjectStatistics {
                subject: subject.to_string(),
                stats: AssignmentStatistics::from_assignments(items, now),
            })
            .collect();

        Self { overall, subjects }
    }
}

/// 科目归档请求
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectArchiveRequest {
    pub subject: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectArchiveResponse {
    pub subject: String,
    pub affected: u64,
}

/// 仪表盘数据
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub total_pending: u64,
    pub due_today: u64,
    pub due_this_week: u64,
    pub overdue: u64,
    pub subjects: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::tests::sample_assignment;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_statistics_aggregation() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();

        let mut on_time = sample_assignment(now - Duration::days(1));
        on_time.completed_at = Some(now - Duration::days(2));
        on_time.is_completed = true;

        let mut late = sample_assignment(now - Duration::days(3));
        late.subject = "物理".to_string();
        late.completed_at = Some(now - Duration::days(1));
        late.is_completed = true;

        let overdue = sample_assignment(now - Duration::hours(1));
        let mut upcoming = sample_assignment(now + Duration::days(2));
        upcoming.subject = String::new();

        let items = vec![on_time, late, overdue, upcoming];
        let resp = StatisticsResponse::from_assignments(&items, now);

        assert_eq!(resp.overall.total, 4);
        assert_eq!(resp.overall.completed, 2);
        assert_eq!(resp.overall.pending, 2);
        assert_eq!(resp.overall.overdue, 1);
        assert_eq!(resp.overall.completed_on_time, 1);
        assert!((resp.overall.on_time_completion_rate - 50.0).abs() < f64::EPSILON);

        let subjects: Vec<_> = resp.subjects.iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(subjects, vec!["数学", "物理"]);
        assert_eq!(resp.subjects[0].stats.total, 2);
        assert_eq!(resp.subjects[1].stats.completed_on_time, 0);
    }

    #[test]
    fn test_empty_statistics_rate_is_zero() {
        let stats = AssignmentStatistics::from_assignments(Vec::<Assignment>::new().iter(), Utc::now());
        assert_eq!(stats, AssignmentStatistics::default());
    }
}

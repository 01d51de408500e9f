//! 周期规则计算
//!
//! 纯计算，不做任何 I/O。日期计算基于本地墙上时间 (`NaiveDateTime`)，
//! 时区换算由调用方负责。

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{HWTrackerError, Result};

/// 周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    None,
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurrenceType::None => write!(f, "none"),
            RecurrenceType::Daily => write!(f, "daily"),
            RecurrenceType::Weekly => write!(f, "weekly"),
            RecurrenceType::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for RecurrenceType {
    type Err = HWTrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(RecurrenceType::None),
            "daily" => Ok(RecurrenceType::Daily),
            "weekly" => Ok(RecurrenceType::Weekly),
            "monthly" => Ok(RecurrenceType::Monthly),
            _ => Err(HWTrackerError::invalid_recurrence_type(format!(
                "无效的周期类型: '{s}'. 支持: none, daily, weekly, monthly"
            ))),
        }
    }
}

/// 结束条件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndType {
    Never,
    Count,
    Date,
}

impl std::fmt::Display for EndType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndType::Never => write!(f, "never"),
            EndType::Count => write!(f, "count"),
            EndType::Date => write!(f, "date"),
        }
    }
}

impl std::str::FromStr for EndType {
    type Err = HWTrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "never" => Ok(EndType::Never),
            "count" => Ok(EndType::Count),
            "date" => Ok(EndType::Date),
            _ => Err(HWTrackerError::invalid_end_type(format!(
                "无效的结束类型: '{s}'. 支持: never, count, date"
            ))),
        }
    }
}

/// 结束条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "end_type", rename_all = "snake_case")]
pub enum EndCondition {
    Never,
    Count { end_count: u32 },
    Date { end_date: DateTime<Utc> },
}

impl EndCondition {
    /// 根据结束类型构造，`count` 需要次数，`date` 需要日期
    pub fn new(
        end_type: EndType,
        end_count: Option<i32>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        match end_type {
            EndType::Never => Ok(EndCondition::Never),
            EndType::Count => match end_count {
                Some(count) if count >= 1 => Ok(EndCondition::Count {
                    end_count: count as u32,
                }),
                Some(count) => Err(HWTrackerError::validation(format!(
                    "结束次数必须大于 0: {count}"
                ))),
                None => Err(HWTrackerError::validation("结束类型为 count 时必须指定次数")),
            },
            EndType::Date => end_date
                .map(|end_date| EndCondition::Date { end_date })
                .ok_or_else(|| HWTrackerError::validation("结束类型为 date 时必须指定日期")),
        }
    }

    pub fn end_type(&self) -> EndType {
        match self {
            EndCondition::Never => EndType::Never,
            EndCondition::Count { .. } => EndType::Count,
            EndCondition::Date { .. } => EndType::Date,
        }
    }

    pub fn end_count(&self) -> Option<u32> {
        match self {
            EndCondition::Count { end_count } => Some(*end_count),
            _ => None,
        }
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        match self {
            EndCondition::Date { end_date } => Some(*end_date),
            _ => None,
        }
    }

    /// 是否还允许继续生成
    pub fn permits(&self, generated_count: u32, now: DateTime<Utc>) -> bool {
        match self {
            EndCondition::Never => true,
            EndCondition::Count { end_count } => generated_count < *end_count,
            EndCondition::Date { end_date } => now <= *end_date,
        }
    }
}

/// 周期规则
///
/// 间隔在构造时规整为至少 1，与周期类型不匹配的选择器会被丢弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    #[serde(rename = "recurrence_type")]
    pub kind: RecurrenceType,
    #[serde(rename = "recurrence_interval")]
    pub interval: u32,
    /// 每周的星期 (0 为周日)，仅用于展示
    #[serde(rename = "recurrence_weekday", skip_serializing_if = "Option::is_none")]
    pub weekday: Option<u8>,
    /// 每月的日期，超出当月天数时取月末
    #[serde(rename = "recurrence_day", skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl RecurrenceRule {
    pub fn new(
        kind: RecurrenceType,
        interval: i32,
        weekday: Option<i32>,
        day: Option<i32>,
    ) -> Result<Self> {
        let interval = interval.max(1) as u32;

        let weekday = match kind {
            RecurrenceType::Weekly => weekday
                .map(|w| {
                    if (0..=6).contains(&w) {
                        Ok(w as u8)
                    } else {
                        Err(HWTrackerError::validation(format!(
                            "星期必须在 0 到 6 之间: {w}"
                        )))
                    }
                })
                .transpose()?,
            _ => None,
        };

        let day = match kind {
            RecurrenceType::Monthly => day
                .map(|d| {
                    if (1..=31).contains(&d) {
                        Ok(d as u32)
                    } else {
                        Err(HWTrackerError::validation(format!(
                            "日期必须在 1 到 31 之间: {d}"
                        )))
                    }
                })
                .transpose()?,
            _ => None,
        };

        Ok(Self {
            kind,
            interval,
            weekday,
            day,
        })
    }

    /// 计算下一次的截止时间
    ///
    /// 类型为 `none` 或日期溢出时返回 `None`。
    pub fn next_due_date(&self, last: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.kind {
            RecurrenceType::None => None,
            RecurrenceType::Daily => last.checked_add_days(Days::new(u64::from(self.interval))),
            RecurrenceType::Weekly => {
                last.checked_add_days(Days::new(7 * u64::from(self.interval)))
            }
            RecurrenceType::Monthly => {
                let next = last.checked_add_months(Months::new(self.interval))?;
                match self.day {
                    Some(day) => {
                        let day = day.min(days_in_month(next.year(), next.month()));
                        NaiveDate::from_ymd_opt(next.year(), next.month(), day)?.and_hms_opt(
                            next.hour(),
                            next.minute(),
                            0,
                        )
                    }
                    None => Some(next),
                }
            }
        }
    }
}

/// 指定年月的天数
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_daily_and_weekly() {
        let daily = RecurrenceRule::new(RecurrenceType::Daily, 3, None, None).unwrap();
        assert_eq!(
            daily.next_due_date(dt(2024, 2, 27, 18, 0)),
            Some(dt(2024, 3, 1, 18, 0))
        );

        let weekly = RecurrenceRule::new(RecurrenceType::Weekly, 1, Some(1), None).unwrap();
        assert_eq!(
            weekly.next_due_date(dt(2024, 1, 1, 9, 0)),
            Some(dt(2024, 1, 8, 9, 0))
        );
    }

    #[test]
    fn test_monthly_clamps_to_month_end() {
        let rule = RecurrenceRule::new(RecurrenceType::Monthly, 1, None, Some(31)).unwrap();
        assert_eq!(
            rule.next_due_date(dt(2024, 1, 31, 23, 59)),
            Some(dt(2024, 2, 29, 23, 59))
        );
        assert_eq!(
            rule.next_due_date(dt(2023, 1, 31, 8, 30)),
            Some(dt(2023, 2, 28, 8, 30))
        );
        // 钳制只看目标月份，下个月恢复到 31 日
        assert_eq!(
            rule.next_due_date(dt(2024, 2, 29, 23, 59)),
            Some(dt(2024, 3, 31, 23, 59))
        );
    }

    #[test]
    fn test_monthly_day_selector_zeroes_seconds() {
        let rule = RecurrenceRule::new(RecurrenceType::Monthly, 2, None, Some(15)).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 11, 3)
            .unwrap()
            .and_hms_opt(7, 45, 30)
            .unwrap();
        assert_eq!(rule.next_due_date(last), Some(dt(2025, 1, 15, 7, 45)));
    }

    #[test]
    fn test_sequence_strictly_increasing() {
        let rules = [
            RecurrenceRule::new(RecurrenceType::Daily, 1, None, None).unwrap(),
            RecurrenceRule::new(RecurrenceType::Weekly, 2, None, None).unwrap(),
            RecurrenceRule::new(RecurrenceType::Monthly, 1, None, Some(31)).unwrap(),
            RecurrenceRule::new(RecurrenceType::Monthly, 1, None, Some(1)).unwrap(),
            RecurrenceRule::new(RecurrenceType::Monthly, 1, None, None).unwrap(),
        ];
        for rule in rules {
            let mut current = dt(2024, 1, 31, 10, 0);
            for _ in 0..30 {
                let next = rule.next_due_date(current).unwrap();
                assert!(next > current, "{rule:?}: {next} <= {current}");
                current = next;
            }
        }
    }

    #[test]
    fn test_none_has_no_next() {
        let rule = RecurrenceRule::new(RecurrenceType::None, 1, None, None).unwrap();
        assert_eq!(rule.next_due_date(dt(2024, 1, 1, 0, 0)), None);
    }

    #[test]
    fn test_interval_coerced_at_construction() {
        let rule = RecurrenceRule::new(RecurrenceType::Daily, 0, None, None).unwrap();
        assert_eq!(rule.interval, 1);
        let rule = RecurrenceRule::new(RecurrenceType::Daily, -5, None, None).unwrap();
        assert_eq!(rule.interval, 1);
    }

    #[test]
    fn test_selectors_dropped_or_rejected() {
        let rule = RecurrenceRule::new(RecurrenceType::Daily, 1, Some(3), Some(10)).unwrap();
        assert_eq!(rule.weekday, None);
        assert_eq!(rule.day, None);

        assert!(RecurrenceRule::new(RecurrenceType::Weekly, 1, Some(7), None).is_err());
        assert!(RecurrenceRule::new(RecurrenceType::Monthly, 1, None, Some(0)).is_err());
        assert!(RecurrenceRule::new(RecurrenceType::Monthly, 1, None, Some(32)).is_err());
        // 不匹配的选择器即使越界也直接丢弃
        assert!(RecurrenceRule::new(RecurrenceType::Weekly, 1, None, Some(99)).is_ok());
    }

    #[test]
    fn test_parse_types() {
        assert!(matches!(
            "yearly".parse::<RecurrenceType>(),
            Err(HWTrackerError::InvalidRecurrenceType(_))
        ));
        assert!(matches!(
            "forever".parse::<EndType>(),
            Err(HWTrackerError::InvalidEndType(_))
        ));
        assert_eq!("weekly".parse::<RecurrenceType>().unwrap(), RecurrenceType::Weekly);
    }

    #[test]
    fn test_end_condition_gates() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let count = EndCondition::new(EndType::Count, Some(3), None).unwrap();
        assert!(count.permits(2, now));
        assert!(!count.permits(3, now));

        let date = EndCondition::new(EndType::Date, None, Some(now)).unwrap();
        assert!(date.permits(100, now));
        assert!(!date.permits(0, now + chrono::Duration::seconds(1)));

        assert!(EndCondition::Never.permits(u32::MAX, now));
    }

    #[test]
    fn test_end_condition_requires_values() {
        assert!(EndCondition::new(EndType::Count, None, None).is_err());
        assert!(EndCondition::new(EndType::Count, Some(0), None).is_err());
        assert!(EndCondition::new(EndType::Date, Some(3), None).is_err());
        assert_eq!(
            EndCondition::new(EndType::Never, Some(3), None).unwrap(),
            EndCondition::Never
        );
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }
}

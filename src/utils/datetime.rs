//! 用户输入的日期解析

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::clock::AppClock;
use crate::errors::{HWTrackerError, Result};

/// 解析截止日期
///
/// 支持 RFC3339、本地时间 `YYYY-MM-DDTHH:MM` 以及本地日期 `YYYY-MM-DD` (当天 23:59)。
pub fn parse_due_datetime(input: &str, clock: &AppClock) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(local) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M") {
        return Ok(clock.to_utc(local));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
        return Ok(clock.to_utc(date.and_time(end_of_day)));
    }

    Err(HWTrackerError::date_parse(format!(
        "无法解析日期 '{input}'，支持 RFC3339、YYYY-MM-DDTHH:MM 或 YYYY-MM-DD"
    )))
}

/// 解析 `YYYY-MM-DD`，返回本地当天 0 点
pub fn parse_local_date(input: &str, clock: &AppClock) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")?;
    Ok(clock.to_utc(date.and_time(NaiveTime::MIN)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::manual::ManualClock;
    use chrono::{FixedOffset, TimeZone};
    use std::sync::Arc;

    fn clock() -> AppClock {
        AppClock::new(
            Arc::new(ManualClock::new(Utc::now())),
            FixedOffset::east_opt(8 * 3600).unwrap(),
        )
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_due_datetime("2024-03-01T12:00:00+09:00", &clock()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_local_minutes() {
        let dt = parse_due_datetime("2024-03-01T08:30", &clock()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 0, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only_is_end_of_day() {
        let dt = parse_due_datetime("2024-03-01", &clock()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 15, 59, 0).unwrap());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_due_datetime("next friday", &clock()),
            Err(HWTrackerError::DateParse(_))
        ));
        assert!(parse_local_date("2024/03/01", &clock()).is_err());
    }

    #[test]
    fn test_parse_local_date() {
        let dt = parse_local_date("2024-03-01", &clock()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 2, 29, 16, 0, 0).unwrap());
    }
}

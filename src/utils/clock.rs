//! 时间来源
//!
//! 业务逻辑通过 [`Clock`] 获取当前时间，测试中可替换为手动时钟。

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 带本地时区的时钟
///
/// 周期计算使用本地墙上时间，存储使用 UTC。
#[derive(Clone)]
pub struct AppClock {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl AppClock {
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self { clock, offset }
    }

    /// 使用系统时钟，时区偏移为空时取系统本地时区
    pub fn system(utc_offset_minutes: Option<i32>) -> Self {
        let offset = utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or_else(|| *Local::now().offset());
        Self::new(Arc::new(SystemClock), offset)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn to_local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.offset).naive_local()
    }

    /// 固定偏移下本地时间与 UTC 一一对应
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        self.offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local))
    }

    /// 本地当天 0 点对应的 UTC 时间
    pub fn start_of_today(&self) -> DateTime<Utc> {
        let today = self.to_local(self.now()).date();
        self.to_utc(today.and_time(chrono::NaiveTime::MIN))
    }
}

#[cfg(test)]
pub mod manual {
    use std::sync::Mutex;

    use chrono::{DateTime, Duration, Utc};

    use super::Clock;

    /// 可手动推进的时钟
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        pub fn set(&self, now: DateTime<Utc>) {
            *self.now.lock().unwrap() = now;
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::manual::ManualClock;
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_local_round_trip() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        let clock = AppClock::new(
            Arc::new(ManualClock::new(start)),
            FixedOffset::east_opt(9 * 3600).unwrap(),
        );

        let local = clock.to_local(start);
        assert_eq!(
            local,
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        );
        assert_eq!(clock.to_utc(local), start);
    }

    #[test]
    fn test_start_of_today_in_local_zone() {
        // UTC 2024-01-01 20:00 在 UTC+9 为 1 月 2 日 05:00
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        let manual = Arc::new(ManualClock::new(now));
        let clock = AppClock::new(manual.clone(), FixedOffset::east_opt(9 * 3600).unwrap());
        assert_eq!(
            clock.start_of_today(),
            Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap()
        );

        manual.advance(Duration::hours(20));
        assert_eq!(
            clock.start_of_today(),
            Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap()
        );
    }
}

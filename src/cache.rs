//! Upstream cache lifetime policy.
//!
//! The site only ever shows the *next* Friday or Saturday. The free
//! 5-day forecast APIs can reach the upcoming Friday on weekdays, but
//! over the weekend the target day is beyond their horizon, so fresh
//! requests buy nothing. Hence: short cache on weekdays, long cache on
//! weekends.

use chrono::{Datelike, NaiveDate, Weekday};

/// Cache lifetime used Monday through Friday (1 hour).
pub const WEEKDAY_LIFETIME_SECS: u64 = 3_600;

/// Cache lifetime used on Saturday and Sunday (20 hours).
pub const WEEKEND_LIFETIME_SECS: u64 = 72_000;

/// How long an upstream response may be reused before a fresh call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheWindow {
    pub lifetime_secs: u64,
}

impl CacheWindow {
    /// Render as a `Cache-Control` request directive value.
    pub fn max_age(&self) -> String {
        format!("max-age={}", self.lifetime_secs)
    }
}

/// Compute the cache lifetime for requests issued on `today`.
///
/// Pure function; callers inject the current local date.
pub fn cache_lifetime(today: NaiveDate) -> CacheWindow {
    let lifetime_secs = match today.weekday() {
        Weekday::Sat | Weekday::Sun => WEEKEND_LIFETIME_SECS,
        _ => WEEKDAY_LIFETIME_SECS,
    };
    CacheWindow { lifetime_secs }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

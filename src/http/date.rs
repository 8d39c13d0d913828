//! HTTP date module
//!
//! Formats timestamps as IMF-fixdate and parses the date forms RFC 7231
//! allows in request headers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, TimeDelta, Utc};
use std::time::SystemTime;

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Obsolete RFC 850 form, e.g. `Sunday, 06-Nov-94 08:49:37 GMT`
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// ANSI C `asctime()` form, e.g. `Sun Nov  6 08:49:37 1994`
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Format a UTC timestamp as an HTTP-date
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format(IMF_FIXDATE).to_string()
}

/// `from` plus `secs` seconds, capped at the last instant IMF-fixdate can
/// express (31 Dec 9999 23:59:59 GMT)
pub fn seconds_after(from: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    let latest = NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map_or(DateTime::<Utc>::MAX_UTC, |naive| naive.and_utc());

    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|offset| from.checked_add_signed(offset))
        .map_or(latest, |time| time.min(latest))
}

/// Parse an HTTP-date in any of the three accepted forms
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    [IMF_FIXDATE, RFC_850, ASCTIME]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// A resource modification time at HTTP-date precision
///
/// HTTP dates carry whole seconds, so the time is truncated once here and
/// both the comparison and the header value derive from the same instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastModified {
    time: DateTime<Utc>,
    header: String,
}

impl LastModified {
    pub fn new(modified: SystemTime) -> Self {
        let time = DateTime::<Utc>::from(modified).trunc_subsecs(0);
        Self {
            header: format_http_date(time),
            time,
        }
    }

    pub const fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Value for the `Last-Modified` response header
    pub fn header(&self) -> &str {
        &self.header
    }
}

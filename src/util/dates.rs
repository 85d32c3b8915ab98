//! Timezone-aware display formatting for portal timestamps.
//!
//! Storage is UTC throughout; only rendering localizes, using the portal's
//! configured zone (São Paulo by default) and the `dd/MM/yyyy` shapes the
//! site has always shown.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use time::{OffsetDateTime, UtcOffset};

pub fn localized_datetime(instant: OffsetDateTime, tz: Tz) -> DateTime<Tz> {
    let utc = instant.to_offset(UtcOffset::UTC);
    let base = DateTime::<Utc>::from_timestamp(utc.unix_timestamp(), utc.nanosecond())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    tz.from_utc_datetime(&base.naive_utc())
}

pub fn format_date(instant: OffsetDateTime, tz: Tz) -> String {
    localized_datetime(instant, tz).format("%d/%m/%Y").to_string()
}

pub fn format_date_time(instant: OffsetDateTime, tz: Tz) -> String {
    localized_datetime(instant, tz)
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

const DATE_FMT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Today's UTC calendar date as a `YYYY-MM-DD` key.
pub fn today() -> String {
    format_date(OffsetDateTime::now_utc().date())
}

/// Current UTC timestamp, RFC 3339.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("RFC3339 formatting should not fail")
}

/// Parse a `YYYY-MM-DD` key. Rejects anything else before it reaches I/O.
pub fn parse_date(s: &str) -> anyhow::Result<Date> {
    Date::parse(s, DATE_FMT).map_err(|e| anyhow::anyhow!("invalid date {s:?} (want YYYY-MM-DD): {e}"))
}

pub fn format_date(d: Date) -> String {
    d.format(DATE_FMT).expect("date formatting should not fail")
}

/// The UTC date `n` days before today.
pub fn days_ago(n: i64) -> String {
    format_date(OffsetDateTime::now_utc().date() - Duration::days(n))
}

/// The date `n` days before an arbitrary `YYYY-MM-DD` key.
pub fn minus_days(date: &str, n: i64) -> anyhow::Result<String> {
    Ok(format_date(parse_date(date)? - Duration::days(n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_valid_keys() {
        let d = parse_date("2026-02-10").unwrap();
        assert_eq!(format_date(d), "2026-02-10");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_date("02/10/2026").is_err());
        assert!(parse_date("2026-2-10").is_err());
        assert!(parse_date("yesterday").is_err());
        assert!(parse_date("2026-13-01").is_err());
    }

    #[test]
    fn today_is_a_valid_key() {
        assert!(parse_date(&today()).is_ok());
    }

    #[test]
    fn minus_days_crosses_month_boundaries() {
        assert_eq!(minus_days("2026-03-01", 1).unwrap(), "2026-02-28");
        assert_eq!(minus_days("2026-02-10", 14).unwrap(), "2026-01-27");
    }

    #[test]
    fn days_ago_orders_before_today() {
        // Date keys compare lexicographically.
        assert!(days_ago(7) < today());
        assert_eq!(days_ago(0), today());
    }
}

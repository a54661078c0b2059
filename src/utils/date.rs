// Calendar helpers and date expression parsing

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::models::Timestamp;
use crate::utils::duration::parse_duration;

/// First instant of `date` in `tz`
///
/// When local midnight does not exist (a DST gap at midnight) the first
/// valid hour of the day is used.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    (0..24)
        .filter_map(|h| date.and_hms_opt(h, 0, 0))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Move `dt` by whole calendar days, keeping its wall-clock time
pub fn shift_days<Tz: TimeZone>(dt: &DateTime<Tz>, days: i64) -> DateTime<Tz> {
    let tz = dt.timezone();
    let naive = dt.naive_local() + chrono::Duration::days(days);
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| start_of_day(&tz, naive.date()))
}

/// Parse a date expression relative to the current local time
pub fn parse_date_expr(expr: &str) -> Result<Timestamp> {
    parse_date_expr_at(expr, Local::now())
}

/// Parse a date expression relative to `now`
///
/// Accepted forms: RFC 3339, `2024-01-15`, `2024-01-15T09:30`, `09:30`
/// (today), `today`, `yesterday`, `now`, and offsets into the past such as
/// `-7d` or `-2h30m`. Dates without an offset are local time.
pub fn parse_date_expr_at(expr: &str, now: DateTime<Local>) -> Result<Timestamp> {
    let expr = expr.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(expr) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(start_of_day(&Local, date).with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(expr, "%Y-%m-%dT%H:%M") {
        return localize(naive);
    }

    if let Ok(time) = NaiveTime::parse_from_str(expr, "%H:%M") {
        return localize(now.date_naive().and_time(time));
    }

    if let Some(offset) = expr.strip_prefix('-') {
        let ago = parse_duration(offset)
            .with_context(|| format!("Invalid relative date: {}", expr))?;
        let then = now
            .checked_sub_signed(ago)
            .ok_or_else(|| anyhow::anyhow!("Relative date out of range: {}", expr))?;
        return Ok(then.with_timezone(&Utc));
    }

    match expr {
        "now" => Ok(now.with_timezone(&Utc)),
        "today" => Ok(start_of_day(&Local, now.date_naive()).with_timezone(&Utc)),
        "yesterday" => {
            let day = now.date_naive() - chrono::Duration::days(1);
            Ok(start_of_day(&Local, day).with_timezone(&Utc))
        }
        _ => anyhow::bail!(
            "Unsupported date expression: {}. Use RFC 3339, YYYY-MM-DD, YYYY-MM-DDTHH:MM, HH:MM, today, yesterday or -<duration>.",
            expr
        ),
    }
}

/// Parse `START..END` into a pair of timestamps
pub fn parse_interval_at(expr: &str, now: DateTime<Local>) -> Result<(Timestamp, Timestamp)> {
    let (start, end) = expr
        .split_once("..")
        .ok_or_else(|| anyhow::anyhow!("Invalid interval '{}'. Expected START..END", expr))?;

    let start = parse_date_expr_at(start, now)?;
    let end = parse_date_expr_at(end, now)?;
    Ok((start, end))
}

fn localize(naive: NaiveDateTime) -> Result<Timestamp> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| anyhow::anyhow!("Local time does not exist: {}", naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 17, 15, 0, 0).earliest().unwrap()
    }

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_date_expr_at("2024-01-15T10:00:00Z", fixed_now()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());

        let ts = parse_date_expr_at("2024-01-15T10:00:00+02:00", fixed_now()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_local_date_and_time() {
        let date = parse_date_expr_at("2024-01-15", fixed_now()).unwrap();
        let local = date.with_timezone(&Local);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(local.hour(), 0);

        let dt = parse_date_expr_at("2024-01-15T09:30", fixed_now()).unwrap();
        let local = dt.with_timezone(&Local);
        assert_eq!((local.hour(), local.minute()), (9, 30));
    }

    #[test]
    fn test_parse_time_of_day_is_today() {
        let ts = parse_date_expr_at("09:15", fixed_now()).unwrap();
        let local = ts.with_timezone(&Local);
        assert_eq!(local.date_naive(), fixed_now().date_naive());
        assert_eq!((local.hour(), local.minute()), (9, 15));
    }

    #[test]
    fn test_parse_relative() {
        let now = fixed_now();
        let week_ago = parse_date_expr_at("-7d", now).unwrap();
        assert_eq!(week_ago, (now - chrono::Duration::days(7)).with_timezone(&Utc));

        let today = parse_date_expr_at("today", now).unwrap();
        let yesterday = parse_date_expr_at("yesterday", now).unwrap();
        assert!(yesterday < today);
        assert_eq!(today.with_timezone(&Local).date_naive(), now.date_naive());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_date_expr_at("next tuesday", fixed_now()).is_err());
        assert!(parse_date_expr_at("-7x", fixed_now()).is_err());
    }

    #[test]
    fn test_parse_relative_out_of_range() {
        let err = parse_date_expr_at("-100000000d", fixed_now()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(parse_date_expr_at("-999999999999999d", fixed_now()).is_err());
        assert!(parse_interval_at("-100000000d..now", fixed_now()).is_err());
    }

    #[test]
    fn test_parse_interval() {
        let (start, end) =
            parse_interval_at("2024-01-15T10:00:00Z..2024-01-15T12:00:00Z", fixed_now()).unwrap();
        assert_eq!(end - start, chrono::Duration::hours(2));
        assert!(parse_interval_at("2024-01-15", fixed_now()).is_err());
    }

    #[test]
    fn test_shift_days_keeps_midnight() {
        let monday = start_of_day(&Utc, NaiveDate::from_ymd_opt(2024, 1, 29).unwrap());
        let next = shift_days(&monday, 7);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap());
    }
}

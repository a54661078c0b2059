// Duration formatting and parsing

use anyhow::Result;
use chrono::Duration;

/// Format a duration for reports: `0m`, `45m`, `2h05m`
pub fn format_duration(d: Duration) -> String {
    if d < Duration::zero() {
        return format!("-{}", format_duration(-d));
    }

    let hours = d.num_hours();
    let minutes = d.num_minutes() % 60;

    if hours > 0 {
        format!("{}h{:02}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Parse a compact duration such as `30s`, `10m`, `2h`, `1d`, `1h30m`
pub fn parse_duration(expr: &str) -> Result<Duration> {
    let expr = expr.trim();
    if expr.is_empty() {
        anyhow::bail!("Empty duration");
    }

    let mut total = Duration::zero();
    let mut digits = String::new();

    for c in expr.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let value: i64 = digits
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration format: {}", expr))?;
        digits.clear();

        let part = match c {
            'd' => Duration::try_days(value),
            'h' => Duration::try_hours(value),
            'm' => Duration::try_minutes(value),
            's' => Duration::try_seconds(value),
            _ => anyhow::bail!("Invalid duration unit '{}' in: {}", c, expr),
        };

        total = part
            .and_then(|part| total.checked_add(&part))
            .ok_or_else(|| anyhow::anyhow!("Duration out of range: {}", expr))?;
    }

    if !digits.is_empty() {
        anyhow::bail!("Duration is missing a unit: {}", expr);
    }

    if total <= Duration::zero() {
        anyhow::bail!("Duration must be greater than 0");
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::zero()), "0m");
        assert_eq!(format_duration(Duration::seconds(59)), "0m");
        assert_eq!(format_duration(Duration::minutes(45)), "45m");
        assert_eq!(format_duration(Duration::minutes(60)), "1h00m");
        assert_eq!(format_duration(Duration::minutes(125)), "2h05m");
        assert_eq!(format_duration(Duration::hours(30)), "30h00m");
        assert_eq!(format_duration(Duration::minutes(-90)), "-1h30m");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::seconds(30));
        assert_eq!(parse_duration("10m").unwrap(), Duration::minutes(10));
        assert_eq!(parse_duration("2h").unwrap(), Duration::hours(2));
        assert_eq!(parse_duration("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::minutes(90));
    }

    #[test]
    fn test_parse_duration_errors() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("3w").is_err());
        assert!(parse_duration("0m").is_err());
    }

    #[test]
    fn test_parse_duration_out_of_range() {
        let err = parse_duration("999999999999999d").unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(parse_duration("99999999999999999999s").is_err());
        assert!(parse_duration("100000000000d100000000000d").is_err());
    }
}

use chrono::{DateTime, FixedOffset};

const BEIJING_OFFSET_SECS: i32 = 8 * 3600;

/// Render an RFC 2822 feed date in UTC+8 as `2024年04月05日 09:30PM`.
///
/// Unparsable input is returned unchanged.
pub fn format_pub_date(raw: &str) -> String {
    let parsed = DateTime::parse_from_rfc2822(raw.trim())
        .or_else(|_| DateTime::parse_from_rfc3339(raw.trim()));

    let Ok(date) = parsed else {
        tracing::warn!("Unparsable publish date: {}", raw);
        return raw.to_string();
    };

    let Some(beijing) = FixedOffset::east_opt(BEIJING_OFFSET_SECS) else {
        return raw.to_string();
    };

    date.with_timezone(&beijing)
        .format("%Y年%m月%d日 %I:%M%p")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_in_beijing_time() {
        assert_eq!(
            format_pub_date("Fri, 05 Apr 2024 13:30:00 GMT"),
            "2024年04月05日 09:30PM"
        );
        assert_eq!(
            format_pub_date("Fri, 05 Apr 2024 16:05:00 +0000"),
            "2024年04月06日 12:05AM"
        );
        assert_eq!(
            format_pub_date("Sat, 06 Apr 2024 12:00:00 +0800"),
            "2024年04月06日 12:00PM"
        );
    }

    #[test]
    fn test_unparsable_passes_through() {
        assert_eq!(format_pub_date("yesterday"), "yesterday");
    }
}

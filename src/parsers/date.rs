//! 注文日の決定

use chrono::{DateTime, NaiveDate, Utc};

/// Date ヘッダー（RFC 2822）から UTC の日付を取り出す
///
/// "Mon, 1 Jan 2024 12:00:00 +0000 (UTC)" のような末尾コメントは無視する。
/// ヘッダーが解釈できない場合は internal_date（ミリ秒）にフォールバックする。
pub fn resolve_order_date(date_header: Option<&str>, internal_date: Option<i64>) -> Option<NaiveDate> {
    if let Some(header) = date_header {
        match parse_date_header(header) {
            Some(date) => return Some(date),
            None => log::warn!("Unparseable Date header, falling back to internal_date"),
        }
    }

    internal_date
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.date_naive())
}

fn parse_date_header(header: &str) -> Option<NaiveDate> {
    let without_comment = match header.find('(') {
        Some(pos) => &header[..pos],
        None => header,
    };
    DateTime::parse_from_rfc2822(without_comment.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rfc2822_header() {
        assert_eq!(
            resolve_order_date(Some("Tue, 2 Jan 2024 18:30:00 +0000"), None),
            Some(ymd(2024, 1, 2))
        );
    }

    #[test]
    fn test_header_is_converted_to_utc_date() {
        // IST の深夜は UTC では前日
        assert_eq!(
            resolve_order_date(Some("Wed, 3 Jan 2024 01:00:00 +0530"), None),
            Some(ymd(2024, 1, 2))
        );
    }

    #[test]
    fn test_trailing_comment_is_ignored() {
        assert_eq!(
            resolve_order_date(Some("Fri, 5 Jul 2024 10:15:00 +0000 (UTC)"), None),
            Some(ymd(2024, 7, 5))
        );
    }

    #[test]
    fn test_falls_back_to_internal_date() {
        assert_eq!(
            resolve_order_date(Some("not a date"), Some(1719792000000)),
            Some(ymd(2024, 7, 1))
        );
        assert_eq!(resolve_order_date(None, Some(1704067200000)), Some(ymd(2024, 1, 1)));
    }

    #[test]
    fn test_no_date_available() {
        assert_eq!(resolve_order_date(Some("garbage"), None), None);
        assert_eq!(resolve_order_date(None, None), None);
    }
}

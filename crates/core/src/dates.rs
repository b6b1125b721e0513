//! Calendar helpers: localized page slugs, display labels and cache keys.

use chrono::{Datelike, NaiveDate};

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Slug of the localized day page, e.g. `11월_2일`.
pub fn localized_slug(date: NaiveDate) -> String {
    format!("{}월_{}일", date.month(), date.day())
}

/// Display label, e.g. `11월 2일`.
pub fn display_label(date: NaiveDate) -> String {
    format!("{}월 {}일", date.month(), date.day())
}

/// `YYYY-MM-DD` part of a cache key.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Convert an English `"November 2"` label to `"11월 2일"`.
///
/// Anything that is not `<Month> <day>` is returned unchanged.
pub fn english_label_to_korean(label: &str) -> String {
    let parts: Vec<&str> = label.split(' ').collect();
    if let [month, day] = parts.as_slice() {
        if let Some(index) = ENGLISH_MONTHS.iter().position(|m| m == month) {
            return format!("{}월 {}일", index + 1, day);
        }
    }
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_localized_slug_and_label() {
        assert_eq!(localized_slug(date(2025, 11, 2)), "11월_2일");
        assert_eq!(display_label(date(2025, 1, 15)), "1월 15일");
    }

    #[test]
    fn test_date_key_is_zero_padded() {
        assert_eq!(date_key(date(2025, 3, 7)), "2025-03-07");
    }

    #[test]
    fn test_english_label_conversion() {
        assert_eq!(english_label_to_korean("November 2"), "11월 2일");
        assert_eq!(english_label_to_korean("May 31"), "5월 31일");
        assert_eq!(english_label_to_korean("Nov 2"), "Nov 2");
        assert_eq!(english_label_to_korean("11월 2일"), "11월 2일");
    }
}

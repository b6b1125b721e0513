//! Korean-relevance ordering of entry lists.

use lazy_static::lazy_static;

use crate::models::HistoricalEntry;

/// Keywords marking an entry as Korea-related (place names, periods,
/// English equivalents). Matched case-insensitively as substrings.
pub const KOREAN_KEYWORDS: &[&str] = &[
    "한국",
    "조선",
    "대한민국",
    "서울",
    "부산",
    "경주",
    "신라",
    "백제",
    "고구려",
    "Korea",
    "Korean",
    "Seoul",
    "South Korea",
    "North Korea",
    "조선민주주의인민공화국",
    "북한",
    "남한",
    "고려",
    "발해",
    "왜란",
    "임진왜란",
    "6.25",
    "한국전쟁",
    "Korean War",
    "DMZ",
    "판문점",
];

lazy_static! {
    static ref LOWERCASE_KEYWORDS: Vec<String> =
        KOREAN_KEYWORDS.iter().map(|k| k.to_lowercase()).collect();
}

/// Whether `text` mentions any Korea-related keyword.
pub fn is_korean_related(text: &str) -> bool {
    let lower = text.to_lowercase();
    LOWERCASE_KEYWORDS.iter().any(|k| lower.contains(k.as_str()))
}

/// Stable partition: related entries first, then the rest, each group in
/// its original relative order. Input entries are cloned, never modified.
pub fn prioritize(entries: &[HistoricalEntry]) -> Vec<HistoricalEntry> {
    let (mut related, rest): (Vec<_>, Vec<_>) = entries
        .iter()
        .cloned()
        .partition(|entry| is_korean_related(&entry.text));
    related.extend(rest);
    related
}

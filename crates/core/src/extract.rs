//! Markup extraction for localized day pages.
//!
//! [`MarkupExtractor`] is the seam callers depend on; [`RegexExtractor`] is
//! the pattern-matching implementation used for the rendered-page source.
//! A structured HTML parser can replace it without touching the fetcher.

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use crate::models::{EntryLink, HistoricalEntry, UNKNOWN_YEAR};

/// Section heading id of the events list.
pub const EVENTS_SECTION_ID: &str = "사건";
/// Section heading id of the births list.
pub const BIRTHS_SECTION_ID: &str = "탄생";
/// Maximum number of list items read per section.
pub const MAX_ITEMS_PER_SECTION: usize = 20;
/// Entries whose text is this many characters or fewer are dropped.
pub const MIN_TEXT_CHARS: usize = 5;

lazy_static! {
    static ref EVENTS_NESTED: Regex = nested_section_pattern(EVENTS_SECTION_ID);
    static ref EVENTS_FLAT: Regex = flat_section_pattern(EVENTS_SECTION_ID);
    static ref BIRTHS_NESTED: Regex = nested_section_pattern(BIRTHS_SECTION_ID);
    static ref BIRTHS_FLAT: Regex = flat_section_pattern(BIRTHS_SECTION_ID);

    static ref LIST_ITEM: Regex =
        Regex::new(r"(?s)<li[^>]*>.*?</li>").expect("Invalid regex pattern");

    /// `<a href="./1987년">1987년</a>`
    static ref LINKED_YEAR: Regex =
        Regex::new(r#"<a[^>]*href="\./(\d{4})년"[^>]*>\d{4}년</a>"#).expect("Invalid regex pattern");
    /// `1987년`
    static ref SUFFIXED_YEAR: Regex = Regex::new(r"(\d{4})년").expect("Invalid regex pattern");
    /// Any 4-digit run.
    static ref BARE_YEAR: Regex = Regex::new(r"(\d{4})").expect("Invalid regex pattern");

    static ref TAG: Regex = Regex::new(r"<[^>]+>").expect("Invalid regex pattern");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("Invalid regex pattern");

    /// `1862년 - ...`
    static ref LEADING_YEAR_DASH: Regex =
        Regex::new(r"^\d{4}년\s*[-–—]\s*").expect("Invalid regex pattern");
    /// `1987년 ...` or `1987년 6월 ...`
    static ref LEADING_YEAR_MONTH: Regex =
        Regex::new(r"^\d{4}년\s+(?:\d{1,2}월\s+)?").expect("Invalid regex pattern");

    static ref ARTICLE_LINK: Regex =
        Regex::new(r#"<a[^>]*href="\./([^"]+)"[^>]*title="([^"]+)"[^>]*>"#).expect("Invalid regex pattern");
}

fn nested_section_pattern(section_id: &str) -> Regex {
    Regex::new(&format!(
        r#"(?s)<section[^>]*>.*?<h2[^>]*id="{}"[^>]*>.*?</h2>\s*<ul[^>]*id="[^"]*">(.*?)</ul>"#,
        regex::escape(section_id)
    ))
    .expect("Invalid regex pattern")
}

fn flat_section_pattern(section_id: &str) -> Regex {
    Regex::new(&format!(
        r#"(?s)<h2[^>]*id="{}"[^>]*>.*?</h2>\s*<ul[^>]*id="[^"]*">(.*?)</ul>"#,
        regex::escape(section_id)
    ))
    .expect("Invalid regex pattern")
}

/// Events and births read from one day page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedSections {
    pub events: Vec<HistoricalEntry>,
    pub births: Vec<HistoricalEntry>,
}

impl ExtractedSections {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.births.is_empty()
    }
}

/// Turns raw day-page markup into entry lists.
///
/// A missing section is not an error: the corresponding list is empty.
pub trait MarkupExtractor: Send + Sync {
    fn extract(&self, markup: &str) -> ExtractedSections;
}

/// Regex-based extractor for Parsoid-rendered day pages.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    wiki_base_url: String,
}

impl RegexExtractor {
    /// `wiki_base_url` is the site root used to build absolute article links,
    /// e.g. `https://ko.wikipedia.org`.
    pub fn new(wiki_base_url: impl Into<String>) -> Self {
        Self {
            wiki_base_url: wiki_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn extract_section(&self, markup: &str, nested: &Regex, flat: &Regex, label: &str) -> Vec<HistoricalEntry> {
        let list = match nested.captures(markup).or_else(|| flat.captures(markup)) {
            Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or_default(),
            None => {
                debug!("Section '{}' not found in markup", label);
                return Vec::new();
            }
        };

        let fragments: Vec<&str> = LIST_ITEM.find_iter(list).map(|m| m.as_str()).collect();
        debug!("Section '{}': {} list items found", label, fragments.len());

        fragments
            .into_iter()
            .take(MAX_ITEMS_PER_SECTION)
            .filter_map(|fragment| self.parse_item(fragment))
            .collect()
    }

    fn parse_item(&self, fragment: &str) -> Option<HistoricalEntry> {
        let plain = WHITESPACE
            .replace_all(&TAG.replace_all(fragment, " "), " ")
            .trim()
            .to_string();

        let year = extract_year(fragment, &plain);
        if year == UNKNOWN_YEAR {
            warn!(
                "No year found in list item: {}",
                fragment.chars().take(100).collect::<String>()
            );
        }

        let text = strip_leading_year(&plain);
        if text.chars().count() <= MIN_TEXT_CHARS {
            return None;
        }

        Some(HistoricalEntry {
            year,
            text,
            raw_markup: fragment.to_string(),
            links: self.extract_links(fragment),
        })
    }

    fn extract_links(&self, fragment: &str) -> Vec<EntryLink> {
        ARTICLE_LINK
            .captures_iter(fragment)
            .map(|caps| EntryLink {
                title: caps[2].to_string(),
                url: format!("{}/wiki/{}", self.wiki_base_url, urlencoding::encode(&caps[1])),
            })
            .collect()
    }
}

impl MarkupExtractor for RegexExtractor {
    fn extract(&self, markup: &str) -> ExtractedSections {
        ExtractedSections {
            events: self.extract_section(markup, &EVENTS_NESTED, &EVENTS_FLAT, EVENTS_SECTION_ID),
            births: self.extract_section(markup, &BIRTHS_NESTED, &BIRTHS_FLAT, BIRTHS_SECTION_ID),
        }
    }
}

/// Linked year in the markup first, then `NNNN년`, then any 4-digit run in
/// the visible text. Attribute values are never consulted for the last two.
fn extract_year(fragment: &str, plain: &str) -> String {
    LINKED_YEAR
        .captures(fragment)
        .or_else(|| SUFFIXED_YEAR.captures(plain))
        .or_else(|| BARE_YEAR.captures(plain))
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
}

fn strip_leading_year(plain: &str) -> String {
    let text = LEADING_YEAR_DASH.replace(plain, "");
    LEADING_YEAR_MONTH.replace(&text, "").trim().to_string()
}

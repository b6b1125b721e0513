//! Data model for a day of history.
//!
//! The serialized form matches the JSON published by the secondary
//! on-this-day API (`{date, url, data: {Events, Births, Deaths}}`), so the
//! same types are used to parse upstream bodies, to persist cache records
//! and to answer HTTP clients.

use serde::{Deserialize, Deserializer, Serialize};

use crate::prioritize::prioritize;

/// Year marker used when no 4-digit year could be found.
pub const UNKNOWN_YEAR: &str = "?";

/// Outbound link attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLink {
    pub title: String,
    #[serde(rename = "link")]
    pub url: String,
}

/// One historical event or birth record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalEntry {
    /// 4-digit year, or [`UNKNOWN_YEAR`].
    #[serde(default = "unknown_year", deserialize_with = "deserialize_year")]
    pub year: String,
    /// Human-readable text with markup stripped.
    pub text: String,
    /// Original markup fragment, kept for display.
    #[serde(rename = "html", default)]
    pub raw_markup: String,
    #[serde(default)]
    pub links: Vec<EntryLink>,
}

fn unknown_year() -> String {
    UNKNOWN_YEAR.to_string()
}

// Upstream APIs are inconsistent about numeric vs string years.
fn deserialize_year<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => unknown_year(),
    })
}

/// Everything known about one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DayHistoryWire", into = "DayHistoryWire")]
pub struct DayHistory {
    /// Localized label, e.g. `11월 2일`.
    pub date: String,
    pub source_url: String,
    pub events: Vec<HistoricalEntry>,
    pub births: Vec<HistoricalEntry>,
    /// Not populated by the primary source.
    pub deaths: Vec<HistoricalEntry>,
}

impl DayHistory {
    /// Copy with `events` and `births` reordered so Korea-related entries come first.
    ///
    /// Entry content is never modified and `deaths` keeps its order.
    pub fn prioritized(&self) -> DayHistory {
        DayHistory {
            date: self.date.clone(),
            source_url: self.source_url.clone(),
            events: prioritize(&self.events),
            births: prioritize(&self.births),
            deaths: self.deaths.clone(),
        }
    }

    /// Drops entries whose text is blank from every list.
    pub fn without_blank_entries(mut self) -> DayHistory {
        for entries in [&mut self.events, &mut self.births, &mut self.deaths] {
            entries.retain(|entry| !entry.text.trim().is_empty());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.births.is_empty() && self.deaths.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct DayHistoryWire {
    date: String,
    url: String,
    data: SectionsWire,
}

#[derive(Serialize, Deserialize)]
struct SectionsWire {
    #[serde(rename = "Events")]
    events: Vec<HistoricalEntry>,
    #[serde(rename = "Births")]
    births: Vec<HistoricalEntry>,
    #[serde(rename = "Deaths", default)]
    deaths: Vec<HistoricalEntry>,
}

impl From<DayHistoryWire> for DayHistory {
    fn from(wire: DayHistoryWire) -> Self {
        DayHistory {
            date: wire.date,
            source_url: wire.url,
            events: wire.data.events,
            births: wire.data.births,
            deaths: wire.data.deaths,
        }
    }
}

impl From<DayHistory> for DayHistoryWire {
    fn from(history: DayHistory) -> Self {
        DayHistoryWire {
            date: history.date,
            url: history.source_url,
            data: SectionsWire {
                events: history.events,
                births: history.births,
                deaths: history.deaths,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_secondary_api_body() {
        let body = r#"{
            "date": "November 2",
            "url": "https://wikipedia.org/wiki/November_2",
            "data": {
                "Events": [
                    {"year": "1947", "text": "The Spruce Goose flies.", "html": "<a>1947</a>", "links": [
                        {"title": "Spruce Goose", "link": "https://wikipedia.org/wiki/Spruce_Goose"}
                    ]}
                ],
                "Births": [{"year": 1734, "text": "Daniel Boone, American pioneer", "html": "", "links": []}],
                "Deaths": []
            }
        }"#;

        let history: DayHistory = serde_json::from_str(body).unwrap();
        assert_eq!(history.date, "November 2");
        assert_eq!(history.source_url, "https://wikipedia.org/wiki/November_2");
        assert_eq!(history.events.len(), 1);
        assert_eq!(history.events[0].links[0].url, "https://wikipedia.org/wiki/Spruce_Goose");
        assert_eq!(history.births[0].year, "1734");
    }

    #[test]
    fn test_missing_sections_are_malformed() {
        let body = r#"{"date": "November 2", "url": "x", "data": {"Events": []}}"#;
        assert!(serde_json::from_str::<DayHistory>(body).is_err());

        let body = r#"{"date": "November 2", "url": "x", "data": {"Events": null, "Births": []}}"#;
        assert!(serde_json::from_str::<DayHistory>(body).is_err());
    }

    #[test]
    fn test_deaths_default_to_empty() {
        let body = r#"{"date": "d", "url": "u", "data": {"Events": [], "Births": []}}"#;
        let history: DayHistory = serde_json::from_str(body).unwrap();
        assert!(history.deaths.is_empty());
        assert!(history.is_empty());
    }

    #[test]
    fn test_missing_year_becomes_unknown() {
        let entry: HistoricalEntry = serde_json::from_str(r#"{"text": "Something happened"}"#).unwrap();
        assert_eq!(entry.year, UNKNOWN_YEAR);
        assert!(entry.links.is_empty());
    }

    #[test]
    fn test_serializes_in_wire_shape() {
        let history = DayHistory {
            date: "11월 2일".to_string(),
            source_url: "https://ko.wikipedia.org/wiki/x".to_string(),
            events: vec![],
            births: vec![],
            deaths: vec![],
        };
        let value = serde_json::to_value(&history).unwrap();
        assert_eq!(value["url"], "https://ko.wikipedia.org/wiki/x");
        assert!(value["data"]["Events"].is_array());
        assert!(value["data"]["Births"].is_array());
        assert!(value["data"]["Deaths"].is_array());
    }
}

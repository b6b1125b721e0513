//! Paced translation of a whole day.

use std::time::Duration;

use log::{debug, info};
use oneul_core::{DayHistory, HistoricalEntry};

use crate::translator::Translator;

/// Translate the leading events and births of `history`.
///
/// Only the first `bulk.events` events and `bulk.births` births are
/// translated; the rest and all deaths are returned as they are. Delays are
/// only spent before items that need a live call, so a fully cached day
/// returns without sleeping.
pub async fn translate_history(translator: &Translator, history: &DayHistory) -> DayHistory {
    let pacing = &translator.config().bulk;

    let leading = history
        .events
        .iter()
        .take(pacing.events)
        .chain(history.births.iter().take(pacing.births));
    let pending = leading
        .filter(|entry| translator.needs_live_call(&entry.text))
        .count();

    if pending == 0 {
        info!("Every leading entry is cached or already Korean");
    } else {
        info!("{} entries need a live translation", pending);
        tokio::time::sleep(pacing.initial_delay).await;
    }

    let events = translate_section(
        translator,
        &history.events,
        pacing.events,
        pacing.item_delay,
        "events",
    )
    .await;

    let births_pending = history
        .births
        .iter()
        .take(pacing.births)
        .any(|entry| translator.needs_live_call(&entry.text));
    if births_pending {
        debug!("Pausing before births");
        tokio::time::sleep(pacing.section_delay).await;
    }

    let births = translate_section(
        translator,
        &history.births,
        pacing.births,
        pacing.item_delay,
        "births",
    )
    .await;

    DayHistory {
        date: history.date.clone(),
        source_url: history.source_url.clone(),
        events,
        births,
        deaths: history.deaths.clone(),
    }
}

/// [`translate_history`] restricted to cached translations.
///
/// Same leading entries, no network calls and no delays: entries without a
/// cached translation keep their original text.
pub fn translate_history_cached(translator: &Translator, history: &DayHistory) -> DayHistory {
    let pacing = &translator.config().bulk;
    let cached_section = |entries: &[HistoricalEntry], limit: usize| {
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                if index >= limit {
                    return entry.clone();
                }
                HistoricalEntry {
                    text: translator.translate_cached(&entry.text),
                    ..entry.clone()
                }
            })
            .collect::<Vec<_>>()
    };

    DayHistory {
        date: history.date.clone(),
        source_url: history.source_url.clone(),
        events: cached_section(&history.events, pacing.events),
        births: cached_section(&history.births, pacing.births),
        deaths: history.deaths.clone(),
    }
}

async fn translate_section(
    translator: &Translator,
    entries: &[HistoricalEntry],
    limit: usize,
    item_delay: Duration,
    section: &str,
) -> Vec<HistoricalEntry> {
    let mut translated = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        if index >= limit {
            translated.push(entry.clone());
            continue;
        }

        if index > 0 && translator.needs_live_call(&entry.text) {
            debug!("Translating {} {}/{}", section, index + 1, limit.min(entries.len()));
            tokio::time::sleep(item_delay).await;
        }

        translated.push(HistoricalEntry {
            text: translator.translate(&entry.text).await,
            ..entry.clone()
        });
    }

    translated
}

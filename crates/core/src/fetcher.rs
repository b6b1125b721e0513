//! Multi-source fetcher for today's history.
//!
//! The fetcher walks an ordered list of sources and cache tiers:
//! 1. The primary localized source (authoritative when it yields events)
//! 2. A fresh cache record for the same day
//! 3. The fallback sources in order (direct secondary API, then relays)
//! 4. Stale cache records for each of the previous lookback days
//!
//! Only when every tier fails does a caller see [`HistoryError::Exhausted`].
//! Concurrent requests for the same day share one in-flight fetch.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, Local, NaiveDate};
use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};

use crate::cache::CacheManager;
use crate::config::SourceConfig;
use crate::dates::{display_label, english_label_to_korean};
use crate::errors::HistoryError;
use crate::models::DayHistory;
use crate::sources::{HistorySource, JsonApiSource, WikipediaSource};

type SharedFetch = Shared<BoxFuture<'static, Result<DayHistory, HistoryError>>>;

/// Fetches a [`DayHistory`] with ordered fallback. Cheap to clone.
#[derive(Clone)]
pub struct HistoryFetcher {
    inner: Arc<FetcherInner>,
}

struct FetcherInner {
    primary: Arc<dyn HistorySource>,
    fallbacks: Vec<Arc<dyn HistorySource>>,
    cache: CacheManager,
    in_flight: Mutex<Option<(NaiveDate, SharedFetch)>>,
}

impl HistoryFetcher {
    pub fn new(
        primary: Arc<dyn HistorySource>,
        fallbacks: Vec<Arc<dyn HistorySource>>,
        cache: CacheManager,
    ) -> Self {
        Self {
            inner: Arc::new(FetcherInner {
                primary,
                fallbacks,
                cache,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Fetcher over the production sources described by `config`.
    pub fn build(config: &SourceConfig, cache: CacheManager) -> Self {
        let primary: Arc<dyn HistorySource> = Arc::new(WikipediaSource::new(config));
        let fallbacks = JsonApiSource::fallback_chain(config)
            .into_iter()
            .map(|source| Arc::new(source) as Arc<dyn HistorySource>)
            .collect();
        Self::new(primary, fallbacks, cache)
    }

    pub fn cache(&self) -> &CacheManager {
        &self.inner.cache
    }

    /// Today's history in the local time zone.
    pub async fn fetch_today(&self) -> Result<DayHistory, HistoryError> {
        self.fetch_joined(Local::now().date_naive()).await
    }

    /// [`fetch_on`](Self::fetch_on), joining any fetch already running for `date`.
    pub async fn fetch_joined(&self, date: NaiveDate) -> Result<DayHistory, HistoryError> {
        let fetch = {
            let mut slot = self.lock_in_flight();
            match slot.as_ref() {
                Some((running_for, fetch)) if *running_for == date => {
                    debug!("Joining in-flight fetch for {}", date);
                    fetch.clone()
                }
                _ => {
                    let this = self.clone();
                    let fetch = async move { this.fetch_on(date).await }.boxed().shared();
                    *slot = Some((date, fetch.clone()));
                    fetch
                }
            }
        };

        let result = fetch.clone().await;

        let mut slot = self.lock_in_flight();
        if matches!(slot.as_ref(), Some((_, current)) if current.ptr_eq(&fetch)) {
            *slot = None;
        }
        result
    }

    /// Run the full fallback sequence for `date` without joining.
    pub async fn fetch_on(&self, date: NaiveDate) -> Result<DayHistory, HistoryError> {
        let inner = &self.inner;

        match inner.primary.fetch(date).await {
            Ok(history) if !history.events.is_empty() => {
                info!(
                    "Loaded {} events from {}",
                    history.events.len(),
                    inner.primary.id()
                );
                let history = history.prioritized();
                inner.cache.put(date, &history);
                return Ok(history);
            }
            Ok(_) => info!("{} returned no events for {}", inner.primary.id(), date),
            Err(e) => warn!("Primary source failed: {}", e),
        }

        if let Some(record) = inner.cache.get(date) {
            info!("Serving cached history for {}", date);
            return Ok(record.payload.prioritized());
        }

        for source in &inner.fallbacks {
            match source.fetch(date).await {
                Ok(mut history) => {
                    info!("Loaded history for {} from {}", date, source.id());
                    history.date = english_label_to_korean(&history.date);
                    let history = history.prioritized();
                    inner.cache.put(date, &history);
                    return Ok(history);
                }
                Err(e) => warn!("Fallback source failed: {}", e),
            }
        }

        for days_back in 1..=i64::from(inner.cache.config().lookback_days) {
            let day = date - Duration::days(days_back);
            if let Some(mut history) = inner.cache.get_stale(day) {
                warn!("Every source failed; serving stale history from {}", day);
                history.date = display_label(date);
                return Ok(history.prioritized());
            }
        }

        warn!("No source or cached record available for {}", date);
        Err(HistoryError::Exhausted)
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<(NaiveDate, SharedFetch)>> {
        self.inner.in_flight.lock().unwrap_or_else(|poisoned| {
            warn!("In-flight fetch mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use crate::models::HistoricalEntry;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockSource {
        id: &'static str,
        response: Option<DayHistory>,
        delay: Option<std::time::Duration>,
        call_count: AtomicUsize,
    }

    impl MockSource {
        fn new(id: &'static str, response: Option<DayHistory>) -> Arc<Self> {
            Arc::new(Self {
                id,
                response,
                delay: None,
                call_count: AtomicUsize::new(0),
            })
        }

        fn slow(id: &'static str, response: DayHistory) -> Arc<Self> {
            Arc::new(Self {
                id,
                response: Some(response),
                delay: Some(std::time::Duration::from_millis(50)),
                call_count: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HistorySource for MockSource {
        fn id(&self) -> &str {
            self.id
        }

        async fn fetch(&self, _date: NaiveDate) -> Result<DayHistory, SourceError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.response.clone().ok_or_else(|| SourceError::Http {
                provider: self.id.to_string(),
                status: 503,
            })
        }
    }

    fn entry(year: &str, text: &str) -> HistoricalEntry {
        HistoricalEntry {
            year: year.to_string(),
            text: text.to_string(),
            raw_markup: String::new(),
            links: vec![],
        }
    }

    fn history(label: &str, events: Vec<HistoricalEntry>) -> DayHistory {
        DayHistory {
            date: label.to_string(),
            source_url: "https://example.org/day".to_string(),
            events,
            births: vec![],
            deaths: vec![],
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 2).unwrap()
    }

    fn cache() -> CacheManager {
        CacheManager::new(Arc::new(MemoryStore::new()))
    }

    fn fetcher(
        primary: &Arc<MockSource>,
        fallbacks: &[&Arc<MockSource>],
        cache: CacheManager,
    ) -> HistoryFetcher {
        HistoryFetcher::new(
            primary.clone(),
            fallbacks
                .iter()
                .map(|s| (*s).clone() as Arc<dyn HistorySource>)
                .collect(),
            cache,
        )
    }

    #[tokio::test]
    async fn test_primary_success_is_prioritized_and_cached() {
        let primary = MockSource::new(
            "PRIMARY",
            Some(history(
                "11월 2일",
                vec![
                    entry("1947", "The first flight of a flying boat"),
                    entry("1950", "Battle in Korea begins a new phase"),
                ],
            )),
        );
        let secondary = MockSource::new("SECONDARY", None);
        let cache = cache();
        let fetcher = fetcher(&primary, &[&secondary], cache.clone());

        let result = fetcher.fetch_on(today()).await.unwrap();

        assert_eq!(result.events[0].year, "1950");
        assert_eq!(secondary.calls(), 0);
        assert_eq!(cache.get(today()).unwrap().payload, result);
    }

    #[tokio::test]
    async fn test_primary_without_events_falls_back_to_fresh_cache() {
        let primary = MockSource::new("PRIMARY", Some(history("11월 2일", vec![])));
        let secondary = MockSource::new("SECONDARY", None);
        let cache = cache();
        let cached = history("11월 2일", vec![entry("1919", "삼일 운동이 시작되었다")]);
        cache.put(today(), &cached);
        let fetcher = fetcher(&primary, &[&secondary], cache);

        let result = fetcher.fetch_on(today()).await.unwrap();

        assert_eq!(result, cached);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_first_successful_relay_wins() {
        let primary = MockSource::new("PRIMARY", None);
        let secondary = MockSource::new("SECONDARY", None);
        let relay1 = MockSource::new(
            "RELAY_1",
            Some(history("November 2", vec![entry("1947", "The Spruce Goose flies")])),
        );
        let relay2 = MockSource::new(
            "RELAY_2",
            Some(history("November 2", vec![entry("2000", "Should never be used")])),
        );
        let cache = cache();
        let fetcher = fetcher(&primary, &[&secondary, &relay1, &relay2], cache.clone());

        let result = fetcher.fetch_on(today()).await.unwrap();

        assert_eq!(result.date, "11월 2일");
        assert_eq!(result.events[0].year, "1947");
        assert_eq!(secondary.calls(), 1);
        assert_eq!(relay1.calls(), 1);
        assert_eq!(relay2.calls(), 0);
        assert!(cache.get(today()).is_some());
    }

    #[tokio::test]
    async fn test_stale_record_is_relabeled_for_today() {
        let primary = MockSource::new("PRIMARY", None);
        let secondary = MockSource::new("SECONDARY", None);
        let cache = cache();
        let three_days_ago = today() - Duration::days(3);
        cache.put_at(
            three_days_ago,
            &history("10월 30일", vec![entry("1988", "Old but still useful")]),
            0,
        );
        let fetcher = fetcher(&primary, &[&secondary], cache);

        let result = fetcher.fetch_on(today()).await.unwrap();

        assert_eq!(result.date, "11월 2일");
        assert_eq!(result.events[0].year, "1988");
    }

    #[tokio::test]
    async fn test_stale_scan_stops_at_lookback() {
        let primary = MockSource::new("PRIMARY", None);
        let cache = cache();
        let store_only = today() - Duration::days(8);
        cache.put_at(
            store_only,
            &history("10월 25일", vec![entry("1988", "Too old to be served")]),
            0,
        );
        let fetcher = fetcher(&primary, &[], cache);

        let result = fetcher.fetch_on(today()).await;
        assert_eq!(result, Err(HistoryError::Exhausted));
    }

    #[tokio::test]
    async fn test_everything_failing_is_exhausted() {
        let primary = MockSource::new("PRIMARY", None);
        let secondary = MockSource::new("SECONDARY", None);
        let fetcher = fetcher(&primary, &[&secondary], cache());

        let err = fetcher.fetch_on(today()).await.unwrap_err();

        assert_eq!(err, HistoryError::Exhausted);
        assert!(err.to_string().contains("데이터를 가져올 수 없습니다"));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let primary = MockSource::slow(
            "PRIMARY",
            history("11월 2일", vec![entry("1950", "Korea event in the news")]),
        );
        let fetcher = fetcher(&primary, &[], cache());

        let (a, b) = tokio::join!(fetcher.fetch_joined(today()), fetcher.fetch_joined(today()));

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(primary.calls(), 1);

        // Finished fetches are not reused.
        fetcher.fetch_joined(today()).await.unwrap();
        assert_eq!(primary.calls(), 2);
    }
}

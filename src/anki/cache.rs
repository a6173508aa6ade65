//! Time-bounded cache of flashcard decks, keyed by learning language.
//!
//! Words and grammar decks are cached independently.  An entry younger than
//! the TTL is returned without touching the network; anything older is
//! refetched.  A failed refetch falls back to the expired entry when there is
//! one, and never overwrites it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::anki::client::{AnkiDeckSource, DeckSource};
use crate::anki::DeckError;
use crate::config::{AnkiConfig, DeckConfig};

/// Which of a language's two decks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeckKind {
    Words,
    Grammar,
}

impl DeckKind {
    pub fn label(self) -> &'static str {
        match self {
            DeckKind::Words => "words",
            DeckKind::Grammar => "grammar",
        }
    }
}

/// A cached value and the moment it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: Instant,
}

impl<T> CacheEntry<T> {
    /// `true` while `now - fetched_at` is strictly below `ttl`.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

type Deck = Arc<Vec<String>>;
type Slot = Mutex<HashMap<String, CacheEntry<Deck>>>;

pub struct DeckCache {
    source: Arc<dyn DeckSource>,
    decks: Vec<DeckConfig>,
    ttl: Duration,
    words: Slot,
    grammar: Slot,
}

impl DeckCache {
    pub fn new(source: Arc<dyn DeckSource>, decks: Vec<DeckConfig>, ttl: Duration) -> Self {
        Self {
            source,
            decks,
            ttl,
            words: Mutex::new(HashMap::new()),
            grammar: Mutex::new(HashMap::new()),
        }
    }

    /// Cache backed by the AnkiConnect endpoint in `config`.
    pub fn from_config(config: &AnkiConfig) -> Self {
        Self::new(
            Arc::new(AnkiDeckSource::from_config(config)),
            config.decks.clone(),
            Duration::from_secs(config.cache_ttl_secs),
        )
    }

    pub async fn word_deck(&self, language: &str) -> Result<Deck, DeckError> {
        self.deck(DeckKind::Words, language).await
    }

    pub async fn grammar_deck(&self, language: &str) -> Result<Deck, DeckError> {
        self.deck(DeckKind::Grammar, language).await
    }

    /// Cards of the `kind` deck for `language`, from cache when fresh.
    ///
    /// No lock is held while fetching, so two callers racing on a cold entry
    /// may both fetch; the last write wins.
    pub async fn deck(&self, kind: DeckKind, language: &str) -> Result<Deck, DeckError> {
        let now = Instant::now();
        let stale = {
            let entries = lock(self.slot(kind));
            match entries.get(language) {
                Some(entry) if entry.is_fresh(self.ttl, now) => {
                    log::debug!("decks: {} deck for {language} served from cache", kind.label());
                    return Ok(Arc::clone(&entry.value));
                }
                Some(entry) => Some(Arc::clone(&entry.value)),
                None => None,
            }
        };

        let deck_name = self.deck_name(kind, language)?;
        log::info!("decks: fetching {} deck {deck_name:?} for {language}", kind.label());

        match self.source.fetch_deck(deck_name).await {
            Ok(cards) => {
                let value = Arc::new(cards);
                lock(self.slot(kind)).insert(
                    language.to_string(),
                    CacheEntry {
                        value: Arc::clone(&value),
                        fetched_at: now,
                    },
                );
                Ok(value)
            }
            Err(err) => match stale {
                Some(value) => {
                    log::warn!(
                        "decks: refresh of {deck_name:?} failed ({err}), serving expired copy"
                    );
                    Ok(value)
                }
                None => Err(err),
            },
        }
    }

    /// Drop every cached deck.
    pub fn clear(&self) {
        lock(&self.words).clear();
        lock(&self.grammar).clear();
    }

    fn slot(&self, kind: DeckKind) -> &Slot {
        match kind {
            DeckKind::Words => &self.words,
            DeckKind::Grammar => &self.grammar,
        }
    }

    fn deck_name(&self, kind: DeckKind, language: &str) -> Result<&str, DeckError> {
        let config = DeckConfig::find(&self.decks, language)
            .ok_or_else(|| DeckError::NotConfigured(language.to_string()))?;
        Ok(match kind {
            DeckKind::Words => &config.words_deck,
            DeckKind::Grammar => &config.grammar_deck,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const HOUR: Duration = Duration::from_secs(60 * 60);

    /// Returns `["<deck>#<n>"]` where n counts fetches; can be switched to fail.
    #[derive(Default)]
    struct CountingSource {
        fetches: AtomicUsize,
        failing: AtomicBool,
        delay: Option<Duration>,
    }

    impl CountingSource {
        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        fn fail(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl DeckSource for CountingSource {
        async fn fetch_deck(&self, deck_name: &str) -> Result<Vec<String>, DeckError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(DeckError::FetchFailed("connection refused".into()));
            }
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(vec![format!("{deck_name}#{n}")])
        }
    }

    fn decks() -> Vec<DeckConfig> {
        vec![
            DeckConfig {
                language: "fr-FR".into(),
                words_deck: "FR words".into(),
                grammar_deck: "FR grammar".into(),
            },
            DeckConfig {
                language: "en-US".into(),
                words_deck: "EN words".into(),
                grammar_deck: "EN grammar".into(),
            },
        ]
    }

    fn cache(source: &Arc<CountingSource>) -> DeckCache {
        DeckCache::new(Arc::clone(source) as Arc<dyn DeckSource>, decks(), HOUR)
    }

    #[tokio::test(start_paused = true)]
    async fn second_read_within_ttl_hits_cache() {
        let source = Arc::new(CountingSource::default());
        let cache = cache(&source);

        let first = cache.word_deck("fr-FR").await.unwrap();
        tokio::time::advance(Duration::from_secs(59 * 60)).await;
        let second = cache.word_deck("fr-FR").await.unwrap();

        assert_eq!(source.fetches(), 1);
        assert_eq!(first, second);
        assert_eq!(*second, vec!["FR words#1".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_refetched() {
        let source = Arc::new(CountingSource::default());
        let cache = cache(&source);

        cache.word_deck("fr-FR").await.unwrap();
        tokio::time::advance(HOUR).await;
        let refreshed = cache.word_deck("fr-FR").await.unwrap();

        assert_eq!(source.fetches(), 2);
        assert_eq!(*refreshed, vec!["FR words#2".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_serves_expired_copy_and_keeps_it_expired() {
        let source = Arc::new(CountingSource::default());
        let cache = cache(&source);

        cache.grammar_deck("fr-FR").await.unwrap();
        tokio::time::advance(HOUR * 2).await;
        source.fail(true);

        let stale = cache.grammar_deck("fr-FR").await.unwrap();
        assert_eq!(*stale, vec!["FR grammar#1".to_string()]);

        // The entry was not rewritten, so the next read tries again.
        source.fail(false);
        let fresh = cache.grammar_deck("fr-FR").await.unwrap();
        assert_eq!(*fresh, vec!["FR grammar#2".to_string()]);
    }

    #[tokio::test]
    async fn failed_first_fetch_propagates() {
        let source = Arc::new(CountingSource::default());
        source.fail(true);
        let cache = cache(&source);

        assert!(matches!(
            cache.word_deck("fr-FR").await,
            Err(DeckError::FetchFailed(_))
        ));
    }

    #[tokio::test]
    async fn unknown_language_is_not_configured() {
        let source = Arc::new(CountingSource::default());
        let cache = cache(&source);

        match cache.word_deck("de-DE").await {
            Err(DeckError::NotConfigured(lang)) => assert_eq!(lang, "de-DE"),
            other => panic!("expected NotConfigured, got {other:?}"),
        }
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn kinds_and_languages_are_cached_independently() {
        let source = Arc::new(CountingSource::default());
        let cache = cache(&source);

        let fr_words = cache.word_deck("fr-FR").await.unwrap();
        let fr_grammar = cache.grammar_deck("fr-FR").await.unwrap();
        let en_words = cache.word_deck("en-US").await.unwrap();
        cache.word_deck("fr-FR").await.unwrap();

        assert_eq!(source.fetches(), 3);
        assert_eq!(fr_words[0], "FR words#1");
        assert_eq!(fr_grammar[0], "FR grammar#2");
        assert_eq!(en_words[0], "EN words#3");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_cold_reads_agree() {
        let source = Arc::new(CountingSource {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let cache = cache(&source);

        let (a, b) = tokio::join!(cache.word_deck("fr-FR"), cache.word_deck("fr-FR"));
        let (a, b) = (a.unwrap(), b.unwrap());

        let fetches = source.fetches();
        assert!((1..=2).contains(&fetches), "fetches = {fetches}");
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert!(a[0].starts_with("FR words#"));

        // Whichever write landed last is what the cache now serves.
        let cached = cache.word_deck("fr-FR").await.unwrap();
        assert_eq!(source.fetches(), fetches);
        assert!(cached == a || cached == b);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_forces_refetch() {
        let source = Arc::new(CountingSource::default());
        let cache = cache(&source);

        cache.word_deck("fr-FR").await.unwrap();
        cache.clear();
        cache.word_deck("fr-FR").await.unwrap();
        assert_eq!(source.fetches(), 2);
    }

    #[test]
    fn freshness_boundary_is_exclusive() {
        let now = Instant::now();
        let entry = CacheEntry {
            value: (),
            fetched_at: now,
        };
        assert!(entry.is_fresh(HOUR, now + Duration::from_secs(3599)));
        assert!(!entry.is_fresh(HOUR, now + HOUR));
    }
}

//! Substance dictionary construction and caching.
//!
//! The dictionary maps every known lookup key (name, slug, synonym; all
//! case-folded) to its substance record. Construction is a pure function of
//! the catalog snapshot; the cache wraps it with a TTL and publishes whole
//! replacement snapshots so concurrent readers never observe a partially
//! rebuilt map.
//!
//! ## Collision rule
//!
//! If two substances produce the same lookup key, the one with the strictly
//! higher evidence score wins; ties keep the first-inserted record.

use crate::error::{LinkerError, LinkerResult};
use async_trait::async_trait;
use kompendium_core::types::Substance;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default time-to-live for a cached dictionary snapshot (5 minutes).
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Source of substance records, typically backed by the catalog database.
///
/// The dictionary cache does not retry internally; a failing load is
/// propagated to the caller and the previous snapshot stays readable.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Loads the current catalog snapshot.
    async fn load_substances(&self) -> LinkerResult<Vec<Substance>>;
}

/// Case-folded lookup map from name/slug/synonym to substance record.
///
/// Immutable once built; the cache replaces it wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstanceDictionary {
    entries: HashMap<String, Substance>,
}

impl SubstanceDictionary {
    /// Builds a dictionary from a catalog snapshot.
    ///
    /// Candidate keys per substance are its name, its slug (if non-empty),
    /// and each non-blank synonym; keys are trimmed and lowercased before
    /// insertion. A substance with a blank name or slug simply contributes
    /// no key for that field. Building from an empty list yields an empty
    /// map.
    #[must_use]
    pub fn build(substances: &[Substance]) -> Self {
        let mut entries = HashMap::new();

        for substance in substances {
            Self::insert_key(&mut entries, &substance.name, substance);
            Self::insert_key(&mut entries, &substance.slug, substance);
            for synonym in &substance.synonyms {
                Self::insert_key(&mut entries, synonym, substance);
            }
        }

        Self { entries }
    }

    fn insert_key(entries: &mut HashMap<String, Substance>, raw: &str, substance: &Substance) {
        let key = raw.trim();
        if key.is_empty() {
            debug!(substance = %substance.id, "skipping blank dictionary key");
            return;
        }

        match entries.entry(key.to_lowercase()) {
            Entry::Occupied(mut occupied) => {
                // Strictly higher evidence replaces; ties keep the first insert.
                if substance.evidence_score > occupied.get().evidence_score {
                    occupied.insert(substance.clone());
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(substance.clone());
            }
        }
    }

    /// Looks up a substance by key, case-folding the query.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Substance> {
        self.entries.get(&key.trim().to_lowercase())
    }

    /// Iterates over all (key, substance) pairs in unspecified order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Substance)> {
        self.entries.iter()
    }

    /// Returns the number of lookup keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the dictionary has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Configuration for the dictionary cache.
#[derive(Debug, Clone, Copy)]
pub struct DictionaryConfig {
    /// How long a cached snapshot is served without consulting the source.
    pub ttl: Duration,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }
}

impl DictionaryConfig {
    /// Creates a configuration with a custom TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }
}

/// A dictionary snapshot with its build instant.
#[derive(Debug, Clone)]
struct CachedDictionary {
    dictionary: Arc<SubstanceDictionary>,
    built_at: Instant,
}

impl CachedDictionary {
    fn is_fresh(&self, config: &DictionaryConfig) -> bool {
        self.built_at.elapsed() <= config.ttl
    }
}

/// Thread-safe, TTL-bounded cache around [`SubstanceDictionary::build`].
///
/// Readers within the TTL window get the cached snapshot without invoking
/// the source. A rebuild publishes a fully-built replacement snapshot in a
/// single swap; the map behind a snapshot is never mutated in place.
/// Concurrent callers that both observe a miss may both invoke the source;
/// the rebuild is idempotent so this is tolerated rather than guarded.
#[derive(Debug, Clone, Default)]
pub struct DictionaryCache {
    inner: Arc<RwLock<Option<CachedDictionary>>>,
    config: DictionaryConfig,
}

impl DictionaryCache {
    /// Creates a cache with the default 5-minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache with custom configuration.
    #[must_use]
    pub fn with_config(config: DictionaryConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            config,
        }
    }

    /// Returns the cache configuration.
    #[must_use]
    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    /// Returns the cached dictionary, reloading from `source` if the TTL
    /// has elapsed.
    ///
    /// - Fresh hit: returns the cached snapshot without calling the source.
    /// - Miss with a source: loads, rebuilds, publishes, returns the new
    ///   snapshot. A load failure is propagated and the previous snapshot
    ///   is left untouched.
    /// - Miss without a source: returns the previous (stale) snapshot if
    ///   one exists, otherwise an empty dictionary.
    pub async fn get_or_load(
        &self,
        source: Option<&dyn CatalogSource>,
    ) -> LinkerResult<Arc<SubstanceDictionary>> {
        // Clone the cached entry out so the guard is not held across await.
        let cached = self.inner.read().ok().and_then(|guard| guard.clone());

        if let Some(entry) = &cached {
            if entry.is_fresh(&self.config) {
                debug!(
                    age_secs = entry.built_at.elapsed().as_secs(),
                    keys = entry.dictionary.len(),
                    "dictionary cache hit"
                );
                return Ok(Arc::clone(&entry.dictionary));
            }
        }

        let Some(source) = source else {
            return Ok(match cached {
                Some(entry) => {
                    debug!("dictionary cache expired, no source; serving previous snapshot");
                    entry.dictionary
                }
                None => Arc::new(SubstanceDictionary::default()),
            });
        };

        debug!("dictionary cache miss; loading catalog snapshot");
        let substances = source.load_substances().await?;
        let dictionary = Arc::new(SubstanceDictionary::build(&substances));

        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(CachedDictionary {
                dictionary: Arc::clone(&dictionary),
                built_at: Instant::now(),
            });
        }

        debug!(
            substances = substances.len(),
            keys = dictionary.len(),
            "dictionary rebuilt"
        );
        Ok(dictionary)
    }

    /// Unconditionally discards the cached snapshot, forcing the next call
    /// to reload.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }

    /// Returns true if a snapshot is cached and within its TTL.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|entry| entry.is_fresh(&self.config)))
            .unwrap_or(false)
    }
}

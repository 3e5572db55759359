//! Per-document settings cache
//!
//! In scoped mode (the client supports `workspace/configuration`) settings
//! are fetched lazily per document. The pending fetch itself is cached, so
//! every caller asking for the same uri while the request is in flight awaits
//! the same response. In global mode a single value, updated from
//! `workspace/didChangeConfiguration`, is used for every document.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{self, BoxFuture, Shared};
use serde_json::Value;
use tower_lsp::lsp_types::Url;
use tracing::{debug, info, warn};

use crate::config::SETTINGS_SECTION;
use crate::settings::source::SettingsSource;
use crate::settings::types::Settings;
use crate::sync::lock;

type PendingSettings = Shared<BoxFuture<'static, Settings>>;

pub struct SettingsCache {
    source: Arc<dyn SettingsSource>,
    scoped: AtomicBool,
    global: Mutex<Settings>,
    entries: Mutex<HashMap<Url, PendingSettings>>,
}

impl SettingsCache {
    /// Creates a cache in global mode; call [`set_scoped`](Self::set_scoped)
    /// once the client's capabilities are known.
    pub fn new(source: Arc<dyn SettingsSource>) -> Self {
        Self {
            source,
            scoped: AtomicBool::new(false),
            global: Mutex::new(Settings::default()),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_scoped(&self, scoped: bool) {
        self.scoped.store(scoped, Ordering::Release);
    }

    pub fn is_scoped(&self) -> bool {
        self.scoped.load(Ordering::Acquire)
    }

    /// Returns the settings for `uri`, fetching them at most once per cache
    /// lifetime of the entry.
    pub async fn get(&self, uri: &Url) -> Settings {
        self.request(uri).await
    }

    /// Resolves the cache entry for `uri` now and returns a future for its
    /// value. The entry (and the fetch, if one is needed) is registered before
    /// this returns, so the future can be awaited from a spawned task.
    pub fn request(&self, uri: &Url) -> BoxFuture<'static, Settings> {
        if !self.is_scoped() {
            let settings = *lock(&self.global);
            return future::ready(settings).boxed();
        }

        lock(&self.entries)
            .entry(uri.clone())
            .or_insert_with(|| self.fetch(uri))
            .clone()
            .boxed()
    }

    /// Handles `workspace/didChangeConfiguration`.
    ///
    /// Scoped mode drops every cached entry so the next diagnostic pass
    /// re-fetches; global mode replaces the global value from the
    /// notification payload.
    pub fn on_global_change(&self, payload: &Value) {
        if self.is_scoped() {
            let mut entries = lock(&self.entries);
            info!("Clearing {} cached document settings", entries.len());
            entries.clear();
            return;
        }

        let settings = match payload.get(SETTINGS_SECTION) {
            Some(section) => Settings::from_value(section.clone()).unwrap_or_else(|e| {
                warn!("Ignoring invalid {} settings: {}", SETTINGS_SECTION, e);
                Settings::default()
            }),
            None => Settings::default(),
        };
        info!("Updated global settings: {:?}", settings);
        *lock(&self.global) = settings;
    }

    /// Drops the entry for a closed document
    pub fn evict(&self, uri: &Url) {
        if lock(&self.entries).remove(uri).is_some() {
            debug!("Evicted settings for {}", uri);
        }
    }

    pub fn contains(&self, uri: &Url) -> bool {
        lock(&self.entries).contains_key(uri)
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fetch(&self, uri: &Url) -> PendingSettings {
        let source = Arc::clone(&self.source);
        let uri = uri.clone();
        debug!("Fetching settings for {}", uri);

        async move {
            source.fetch(&uri).await.unwrap_or_else(|e| {
                warn!("Falling back to default settings for {}: {}", uri, e);
                Settings::default()
            })
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::error::SettingsError;
    use crate::settings::source::MockSettingsSource;
    use serde_json::json;

    fn uri(path: &str) -> Url {
        Url::parse(&format!("file:///test/{}", path)).unwrap()
    }

    fn scoped_cache(source: MockSettingsSource) -> SettingsCache {
        let cache = SettingsCache::new(Arc::new(source));
        cache.set_scoped(true);
        cache
    }

    #[tokio::test]
    async fn get_fetches_once_per_uri() {
        let mut source = MockSettingsSource::new();
        source
            .expect_fetch()
            .withf(|u| u.path() == "/test/a.txt")
            .times(1)
            .returning(|_| Ok(Settings::new(7)));
        let cache = scoped_cache(source);

        let (a1, a2) = (uri("a.txt"), uri("a.txt"));
        let (first, second) = tokio::join!(cache.get(&a1), cache.get(&a2));
        let third = cache.get(&uri("a.txt")).await;

        assert_eq!(first, Settings::new(7));
        assert_eq!(second, Settings::new(7));
        assert_eq!(third, Settings::new(7));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn get_falls_back_to_default_when_fetch_fails() {
        let mut source = MockSettingsSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Err(SettingsError::Unavailable("closed".to_string())));
        let cache = scoped_cache(source);

        assert_eq!(cache.get(&uri("a.txt")).await, Settings::default());
        // The fallback is cached like any other result
        assert_eq!(cache.get(&uri("a.txt")).await, Settings::default());
    }

    #[tokio::test]
    async fn global_change_in_scoped_mode_clears_cache() {
        let mut source = MockSettingsSource::new();
        source
            .expect_fetch()
            .times(3)
            .returning(|_| Ok(Settings::new(2)));
        let cache = scoped_cache(source);

        cache.get(&uri("a.txt")).await;
        cache.get(&uri("b.txt")).await;
        assert_eq!(cache.len(), 2);

        cache.on_global_change(&json!({}));
        assert!(cache.is_empty());

        cache.get(&uri("a.txt")).await;
        assert!(cache.contains(&uri("a.txt")));
        assert!(!cache.contains(&uri("b.txt")));
    }

    #[tokio::test]
    async fn request_registers_entry_before_polling() {
        let mut source = MockSettingsSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(Settings::new(4)));
        let cache = scoped_cache(source);

        let pending = cache.request(&uri("a.txt"));
        assert!(cache.contains(&uri("a.txt")));

        let a = uri("a.txt");
        let (first, second) = tokio::join!(pending, cache.get(&a));
        assert_eq!(first, Settings::new(4));
        assert_eq!(second, Settings::new(4));
    }

    #[tokio::test]
    async fn evict_forces_refetch() {
        let mut source = MockSettingsSource::new();
        source
            .expect_fetch()
            .times(2)
            .returning(|_| Ok(Settings::new(2)));
        let cache = scoped_cache(source);

        cache.get(&uri("a.txt")).await;
        cache.evict(&uri("a.txt"));
        assert!(!cache.contains(&uri("a.txt")));

        cache.get(&uri("a.txt")).await;
    }

    #[tokio::test]
    async fn global_mode_never_fetches() {
        let mut source = MockSettingsSource::new();
        source.expect_fetch().never();
        let cache = SettingsCache::new(Arc::new(source));

        assert_eq!(cache.get(&uri("a.txt")).await, Settings::default());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn global_change_in_global_mode_updates_value() {
        let mut source = MockSettingsSource::new();
        source.expect_fetch().never();
        let cache = SettingsCache::new(Arc::new(source));

        cache.on_global_change(&json!({"languageServerExample": {"maxNumberOfProblems": 5}}));
        assert_eq!(cache.get(&uri("a.txt")).await, Settings::new(5));

        // A payload without the section resets to the default
        cache.on_global_change(&json!({"other": {}}));
        assert_eq!(cache.get(&uri("a.txt")).await, Settings::default());

        cache.on_global_change(&json!({"languageServerExample": {"maxNumberOfProblems": 0}}));
        assert_eq!(cache.get(&uri("a.txt")).await, Settings::default());
    }
}

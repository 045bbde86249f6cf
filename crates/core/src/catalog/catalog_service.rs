use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::catalog_model::{HeroicAbility, SpellSchool};
use crate::errors::Result;

/// Remote home of a reference catalog.
#[async_trait]
pub trait CatalogSourceTrait<T: Send + Sync>: Send + Sync {
    /// Same capability check as the character store probe.
    fn is_configured(&self) -> bool;

    async fn fetch_all(&self) -> Result<Vec<T>>;

    /// Writes `entries` to the remote, overwriting same-keyed entries.
    async fn seed(&self, entries: &[T]) -> Result<()>;
}

/// Read-mostly reference data served remote-first with a bundled fallback.
///
/// Never fails: any remote problem yields the bundled entries.
pub struct CatalogService<T: Send + Sync> {
    name: &'static str,
    source: Option<Arc<dyn CatalogSourceTrait<T>>>,
    bundled: Arc<Vec<T>>,
}

pub type SpellCatalog = CatalogService<SpellSchool>;
pub type AbilityCatalog = CatalogService<HeroicAbility>;

impl<T> CatalogService<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        name: &'static str,
        source: Option<Arc<dyn CatalogSourceTrait<T>>>,
        bundled: Vec<T>,
    ) -> Self {
        Self {
            name,
            source,
            bundled: Arc::new(bundled),
        }
    }

    /// Bundled entries, without touching the remote.
    pub fn bundled(&self) -> Vec<T> {
        self.bundled.as_ref().clone()
    }

    fn source(&self) -> Option<&dyn CatalogSourceTrait<T>> {
        self.source.as_deref().filter(|source| source.is_configured())
    }

    async fn seed_quietly(&self, source: &dyn CatalogSourceTrait<T>) {
        if self.bundled.is_empty() {
            return;
        }
        match source.seed(&self.bundled).await {
            Ok(()) => info!(
                "[Catalog] Seeded {} remote {} entries",
                self.bundled.len(),
                self.name
            ),
            Err(err) => warn!("[Catalog] Failed to seed {}: {}", self.name, err),
        }
    }

    /// Remote entries when present, otherwise the bundled ones. An empty
    /// remote catalog is seeded from the bundled entries.
    pub async fn get_all(&self) -> Vec<T> {
        let Some(source) = self.source() else {
            debug!("[Catalog] {} source not configured, using bundled data", self.name);
            return self.bundled();
        };

        match source.fetch_all().await {
            Ok(entries) if !entries.is_empty() => entries,
            Ok(_) => {
                self.seed_quietly(source).await;
                self.bundled()
            }
            Err(err) => {
                warn!(
                    "[Catalog] Failed to fetch {}, using bundled data: {}",
                    self.name, err
                );
                self.bundled()
            }
        }
    }

    /// Seeds the remote catalog if it is configured and currently empty.
    pub async fn ensure_seeded(&self) {
        let Some(source) = self.source() else {
            return;
        };
        match source.fetch_all().await {
            Ok(entries) if entries.is_empty() => self.seed_quietly(source).await,
            Ok(_) => {}
            Err(err) => warn!("[Catalog] Failed to check {}: {}", self.name, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, RemoteError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MemorySource {
        configured: bool,
        entries: Mutex<Vec<String>>,
        fail_fetch: bool,
        seeds: AtomicUsize,
    }

    impl MemorySource {
        fn with(entries: &[&str]) -> Self {
            Self {
                configured: true,
                entries: Mutex::new(entries.iter().map(|e| e.to_string()).collect()),
                fail_fetch: false,
                seeds: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CatalogSourceTrait<String> for MemorySource {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn fetch_all(&self) -> Result<Vec<String>> {
            if self.fail_fetch {
                return Err(Error::Remote(RemoteError::Transport("offline".to_string())));
            }
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn seed(&self, entries: &[String]) -> Result<()> {
            self.seeds.fetch_add(1, Ordering::SeqCst);
            self.entries.lock().unwrap().extend_from_slice(entries);
            Ok(())
        }
    }

    fn catalog(source: Arc<MemorySource>) -> CatalogService<String> {
        CatalogService::new(
            "test",
            Some(source as Arc<dyn CatalogSourceTrait<String>>),
            vec!["bundled".to_string()],
        )
    }

    #[tokio::test]
    async fn remote_entries_win_when_present() {
        let source = Arc::new(MemorySource::with(&["remote"]));
        let entries = catalog(source.clone()).get_all().await;
        assert_eq!(entries, vec!["remote".to_string()]);
        assert_eq!(source.seeds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_remote_is_seeded_and_bundled_returned() {
        let source = Arc::new(MemorySource::with(&[]));
        let service = catalog(source.clone());

        assert_eq!(service.get_all().await, vec!["bundled".to_string()]);
        assert_eq!(source.seeds.load(Ordering::SeqCst), 1);
        assert_eq!(service.get_all().await, vec!["bundled".to_string()]);
        assert_eq!(source.seeds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_error_falls_back_to_bundled() {
        let source = Arc::new(MemorySource {
            fail_fetch: true,
            ..MemorySource::with(&["remote"])
        });
        assert_eq!(catalog(source).get_all().await, vec!["bundled".to_string()]);
    }

    #[tokio::test]
    async fn unconfigured_source_is_not_called() {
        let source = Arc::new(MemorySource {
            configured: false,
            ..MemorySource::with(&[])
        });
        let service = catalog(source.clone());
        service.ensure_seeded().await;
        assert_eq!(service.get_all().await, vec!["bundled".to_string()]);
        assert_eq!(source.seeds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ensure_seeded_only_seeds_empty_remote() {
        let populated = Arc::new(MemorySource::with(&["remote"]));
        catalog(populated.clone()).ensure_seeded().await;
        assert_eq!(populated.seeds.load(Ordering::SeqCst), 0);

        let empty = Arc::new(MemorySource::with(&[]));
        catalog(empty.clone()).ensure_seeded().await;
        assert_eq!(empty.seeds.load(Ordering::SeqCst), 1);
    }
}

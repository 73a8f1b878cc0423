//! Shared access to the master sitemap and cached user derivations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::access::Subject;
use crate::error::CopyError;
use crate::i18n::Locale;
use crate::master::MasterSitemap;
use crate::user::{UserSitemap, UserSitemapBuilder};

/// Derivation settings for one master generation.
struct Current {
    generation: u64,
    builder: UserSitemapBuilder,
}

#[derive(Default)]
struct UserCache {
    generation: u64,
    entries: HashMap<(Subject, Locale), Arc<UserSitemap>>,
}

/// Owner of the current master sitemap.
///
/// User sitemaps are derived on demand and cached per subject and locale.
/// Reloading swaps the master atomically and drops the cache; callers
/// holding an `Arc` from before the reload keep a consistent old snapshot.
///
/// # Thread Safety
///
/// - `RwLock<Arc<Current>>` holds the master snapshot and derivation settings
/// - `Mutex<UserCache>` guards the derived sitemaps
///
/// Derivation runs outside both locks. A derivation started before a reload
/// is returned to its caller but never cached.
pub struct SitemapService {
    current: RwLock<Arc<Current>>,
    cache: Mutex<UserCache>,
}

impl SitemapService {
    /// Create a service deriving user sitemaps with `builder`.
    #[must_use]
    pub fn new(builder: UserSitemapBuilder) -> Self {
        Self {
            current: RwLock::new(Arc::new(Current {
                generation: 0,
                builder,
            })),
            cache: Mutex::new(UserCache::default()),
        }
    }

    /// Current master sitemap snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn master(&self) -> Arc<MasterSitemap> {
        Arc::clone(self.current().builder.master())
    }

    /// User sitemap for `subject` in `locale`, derived on first use.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn user_sitemap(
        &self,
        subject: &Subject,
        locale: &Locale,
    ) -> Result<Arc<UserSitemap>, CopyError> {
        let current = self.current();
        let key = (subject.clone(), locale.clone());

        {
            let cache = self.cache.lock().unwrap();
            if cache.generation == current.generation
                && let Some(hit) = cache.entries.get(&key)
            {
                return Ok(Arc::clone(hit));
            }
        }

        let derived = Arc::new(current.builder.build(subject, locale)?);

        let mut cache = self.cache.lock().unwrap();
        if cache.generation != current.generation {
            return Ok(derived);
        }
        let entry = cache.entries.entry(key).or_insert(derived);
        Ok(Arc::clone(entry))
    }

    /// Swap in a new master sitemap and drop every cached derivation.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn reload(&self, master: Arc<MasterSitemap>) {
        let mut current = self.current.write().unwrap();
        let generation = current.generation + 1;
        let nodes = master.len();
        let next = Arc::new(Current {
            generation,
            builder: current.builder.clone().with_master(master),
        });
        *current = next;

        let mut cache = self.cache.lock().unwrap();
        let dropped = cache.entries.len();
        cache.generation = generation;
        cache.entries.clear();

        tracing::info!(generation, nodes, dropped, "Master sitemap reloaded");
    }

    /// Drop every cached derivation without changing the master.
    ///
    /// # Panics
    ///
    /// Panics if the cache lock is poisoned.
    pub fn invalidate(&self) {
        self.cache.lock().unwrap().entries.clear();
    }

    /// Number of cached user sitemaps.
    ///
    /// # Panics
    ///
    /// Panics if the cache lock is poisoned.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.lock().unwrap().entries.len()
    }

    fn current(&self) -> Arc<Current> {
        Arc::clone(&self.current.read().unwrap())
    }
}

//! Upstream response cache using Moka.
//!
//! Moka only provides storage and the capacity ceiling. Freshness is decided
//! here, against the gateway clock, every time an entry is read: an entry
//! older than the freshness threshold is reported stale and left in place
//! until the next successful fetch overwrites it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::policy::EvictionPolicy;
use quotegate_core::{Millis, elapsed_since};
use serde_json::Value;

use crate::cache::keys::CacheKey;
use crate::metrics::CacheMetrics;

/// Configuracion del cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Edad maxima de una entry servible (default: 60 segundos)
    pub freshness: Duration,
    /// Maximo numero de entries (default: 10000)
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness: Duration::from_secs(60),
            max_capacity: 10_000,
        }
    }
}

/// Payload almacenado junto con el instante en que se escribio.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Arc<Value>,
    pub stored_at: Millis,
}

impl CacheEntry {
    /// Returns true if the entry is younger than `freshness` at `now`.
    pub fn is_fresh(&self, now: Millis, freshness: Duration) -> bool {
        elapsed_since(self.stored_at, now) < freshness.as_millis() as Millis
    }
}

/// Resultado de buscar una key.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Entry present and younger than the freshness threshold.
    Fresh(Arc<Value>),
    /// Entry present but too old to serve.
    Stale { age_ms: Millis },
    /// Nothing stored under this key.
    Missing,
}

impl Lookup {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Lookup::Fresh(_))
    }
}

/// Cache de respuestas upstream.
/// Thread-safe y async-friendly.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use quotegate_core::RequestDescriptor;
/// use quotegate_server::cache::{CacheConfig, CacheKey, Lookup, ResponseCache};
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = ResponseCache::new(CacheConfig::default());
/// let key = CacheKey::from_request(&RequestDescriptor::new("/quotes/latest"));
///
/// cache.insert(key.clone(), Arc::new(serde_json::json!({"price": 1})), 0).await;
///
/// if let Lookup::Fresh(payload) = cache.lookup(&key, 1_000).await {
///     println!("Cache hit: {}", payload);
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<CacheKey, Arc<CacheEntry>>,
    freshness: Duration,
    metrics: CacheMetrics,
}

impl ResponseCache {
    /// Crea un nuevo cache con la configuracion dada.
    pub fn new(config: CacheConfig) -> Self {
        let metrics = CacheMetrics::new();

        // Configurar listener para evictions
        let eviction_metrics = metrics.clone();
        // LRU: TinyLFU podria rechazar una key recien traida con el cache lleno
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .eviction_policy(EvictionPolicy::lru())
            .eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    moka::notification::RemovalCause::Expired => "expired",
                    moka::notification::RemovalCause::Size => "capacity",
                    moka::notification::RemovalCause::Explicit => "manual",
                    moka::notification::RemovalCause::Replaced => "replaced",
                };
                eviction_metrics.record_eviction(reason);
            })
            .build();

        Self {
            inner,
            freshness: config.freshness,
            metrics,
        }
    }

    /// Busca una key y decide si la entry sigue fresca en `now`.
    ///
    /// Stale entries are not removed.
    pub async fn lookup(&self, key: &CacheKey, now: Millis) -> Lookup {
        let start = Instant::now();

        let result = match self.inner.get(key).await {
            Some(entry) if entry.is_fresh(now, self.freshness) => {
                self.metrics.record_hit();
                Lookup::Fresh(Arc::clone(&entry.payload))
            },
            Some(entry) => {
                self.metrics.record_stale();
                Lookup::Stale {
                    age_ms: elapsed_since(entry.stored_at, now),
                }
            },
            None => {
                self.metrics.record_miss();
                Lookup::Missing
            },
        };

        self.metrics.record_operation_duration("lookup", start.elapsed());

        result
    }

    /// Guarda un payload, reemplazando cualquier entry previa de la key.
    pub async fn insert(&self, key: CacheKey, payload: Arc<Value>, now: Millis) {
        let start = Instant::now();

        self.inner
            .insert(
                key,
                Arc::new(CacheEntry {
                    payload,
                    stored_at: now,
                }),
            )
            .await;

        self.metrics.record_operation_duration("insert", start.elapsed());
        self.update_entry_gauge();
    }

    /// Retorna la entry cruda, sin mirar frescura.
    pub async fn entry(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.inner.get(key).await
    }

    /// Retorna el numero aproximado de entries en cache.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Retorna las metricas para acceso externo.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Actualiza el gauge de entry count.
    fn update_entry_gauge(&self) {
        self.metrics.update_entry_count(self.inner.entry_count());
    }

    /// Fuerza el mantenimiento pendiente de Moka (para tests principalmente).
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

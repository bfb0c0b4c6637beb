//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio para registrar las metricas.
pub fn register_cache_metrics() {
    metrics::describe_counter!("quotegate_cache_hits_total", "Lookups served from a fresh entry");
    metrics::describe_counter!("quotegate_cache_misses_total", "Lookups with no stored entry");
    metrics::describe_counter!(
        "quotegate_cache_stale_total",
        "Lookups that found an entry older than the freshness threshold"
    );
    metrics::describe_counter!(
        "quotegate_cache_evictions_total",
        "Entries removed from the cache, by reason"
    );
    metrics::describe_gauge!("quotegate_cache_entries", "Current number of entries in cache");
    metrics::describe_histogram!(
        "quotegate_cache_operation_seconds",
        "Time spent on cache operations"
    );
}

/// Recorder de metricas de cache.
/// Usa atomic counters internos para que tests y /health puedan leerlos.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    stale: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self {
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            stale: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("quotegate_cache_hits_total").increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("quotegate_cache_misses_total").increment(1);
    }

    /// Registra una entry encontrada pero vencida
    pub fn record_stale(&self) {
        self.stale.fetch_add(1, Ordering::Relaxed);
        counter!("quotegate_cache_stale_total").increment(1);
    }

    /// Registra una eviction
    pub fn record_eviction(&self, reason: &str) {
        counter!("quotegate_cache_evictions_total", "reason" => reason.to_string()).increment(1);
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: u64) {
        gauge!("quotegate_cache_entries").set(count as f64);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &str, duration: Duration) {
        histogram!(
            "quotegate_cache_operation_seconds",
            "operation" => operation.to_string()
        )
        .record(duration.as_secs_f64());
    }

    /// Retorna el numero de hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Retorna el numero de misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Retorna el numero de lookups vencidos
    pub fn stale(&self) -> u64 {
        self.stale.load(Ordering::Relaxed)
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}

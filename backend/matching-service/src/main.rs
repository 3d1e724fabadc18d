use anyhow::Context;
use matching_service::{Config, SignalRegistry};
use ranking_cache::CacheMetrics;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Validates engine configuration: settings, weight profiles and the cache
/// backend. Exits non-zero on the first problem.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load config
    let config = Config::from_env().context("Failed to load config")?;

    let signals = Arc::new(SignalRegistry::standard(&config.signal_settings()));
    let profiles = config
        .load_profiles()
        .context("Failed to load weight profiles")?;
    profiles
        .validate_against(&signals)
        .context("Weight profiles reference unknown signals")?;

    for id in profiles.ids() {
        if let Some(profile) = profiles.get(id) {
            info!(
                profile_id = profile.id(),
                version = profile.version(),
                factors = profile.factors().count(),
                "Weight profile ok"
            );
        }
    }

    let backend = config
        .build_cache_backend()
        .await
        .context("Failed to build cache backend")?;
    backend
        .ping()
        .await
        .with_context(|| format!("Cache backend '{}' is unreachable", backend.name()))?;

    // Embedding services export this registry on their metrics endpoint
    CacheMetrics::register(prometheus::default_registry())
        .context("Failed to register cache metrics")?;
    info!(
        metric_families = prometheus::gather().len(),
        "Cache metrics registered"
    );

    info!(
        cache_backend = backend.name(),
        profiles = profiles.len(),
        max_consecutive_from_author = config.diversity_max_consecutive,
        max_candidates = config.max_candidates,
        max_page_size = config.max_page_size,
        "Matching engine configuration ok"
    );

    Ok(())
}

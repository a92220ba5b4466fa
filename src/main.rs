//! Tornium Fetch - command-line lookups
//!
//! Fetches each endpoint given on the command line through the cache and
//! the concurrency limiter, printing one JSON line per endpoint in order.
//!
//! ```text
//! API_ACCESS_TOKEN=... tornium-fetch user/2383326/stat user/estimate/2383326
//! ```

use anyhow::{bail, Context};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tornium_fetch::{ApiClient, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tornium_fetch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let endpoints: Vec<String> = std::env::args().skip(1).collect();
    if endpoints.is_empty() {
        bail!("usage: tornium-fetch <endpoint>...");
    }

    let config = Config::from_env();
    info!(
        "Configuration loaded: limit={}, ttl={}ms, cache_dir={:?}, base_url={}",
        config.concurrency_limit, config.cache_ttl_ms, config.cache_dir, config.api_base_url
    );

    let client = ApiClient::from_config(&config)
        .await
        .context("failed to build API client")?;

    let outcomes = client.lookup_many(endpoints.iter().cloned()).await;
    let mut failures = 0usize;
    for (endpoint, outcome) in endpoints.iter().zip(outcomes) {
        let line = match outcome {
            Ok(payload) => {
                if !payload.is_success() {
                    failures += 1;
                }
                json!({"endpoint": endpoint, "result": payload})
            }
            Err(err) => {
                failures += 1;
                json!({"endpoint": endpoint, "error": err.to_string()})
            }
        };
        println!("{line}");
    }

    let stats = client.cache().stats();
    info!(
        "Done: {} lookups, {} failed, cache hits={} misses={} evictions={}",
        endpoints.len(),
        failures,
        stats.hits,
        stats.misses,
        stats.evictions
    );

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

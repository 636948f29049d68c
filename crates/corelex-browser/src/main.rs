use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use corelex_db::CorelexDb;
use corelex_morphy::NounMorphy;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use corelex_browser::rate_limit::RateLimiterLayer;
use corelex_browser::{AppState, Config, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::load()?;
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "using corelex data at {} (mode: {:?})",
        config.data_dir.display(),
        config.load_mode
    );
    info!("grouping mode: {:?}", config.grouping_mode());
    if config.disable_cache {
        info!("cache headers disabled");
    }
    info!(
        "rate limit: {} req/s (burst {})",
        config.rate_limit_rps, config.rate_limit_burst
    );

    let start = Instant::now();
    let db = Arc::new(CorelexDb::open(&config.db_config())?);
    let morphy = Arc::new(NounMorphy::load(&config.data_dir)?);
    info!(
        "corelex loaded in {} ms: {} basic types, {} corelex types, {} nouns, {} noun exceptions",
        start.elapsed().as_millis(),
        db.basic_type_count(),
        db.corelex_type_count(),
        db.noun_count(),
        morphy.exception_count()
    );

    let state = AppState {
        db,
        morphy,
        grouping: config.grouping_mode(),
        disable_cache: config.disable_cache,
    };

    let rate_limiter = RateLimiterLayer::new(config.rate_limit_rps, config.rate_limit_burst);
    let app = router(state)
        .layer(rate_limiter)
        .layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}

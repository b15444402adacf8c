//! Axum server bootstrap — the composition root.
//!
//! This module is the only place where infrastructure is wired together:
//! the database pool, the vendor registry, the engine, and the aggregation
//! service. Handlers never construct any of this themselves.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use speechbench_core::Settings;
use speechbench_core::ports::{ArtifactStore, Repository, ScriptRepository};
use speechbench_db::{DbFactory, setup_database};
use speechbench_engine::{AggregationService, Engine, EngineConfig};
use speechbench_vendors::{HttpVendorAdapter, HttpVendorConfig, LocalAdapter, TimedAdapter, VendorRegistry};

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins — development mode.
    #[default]
    AllowAll,
    /// Allow a specific, named set of origins — production mode.
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Derive server config from process-wide settings, applying `AllowAll`
    /// CORS unless the caller opts into a named origin list.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            port: settings.port,
            cors: CorsConfig::default(),
        }
    }

    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Application context for the Axum adapter: every service a handler might
/// need, wired once at startup.
pub struct AxumContext {
    pub repository: Arc<dyn Repository>,
    pub script_repository: Arc<dyn ScriptRepository>,
    pub artifact_store: Arc<dyn ArtifactStore>,
    pub engine: Engine,
    pub aggregation: AggregationService,
}

/// Build a [`VendorRegistry`] from [`Settings`].
///
/// Every vendor with complete `SPEECHBENCH_VENDOR_<NAME>_*` credentials is
/// wrapped in [`TimedAdapter`] (uniform timeout/retry policy, §5) and
/// registered for *both* TTS and STT — `Settings` carries no per-vendor
/// capability flag, and an [`HttpVendorAdapter`] that is called against an
/// endpoint the vendor doesn't implement simply fails the call with a
/// non-2xx response, surfaced as a retryable or non-retryable
/// `VendorError::CallFailed` like any other vendor failure. A `"local"`
/// deterministic adapter is always registered for both capabilities so a
/// fresh deployment with zero vendor credentials can still exercise every
/// run mode end to end.
fn build_registry(settings: &Settings) -> VendorRegistry {
    let mut registry = VendorRegistry::new();

    registry.register_tts(Arc::new(LocalAdapter::new("local")));
    registry.register_stt(Arc::new(LocalAdapter::new("local")));

    for creds in settings.vendor_credentials.values() {
        let config = HttpVendorConfig {
            vendor_id: creds.vendor_id.clone(),
            base_url: creds.base_url.clone(),
            api_key: creds.api_key.clone(),
        };
        let tts = TimedAdapter::new(
            HttpVendorAdapter::new(config.clone()),
            settings.call_timeout,
            settings.max_retries,
        );
        let stt = TimedAdapter::new(
            HttpVendorAdapter::new(config),
            settings.call_timeout * 2,
            settings.max_retries,
        );
        registry.register_tts(Arc::new(tts));
        registry.register_stt(Arc::new(stt));
    }

    registry
}

/// Bootstrap the Axum server with all services.
pub async fn bootstrap(settings: &Settings) -> Result<AxumContext> {
    let db_path = Path::new(&settings.database_path);
    let pool = setup_database(db_path).await?;

    let repository = DbFactory::repository(pool.clone());
    let script_repository = DbFactory::script_repository(pool);
    let artifact_store = DbFactory::artifact_store(settings.storage_dir.clone());

    let registry = Arc::new(build_registry(settings));
    let engine_config = EngineConfig::from_settings(settings);

    info!(
        vendors = ?registry.tts_vendors(),
        concurrency = engine_config.concurrency,
        "speechbench engine configured"
    );

    let engine = Engine::new(repository.clone(), artifact_store.clone(), registry, engine_config);
    let aggregation = AggregationService::new(repository.clone(), settings.lookback_days);

    Ok(AxumContext {
        repository,
        script_repository,
        artifact_store,
        engine,
        aggregation,
    })
}

/// Start the web server: bootstrap the context, build the router, and
/// serve it on `config.port`.
pub async fn start_server(settings: &Settings, config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;

    let ctx = bootstrap(settings).await?;
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("speechbench API listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

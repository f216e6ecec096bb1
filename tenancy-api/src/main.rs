use anyhow::{Context, Result};
use std::sync::Arc;
use tenancy_api::{create_app, telemetry, Config, StoreBackend};
use tenancy_orchestrator::{DryRunStore, KubeStore, MemoryStore, ResourceStore, TenantOrchestrator};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_subscriber();

    info!("Starting tenancy-api service...");

    // Load configuration
    let config = Config::from_env().context("Error getting config from environment")?;
    info!(
        "Configuration loaded: bind_addr={}, cluster_id={}, store={:?}, dry_run={}",
        config.bind_addr, config.tenancy.cluster_id, config.store, config.dry_run
    );

    let store = connect_store(&config).await?;
    let orchestrator = TenantOrchestrator::new(store, config.tenancy.clone());

    // Create app
    let app = create_app(orchestrator).await?;

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_store(config: &Config) -> Result<Arc<dyn ResourceStore>> {
    let store: Arc<dyn ResourceStore> = match config.store {
        StoreBackend::Kube => {
            // KUBECONFIG when set, otherwise the in-cluster service account.
            let client = kube::Client::try_default()
                .await
                .context("Error building Kubernetes client")?;
            let version = client
                .apiserver_version()
                .await
                .context("Failed to get Kubernetes server version")?;
            info!(
                "Connected to Kubernetes {} (major {}, minor {})",
                version.git_version, version.major, version.minor
            );
            Arc::new(KubeStore::new(client).with_timeout(config.store_timeout))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; tenants are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if config.dry_run {
        warn!("Dry-run mode: creates are logged, not performed");
        return Ok(Arc::new(DryRunStore::new(store)));
    }
    Ok(store)
}

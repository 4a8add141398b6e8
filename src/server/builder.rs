//! Service startup
//!
//! Builds the importer from configuration, starts background reconciliation
//! and serves HTTP until shutdown.

use crate::config::Config;
use crate::core::Importer;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use tracing::info;

/// Run the importer service with the given configuration
pub async fn run_service(config: Config) -> Result<()> {
    info!("Starting {} v{}", crate::NAME, crate::VERSION);

    let importer = Importer::new(config).await?;
    let reconciliation = importer.start_background_services();

    let server = HttpServer::new(&importer);
    info!(
        "Server starting at: http://{}",
        importer.config().server().address()
    );
    info!("API Endpoints:");
    info!("   GET  /health - Health check");
    info!("   POST /api/v1/files - File arrival");
    info!("   POST /api/v1/batches/flush - Close the active batch");
    info!("   GET  /api/v1/batches - Batch list");
    info!("   GET  /api/v1/batches/{{batch_id}} - Batch detail");

    let result = server.start().await;

    if let Some(task) = reconciliation {
        task.abort();
        info!("Reconciliation task stopped");
    }
    result
}

//! Health check endpoint

use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Serialize;
use tracing::{debug, error};

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

/// Health status information
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Overall status
    pub status: &'static str,
    /// Timestamp of the check
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Service version
    pub version: &'static str,
    /// Whether import jobs are being polled
    pub reconciliation_enabled: bool,
}

/// Health check endpoint
///
/// Reports healthy when the batch store answers a query.
pub async fn health_check(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Health check requested");

    match state.store.health_check().await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success(HealthStatus {
            status: "healthy",
            timestamp: chrono::Utc::now(),
            version: crate::VERSION,
            reconciliation_enabled: state.config.reconciler().enabled,
        }))),
        Err(e) => {
            error!("Store health check failed: {}", e);
            Ok(HttpResponse::ServiceUnavailable().json(
                ApiResponse::<HealthStatus>::error_for_type(format!("Store unavailable: {}", e)),
            ))
        }
    }
}

//! Batch inspection and control endpoints

use crate::core::batch::BatchStatus;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::BatchFilter;
use crate::utils::error::ImporterError;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

/// Configure batch routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/batches")
            .route("", web::get().to(list_batches))
            .route("/flush", web::post().to(flush))
            .route("/{batch_id}", web::get().to(get_batch)),
    );
}

/// Query parameters for listing batches
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchListQuery {
    /// Lifecycle status, e.g. `partiallyFailed`
    pub status: Option<String>,
    /// Only batches that are (or are no longer) polled
    pub pollable: Option<bool>,
    pub limit: Option<usize>,
}

impl BatchListQuery {
    fn to_filter(&self) -> Result<BatchFilter, ImporterError> {
        let statuses = match &self.status {
            Some(status) => vec![status.parse::<BatchStatus>()?],
            None => Vec::new(),
        };
        Ok(BatchFilter {
            statuses,
            pollable: self.pollable,
            limit: self.limit,
        })
    }
}

/// List batches, oldest first
pub async fn list_batches(
    state: web::Data<AppState>,
    query: web::Query<BatchListQuery>,
) -> ActixResult<HttpResponse> {
    let filter = query.to_filter()?;
    let batches = state.store.list_batches(&filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(batches)))
}

/// One batch with its files and their outcomes
pub async fn get_batch(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let raw = path.into_inner();
    let batch_id = Uuid::parse_str(&raw)
        .map_err(|_| ImporterError::validation(format!("Invalid batch id: {}", raw)))?;

    let batch = state
        .store
        .get_batch(batch_id)
        .await?
        .ok_or_else(|| ImporterError::not_found(format!("Batch {} not found", batch_id)))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(batch)))
}

/// Close and submit the active batch now
pub async fn flush(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let flushed = state.accumulator.flush().await?;
    match &flushed {
        Some(batch) => info!("Batch {} flushed on request", batch.batch_id),
        None => info!("Flush requested with no batch to close"),
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(flushed)))
}

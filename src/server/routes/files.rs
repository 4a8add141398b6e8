//! File arrival endpoint

use crate::core::batch::FileArrival;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use tracing::debug;

/// Configure file arrival routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/files", web::post().to(file_arrived));
}

/// Accept one file-arrival record and place the file into a batch.
///
/// A malformed record is answered with 400 so the producer can redeliver it.
pub async fn file_arrived(state: web::Data<AppState>, body: String) -> ActixResult<HttpResponse> {
    let arrival = FileArrival::parse(&body)?;
    debug!(
        "File arrived: {} ({} resources)",
        arrival.filename, arrival.line_count
    );

    let batch = state.accumulator.accept(arrival).await?;
    Ok(HttpResponse::Accepted().json(ApiResponse::success(batch)))
}

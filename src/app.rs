use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/requirements", get(handlers::get_requirements))
        .route("/api/entries", get(handlers::get_entries).post(handlers::post_entry))
        .route("/api/entries/all", get(handlers::get_all_entries))
        .route("/api/entries/batch", post(handlers::post_batch))
        .route("/api/entries/reset", post(handlers::post_reset))
        .route("/api/entries/range/:start/:end", get(handlers::get_entries_range))
        .route("/api/progress", get(handlers::get_progress))
        .route("/api/today", get(handlers::get_today))
        .route("/api/history", get(handlers::get_history))
        .route("/api/history/month", get(handlers::get_month))
        .route("/api/history/month/export", get(handlers::export_month))
        .route("/api/lab-reports", get(handlers::get_lab_reports).post(handlers::post_lab_report))
        .route("/api/lab-reports/parameters", get(handlers::get_lab_parameters))
        .route("/api/lab-reports/trends", get(handlers::get_lab_trends))
        .with_state(state)
}

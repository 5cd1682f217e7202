use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use ekpool_core::health::{healthz, readyz};
use ekpool_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    admin_codes::{add_codes, delete_code, delete_codes, get_counts, get_pools},
    audit::{get_log_bounds, query_logs},
    codes::{get_my_codes, reserve_code, return_code},
    countries::list_countries,
    users::{create_user, delete_user, get_user, list_members, update_user},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Catalog
        .route("/countries", get(list_countries))
        // Member codes
        .route("/codes/reserve", post(reserve_code))
        .route("/codes/{code}/return", post(return_code))
        .route("/codes/@me", get(get_my_codes))
        // Pool administration
        .route("/admin/pools", get(get_pools))
        .route("/admin/counts", get(get_counts))
        .route("/admin/codes", post(add_codes))
        .route("/admin/codes/delete", post(delete_codes))
        .route("/admin/codes/{code}", delete(delete_code))
        // Audit log
        .route("/admin/logs", get(query_logs))
        .route("/admin/logs/bounds", get(get_log_bounds))
        // Users
        .route("/admin/users", get(list_members))
        .route("/admin/users", post(create_user))
        .route("/admin/users/{id}", get(get_user))
        .route("/admin/users/{id}", patch(update_user))
        .route("/admin/users/{id}", delete(delete_user))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}

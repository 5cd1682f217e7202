use axum::{Json, extract::State};

use ekpool_domain::country::CountryEntry;

use crate::error::PoolServiceError;
use crate::handlers::{Caller, require_any};
use crate::state::AppState;

// ── GET /countries ───────────────────────────────────────────────────────────

pub async fn list_countries(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<Vec<CountryEntry>>, PoolServiceError> {
    require_any(caller)?;
    Ok(Json(state.catalog.entries().to_vec()))
}

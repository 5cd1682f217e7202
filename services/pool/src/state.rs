use std::sync::Arc;

use axum::extract::FromRef;

use ekpool_auth_types::identity::AccessTokenSecret;
use ekpool_domain::country::CountryCatalog;

use crate::infra::StoreBackend;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreBackend,
    pub catalog: Arc<CountryCatalog>,
    pub token_secret: AccessTokenSecret,
}

impl AppState {
    pub fn new(store: StoreBackend, catalog: CountryCatalog, token_secret: &str) -> Self {
        Self {
            store,
            catalog: Arc::new(catalog),
            token_secret: AccessTokenSecret::new(token_secret),
        }
    }

    pub fn code_ledger(&self) -> StoreBackend {
        self.store.clone()
    }

    pub fn audit_log(&self) -> StoreBackend {
        self.store.clone()
    }

    pub fn user_repo(&self) -> StoreBackend {
        self.store.clone()
    }
}

impl FromRef<AppState> for AccessTokenSecret {
    fn from_ref(state: &AppState) -> Self {
        state.token_secret.clone()
    }
}

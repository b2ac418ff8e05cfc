use std::sync::Arc;

use crate::auth::TokenService;
use crate::database::Store;

/// Dependencies handed to every handler through axum `State`
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(store: Store, tokens: TokenService) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
        }
    }
}

use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::store::Store;

/// Shared, read-only application state handed to every handler.
///
/// The store is the only shared mutable resource and guards itself.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenCodec,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenCodec) -> Self {
        Self { store, tokens }
    }
}

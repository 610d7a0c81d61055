//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::PersistenceGateway;
use crate::services::{CartController, ItemStore, SessionManager};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// document store, the session manager and the item/cart services.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    gateway: Arc<dyn PersistenceGateway>,
    sessions: SessionManager,
    items: ItemStore,
    cart: CartController,
}

impl AppState {
    /// Create a new application state over `gateway`.
    #[must_use]
    pub fn new(config: ServerConfig, gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self::with_sessions(config, Arc::clone(&gateway), SessionManager::new(gateway))
    }

    /// Create a new application state with a preconfigured session manager.
    #[must_use]
    pub fn with_sessions(
        config: ServerConfig,
        gateway: Arc<dyn PersistenceGateway>,
        sessions: SessionManager,
    ) -> Self {
        let items = ItemStore::new(Arc::clone(&gateway));
        let cart = CartController::new(Arc::clone(&gateway));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                gateway,
                sessions,
                items,
                cart,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn gateway(&self) -> &dyn PersistenceGateway {
        self.inner.gateway.as_ref()
    }

    /// Get a reference to the session manager.
    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    /// Get a handle to the item service.
    #[must_use]
    pub fn items(&self) -> &ItemStore {
        &self.inner.items
    }

    /// Get a handle to the cart service.
    #[must_use]
    pub fn cart(&self) -> &CartController {
        &self.inner.cart
    }
}

//! Application wiring.
//!
//! Builds the session, the request client, the session store and the card
//! services from one configuration, all sharing the same session handle.

use std::sync::Arc;

use tracing::info;

use crate::client::ApiClient;
use crate::config::ConfigV1;
use crate::error::Result;
use crate::navigation::{Navigator, RouteGuard};
use crate::services::{CardAppearanceService, CardLinksService, CardsService};
use crate::session::{create_token_storage, SessionHandle, SessionStore};

/// Everything a front-end needs, wired to a single session.
pub struct App {
    /// Configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    pub session: SessionHandle,
    pub client: ApiClient,
    pub store: SessionStore,
    pub cards: CardsService,
    pub links: CardLinksService,
    pub appearance: CardAppearanceService,
    pub guard: RouteGuard,
}

impl App {
    /// Hydrates the session from storage and builds the client.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error when `api.base_url` is missing or
    /// invalid, or with a storage error when the token slot cannot be read.
    pub fn from_config(config: ConfigV1, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let storage = create_token_storage(&config.session, config.environment);
        let session = SessionHandle::hydrate(storage)?;
        let guard = RouteGuard::new(&config.routes);
        let client = ApiClient::new(
            &config.api,
            session.clone(),
            navigator.clone(),
            guard.login_path(),
        )?;
        let store = SessionStore::new(client.clone(), navigator, guard.login_path());

        info!(
            authenticated = session.is_authenticated(),
            "Insignia client ready"
        );

        Ok(App {
            config: Arc::new(config),
            cards: CardsService::new(client.clone()),
            links: CardLinksService::new(client.clone()),
            appearance: CardAppearanceService::new(client.clone()),
            session,
            client,
            store,
            guard,
        })
    }
}

//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::{
    config::Config,
    db::DbPool,
    middleware::auth::JwtVerifier,
    providers::{BillingProvider, VoiceProvider},
};

/// Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub billing: Arc<dyn BillingProvider>,
    pub voice: Arc<dyn VoiceProvider>,
    pub jwt: JwtVerifier,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        config: Config,
        billing: Arc<dyn BillingProvider>,
        voice: Arc<dyn VoiceProvider>,
    ) -> Self {
        let jwt = JwtVerifier::new(&config.supabase_jwt_secret);
        Self {
            pool,
            config: Arc::new(config),
            billing,
            voice,
            jwt,
        }
    }
}

//! Server application state shared across handlers

use crate::config::SecretsConfig;
use crate::dispatch::Dispatcher;
use crate::shutdown::ShutdownState;
use std::sync::Arc;

/// Immutable state cloned into every handler
#[derive(Clone)]
pub struct ServerAppState {
    pub dispatcher: Arc<Dispatcher>,

    /// Used only to report which vendors have a key configured
    pub secrets: Arc<SecretsConfig>,

    pub shutdown_state: ShutdownState,
}

impl ServerAppState {
    pub fn new(dispatcher: Dispatcher, secrets: SecretsConfig, shutdown_state: ShutdownState) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            secrets: Arc::new(secrets),
            shutdown_state,
        }
    }
}

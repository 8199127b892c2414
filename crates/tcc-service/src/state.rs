//! Application state.

use std::sync::Arc;

use tcc_core::RewardRuleConfig;
use tcc_store::{RocksStore, Store, StoreError};

use crate::config::ServiceConfig;
use crate::crypto::TokenSigner;
use crate::error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Signer for spend-token strings.
    pub signer: TokenSigner,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let signer = TokenSigner::new(config.token_signing_secret.clone());

        Self {
            store,
            config,
            signer,
        }
    }

    /// Seed the default reward configuration if none is stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn ensure_reward_config(&self) -> Result<(), StoreError> {
        if self.store.get_reward_config()?.is_none() {
            tracing::info!("No reward configuration found, seeding defaults");
            self.store.put_reward_config(&RewardRuleConfig::default())?;
        }
        Ok(())
    }

    /// Load the active reward configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ConfigUnavailable` if no configuration is stored.
    pub fn reward_config(&self) -> Result<RewardRuleConfig, ApiError> {
        self.store
            .get_reward_config()?
            .ok_or(ApiError::ConfigUnavailable)
    }
}

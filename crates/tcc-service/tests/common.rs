//! Common test utilities for tcc-service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use tcc_core::{AccountId, TransactionKind};
use tcc_service::{create_router, AppState, ServiceConfig};
use tcc_store::{RocksStore, Store};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct handle to the store, for seeding balances.
    pub store: Arc<RocksStore>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test citizen account ID for authenticated requests.
    pub citizen_id: AccountId,
    /// The service API key for terminal/backoffice requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let service_api_key = "test-service-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            service_api_key: Some(service_api_key.clone()),
            token_signing_secret: "test-signing-secret".into(),
            token_ttl_seconds: 300,
            sweep_interval_seconds: 60,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(Arc::clone(&store), config);
        state
            .ensure_reward_config()
            .expect("Failed to seed reward config");
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");
        let citizen_id = AccountId::generate();

        Self {
            server,
            store,
            _temp_dir: temp_dir,
            citizen_id,
            service_api_key,
        }
    }

    /// Get the authorization header for citizen authentication.
    pub fn citizen_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.citizen_id)
    }

    /// Get a different citizen's auth header (for testing isolation).
    pub fn other_citizen_auth_header() -> String {
        let other = AccountId::generate();
        format!("Bearer test-token:{other}")
    }

    /// Register the test citizen's wallet account via the API.
    pub async fn create_citizen_account(&self) {
        self.server
            .post("/v1/accounts")
            .add_header("authorization", self.citizen_auth_header())
            .await
            .assert_status_ok();
    }

    /// Credit the test citizen's wallet directly through the store.
    pub fn fund_citizen(&self, amount: i64) {
        self.store
            .apply_transaction(
                &self.citizen_id,
                TransactionKind::Earn,
                amount,
                None,
                &format!("test-fund:{}", uuid::Uuid::new_v4()),
            )
            .expect("Failed to fund account");
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

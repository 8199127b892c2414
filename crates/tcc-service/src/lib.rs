//! TCC Token Ledger HTTP API Service.
//!
//! This crate provides the HTTP API for the municipal TCC ledger,
//! including:
//!
//! - Citizen wallet accounts and transaction history
//! - Earn-event ingestion (purchases, check-ins, civic reports)
//! - Signed single-use spend tokens and merchant redemption
//! - Shop reimbursement batches
//! - Reward rule administration
//!
//! # Authentication
//!
//! The service supports two authentication methods:
//!
//! 1. **Citizen bearer tokens** - For wallet-app requests
//! 2. **Service API keys** - For merchant terminals and municipal backoffice

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Some handlers need async for consistency

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod sweep;

pub use config::ServiceConfig;
pub use crypto::TokenSigner;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use sweep::spawn_expiry_sweep;

//! TCC Ledger Client SDK.
//!
//! This crate provides a client library for merchant terminals and
//! municipal services to interact with the TCC ledger API.
//!
//! # Example
//!
//! ```no_run
//! use tcc_client::TccClient;
//! use tcc_core::{EarnEvent, PurchaseCategory};
//!
//! # async fn example() -> Result<(), tcc_client::ClientError> {
//! let client = TccClient::new(
//!     "http://tcc-ledger.civic-platform.svc:8080",
//!     "your-service-api-key",
//! );
//!
//! // Report a qualifying purchase
//! let response = client.report_earn(
//!     "citizen-account-uuid",
//!     EarnEvent::Purchase {
//!         euro_cents: 1000,
//!         area: "centro".to_string(),
//!         category: PurchaseCategory::Bio,
//!     },
//!     "receipt-2024-0042",
//! ).await?;
//!
//! println!("Awarded {} TCC", response.tcc_awarded);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, TccClient};
pub use error::ClientError;
pub use types::*;

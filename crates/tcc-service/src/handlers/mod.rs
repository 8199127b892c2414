//! HTTP request handlers.
//!
//! Handlers are organized by resource.

pub mod accounts;
pub mod earn;
pub mod health;
pub mod reimbursements;
pub mod rules;
pub mod tokens;

// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod catalog;
pub mod config;
pub mod draft;
pub mod persistence;
pub mod session;
pub mod valuation;

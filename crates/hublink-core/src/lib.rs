//! Core domain models and the token store seam.
//!
//! Provides strongly-typed domain primitives, OAuth session types, and the
//! injectable token store used by the HTTP layer. The other crates depend on
//! these foundational types for type safety and consistency.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod store;

pub use error::{Result, StoreError};
pub use models::{Contact, OauthToken, SessionId};
pub use store::{MemoryTokenStore, TokenStore};

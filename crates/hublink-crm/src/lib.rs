//! HubSpot integration: CRM client adapter and OAuth2 broker.
//!
//! This crate owns all outbound traffic to HubSpot. The client adapter wraps
//! the CRM v3 contact endpoints behind a search-then-create-or-update upsert,
//! and the OAuth broker handles authorization URL construction plus the
//! authorization-code and refresh-token grants.
//!
//! # Example
//!
//! ```no_run
//! use hublink_core::Contact;
//! use hublink_crm::{ClientConfig, CrmError, HubSpotClient};
//!
//! # async fn example() -> Result<(), CrmError> {
//! let client = HubSpotClient::new(ClientConfig::default())?;
//! let outcome = client.upsert_contact("token", &Contact::new("a@x.com", "Ann")).await?;
//! if outcome.was_created() {
//!     println!("created contact {}", outcome.record().id);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod oauth;

pub use client::{ClientConfig, ContactRecord, HubSpotClient, UpsertOutcome};
pub use error::{CrmError, Result};
pub use oauth::{OauthClient, OauthConfig};

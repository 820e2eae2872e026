//! HTTP client for the HubSpot CRM v3 contact endpoints.
//!
//! Wraps search, create, and update behind an email-keyed upsert. The upsert
//! is search-before-write only: races between concurrent calls for the same
//! email are not addressed here, matching the CRM's own last-write-wins
//! semantics.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use hublink_core::Contact;

use crate::error::{CrmError, Result};

/// Configuration for the CRM client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the CRM API.
    pub base_url: String,
    /// Default timeout for HTTP requests.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.hubapi.com".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: "Hublink/0.1".to_string(),
        }
    }
}

/// HTTP client for contact operations against HubSpot.
///
/// Uses connection pooling and a configured timeout. Authentication is a
/// bearer token supplied per call, so the same client serves OAuth access
/// tokens and private-app API keys alike.
#[derive(Debug, Clone)]
pub struct HubSpotClient {
    client: reqwest::Client,
    config: ClientConfig,
}

/// A contact record as returned by the CRM.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactRecord {
    /// CRM-assigned object id.
    pub id: String,
    /// Properties stored on the record.
    #[serde(default)]
    pub properties: ContactProperties,
}

/// Contact properties carried on a CRM record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactProperties {
    /// Email address property.
    pub email: Option<String>,
    /// First name property.
    pub firstname: Option<String>,
}

/// Result of an email-keyed upsert.
#[derive(Debug, Clone)]
pub enum UpsertOutcome {
    /// No contact matched the email; a new record was created.
    Created(ContactRecord),
    /// An existing record matched the email and was updated in place.
    Updated(ContactRecord),
}

impl UpsertOutcome {
    /// The record the CRM returned for the write.
    pub fn record(&self) -> &ContactRecord {
        match self {
            Self::Created(record) | Self::Updated(record) => record,
        }
    }

    /// Whether the upsert created a new record.
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    #[serde(rename = "filterGroups")]
    filter_groups: Vec<FilterGroup<'a>>,
    properties: &'a [&'a str],
    limit: u32,
}

#[derive(Debug, Serialize)]
struct FilterGroup<'a> {
    filters: Vec<Filter<'a>>,
}

#[derive(Debug, Serialize)]
struct Filter<'a> {
    #[serde(rename = "propertyName")]
    property_name: &'a str,
    operator: &'a str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ContactRecord>,
}

#[derive(Debug, Serialize)]
struct ContactWrite<'a> {
    properties: WriteProperties<'a>,
}

#[derive(Debug, Serialize)]
struct WriteProperties<'a> {
    email: &'a str,
    firstname: &'a str,
}

impl HubSpotClient {
    /// Creates a new CRM client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `CrmError::Configuration` if the HTTP client cannot be built
    /// with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| CrmError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Creates a new CRM client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Searches for a contact by exact email match.
    ///
    /// Returns the first matching record, or `None` when the email is
    /// unknown to the CRM.
    #[instrument(name = "crm_search", skip(self, access_token))]
    pub async fn search_by_email(
        &self,
        access_token: &str,
        email: &str,
    ) -> Result<Option<ContactRecord>> {
        let url = format!("{}/crm/v3/objects/contacts/search", self.config.base_url);
        let body = SearchRequest {
            filter_groups: vec![FilterGroup {
                filters: vec![Filter { property_name: "email", operator: "EQ", value: email }],
            }],
            properties: &["email", "firstname"],
            limit: 1,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.categorize_send_error(e))?;

        let search: SearchResponse = self.parse_response(response).await?;

        debug!(matches = search.results.len(), "Contact search completed");
        Ok(search.results.into_iter().next())
    }

    /// Creates a new contact with the given properties.
    #[instrument(name = "crm_create", skip(self, access_token, contact), fields(email = %contact.email))]
    pub async fn create_contact(
        &self,
        access_token: &str,
        contact: &Contact,
    ) -> Result<ContactRecord> {
        let url = format!("{}/crm/v3/objects/contacts", self.config.base_url);
        let body = ContactWrite {
            properties: WriteProperties { email: &contact.email, firstname: &contact.firstname },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.categorize_send_error(e))?;

        self.parse_response(response).await
    }

    /// Updates an existing contact's properties by id.
    #[instrument(name = "crm_update", skip(self, access_token, contact), fields(email = %contact.email))]
    pub async fn update_contact(
        &self,
        access_token: &str,
        contact_id: &str,
        contact: &Contact,
    ) -> Result<ContactRecord> {
        let url = format!("{}/crm/v3/objects/contacts/{contact_id}", self.config.base_url);
        let body = ContactWrite {
            properties: WriteProperties { email: &contact.email, firstname: &contact.firstname },
        };

        let response = self
            .client
            .patch(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.categorize_send_error(e))?;

        self.parse_response(response).await
    }

    /// Upserts a contact keyed by email: update the first record matching
    /// the email, otherwise create a new one.
    pub async fn upsert_contact(
        &self,
        access_token: &str,
        contact: &Contact,
    ) -> Result<UpsertOutcome> {
        match self.search_by_email(access_token, &contact.email).await? {
            Some(existing) => {
                info!(contact_id = %existing.id, email = %contact.email, "Updating existing contact");
                let record = self.update_contact(access_token, &existing.id, contact).await?;
                Ok(UpsertOutcome::Updated(record))
            },
            None => {
                info!(email = %contact.email, "Creating new contact");
                let record = self.create_contact(access_token, contact).await?;
                Ok(UpsertOutcome::Created(record))
            },
        }
    }

    /// Maps a reqwest send failure onto the error taxonomy.
    fn categorize_send_error(&self, error: reqwest::Error) -> CrmError {
        if error.is_timeout() {
            return CrmError::timeout(self.config.timeout.as_secs());
        }
        if error.is_connect() {
            return CrmError::network(format!("connection failed: {error}"));
        }
        CrmError::network(error.to_string())
    }

    /// Decodes a success response, surfacing non-success statuses with their
    /// body text.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrmError::api(status.as_u16(), body));
        }

        response.json().await.map_err(|e| CrmError::decode(e.to_string()))
    }
}

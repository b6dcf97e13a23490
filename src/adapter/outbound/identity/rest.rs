//! Identity directory backed by a PostgREST table.
//!
//! Rows have two columns, `twitter_handle` and `wallet_address`, with a
//! unique constraint on the address. Addresses are stored lower-case.

use std::str::FromStr;

use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};
use crate::port::outbound::identity::{normalize_handle, IdentityDirectory};

/// REST client for the wallet directory table.
#[derive(Debug)]
pub struct RestDirectory {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    twitter_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wallet_address: Option<String>,
}

impl RestDirectory {
    /// Create a client for `table` under the REST root at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL or the key is empty.
    pub fn new(base_url: &str, table: &str, api_key: impl Into<String>) -> Result<Self> {
        let base = url::Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
            field: "identity.url",
            reason: e.to_string(),
        })?;
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "identity.api_key",
            }
            .into());
        }

        Ok(Self {
            client: Client::new(),
            endpoint: endpoint(&base, table),
            api_key,
        })
    }

    /// Full table URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn select(&self, filter: (&str, String), column: &str) -> Result<Vec<Row>> {
        debug!(endpoint = %self.endpoint, column, "Querying identity directory");
        let rows = self
            .client
            .get(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[filter, ("select", column.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Row>>()
            .await?;
        Ok(rows)
    }
}

fn endpoint(base: &url::Url, table: &str) -> String {
    format!(
        "{}/rest/v1/{}",
        base.as_str().trim_end_matches('/'),
        table.trim_matches('/')
    )
}

fn wallets(rows: Vec<Row>) -> Vec<Address> {
    rows.into_iter()
        .filter_map(|row| row.wallet_address)
        .filter_map(|raw| match Address::from_str(raw.trim()) {
            Ok(address) => Some(address),
            Err(e) => {
                warn!(value = %raw, error = %e, "Skipping malformed wallet address");
                None
            }
        })
        .collect()
}

fn address_key(address: Address) -> String {
    format!("{address:#x}")
}

/// Handles are stored as given, addresses lower-case.
fn row(handle: &str, address: Address) -> Result<Row> {
    Ok(Row {
        twitter_handle: Some(normalize_handle(handle)?),
        wallet_address: Some(address_key(address)),
    })
}

#[async_trait]
impl IdentityDirectory for RestDirectory {
    async fn lookup(&self, handle: &str) -> Result<Vec<Address>> {
        let handle = normalize_handle(handle)?;
        let rows = self
            .select(("twitter_handle", format!("eq.{handle}")), "wallet_address")
            .await?;
        Ok(wallets(rows))
    }

    async fn reverse_lookup(&self, address: Address) -> Result<Option<String>> {
        let rows = self
            .select(
                ("wallet_address", format!("eq.{}", address_key(address))),
                "twitter_handle",
            )
            .await?;
        Ok(rows.into_iter().find_map(|row| row.twitter_handle))
    }

    async fn upsert(&self, handle: &str, address: Address) -> Result<()> {
        let row = row(handle, address)?;
        self.client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .query(&[("on_conflict", "wallet_address")])
            .json(&[row])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

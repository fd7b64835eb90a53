//! OSV.dev API client
//!
//! Thin client for the two endpoints the dependency scanner needs:
//! `/v1/querybatch` to cheaply learn which packages have advisories at all,
//! and `/v1/query` for the full advisory list of one package. Requests are
//! plain JSON POSTs with no authentication; the ecosystem name is always
//! `Packagist`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_BASE_URL: &str = "https://api.osv.dev";
pub const ECOSYSTEM: &str = "Packagist";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the OSV client. Whether an error is fatal depends on the
/// phase: batch errors abort the dependency scanner, per-package errors are
/// skipped.
#[derive(Debug, thiserror::Error)]
pub enum OsvError {
    #[error("OSV.dev request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OSV.dev returned status {0}")]
    Status(u16),

    #[error("request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageRef {
    pub name: String,
    pub ecosystem: String,
}

/// One entry of a batch query.
#[derive(Debug, Clone, Serialize)]
pub struct PackageQuery {
    pub package: PackageRef,
    pub version: String,
}

impl PackageQuery {
    pub fn packagist(name: &str, version: &str) -> Self {
        Self {
            package: PackageRef {
                name: name.to_string(),
                ecosystem: ECOSYSTEM.to_string(),
            },
            version: version.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    queries: &'a [PackageQuery],
}

#[derive(Debug, Default, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    results: Vec<BatchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct BatchResult {
    #[serde(default)]
    vulns: Vec<VulnStub>,
}

#[derive(Debug, Deserialize)]
struct VulnStub {
    #[allow(dead_code)]
    #[serde(default)]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    vulns: Vec<OsvVulnerability>,
}

/// Advisory record as returned by `/v1/query`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsvVulnerability {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub references: Vec<OsvReference>,
    #[serde(default)]
    pub affected: Vec<OsvAffected>,
    #[serde(default)]
    pub database_specific: OsvDatabaseSpecific,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsvReference {
    #[serde(default, rename = "type")]
    pub reference_type: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsvAffected {
    #[serde(default)]
    pub package: OsvPackage,
    #[serde(default)]
    pub ranges: Vec<OsvRange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsvPackage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ecosystem: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsvRange {
    #[serde(default, rename = "type")]
    pub range_type: String,
    #[serde(default)]
    pub events: Vec<OsvEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsvEvent {
    #[serde(default)]
    pub introduced: Option<String>,
    #[serde(default)]
    pub fixed: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsvDatabaseSpecific {
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub cwe_ids: Vec<String>,
}

/// HTTP client for OSV.dev.
#[derive(Debug, Clone)]
pub struct OsvClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for OsvClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl OsvClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("building HTTP client cannot fail");
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Probe a batch of packages. The returned flags are positionally
    /// aligned with `queries`: `true` at index `i` means package `i` has at
    /// least one advisory.
    pub async fn query_batch(
        &self,
        cancel: &CancellationToken,
        queries: &[PackageQuery],
    ) -> Result<Vec<bool>, OsvError> {
        if cancel.is_cancelled() {
            return Err(OsvError::Cancelled);
        }

        let url = format!("{}/v1/querybatch", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&BatchRequest { queries })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OsvError::Status(response.status().as_u16()));
        }

        let body: BatchResponse = response.json().await?;
        let mut flags = vec![false; queries.len()];
        for (index, result) in body.results.into_iter().enumerate() {
            if index >= flags.len() {
                break;
            }
            flags[index] = !result.vulns.is_empty();
        }
        Ok(flags)
    }

    /// Full advisory list for one package and version.
    pub async fn query_package(
        &self,
        cancel: &CancellationToken,
        name: &str,
        version: &str,
    ) -> Result<Vec<OsvVulnerability>, OsvError> {
        if cancel.is_cancelled() {
            return Err(OsvError::Cancelled);
        }

        let url = format!("{}/v1/query", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&PackageQuery::packagist(name, version))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OsvError::Status(response.status().as_u16()));
        }

        let body: QueryResponse = response.json().await?;
        Ok(body.vulns)
    }
}

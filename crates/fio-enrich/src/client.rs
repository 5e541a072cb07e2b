//! [`HttpEnricher`] — the reqwest implementation of [`EnrichmentProvider`].

use std::time::Duration;

use fio_core::{
  enrich::{Candidate, Dependency, EnrichError, EnrichmentProvider},
  ethnicity::UNKNOWN,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{AgeResponse, EthnicityResponse, GenderResponse};

/// Base URLs of the three prediction services.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
  pub age_url:       String,
  pub gender_url:    String,
  pub ethnicity_url: String,
  /// Per-request timeout. `None` keeps the transport default, which never
  /// times out.
  pub timeout:       Option<Duration>,
}

impl EnrichConfig {
  pub fn new(
    age_url: impl Into<String>,
    gender_url: impl Into<String>,
    ethnicity_url: impl Into<String>,
  ) -> Self {
    Self {
      age_url:       age_url.into(),
      gender_url:    gender_url.into(),
      ethnicity_url: ethnicity_url.into(),
      timeout:       None,
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  fn url(&self, dependency: Dependency) -> &str {
    match dependency {
      Dependency::Age => &self.age_url,
      Dependency::Gender => &self.gender_url,
      Dependency::Ethnicity => &self.ethnicity_url,
    }
  }
}

/// Queries the prediction services over HTTP.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpEnricher {
  client: Client,
  config: EnrichConfig,
}

impl HttpEnricher {
  pub fn new(config: EnrichConfig) -> Result<Self, reqwest::Error> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout {
      builder = builder.timeout(timeout);
    }
    Ok(Self { client: builder.build()?, config })
  }

  pub fn config(&self) -> &EnrichConfig { &self.config }

  /// `GET <base>?name=<name>` and decode the body as `T`.
  ///
  /// Transport failures and non-success statuses are `Unreachable`; a body
  /// that does not decode is `Malformed`. Nothing is retried.
  async fn fetch<T: DeserializeOwned>(
    &self,
    dependency: Dependency,
    name: &str,
  ) -> Result<T, EnrichError> {
    let resp = self
      .client
      .get(self.config.url(dependency))
      .query(&[("name", name)])
      .send()
      .await
      .map_err(|e| EnrichError::Unreachable(dependency, e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      debug!(%dependency, %status, body = %body, "lookup answered with an error status");
      return Err(EnrichError::Unreachable(dependency, format!("HTTP {status}")));
    }

    let bytes = resp
      .bytes()
      .await
      .map_err(|e| EnrichError::Unreachable(dependency, e.to_string()))?;

    serde_json::from_slice(&bytes)
      .map_err(|e| EnrichError::Malformed(dependency, e.to_string()))
  }
}

impl EnrichmentProvider for HttpEnricher {
  async fn age(&self, name: &str) -> Result<i32, EnrichError> {
    let body: AgeResponse = self.fetch(Dependency::Age, name).await?;
    debug!(name, age = ?body.age, "age lookup answered");
    Ok(body.age.unwrap_or_default())
  }

  async fn gender(&self, name: &str) -> Result<String, EnrichError> {
    let body: GenderResponse = self.fetch(Dependency::Gender, name).await?;
    debug!(name, gender = ?body.gender, "gender lookup answered");
    Ok(body.gender.unwrap_or_else(|| UNKNOWN.to_owned()))
  }

  async fn ethnicity(&self, name: &str) -> Result<Vec<Candidate>, EnrichError> {
    let body: EthnicityResponse = self.fetch(Dependency::Ethnicity, name).await?;
    debug!(name, candidates = body.country.len(), "ethnicity lookup answered");
    Ok(body.country)
  }
}

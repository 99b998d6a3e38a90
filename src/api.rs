use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
  config::Config,
  globe::{
    features::{CountryFeature, Nation},
    topojson::{COUNTRIES_OBJECT, TopoJsonError, decode_features},
  },
  traveler::TravelerRecord,
};

#[derive(Error, Debug)]
pub enum ApiError {
  #[error("Request to {url} failed: {message}")]
  Request { url: String, message: String },
  #[error("{url} answered with status {status}")]
  Status { url: String, status: u16 },
  #[error("Failed to decode response of {url}: {source}")]
  Decode {
    url: String,
    #[source]
    source: serde_json::Error,
  },
  #[error("Failed to decode world boundaries: {0}")]
  Topology(#[from] TopoJsonError),
}

/// Traveler counts of one country as delivered by `/api/countries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
  pub country: String,
  #[serde(default)]
  pub current: u32,
  #[serde(default)]
  pub planned: u32,
}

/// The traveler backend.
#[async_trait::async_trait]
pub trait TravelApi: Send + Sync {
  /// Traveler counts for all countries that have any.
  async fn countries(&self) -> Result<Vec<CountryCount>, ApiError>;

  /// All active travelers of a country, keyed by its display name.
  async fn travelers(&self, country: &str) -> Result<Vec<TravelerRecord>, ApiError>;
}

/// Sources of the globe geometry and the country names.
#[async_trait::async_trait]
pub trait GeoSource: Send + Sync {
  async fn world(&self) -> Result<Vec<CountryFeature>, ApiError>;

  async fn country_names(&self) -> Result<Vec<Nation>, ApiError>;
}

/// Talks to the backend and the public datasets over HTTP.
pub struct HttpClient {
  api_url: String,
  world_atlas_url: String,
  country_names_url: String,
  client: surf::Client,
}

impl HttpClient {
  #[must_use]
  pub fn new(config: &Config) -> Self {
    Self {
      api_url: config.api_url.trim_end_matches('/').to_string(),
      world_atlas_url: config.world_atlas_url.clone(),
      country_names_url: config.country_names_url.clone(),
      client: surf::Client::new(),
    }
  }

  fn travelers_url(&self, country: &str) -> String {
    format!(
      "{}/api/travelers/{}",
      self.api_url,
      urlencoding::encode(country)
    )
  }

  async fn get_text(&self, url: &str) -> Result<String, ApiError> {
    log::debug!("GET {url}");
    let mut response = self
      .client
      .get(url)
      .await
      .map_err(|e| ApiError::Request {
        url: url.to_string(),
        message: e.to_string(),
      })?;

    if !response.status().is_success() {
      return Err(ApiError::Status {
        url: url.to_string(),
        status: response.status().into(),
      });
    }

    response.body_string().await.map_err(|e| ApiError::Request {
      url: url.to_string(),
      message: e.to_string(),
    })
  }

  async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
    let body = self.get_text(url).await?;
    serde_json::from_str(&body).map_err(|source| ApiError::Decode {
      url: url.to_string(),
      source,
    })
  }
}

#[async_trait::async_trait]
impl TravelApi for HttpClient {
  async fn countries(&self) -> Result<Vec<CountryCount>, ApiError> {
    self
      .get_json(&format!("{}/api/countries", self.api_url))
      .await
  }

  async fn travelers(&self, country: &str) -> Result<Vec<TravelerRecord>, ApiError> {
    self.get_json(&self.travelers_url(country)).await
  }
}

#[async_trait::async_trait]
impl GeoSource for HttpClient {
  async fn world(&self) -> Result<Vec<CountryFeature>, ApiError> {
    let body = self.get_text(&self.world_atlas_url).await?;
    Ok(decode_features(&body, COUNTRIES_OBJECT)?)
  }

  async fn country_names(&self) -> Result<Vec<Nation>, ApiError> {
    self.get_json(&self.country_names_url).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(api_url: &str) -> HttpClient {
    HttpClient::new(&Config {
      api_url: api_url.to_string(),
      ..Config::default()
    })
  }

  #[test]
  fn escapes_country_names() {
    let client = client("http://localhost:5000/");
    assert_eq!(
      client.travelers_url("Côte d'Ivoire"),
      "http://localhost:5000/api/travelers/C%C3%B4te%20d%27Ivoire"
    );
    assert_eq!(
      client.travelers_url("Bosnia and Herzegovina"),
      "http://localhost:5000/api/travelers/Bosnia%20and%20Herzegovina"
    );
  }

  #[test]
  fn country_counts_default_missing_numbers() {
    let counts: Vec<CountryCount> =
      serde_json::from_str(r#"[{"country": "Kenya", "current": 3}]"#).unwrap();
    assert_eq!(
      counts,
      vec![CountryCount {
        country: "Kenya".to_string(),
        current: 3,
        planned: 0
      }]
    );
  }

  #[test]
  fn unreachable_backend_is_a_request_error() {
    let client = client("http://127.0.0.1:9");
    let result = futures::executor::block_on(client.countries());
    assert!(matches!(result, Err(ApiError::Request { .. })));
  }
}

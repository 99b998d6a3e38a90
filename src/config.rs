use std::path::PathBuf;

use dirs::home_dir;
use log::error;

use crate::panel::ReturnedPolicy;

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_WORLD_ATLAS_URL: &str =
  "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-110m.json";
const DEFAULT_COUNTRY_NAMES_URL: &str = "https://restcountries.com/v3.1/all?fields=name,ccn3";

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
  #[serde(skip)]
  pub config_path: Option<PathBuf>,
  /// Base url of the traveler backend.
  pub api_url: String,
  pub world_atlas_url: String,
  pub country_names_url: String,
  /// Lists returned travelers in the detail panel.
  #[serde(default)]
  pub show_returned_travelers: bool,
}

/// The parts of the config that can come from the environment or the config file.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PartialConfig {
  #[serde(skip)]
  config_path: Option<PathBuf>,
  #[serde(default)]
  api_url: Option<String>,
  #[serde(default)]
  world_atlas_url: Option<String>,
  #[serde(default)]
  country_names_url: Option<String>,
  #[serde(default)]
  show_returned_travelers: Option<bool>,
}

impl PartialConfig {
  fn merge(self, other: Self) -> Self {
    Self {
      config_path: self.config_path.or(other.config_path),
      api_url: self.api_url.or(other.api_url),
      world_atlas_url: self.world_atlas_url.or(other.world_atlas_url),
      country_names_url: self.country_names_url.or(other.country_names_url),
      show_returned_travelers: self
        .show_returned_travelers
        .or(other.show_returned_travelers),
    }
  }

  fn or_default(self) -> Config {
    let default = Config::default();
    Config {
      config_path: self.config_path.or(default.config_path),
      api_url: self.api_url.unwrap_or(default.api_url),
      world_atlas_url: self.world_atlas_url.unwrap_or(default.world_atlas_url),
      country_names_url: self.country_names_url.unwrap_or(default.country_names_url),
      show_returned_travelers: self
        .show_returned_travelers
        .unwrap_or(default.show_returned_travelers),
    }
  }
}

impl Config {
  /// Environment first, then the config file, then the defaults. Writes the config file if there
  /// is none yet.
  #[must_use]
  pub fn new() -> Self {
    let from_env = Self::from_env();
    let from_file = Self::from_file(from_env.config_path.clone());
    let file_missing = from_file.is_none();

    let merged = from_file
      .map_or_else(|| from_env.clone(), |f| from_env.clone().merge(f))
      .or_default();

    if file_missing {
      merged.init_cfg_file();
    }
    merged
  }

  fn from_env() -> PartialConfig {
    PartialConfig {
      config_path: std::env::var("TRAVELGLOBE_CONFIG").ok().map(PathBuf::from),
      api_url: std::env::var("TRAVELGLOBE_API_URL").ok(),
      world_atlas_url: std::env::var("TRAVELGLOBE_WORLD_ATLAS_URL").ok(),
      country_names_url: std::env::var("TRAVELGLOBE_COUNTRY_NAMES_URL").ok(),
      show_returned_travelers: None,
    }
  }

  fn from_file(config_path: Option<PathBuf>) -> Option<PartialConfig> {
    let config_path = config_path.or_else(default_config_path)?.join("config.json");

    serde_json::from_str(&std::fs::read_to_string(&config_path).ok()?)
      .inspect_err(|e| error!("Failed to read config file: {e}"))
      .ok()
  }

  fn init_cfg_file(&self) {
    let Some(path) = &self.config_path else {
      return;
    };
    if !path.exists() {
      let _ = std::fs::create_dir_all(path).inspect_err(|e| {
        error!("Failed to create config directory: {e}");
      });
    }

    let path = path.join("config.json");
    if !path.exists() {
      match serde_json::to_string_pretty(self) {
        Ok(config) => {
          let _ = std::fs::write(path, config).inspect_err(|e| {
            error!("Failed to write config file: {e}");
          });
        }
        Err(e) => error!("Failed to serialize config: {e}"),
      }
    }
  }

  #[must_use]
  pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
    if let Some(api_url) = api_url {
      self.api_url = api_url;
    }
    self
  }

  #[must_use]
  pub fn with_show_returned_travelers(mut self, show: bool) -> Self {
    self.show_returned_travelers |= show;
    self
  }

  #[must_use]
  pub fn returned_policy(&self) -> ReturnedPolicy {
    if self.show_returned_travelers {
      ReturnedPolicy::Show
    } else {
      ReturnedPolicy::Hide
    }
  }
}

fn default_config_path() -> Option<PathBuf> {
  home_dir().map(|p| p.join(".config").join("travelglobe"))
}

impl Default for Config {
  fn default() -> Self {
    Self {
      config_path: default_config_path(),
      api_url: DEFAULT_API_URL.to_string(),
      world_atlas_url: DEFAULT_WORLD_ATLAS_URL.to_string(),
      country_names_url: DEFAULT_COUNTRY_NAMES_URL.to_string(),
      show_returned_travelers: false,
    }
  }
}

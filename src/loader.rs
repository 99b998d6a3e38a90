use std::sync::{
  Arc,
  mpsc::{Receiver, Sender, channel},
};

use anyhow::Context as _;
use log::{error, info, warn};

use crate::{
  api::{ApiError, GeoSource, TravelApi},
  globe::features::{CountryFeature, CountryNames, split_overseas_territories},
  metrics::CountryMetricStore,
  panel::RequestToken,
  traveler::TravelerRecord,
};

/// Everything the globe needs before it can be painted.
#[derive(Debug, Clone)]
pub struct GlobeData {
  pub features: Vec<CountryFeature>,
  pub names: CountryNames,
  pub metrics: CountryMetricStore,
}

/// Results of background loads, delivered to the UI thread.
#[derive(Debug)]
pub enum LoadEvent {
  Globe(GlobeData),
  GlobeFailed(String),
  Travelers {
    token: RequestToken,
    result: Result<Vec<TravelerRecord>, ApiError>,
  },
}

/// Loads the traveler counts, then the world boundaries, then the country names. Only missing
/// world boundaries are an error, failed counts or names leave those empty.
pub async fn load_globe(api: &dyn TravelApi, geo: &dyn GeoSource) -> anyhow::Result<GlobeData> {
  let mut metrics = CountryMetricStore::new();
  metrics.load(api).await;

  let world = geo
    .world()
    .await
    .context("Failed to load world boundaries")?;

  let names = match geo.country_names().await {
    Ok(nations) => CountryNames::from_nations(nations),
    Err(e) => {
      warn!("Failed to load country names, showing ids only: {e}");
      CountryNames::default()
    }
  };

  let features = split_overseas_territories(world);
  info!(
    "Loaded {} countries, {} names, counts for {}",
    features.len(),
    names.len(),
    metrics.len()
  );
  Ok(GlobeData {
    features,
    names,
    metrics,
  })
}

/// Runs the network loads on the tokio runtime and wakes the UI when a result arrives.
pub struct Loader {
  api: Arc<dyn TravelApi>,
  geo: Arc<dyn GeoSource>,
  sender: Sender<LoadEvent>,
  ctx: egui::Context,
}

impl Loader {
  #[must_use]
  pub fn new(
    api: Arc<dyn TravelApi>,
    geo: Arc<dyn GeoSource>,
    ctx: egui::Context,
  ) -> (Self, Receiver<LoadEvent>) {
    let (sender, receiver) = channel();
    (
      Self {
        api,
        geo,
        sender,
        ctx,
      },
      receiver,
    )
  }

  fn deliver(sender: &Sender<LoadEvent>, ctx: &egui::Context, event: LoadEvent) {
    let _ = sender
      .send(event)
      .inspect_err(|e| error!("Failed to deliver load result: {e}"));
    ctx.request_repaint();
  }

  pub fn spawn_initial_load(&self) {
    let api = Arc::clone(&self.api);
    let geo = Arc::clone(&self.geo);
    let sender = self.sender.clone();
    let ctx = self.ctx.clone();

    tokio::spawn(async move {
      let event = match load_globe(&*api, &*geo).await {
        Ok(data) => LoadEvent::Globe(data),
        Err(e) => {
          error!("{e:#}");
          LoadEvent::GlobeFailed(format!("{e:#}"))
        }
      };
      Self::deliver(&sender, &ctx, event);
    });
  }

  /// Fetches the travelers of `country`. The result carries `token` so stale responses can be
  /// told apart.
  pub fn spawn_traveler_fetch(&self, token: RequestToken, country: String) {
    let api = Arc::clone(&self.api);
    let sender = self.sender.clone();
    let ctx = self.ctx.clone();

    tokio::spawn(async move {
      let result = api.travelers(&country).await;
      Self::deliver(&sender, &ctx, LoadEvent::Travelers { token, result });
    });
  }
}

#[cfg(test)]
pub(crate) mod test_utils {
  use geo_types::{MultiPolygon, polygon};

  use crate::{
    api::{ApiError, GeoSource},
    globe::features::{CountryFeature, CountryGeometry, FeatureId, Nation, NationName},
  };

  /// World with mainland France, French Guiana and Kenya.
  pub struct FakeGeo {
    pub world_available: bool,
    pub names_available: bool,
  }

  impl FakeGeo {
    pub fn available() -> Self {
      Self {
        world_available: true,
        names_available: true,
      }
    }
  }

  pub fn world() -> Vec<CountryFeature> {
    vec![
      CountryFeature::new(
        FeatureId::Numeric(250),
        CountryGeometry::MultiPolygon(MultiPolygon(vec![
          polygon![(x: 0., y: 44.), (x: 6., y: 44.), (x: 6., y: 50.), (x: 0., y: 50.), (x: 0., y: 44.)],
          polygon![(x: -54., y: 2.), (x: -52., y: 2.), (x: -52., y: 5.), (x: -54., y: 5.), (x: -54., y: 2.)],
        ])),
      ),
      CountryFeature::new(
        FeatureId::Numeric(404),
        CountryGeometry::Polygon(
          polygon![(x: 34., y: -4.), (x: 41., y: -4.), (x: 41., y: 4.), (x: 34., y: 4.), (x: 34., y: -4.)],
        ),
      ),
    ]
  }

  fn nation(ccn3: &str, name: &str) -> Nation {
    Nation {
      ccn3: Some(ccn3.to_string()),
      name: NationName {
        common: name.to_string(),
      },
    }
  }

  #[async_trait::async_trait]
  impl GeoSource for FakeGeo {
    async fn world(&self) -> Result<Vec<CountryFeature>, ApiError> {
      if self.world_available {
        Ok(world())
      } else {
        Err(ApiError::Request {
          url: "world".to_string(),
          message: "offline".to_string(),
        })
      }
    }

    async fn country_names(&self) -> Result<Vec<Nation>, ApiError> {
      if self.names_available {
        Ok(vec![nation("250", "France"), nation("404", "Kenya")])
      } else {
        Err(ApiError::Status {
          url: "names".to_string(),
          status: 500,
        })
      }
    }
  }
}

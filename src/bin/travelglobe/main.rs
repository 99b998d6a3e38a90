use std::sync::Arc;

use clap::Parser as CliParser;
use travelglobe::{
  api::HttpClient, config::Config, globe_ui::GlobeApp, loader::Loader,
  travel_status::local_today,
};

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Base url of the traveler backend, overrides the config.
  #[arg(short, long)]
  api_url: Option<String>,

  /// Also list travelers whose trip is over.
  #[arg(short = 'r', long, default_value_t = false)]
  show_returned: bool,
}

fn main() -> eframe::Result {
  // init logger.
  env_logger::init();
  let args = Args::parse();

  let config = Config::new()
    .with_api_url(args.api_url)
    .with_show_returned_travelers(args.show_returned);
  log::info!("Using traveler backend at {}", config.api_url);

  // Tokio runtime.
  let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
  let _enter = rt.enter();

  let options = eframe::NativeOptions {
    viewport: egui::ViewportBuilder {
      inner_size: Some(egui::vec2(1400.0, 900.0)),
      clamp_size_to_monitor_size: Some(true),
      ..Default::default()
    },
    ..Default::default()
  };

  eframe::run_native(
    "travelglobe",
    options,
    Box::new(move |cc| {
      let client = Arc::new(HttpClient::new(&config));
      let (loader, events) = Loader::new(client.clone(), client, cc.egui_ctx.clone());
      Ok(Box::new(GlobeApp::new(
        loader,
        events,
        local_today(),
        config.returned_policy(),
      )))
    }),
  )
}

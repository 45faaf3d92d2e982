mod app;
mod svg;
mod utils;

use app::SvgRecolorApp;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;
use utils::config::RecolorConfig;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("svg_recolor=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = RecolorConfig::load_or_default();
    let runtime = Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 640.0])
            .with_min_inner_size([420.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SVG Recolor",
        options,
        Box::new(move |cc| Box::new(SvgRecolorApp::new(cc, config, runtime))),
    )?;
    Ok(())
}

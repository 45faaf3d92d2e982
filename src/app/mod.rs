mod controller;
mod state;
mod ui;

pub use controller::{ControlId, Controller, InputEvent, LoadOutcome, LoadRequest};
pub use state::{ColorControls, MountContent};

use crate::svg::{load_svg, AssetFetcher, SvgFetcher};
use crate::utils::config::RecolorConfig;
use eframe::{egui, App};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{info, warn};

/// Serialized icon handed to egui's image loaders, keyed by render revision.
struct RenderedIcon {
    revision: u64,
    uri: String,
}

pub struct SvgRecolorApp {
    controller: Controller,
    runtime: Runtime,
    fetcher: Arc<dyn SvgFetcher>,
    load_sender: std_mpsc::Sender<LoadOutcome>,
    load_receiver: std_mpsc::Receiver<LoadOutcome>,
    rendered: Option<RenderedIcon>,
}

impl SvgRecolorApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: RecolorConfig, runtime: Runtime) -> Self {
        info!("Initializing SVG recolor");
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let (load_sender, load_receiver) = std_mpsc::channel();
        let mut app = Self {
            controller: Controller::new(&config),
            runtime,
            fetcher: Arc::new(AssetFetcher::new(config.asset_root.clone())),
            load_sender,
            load_receiver,
            rendered: None,
        };

        let request = app.controller.start();
        app.spawn_load(request, &cc.egui_ctx);
        app
    }

    fn spawn_load(&self, request: LoadRequest, ctx: &egui::Context) {
        let fetcher = Arc::clone(&self.fetcher);
        let sender = self.load_sender.clone();
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let result = load_svg(fetcher.as_ref(), &request.path).await;
            let outcome = LoadOutcome {
                generation: request.generation,
                path: request.path,
                result,
            };
            if sender.send(outcome).is_err() {
                warn!("load finished after the window closed");
            }
            ctx.request_repaint();
        });
    }

    /// Routes one input event through the controller and starts any load it asks for.
    pub fn dispatch(&mut self, event: InputEvent, ctx: &egui::Context) {
        if let Some(request) = self.controller.handle_input(event) {
            self.spawn_load(request, ctx);
        }
    }

    pub fn open_file(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("SVG", &["svg"])
            .pick_file()
        else {
            return;
        };

        let label = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let index = self
            .controller
            .add_icon_option(label, path.to_string_lossy().to_string());
        self.dispatch(InputEvent::OptionClicked(index), ctx);
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        while let Ok(outcome) = self.load_receiver.try_recv() {
            self.controller.finish_load(outcome);
        }
        self.refresh_rendered(ctx);
    }

    /// Re-serializes the icon when the controller's revision moves, and
    /// evicts the previous rasterization from egui's cache.
    fn refresh_rendered(&mut self, ctx: &egui::Context) {
        let revision = self.controller.revision();
        if self.rendered.as_ref().is_some_and(|r| r.revision == revision) {
            return;
        }

        if let Some(old) = self.rendered.take() {
            ctx.forget_image(&old.uri);
        }

        let Some(svg) = self.controller.current_svg() else {
            return;
        };

        match svg.to_standalone_markup() {
            Ok(markup) => {
                let uri = format!("bytes://icon-{revision}.svg");
                ctx.include_bytes(uri.clone(), markup.into_bytes());
                self.rendered = Some(RenderedIcon { revision, uri });
            }
            Err(e) => warn!("failed to serialize svg for display: {e}"),
        }
    }
}

impl App for SvgRecolorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}

use super::state::{ColorControls, IconOption, MountContent, MountState};
use crate::svg::{apply_color, IconError, SvgDocument, SvgElement};
use crate::utils::color::{
    normalize_hex, CanonicalColor, HudReadout, DEFAULT_BACKGROUND, DEFAULT_FOREGROUND,
};
use crate::utils::config::RecolorConfig;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlId {
    ForegroundPicker,
    ForegroundHex,
    BackgroundPicker,
    BackgroundHex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Control { id: ControlId, value: String },
    OptionClicked(usize),
}

impl InputEvent {
    pub fn control(id: ControlId, value: impl Into<String>) -> Self {
        Self::Control {
            id,
            value: value.into(),
        }
    }
}

/// A load the host must run and hand back through [`Controller::finish_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u64,
    pub path: String,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub generation: u64,
    pub path: String,
    pub result: Result<SvgDocument, IconError>,
}

/// Owns the mount, both color control pairs, the HUD and the icon options.
#[derive(Debug)]
pub struct Controller {
    mount: MountState,
    foreground: ColorControls,
    background: ColorControls,
    hud: HudReadout,
    options: Vec<IconOption>,
    generation: u64,
    revision: u64,
}

impl Controller {
    pub fn new(config: &RecolorConfig) -> Self {
        let foreground = normalize_hex(&config.foreground).unwrap_or(DEFAULT_FOREGROUND);
        let background = normalize_hex(&config.background).unwrap_or(DEFAULT_BACKGROUND);

        let options = config
            .icon_entries()
            .into_iter()
            .map(|entry| IconOption {
                active: entry.path == config.default_icon,
                label: entry.label,
                path: entry.path,
            })
            .collect();

        Self {
            mount: MountState::new(config.default_icon.clone(), background),
            foreground: ColorControls::synced(foreground),
            background: ColorControls::synced(background),
            hud: HudReadout::default(),
            options,
            generation: 0,
            revision: 0,
        }
    }

    /// Kicks off the load of the mount's initial source.
    pub fn start(&mut self) -> LoadRequest {
        info!(
            foreground = %self.foreground.picker,
            background = %self.mount.background,
            "starting with icon {}",
            self.mount.data_src
        );
        let path = self.mount.data_src.clone();
        self.begin_load(path)
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Option<LoadRequest> {
        match event {
            InputEvent::Control { id, value } => {
                self.handle_control(id, value);
                None
            }
            InputEvent::OptionClicked(index) => self.select_option(index),
        }
    }

    /// Appends an option (e.g. a file picked from disk) and returns its index.
    pub fn add_icon_option(&mut self, label: String, path: String) -> usize {
        if let Some(index) = self.options.iter().position(|o| o.path == path) {
            return index;
        }
        self.options.push(IconOption {
            label,
            path,
            active: false,
        });
        self.options.len() - 1
    }

    /// Applies a finished load. Returns `false` when a newer load has
    /// superseded it and the outcome was dropped.
    pub fn finish_load(&mut self, outcome: LoadOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                path = %outcome.path,
                generation = outcome.generation,
                latest = self.generation,
                "dropping stale svg load"
            );
            return false;
        }

        match outcome.result {
            Ok(document) => {
                self.mount.content = MountContent::Svg(document);
                let color = normalize_hex(&self.foreground.picker).unwrap_or(DEFAULT_FOREGROUND);
                self.recolor(color);
            }
            Err(err) => {
                error!(path = %outcome.path, "failed to load svg: {err}");
                self.mount.content = MountContent::Error(format!("Error: {err}"));
            }
        }
        self.revision += 1;
        true
    }

    fn handle_control(&mut self, id: ControlId, value: String) {
        match id {
            ControlId::ForegroundPicker => {
                self.foreground.picker = value;
                if let Some(color) = normalize_hex(&self.foreground.picker) {
                    if self.mount.current_svg().is_some() {
                        self.foreground.text = color.to_string();
                        self.recolor(color);
                    }
                }
            }
            ControlId::ForegroundHex => {
                self.foreground.text = value;
                if let Some(color) = normalize_hex(&self.foreground.text) {
                    if self.mount.current_svg().is_some() {
                        self.foreground.picker = color.to_string();
                        self.recolor(color);
                    }
                }
            }
            ControlId::BackgroundPicker => {
                self.background.picker = value;
                if let Some(color) = normalize_hex(&self.background.picker) {
                    self.background.text = color.to_string();
                    self.mount.background = color;
                }
            }
            ControlId::BackgroundHex => {
                self.background.text = value;
                if let Some(color) = normalize_hex(&self.background.text) {
                    self.background.picker = color.to_string();
                    self.mount.background = color;
                }
            }
        }
    }

    fn select_option(&mut self, index: usize) -> Option<LoadRequest> {
        let Some(path) = self.options.get(index).map(|o| o.path.clone()) else {
            warn!(index, "ignoring click on unknown icon option");
            return None;
        };

        for option in self.options.iter_mut() {
            option.active = false;
        }
        self.options[index].active = true;

        Some(self.begin_load(path))
    }

    fn begin_load(&mut self, path: String) -> LoadRequest {
        self.generation += 1;
        self.revision += 1;
        self.mount.data_src = path.clone();
        self.mount.content = MountContent::Loading;

        debug!(generation = self.generation, "loading {path}");
        LoadRequest {
            generation: self.generation,
            path,
        }
    }

    fn recolor(&mut self, color: CanonicalColor) {
        if let Some(svg) = self.mount.current_svg_mut() {
            apply_color(svg, color, &mut self.hud);
            self.revision += 1;
        }
    }

    pub fn mount(&self) -> &MountState {
        &self.mount
    }

    pub fn foreground(&self) -> &ColorControls {
        &self.foreground
    }

    pub fn background(&self) -> &ColorControls {
        &self.background
    }

    pub fn hud(&self) -> &HudReadout {
        &self.hud
    }

    pub fn options(&self) -> &[IconOption] {
        &self.options
    }

    pub fn current_svg(&self) -> Option<&SvgElement> {
        self.mount.current_svg()
    }

    /// Bumped whenever the rendered SVG markup may have changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

use super::{ColorControls, ControlId, InputEvent, MountContent, SvgRecolorApp};
use crate::utils::color::{normalize_hex, CanonicalColor, ColorExt};
use eframe::egui::{self, Color32, RichText};

const ERROR_TEXT: Color32 = Color32::from_rgb(0x66, 0x66, 0x66);

impl SvgRecolorApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        let mut events = Vec::new();
        let mut open_requested = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(10.0);
            ui.vertical_centered(|ui| {
                ui.heading("SVG Recolor");
            });
            ui.add_space(10.0);

            ui.group(|ui| {
                ui.horizontal_wrapped(|ui| {
                    for (index, option) in self.controller.options().iter().enumerate() {
                        if ui.selectable_label(option.active, option.label.as_str()).clicked() {
                            events.push(InputEvent::OptionClicked(index));
                        }
                    }
                    if ui.button("📂 Open SVG...").clicked() {
                        open_requested = true;
                    }
                });
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                color_row(
                    ui,
                    "Color",
                    self.controller.foreground(),
                    (ControlId::ForegroundPicker, ControlId::ForegroundHex),
                    &mut events,
                );
                ui.add_space(20.0);
                color_row(
                    ui,
                    "Background",
                    self.controller.background(),
                    (ControlId::BackgroundPicker, ControlId::BackgroundHex),
                    &mut events,
                );
            });

            ui.add_space(8.0);
            let hud = self.controller.hud();
            ui.horizontal(|ui| {
                ui.label(RichText::new("HEX").weak());
                ui.monospace(hud.hex.as_str());
                ui.add_space(12.0);
                ui.label(RichText::new("RGB").weak());
                ui.monospace(hud.rgb.as_str());
            });

            ui.add_space(8.0);
            let mount = self.controller.mount();
            egui::Frame::none()
                .fill(Color32::from_canonical(mount.background))
                .inner_margin(16.0)
                .show(ui, |ui| {
                    let size = ui.available_size();
                    ui.set_min_size(size);
                    ui.centered_and_justified(|ui| match &mount.content {
                        MountContent::Empty => {}
                        MountContent::Loading => {
                            ui.label("Loading SVG...");
                        }
                        MountContent::Error(message) => {
                            ui.colored_label(ERROR_TEXT, message.as_str());
                        }
                        MountContent::Svg(_) => match &self.rendered {
                            Some(icon) => {
                                let side = size.x.min(size.y).max(16.0);
                                ui.add(
                                    egui::Image::new(icon.uri.as_str())
                                        .fit_to_exact_size(egui::vec2(side, side)),
                                );
                            }
                            None => {
                                ui.spinner();
                            }
                        },
                    });
                });
        });

        for event in events {
            self.dispatch(event, ctx);
        }
        if open_requested {
            self.open_file(ctx);
        }
    }
}

fn color_row(
    ui: &mut egui::Ui,
    label: &str,
    controls: &ColorControls,
    (picker_id, hex_id): (ControlId, ControlId),
    events: &mut Vec<InputEvent>,
) {
    ui.label(label);

    let mut rgb = normalize_hex(&controls.picker)
        .map(CanonicalColor::to_array)
        .unwrap_or_default();
    if ui.color_edit_button_srgb(&mut rgb).changed() {
        let [r, g, b] = rgb;
        let picked = Color32::from_rgb(r, g, b).to_canonical();
        events.push(InputEvent::control(picker_id, picked.to_string()));
    }

    let mut text = controls.text.clone();
    let response = ui.add(egui::TextEdit::singleline(&mut text).desired_width(80.0));
    if response.changed() {
        events.push(InputEvent::control(hex_id, text));
    }
}

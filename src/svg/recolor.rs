use super::document::SvgElement;
use crate::utils::color::{CanonicalColor, HudReadout};
use tracing::debug;

/// Class names with this prefix are assumed to have carried a fill color in
/// the stylesheet that was stripped on load.
const CLASS_FILL_PREFIX: &str = "cls-";

/// Rewrites the fill/stroke of every element under `svg` and refreshes the HUD.
pub fn apply_color(svg: &mut SvgElement, color: CanonicalColor, hud: &mut HudReadout) {
    let hex = color.to_string();
    let mut touched = 0usize;

    svg.visit_descendants_mut(&mut |el| {
        if recolor_element(el, &hex) {
            touched += 1;
        }
    });

    debug!(color = %hex, touched, "recolored svg");
    hud.show(color);
}

fn recolor_element(el: &mut SvgElement, hex: &str) -> bool {
    let mut changed = false;

    for key in ["fill", "stroke"] {
        if is_paint(el.attribute(key)) {
            el.set_attribute(key, hex);
            changed = true;
        }
    }

    if el.classes().any(|class| class.starts_with(CLASS_FILL_PREFIX)) {
        el.set_attribute("fill", hex);
        changed = true;
    }

    changed
}

fn is_paint(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty() && !v.eq_ignore_ascii_case("none"))
}

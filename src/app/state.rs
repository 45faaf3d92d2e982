use crate::svg::{SvgDocument, SvgElement};
use crate::utils::color::CanonicalColor;

#[derive(Debug, Clone, Default)]
pub enum MountContent {
    #[default]
    Empty,
    Loading,
    Svg(SvgDocument),
    Error(String),
}

/// The icon container: its source path, background and rendered content.
#[derive(Debug, Clone)]
pub struct MountState {
    pub data_src: String,
    pub background: CanonicalColor,
    pub content: MountContent,
}

impl MountState {
    pub fn new(data_src: String, background: CanonicalColor) -> Self {
        Self {
            data_src,
            background,
            content: MountContent::Empty,
        }
    }

    pub fn current_svg(&self) -> Option<&SvgElement> {
        match &self.content {
            MountContent::Svg(doc) => doc.root_svg(),
            _ => None,
        }
    }

    pub fn current_svg_mut(&mut self) -> Option<&mut SvgElement> {
        match &mut self.content {
            MountContent::Svg(doc) => doc.root_svg_mut(),
            _ => None,
        }
    }
}

/// A color picker and its hex text field. Values are whatever the control
/// currently shows, valid or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorControls {
    pub picker: String,
    pub text: String,
}

impl ColorControls {
    pub fn synced(color: CanonicalColor) -> Self {
        Self {
            picker: color.to_string(),
            text: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconOption {
    pub label: String,
    pub path: String,
    pub active: bool,
}

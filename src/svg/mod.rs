mod document;
mod error;
mod loader;
mod recolor;

pub use document::{SvgDocument, SvgElement};
pub use error::{IconError, LoadError, ParseError};
pub use loader::{load_svg, AssetFetcher, SvgFetcher};
pub use recolor::apply_color;

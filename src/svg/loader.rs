use super::document::{SvgDocument, SvgElement};
use super::error::{IconError, LoadError, ParseError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FALLBACK_DIMENSION: f64 = 100.0;

#[async_trait]
pub trait SvgFetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<String, LoadError>;
}

/// Fetches `http(s)://` paths over the network and everything else from the
/// asset directory on disk.
pub struct AssetFetcher {
    client: reqwest::Client,
    asset_root: PathBuf,
}

impl AssetFetcher {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            asset_root: asset_root.into(),
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<String, LoadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| LoadError::Body(e.to_string()))
    }

    async fn fetch_local(&self, path: &str) -> Result<String, LoadError> {
        let full_path = self.resolve(path);
        tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => LoadError::Status {
                    status: 404,
                    status_text: "Not Found".to_string(),
                },
                ErrorKind::PermissionDenied => LoadError::Status {
                    status: 403,
                    status_text: "Forbidden".to_string(),
                },
                ErrorKind::InvalidData => LoadError::Body(e.to_string()),
                _ => LoadError::Transport(format!("{}: {}", full_path.display(), e)),
            })
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_root.join(path)
        }
    }
}

#[async_trait]
impl SvgFetcher for AssetFetcher {
    async fn fetch(&self, path: &str) -> Result<String, LoadError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            self.fetch_remote(path).await
        } else {
            self.fetch_local(path).await
        }
    }
}

/// Fetches the icon at `path`, inlines it, and gets it ready for recoloring.
pub async fn load_svg(fetcher: &dyn SvgFetcher, path: &str) -> Result<SvgDocument, IconError> {
    if path.trim().is_empty() {
        return Err(LoadError::MissingSource.into());
    }

    debug!(path, "fetching svg");
    let markup = fetcher.fetch(path).await?;

    let mut document = SvgDocument::parse(&markup)?;
    prepare(&mut document)?;

    info!(path, bytes = markup.len(), "svg loaded");
    Ok(document)
}

/// Gives the root a `viewBox` if it lacks one and strips embedded styles,
/// which would otherwise win over the presentation attributes we rewrite.
pub fn prepare(document: &mut SvgDocument) -> Result<(), ParseError> {
    let svg = document.root_svg_mut().ok_or(ParseError::MissingSvgRoot)?;
    ensure_view_box(svg);
    svg.remove_descendants(&|el| el.local_name() == "style");
    Ok(())
}

fn ensure_view_box(svg: &mut SvgElement) {
    if svg.attribute("viewBox").is_some_and(|v| !v.is_empty()) {
        return;
    }

    let dimension = |key: &str| {
        svg.attribute(key)
            .and_then(parse_leading_float)
            .filter(|v| *v != 0.0)
            .unwrap_or(FALLBACK_DIMENSION)
    };
    let (width, height) = (dimension("width"), dimension("height"));

    svg.set_attribute("viewBox", format!("0 0 {} {}", width, height));
    svg.remove_attribute("width");
    svg.remove_attribute("height");
}

/// Reads the longest numeric prefix, so `"24px"` is 24.
fn parse_leading_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    end = digits_from(end);
    if bytes.get(end) == Some(&b'.') {
        end = digits_from(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

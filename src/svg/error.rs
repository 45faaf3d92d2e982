#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Missing source path for the SVG mount.")]
    MissingSource,

    #[error("Failed to load SVG: {status} {status_text}")]
    Status { status: u16, status_text: String },

    #[error("Failed to load SVG: {0}")]
    Transport(String),

    #[error("Failed to read SVG body: {0}")]
    Body(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No <svg> found in loaded file.")]
    MissingSvgRoot,

    #[error("Malformed SVG markup at byte {position}: {message}")]
    Malformed { position: usize, message: String },
}

/// Anything that can stop an icon from reaching the mount.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_carries_code_and_reason() {
        let err = IconError::from(LoadError::Status {
            status: 404,
            status_text: "Not Found".to_string(),
        });
        assert_eq!(err.to_string(), "Failed to load SVG: 404 Not Found");
    }

    #[test]
    fn missing_root_message() {
        let err = IconError::from(ParseError::MissingSvgRoot);
        assert_eq!(err.to_string(), "No <svg> found in loaded file.");
    }
}

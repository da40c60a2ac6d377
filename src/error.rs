use std::path::PathBuf;

/// Errors raised while loading, converting or saving images.
#[derive(Debug)]
pub enum Error {
    /// The input is missing, unreadable, or not a supported image encoding.
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    /// The output file could not be created or flushed.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The image encoder rejected the bitmap.
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
    /// Invalid conversion parameters.
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Decode { path, .. } => {
                write!(f, "failed to decode image {}", path.display())
            }
            Error::Write { path, .. } => {
                write!(f, "failed to write {}", path.display())
            }
            Error::Encode { path, .. } => {
                write!(f, "failed to encode image {}", path.display())
            }
            Error::Config(msg) => write!(f, "invalid parameters: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode { source, .. } | Error::Encode { source, .. } => Some(source),
            Error::Write { source, .. } => Some(source),
            Error::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_names_the_path() {
        let err = Error::Write {
            path: PathBuf::from("out/fixture.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write out/fixture.png");
        assert!(err.source().is_some());
    }

    #[test]
    fn config_error_has_no_source() {
        let err = Error::Config("gamma must be > 0".to_string());
        assert_eq!(err.to_string(), "invalid parameters: gamma must be > 0");
        assert!(err.source().is_none());
    }
}

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::texture::TextureKind;

/// Top-level error for the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Setup(#[from] SetupError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("resolution {u_steps}x{v_steps} is outside 1..={max}", max = crate::math::MAX_STEPS)]
    InvalidResolution { u_steps: u32, v_steps: u32 },
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("could not load {kind} texture from {path}")]
    Decode {
        kind: TextureKind,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture loader thread is not running")]
    LoaderGone,
}

/// Failures while acquiring the window surface and graphics device.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("event loop failed")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("could not create window")]
    Window(#[from] winit::error::OsError),

    #[error("could not create rendering surface")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter found")]
    NoAdapter,

    #[error("could not acquire graphics device")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("shader validation failed: {0}")]
    Shader(String),
}

/// Formats an error followed by each of its causes, separated by `: `.
/// Wrappers that repeat their cause's message verbatim are collapsed.
pub fn report(err: &dyn StdError) -> String {
    let mut last = err.to_string();
    let mut out = last.clone();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if text != last {
            out.push_str(": ");
            out.push_str(&text);
        }
        last = text;
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_each_cause_once() {
        let source = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing file",
        ));
        let err = TextureError::Decode {
            kind: TextureKind::Normal,
            path: PathBuf::from("maps/normal.png"),
            source,
        };

        let text = report(&err);
        assert!(text.starts_with("could not load normal texture from maps/normal.png: "));
        assert_eq!(text.matches("missing file").count(), 1);
    }

    #[test]
    fn report_without_source_is_display() {
        let err = SetupError::NoAdapter;
        assert_eq!(report(&err), err.to_string());
    }

    #[test]
    fn config_read_error_names_path_and_cause() {
        let err = ConfigError::Read {
            path: PathBuf::from("ripple3d.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "could not read config ripple3d.json");
        assert_eq!(report(&err), "could not read config ripple3d.json: denied");
    }
}

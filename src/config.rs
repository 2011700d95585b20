use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::math::{MAX_STEPS, RippleSurface};
use crate::texture::TextureKind;

pub const CONFIG_ENV: &str = "RIPPLE3D_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "ripple3d.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub amplitude: f64,
    pub harmonic: f64,
    pub wave_radius: f64,
    pub max_radius: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        let surface = RippleSurface::default();
        Self {
            amplitude: surface.amplitude,
            harmonic: surface.harmonic,
            wave_radius: surface.wave_radius,
            max_radius: surface.max_radius,
        }
    }
}

impl From<&SurfaceConfig> for RippleSurface {
    fn from(config: &SurfaceConfig) -> Self {
        Self {
            amplitude: config.amplitude,
            harmonic: config.harmonic,
            wave_radius: config.wave_radius,
            max_radius: config.max_radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub circle_count: u32,
    pub segments_count: u32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            circle_count: 20,
            segments_count: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub u: f32,
    pub v: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self { u: 45.0, v: 60.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub angle: f32,
    pub zoom: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            angle: 0.0,
            zoom: -10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub diffuse: PathBuf,
    pub normal: PathBuf,
    pub specular: PathBuf,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            diffuse: PathBuf::from("textures/diffuse.jpg"),
            normal: PathBuf::from("textures/normal.jpg"),
            specular: PathBuf::from("textures/specular.jpg"),
        }
    }
}

impl TextureConfig {
    pub fn path(&self, kind: TextureKind) -> &Path {
        match kind {
            TextureKind::Diffuse => &self.diffuse,
            TextureKind::Normal => &self.normal,
            TextureKind::Specular => &self.specular,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub surface: SurfaceConfig,
    pub mesh: MeshConfig,
    pub light: LightConfig,
    pub view: ViewConfig,
    pub textures: TextureConfig,
    pub window: WindowConfig,
}

impl AppConfig {
    /// Reads the file named by `RIPPLE3D_CONFIG`, else `ripple3d.json` if it
    /// exists, else falls back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            }
        };

        match path {
            Some(path) => Self::from_file(&path),
            None => {
                info!("no config file found, using defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let steps = [
            ("mesh.circle_count", self.mesh.circle_count),
            ("mesh.segments_count", self.mesh.segments_count),
        ];
        for (field, value) in steps {
            if value == 0 || value > MAX_STEPS {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is outside 1..={MAX_STEPS}"),
                });
            }
        }

        let positive = [
            ("surface.wave_radius", self.surface.wave_radius),
            ("surface.max_radius", self.surface.max_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} must be a positive number"),
                });
            }
        }

        let finite = [
            ("surface.amplitude", self.surface.amplitude),
            ("surface.harmonic", self.surface.harmonic),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} must be finite"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = AppConfig::from_json(r#"{ "mesh": { "circle_count": 8 }, "light": { "v": 10 } }"#)
            .unwrap();
        assert_eq!(config.mesh.circle_count, 8);
        assert_eq!(config.mesh.segments_count, MeshConfig::default().segments_count);
        assert_eq!(config.light.v, 10.0);
        assert_eq!(config.light.u, LightConfig::default().u);
        assert_eq!(config.surface, SurfaceConfig::default());
    }

    #[test]
    fn zero_steps_are_rejected() {
        let mut config = AppConfig::default();
        config.mesh.segments_count = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "mesh.segments_count", .. }));
    }

    #[test]
    fn oversized_steps_are_rejected() {
        let mut config = AppConfig::default();
        config.mesh.circle_count = MAX_STEPS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let mut config = AppConfig::default();
        config.surface.wave_radius = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "surface.wave_radius", .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::from_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("exist.json"));
    }

    #[test]
    fn texture_paths_by_kind() {
        let textures = TextureConfig::default();
        assert_eq!(textures.path(TextureKind::Normal), Path::new("textures/normal.jpg"));
        assert_eq!(textures.path(TextureKind::Specular), Path::new("textures/specular.jpg"));
    }

    #[test]
    fn surface_section_maps_onto_shape() {
        let config = SurfaceConfig {
            amplitude: 0.2,
            harmonic: 3.0,
            wave_radius: 0.5,
            max_radius: 2.0,
        };
        let surface = RippleSurface::from(&config);
        assert_eq!(surface.harmonic, 3.0);
        assert_eq!(surface.max_radius, 2.0);
    }
}

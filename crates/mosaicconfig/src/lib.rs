use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionSetting {
    Orthographic,
    Perspective,
}

impl Default for ProjectionSetting {
    fn default() -> Self {
        Self::Orthographic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSetting {
    Low,
    High,
}

impl Default for PowerSetting {
    fn default() -> Self {
        Self::High
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MosaicConfig {
    pub version: u32,
    #[serde(default)]
    pub layout: LayoutSection,
    #[serde(default)]
    pub viewport: ViewportSection,
    #[serde(default)]
    pub view: ViewSection,
    #[serde(default)]
    pub gpu: GpuSection,
    #[serde(default)]
    pub photos: Vec<PhotoEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayoutSection {
    #[serde(default = "default_columns")]
    pub columns: usize,
    /// Gap between photos in pixels.
    #[serde(default = "default_gap")]
    pub gap: f32,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            gap: default_gap(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ViewportSection {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportSection {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewSection {
    #[serde(default)]
    pub offset: [f32; 3],
    /// Euler angles in degrees.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    #[serde(default, deserialize_with = "deserialize_projection")]
    pub projection: ProjectionSetting,
    /// Vertical field of view in degrees, perspective only.
    #[serde(default)]
    pub fov: Option<f32>,
}

impl Default for ViewSection {
    fn default() -> Self {
        Self {
            offset: [0.0; 3],
            rotation: [0.0; 3],
            scale: default_scale(),
            projection: ProjectionSetting::default(),
            fov: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GpuSection {
    #[serde(default)]
    pub power: PowerSetting,
    #[serde(default = "default_mipmaps")]
    pub mipmaps: bool,
}

impl Default for GpuSection {
    fn default() -> Self {
        Self {
            power: PowerSetting::default(),
            mipmaps: default_mipmaps(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhotoEntry {
    pub path: PathBuf,
}

fn default_columns() -> usize {
    4
}

fn default_gap() -> f32 {
    12.0
}

fn default_scale() -> [f32; 3] {
    [1.0; 3]
}

fn default_mipmaps() -> bool {
    true
}

fn deserialize_projection<'de, D>(deserializer: D) -> Result<ProjectionSetting, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_projection(&raw).map_err(de::Error::custom)
}

fn parse_projection(raw: &str) -> Result<ProjectionSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "orthographic" | "ortho" | "flat" => Ok(ProjectionSetting::Orthographic),
        "perspective" | "persp" => Ok(ProjectionSetting::Perspective),
        other => Err(format!("invalid projection '{other}'")),
    }
}

impl MosaicConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: MosaicConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads and validates `path`; relative photo paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&input)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for photo in &mut self.photos {
            if photo.path.is_relative() {
                photo.path = base.join(&photo.path);
            }
        }
    }

    pub fn photo_paths(&self) -> Vec<PathBuf> {
        self.photos.iter().map(|photo| photo.path.clone()).collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.layout.columns == 0 {
            return Err(ConfigError::Invalid(
                "layout.columns must be at least 1".into(),
            ));
        }

        if !self.layout.gap.is_finite() || self.layout.gap < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "layout.gap must be a non-negative number of pixels, got {}",
                self.layout.gap
            )));
        }

        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must have a non-zero size, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }

        if !self.photos.is_empty() && self.photos.len() < self.layout.columns {
            return Err(ConfigError::Invalid(format!(
                "{} columns need at least {} photos, config lists {}",
                self.layout.columns,
                self.layout.columns,
                self.photos.len()
            )));
        }

        for (index, photo) in self.photos.iter().enumerate() {
            if photo.path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "photo #{index} has an empty path"
                )));
            }
        }

        if self
            .view
            .scale
            .iter()
            .any(|component| !component.is_finite() || *component == 0.0)
        {
            return Err(ConfigError::Invalid(
                "view.scale components must be finite and non-zero".into(),
            ));
        }

        if let Some(fov) = self.view.fov {
            if !(fov > 0.0 && fov < 180.0) {
                return Err(ConfigError::Invalid(format!(
                    "view.fov must be between 0 and 180 degrees, got {fov}"
                )));
            }
        }

        Ok(())
    }
}

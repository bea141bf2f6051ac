use std::path::PathBuf;

use anyhow::{Context, Result};
use mosaic::{MosaicParams, Projection, ViewTransform, Viewport};
use mosaicconfig::{MosaicConfig, PowerSetting, ProjectionSetting, ViewSection};
use renderer::{GpuPowerPreference, RendererConfig};

use crate::cli::BatchArgs;

/// Everything one invocation needs, merged from the config file and flags.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub photos: Vec<PathBuf>,
    pub params: MosaicParams,
    pub viewport: Viewport,
    pub view: ViewTransform,
    pub renderer: RendererConfig,
}

impl RunSettings {
    pub fn resolve(args: &BatchArgs) -> Result<Self> {
        let config = match args.config.as_deref() {
            Some(path) => Some(
                MosaicConfig::load(path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
            ),
            None => None,
        };
        Self::merge(config.as_ref(), args)
    }

    fn merge(config: Option<&MosaicConfig>, args: &BatchArgs) -> Result<Self> {
        let mut params = MosaicParams::default();
        let mut viewport = Viewport::new(1920, 1080);
        let mut section = ViewSection::default();
        let mut renderer = RendererConfig::default();
        let mut photos = Vec::new();

        if let Some(config) = config {
            params.columns = config.layout.columns;
            params.gap_px = config.layout.gap;
            viewport = Viewport::new(config.viewport.width, config.viewport.height);
            section = config.view.clone();
            renderer.power = match config.gpu.power {
                PowerSetting::Low => GpuPowerPreference::Low,
                PowerSetting::High => GpuPowerPreference::High,
            };
            renderer.mipmaps = config.gpu.mipmaps;
            photos = config.photo_paths();
        }

        if !args.photos.is_empty() {
            photos = args.photos.clone();
        }
        if let Some(columns) = args.columns {
            params.columns = columns;
        }
        if let Some(gap) = args.gap {
            params.gap_px = gap;
        }
        if let Some(size) = args.size.as_deref() {
            let (width, height) = parse_surface_size(size)?;
            viewport = Viewport::new(width, height);
        }

        if photos.is_empty() {
            anyhow::bail!("no photos given; pass image paths or --config");
        }

        Ok(Self {
            photos,
            params,
            viewport,
            view: view_from_section(&section, viewport),
            renderer,
        })
    }
}

/// Converts the degree-based config view into the radians the transform expects.
pub fn view_from_section(section: &ViewSection, viewport: Viewport) -> ViewTransform {
    let projection = match section.projection {
        ProjectionSetting::Orthographic => Projection::Orthographic,
        ProjectionSetting::Perspective => match section.fov {
            Some(degrees) => Projection::perspective_with_fov(degrees.to_radians(), viewport.aspect()),
            None => Projection::perspective(viewport.aspect()),
        },
    };
    ViewTransform {
        offset: section.offset,
        rotation: section.rotation.map(f32::to_radians),
        scale: section.scale,
        projection,
    }
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32)> {
    let (width, height) = spec
        .trim()
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| anyhow::anyhow!("expected WxH format, e.g. 1920x1080"))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid width in size specification"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid height in size specification"))?;

    if width == 0 || height == 0 {
        anyhow::bail!("viewport dimensions must be greater than zero");
    }

    Ok((width, height))
}

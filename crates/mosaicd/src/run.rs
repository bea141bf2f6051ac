use anyhow::{Context, Result};
use mosaic::Mosaic;
use renderer::{probe_photos, GpuContext, GpuMosaic, GpuPowerPreference, PhotoBatch};
use tracing_subscriber::EnvFilter;

use crate::bootstrap::RunSettings;
use crate::cli::{Cli, Command, LayoutArgs, UploadArgs};
use crate::report::{column_summary, LayoutReport};

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    match cli.command {
        Command::Layout(args) => run_layout(args),
        Command::Upload(args) => run_upload(args),
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_layout(args: LayoutArgs) -> Result<()> {
    let settings = RunSettings::resolve(&args.batch)?;
    tracing::info!(
        photos = settings.photos.len(),
        columns = settings.params.columns,
        width = settings.viewport.width,
        height = settings.viewport.height,
        "computing mosaic layout"
    );

    let photos = probe_photos(&settings.photos)?;
    let mosaic = Mosaic::new(photos, settings.params, settings.viewport)
        .context("failed to lay out photo batch")?;

    if args.json {
        let report = LayoutReport::from_mosaic(&mosaic);
        let json = serde_json::to_string_pretty(&report).context("failed to encode layout")?;
        println!("{json}");
    } else {
        print!("{}", column_summary(&mosaic));
        println!(
            "{} cells, {} vertex bytes, {} index bytes",
            mosaic.buffers().len(),
            mosaic.buffers().vertex_bytes().len(),
            mosaic.buffers().index_bytes().len()
        );
    }
    Ok(())
}

fn run_upload(args: UploadArgs) -> Result<()> {
    let mut settings = RunSettings::resolve(&args.batch)?;
    if args.no_mipmaps {
        settings.renderer.mipmaps = false;
    }
    if args.low_power {
        settings.renderer.power = GpuPowerPreference::Low;
    }

    let batch = PhotoBatch::load(&settings.photos)?;
    let context = GpuContext::new(&settings.renderer)?;
    let gpu = GpuMosaic::new(
        context,
        &settings.renderer,
        &batch,
        settings.params,
        settings.viewport,
        settings.view,
    )?;

    let summary = gpu.summary();
    let instances = gpu.instances();
    tracing::info!(
        adapter = %summary.adapter,
        photos = summary.photos,
        cells = summary.cells,
        instances = instances.len(),
        mip_levels = summary.mip_levels.iter().sum::<u32>(),
        vertex_bytes = summary.vertex_bytes,
        index_bytes = summary.index_bytes,
        "upload complete"
    );
    println!(
        "uploaded {} photos ({} cells) to {}",
        summary.photos, summary.cells, summary.adapter
    );
    Ok(())
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "mosaicd",
    author,
    version,
    about = "Waterfall photo mosaic layout and GPU upload"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read image headers, lay the batch out and print the emitted slots.
    Layout(LayoutArgs),
    /// Decode the batch, upload textures with mip chains and the mosaic buffers.
    Upload(UploadArgs),
}

/// Where the photo batch and layout settings come from.
#[derive(Args, Debug, Default)]
pub struct BatchArgs {
    /// Mosaic TOML file; command-line flags override its values.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Image files, in batch order. Replaces the photos listed in `--config`.
    #[arg(value_name = "PHOTO")]
    pub photos: Vec<PathBuf>,

    /// Number of columns.
    #[arg(long, value_name = "N")]
    pub columns: Option<usize>,

    /// Gap between photos in pixels.
    #[arg(long, value_name = "PIXELS")]
    pub gap: Option<f32>,

    /// Viewport to lay out for (e.g. `1920x1080`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Print the layout as JSON instead of a per-column summary.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Upload base levels only.
    #[arg(long)]
    pub no_mipmaps: bool,

    /// Prefer a low-power adapter.
    #[arg(long)]
    pub low_power: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn layout_accepts_positional_photos() {
        let cli = Cli::try_parse_from([
            "mosaicd", "layout", "a.png", "b.png", "--columns", "2", "--size", "800x600", "--json",
        ])
        .unwrap();
        let Command::Layout(args) = cli.command else {
            panic!("expected layout subcommand");
        };
        assert_eq!(args.batch.photos.len(), 2);
        assert_eq!(args.batch.columns, Some(2));
        assert_eq!(args.batch.size.as_deref(), Some("800x600"));
        assert!(args.json);
    }

    #[test]
    fn upload_flags_parse() {
        let cli = Cli::try_parse_from(["mosaicd", "upload", "--config", "m.toml", "--no-mipmaps"])
            .unwrap();
        let Command::Upload(args) = cli.command else {
            panic!("expected upload subcommand");
        };
        assert_eq!(args.batch.config, Some(PathBuf::from("m.toml")));
        assert!(args.no_mipmaps);
        assert!(!args.low_power);
    }
}

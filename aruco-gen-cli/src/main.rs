use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use aruco::codec::{Codec, HammingCodec};
use aruco::config::MarkerConfig;
use aruco_gen::board::{Board, BoardGenerator, BoardSpec};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod render_pdf;
mod render_png;

/// ArUco marker and board rendering CLI
#[derive(Parser)]
#[command(name = "aruco-gen", version)]
struct Cli {
    /// Marker family description (.toml); defaults to ArUco 10-bit
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the marker family: grid, codewords and id range
    Info,
    /// Render individual markers as PNG or PDF
    Render {
        /// Marker IDs to render (e.g. "0", "0-9", "0,3,5")
        #[arg(long, default_value = "0")]
        ids: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Png)]
        format: Format,
        /// Exact side length in pixels; overrides --scale and --quiet
        #[arg(long)]
        size: Option<u32>,
        /// Pixels per marker cell
        #[arg(long, default_value = "10")]
        scale: u32,
        /// White quiet zone around the marker, in cells
        #[arg(long, default_value = "1")]
        quiet: u32,
        /// Print the "#id" label under each marker (PDF output only)
        #[arg(long)]
        label: bool,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Render a board of random markers and its layout
    Board {
        #[arg(long, value_enum, default_value_t = BoardKind::Grid)]
        kind: BoardKind,
        /// Markers per row
        #[arg(long, default_value = "5")]
        width: u32,
        /// Markers per column
        #[arg(long, default_value = "4")]
        height: u32,
        /// Marker side in pixels
        #[arg(long, default_value = "140")]
        marker_size: u32,
        /// Gap between markers in pixels (ignored by chessboards)
        #[arg(long, default_value = "28")]
        distance: u32,
        /// IDs that must not be used (e.g. "0-9,42")
        #[arg(long)]
        exclude: Option<String>,
        /// Seed for the id selection; random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Report corners relative to the board center (grids are always centered)
        #[arg(long)]
        centered: bool,
        /// Output image path
        #[arg(short, long, default_value = "board.png")]
        output: PathBuf,
        /// Layout JSON path; defaults to the image path with a .json extension
        #[arg(long)]
        layout: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Png,
    Pdf,
}

#[derive(Clone, Copy, ValueEnum)]
enum BoardKind {
    Grid,
    Chessboard,
    Frame,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let codec = HammingCodec::new(&config)
        .with_context(|| format!("invalid marker family '{}'", config.name))?;

    match cli.command {
        Command::Info => cmd_info(&config, &codec),
        Command::Render {
            ids,
            format,
            size,
            scale,
            quiet,
            label,
            output,
        } => cmd_render(
            &config, &codec, &ids, format, size, scale, quiet, label, &output,
        ),
        Command::Board {
            kind,
            width,
            height,
            marker_size,
            distance,
            exclude,
            seed,
            centered,
            output,
            layout,
        } => {
            let excluded = match exclude {
                Some(spec) => parse_ids(&spec, codec.id_count())?,
                None => Vec::new(),
            };
            let spec = BoardSpec {
                grid_width: width,
                grid_height: height,
                marker_size,
                marker_distance: distance,
                excluded,
            };
            cmd_board(&config, &codec, kind, &spec, seed, centered, &output, layout)
        }
    }
}

/// Load a family from a TOML file, or the built-in ArUco family.
fn load_config(path: Option<&Path>) -> Result<MarkerConfig> {
    let Some(path) = path else {
        return Ok(MarkerConfig::default());
    };
    let toml_str =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    MarkerConfig::from_toml_str(&toml_str)
        .with_context(|| format!("parsing marker family from {}", path.display()))
}

/// Parse an ID list like "0", "0-9", "0,3,5", "0-4,7,10-12".
fn parse_ids(spec: &str, id_count: u32) -> Result<Vec<i32>> {
    let max_id = id_count as i32 - 1;
    let mut ids = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if let Some((start, end)) = part.split_once('-') {
            let start: i32 = start.trim().parse().context("invalid ID range start")?;
            let end: i32 = end.trim().parse().context("invalid ID range end")?;
            anyhow::ensure!(start <= end, "empty ID range {}-{}", start, end);
            anyhow::ensure!(end <= max_id, "ID {} exceeds max {}", end, max_id);
            ids.extend(start..=end);
        } else {
            let id: i32 = part.parse().context("invalid ID")?;
            anyhow::ensure!(id <= max_id, "ID {} exceeds max {}", id, max_id);
            ids.push(id);
        }
    }
    Ok(ids)
}

fn cmd_info(config: &MarkerConfig, codec: &HammingCodec) -> Result<()> {
    let book = codec.codebook();
    println!("Family:        {}", config.name);
    println!("Data grid:     {0}x{0}", config.grid_size);
    println!("Border cells:  {}", config.border_cells);
    println!("Marker cells:  {0}x{0}", config.total_cells());
    println!("IDs:           0-{}", codec.id_count() - 1);
    println!("Min distance:  {}", book.min_distance());
    println!("Decode cols:   {:?}", book.decode_columns());
    println!();
    println!("Codewords:");
    for (i, &w) in book.words().iter().enumerate() {
        println!("  {i}: {w:0width$b}", width = book.word_bits());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_render(
    config: &MarkerConfig,
    codec: &HammingCodec,
    id_spec: &str,
    format: Format,
    size: Option<u32>,
    scale: u32,
    quiet: u32,
    label: bool,
    output_dir: &Path,
) -> Result<()> {
    anyhow::ensure!(
        !label || matches!(format, Format::Pdf),
        "--label is only supported with --format pdf"
    );
    let ids = parse_ids(id_spec, codec.id_count())?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory '{}'", output_dir.display()))?;

    for &id in &ids {
        let marker = aruco_gen::render::render(codec, id, config.border_cells)?;
        let ext = match format {
            Format::Png => "png",
            Format::Pdf => "pdf",
        };
        let path = output_dir.join(format!("{}_{:04}.{}", config.name, id, ext));

        match format {
            Format::Png => {
                let img = match size {
                    Some(px) => marker.to_image(px),
                    None => marker.to_scaled_image(scale, quiet),
                };
                render_png::write_image_png(&img, &path)?;
            }
            Format::Pdf => render_pdf::write_marker_pdf(&marker, quiet as usize, label, &path)?,
        }
        println!("wrote {}", path.display());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_board(
    config: &MarkerConfig,
    codec: &HammingCodec,
    kind: BoardKind,
    spec: &BoardSpec,
    seed: Option<u64>,
    centered: bool,
    output: &Path,
    layout: Option<PathBuf>,
) -> Result<()> {
    // random seed when none is given; logged for reruns
    let seed = seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "selecting marker ids");
    let mut rng = StdRng::seed_from_u64(seed);
    let gen = BoardGenerator::new(codec, config.border_cells);
    let board: Board = match kind {
        BoardKind::Grid => gen.grid(spec, &mut rng)?,
        BoardKind::Chessboard => gen.chessboard(spec, centered, &mut rng)?,
        BoardKind::Frame => gen.frame(spec, centered, &mut rng)?,
    };

    render_png::write_image_png(&board.image, output)?;
    println!("wrote {}", output.display());

    let layout_path = layout.unwrap_or_else(|| output.with_extension("json"));
    let json = serde_json::to_string_pretty(&board.config)?;
    std::fs::write(&layout_path, json)
        .with_context(|| format!("writing {}", layout_path.display()))?;
    println!(
        "wrote {} ({} markers)",
        layout_path.display(),
        board.config.markers.len()
    );
    Ok(())
}

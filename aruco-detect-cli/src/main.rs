use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use aruco::analyzer::{Detection, PatchAnalyzer};
use aruco::config::MarkerConfig;
use aruco::error::MarkerError;
use aruco::image::ImageU8;
use aruco::threshold;

/// ArUco patch reader: identify the marker filling each PNG/JPEG image
#[derive(Parser)]
#[command(name = "aruco-detect", version)]
struct Args {
    /// Input images, each a square crop of one candidate marker
    #[arg(required = true)]
    images: Vec<String>,

    /// Marker family description (.toml); defaults to ArUco 10-bit
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treat inputs as already binarized (non-zero = foreground)
    #[arg(long)]
    binary: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Suppress non-JSON output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Serialize, PartialEq)]
struct OutputResult {
    file: String,
    image_width: u32,
    image_height: u32,
    detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rotations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl OutputResult {
    fn new(file: &str, img: &ImageU8, result: Result<Detection, String>) -> Self {
        let (detected, id, rotations, reason) = match result {
            Ok(det) => (true, Some(det.id), Some(det.rotations), None),
            Err(reason) => (false, None, None, Some(reason)),
        };
        OutputResult {
            file: file.to_string(),
            image_width: img.width,
            image_height: img.height,
            detected,
            id,
            rotations,
            reason,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<MarkerConfig> {
    let Some(path) = path else {
        return Ok(MarkerConfig::default());
    };
    let toml_str =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    MarkerConfig::from_toml_str(&toml_str)
        .with_context(|| format!("parsing marker family from {}", path.display()))
}

fn load_image(path: &str) -> Result<ImageU8> {
    let img = image::open(path)
        .with_context(|| format!("failed to open image: {path}"))?
        .into_luma8();

    let width = img.width();
    let height = img.height();
    let pixels = img.into_raw();

    Ok(ImageU8::from_buf(width, height, width, pixels))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let analyzer = PatchAnalyzer::from_config(&config)
        .with_context(|| format!("invalid marker family '{}'", config.name))?;

    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let img = load_image(path)?;
        if !args.quiet {
            eprintln!("loaded {} ({}x{})", path, img.width, img.height);
        }
        images.push(img);
    }

    // only square images are patches; the rest are reported without analysis
    let patches: Vec<ImageU8> = images
        .iter()
        .filter(|img| img.is_square())
        .map(|img| {
            if args.binary {
                img.clone()
            } else {
                threshold::binarize_otsu(img)
            }
        })
        .collect();
    let mut analyzed = analyzer.analyze_all(&patches).into_iter();

    let mut found = 0;
    for (path, img) in args.images.iter().zip(&images) {
        let result = if img.is_square() {
            match analyzed.next() {
                Some(r) => r.map_err(|e: MarkerError| e.to_string()),
                None => anyhow::bail!("missing analysis result for {path}"),
            }
        } else {
            Err(format!("patch is not square ({}x{})", img.width, img.height))
        };
        match &result {
            Ok(det) => {
                found += 1;
                tracing::debug!(
                    file = %path,
                    id = det.id,
                    rotations = det.rotations,
                    "marker identified"
                );
            }
            Err(reason) => tracing::debug!(file = %path, %reason, "patch rejected"),
        }

        let output = OutputResult::new(path, img, result);
        let json = if args.pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        println!("{json}");
    }

    if !args.quiet {
        eprintln!("identified {found} of {} images", args.images.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_for_detection() {
        let img = ImageU8::new(70, 70);
        let out = OutputResult::new(
            "a.png",
            &img,
            Ok(Detection {
                id: 110,
                rotations: 2,
            }),
        );
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(
            json,
            r#"{"file":"a.png","image_width":70,"image_height":70,"detected":true,"id":110,"rotations":2}"#
        );
    }

    #[test]
    fn output_for_rejection() {
        let img = ImageU8::new(35, 35);
        let out = OutputResult::new("b.png", &img, Err(MarkerError::NotAMarker.to_string()));
        assert!(!out.detected);
        assert_eq!(out.id, None);
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains(r#""reason":"#));
        assert!(!json.contains("rotations"));
    }
}

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use shapedetect::io::load_pixel_buffer;
use shapedetect::{DebugConfig, DetectionParams, DetectionPipeline, DetectionResult};

#[derive(Parser)]
#[command(name = "shapedetect")]
#[command(about = "Detect circles, squares, rectangles, triangles, pentagons and stars in images")]
struct Cli {
    /// Paths to input image files
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Increase log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Load detection parameters from a JSON file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn debug_dir_name(index: usize, path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{:02}_{}", index + 1, stem)
}

fn process_image(
    pipeline: &DetectionPipeline,
    path: &Path,
    debug_dir: Option<PathBuf>,
) -> anyhow::Result<DetectionResult> {
    let buffer = load_pixel_buffer(path)?;
    log::info!("Image loaded: {} ({}x{})", path.display(), buffer.width(), buffer.height());

    let debug = debug_dir.map(DebugConfig::prepare).transpose()?;
    pipeline.run_with_debug(&buffer, debug.as_ref())
}

fn print_result(path: &Path, result: &DetectionResult) {
    println!("\n=== {} ===", path.display());
    println!(
        "Image: {}x{}, processed in {:.2} ms",
        result.image_width, result.image_height, result.processing_time_ms
    );
    println!("Total shapes detected: {}", result.shapes.len());

    for (i, shape) in result.shapes.iter().enumerate() {
        let b = shape.bounding_box;
        println!(
            "  {}: {} (confidence: {:.2}) at ({:.1}, {:.1}) bbox {}x{}+{}+{} area {}",
            i + 1,
            shape.kind,
            shape.confidence,
            shape.center.x,
            shape.center.y,
            b.width,
            b.height,
            b.x,
            b.y,
            shape.area
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let params = match &args.config {
        Some(path) => DetectionParams::from_json_file(path)?,
        None => DetectionParams::default(),
    };

    let pipeline = Arc::new(
        DetectionPipeline::new()
            .with_params(params)?
            .with_verbose(args.verbose > 0),
    );

    let debug_root = args.debug_out.clone().map(DebugConfig::prepare).transpose()?;

    // Each image gets its own blocking task; the pipeline itself is shared read-only.
    let mut handles = Vec::with_capacity(args.images.len());
    for (index, path) in args.images.iter().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        let path = path.clone();
        let debug_dir = debug_root
            .as_ref()
            .map(|root| root.output_dir.join(debug_dir_name(index, &path)));
        handles.push(tokio::task::spawn_blocking(move || {
            process_image(&pipeline, &path, debug_dir)
        }));
    }

    let mut failures = 0;
    let mut json_results = Vec::new();
    for (path, handle) in args.images.iter().zip(handles) {
        let outcome = handle
            .await
            .with_context(|| format!("Worker for {} panicked", path.display()))?;

        match outcome {
            Ok(result) if args.json => json_results.push(serde_json::json!({
                "image": path.display().to_string(),
                "result": result,
            })),
            Ok(result) => print_result(path, &result),
            Err(e) => {
                eprintln!("Error processing {}: {:#}", path.display(), e);
                failures += 1;
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    if failures > 0 {
        anyhow::bail!("{} of {} images failed", failures, args.images.len());
    }

    Ok(())
}

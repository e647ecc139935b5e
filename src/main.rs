//! Rasterflow CLI - raster filtering from the command line.

use anyhow::{anyhow, bail, Context, Result};
use rasterflow::io::{codec, pgm};
use rasterflow::prelude::*;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("rasterflow");

    if args.len() < 2 {
        print_usage(program);
        return;
    }

    let result = match args[1].as_str() {
        "list" => {
            list_filters();
            Ok(())
        }
        "info" => match args.get(2) {
            Some(path) => image_info(Path::new(path)),
            None => Err(anyhow!("please specify an image path")),
        },
        "process" => {
            if args.len() < 4 {
                eprintln!("Error: Please specify input and output paths");
                print_usage(program);
                std::process::exit(2);
            }
            process_image(&args[2..])
        }
        "demo" => {
            let dir = args.get(2).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
            run_demo(&dir)
        }
        "help" | "--help" | "-h" => {
            print_usage(program);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage(program);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    println!("Rasterflow v{}", rasterflow::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  list                          List all available filters");
    println!("  info <image>                  Show dimensions and statistics of an image");
    println!("  process <in> <out> [options]  Filter an image");
    println!("  demo [dir]                    Render the demo images into a directory");
    println!("  help                          Show this help message");
    println!();
    println!("Process options (applied in the order given):");
    println!("  --blur <sigma>[:<size>]   Gaussian blur (default size: {})", GaussianBlur::DEFAULT_KERNEL_SIZE);
    println!("  --brightness <factor>     Scale every sample by a factor");
    println!("  --edges [h|v|both]        Sobel edge detection (default: both)");
    println!("  --pipeline <file>         Filters from a .toml or .json description");
    println!("  --normalize               Stretch the result to the full 0-255 range");
    println!();
    println!("Files ending in .pgm are read and written as PGM. Other inputs are");
    println!("decoded as grayscale; .jpg/.jpeg outputs are written as JPEG.");
}

// ============================================================================
// Commands
// ============================================================================

fn list_filters() {
    let registry = FilterRegistry::with_builtins();
    println!("Available filters ({} total):", registry.len());
    println!();

    for category in [Category::Blur, Category::Edge, Category::Adjust] {
        let names = registry.filters_by_category(category);
        if names.is_empty() {
            continue;
        }
        println!("  📁 {}", category);
        for name in names {
            if let Some(entry) = registry.get_entry(name) {
                println!("      • {} - {}", entry.name, entry.description);
                for (key, value) in &entry.defaults {
                    println!("          {} = {}", key, value);
                }
            }
        }
        println!();
    }
}

fn image_info(path: &Path) -> Result<()> {
    let image = load_image(path)?;
    println!("Image: {}", path.display());
    println!("  Size:     {}x{}", image.width(), image.height());
    println!("  Channels: {}", image.channels());
    println!("  Min:      {}", image.min_value().unwrap_or(0));
    println!("  Max:      {}", image.max_value().unwrap_or(0));
    println!("  Mean:     {:.3}", image.mean_value());
    println!("  Stddev:   {:.3}", image.standard_deviation());
    Ok(())
}

fn process_image(args: &[String]) -> Result<()> {
    let input_path = Path::new(&args[0]);
    let output_path = Path::new(&args[1]);
    let (pipeline, normalize) = parse_pipeline(&args[2..])?;

    let input = load_image(input_path)?;
    println!(
        "⚙️  Processing {} -> {} ({} filter(s))",
        input_path.display(),
        output_path.display(),
        pipeline.len()
    );

    let mut output = pipeline.apply_with_progress(&input, |event| match event {
        PipelineProgress::FilterStarted { index, name, total } => {
            println!("   • [{}/{}] {}", index + 1, total, name);
        }
        PipelineProgress::Completed { total_duration, .. } => {
            log::info!("pipeline finished in {:.2}ms", total_duration.as_secs_f64() * 1000.0);
        }
        _ => {}
    });
    if normalize {
        output.normalize();
    }

    save_image(&output, output_path)?;
    println!("🎉 Image saved to: {}", output_path.display());
    Ok(())
}

fn run_demo(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let test_image = square_pattern(200, 200)?;
    save_image(&test_image, &dir.join("test_input.pgm"))?;

    let blurred = GaussianBlur::new(2.0, 5)?.apply(&test_image);
    save_image(&blurred, &dir.join("blurred.pgm"))?;

    let edges = EdgeDetection::default().apply(&test_image);
    save_image(&edges, &dir.join("edges.pgm"))?;

    let bright = BrightnessAdjust::new(1.5)?.apply(&test_image);
    save_image(&bright, &dir.join("bright.pgm"))?;

    let pipeline = FilterPipeline::new()
        .with_filter(GaussianBlur::new(1.0, 3)?)
        .with_filter(BrightnessAdjust::new(1.2)?)
        .with_filter(EdgeDetection::default());
    let result = pipeline.apply(&test_image);
    save_image(&result, &dir.join("pipeline_result.pgm"))?;

    println!("🎉 Demo images written to {}", dir.display());
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// White square on a black background, inset by a quarter on each side.
fn square_pattern(width: usize, height: usize) -> Result<PixelBuffer> {
    let (x0, x1) = (width / 4, width * 3 / 4);
    let (y0, y1) = (height / 4, height * 3 / 4);
    Ok(PixelBuffer::from_fn(width, height, 1, |x, y, _| {
        if x > x0 && x < x1 && y > y0 && y < y1 {
            255
        } else {
            0
        }
    })?)
}

fn parse_pipeline(args: &[String]) -> Result<(FilterPipeline, bool)> {
    let mut pipeline = FilterPipeline::new();
    let mut normalize = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--blur" => {
                let value = args.get(i + 1).ok_or_else(|| anyhow!("--blur needs a sigma"))?;
                let (sigma, size) = parse_blur(value)?;
                pipeline.push(Box::new(GaussianBlur::new(sigma, size)?));
                i += 2;
            }
            "--brightness" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow!("--brightness needs a factor"))?;
                let factor: f64 = value
                    .parse()
                    .with_context(|| format!("invalid brightness factor '{}'", value))?;
                pipeline.push(Box::new(BrightnessAdjust::new(factor)?));
                i += 2;
            }
            "--edges" => {
                let direction = args.get(i + 1).and_then(|s| parse_direction(s));
                pipeline.push(Box::new(EdgeDetection::new(direction.unwrap_or_default())));
                i += if direction.is_some() { 2 } else { 1 };
            }
            "--pipeline" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow!("--pipeline needs a file"))?;
                let config = PipelineConfig::load(path).with_context(|| format!("loading {}", path))?;
                for filter in config.build()?.iter() {
                    pipeline.push(filter.clone_box());
                }
                i += 2;
            }
            "--normalize" => {
                normalize = true;
                i += 1;
            }
            other => bail!("unknown option: {}", other),
        }
    }

    Ok((pipeline, normalize))
}

fn parse_blur(value: &str) -> Result<(f64, usize)> {
    let (sigma, size) = match value.split_once(':') {
        Some((sigma, size)) => (
            sigma,
            size.parse::<usize>()
                .with_context(|| format!("invalid kernel size '{}'", size))?,
        ),
        None => (value, GaussianBlur::DEFAULT_KERNEL_SIZE),
    };
    let sigma: f64 = sigma
        .parse()
        .with_context(|| format!("invalid sigma '{}'", sigma))?;
    Ok((sigma, size))
}

fn parse_direction(value: &str) -> Option<Direction> {
    match value.to_ascii_lowercase().as_str() {
        "h" | "horizontal" => Some(Direction::Horizontal),
        "v" | "vertical" => Some(Direction::Vertical),
        "both" => Some(Direction::Both),
        _ => None,
    }
}

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| wanted.iter().any(|w| e.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

fn load_image(path: &Path) -> Result<PixelBuffer> {
    let image = if has_extension(path, &["pgm"]) {
        pgm::try_load(path)?
    } else {
        codec::try_load_grayscale(path)?
    };
    log::info!("loaded {} ({}x{})", path.display(), image.width(), image.height());
    Ok(image)
}

fn save_image(image: &PixelBuffer, path: &Path) -> Result<()> {
    let saved = if has_extension(path, &["jpg", "jpeg"]) {
        codec::try_save_jpeg(image, path, codec::DEFAULT_JPEG_QUALITY)
    } else if image.channels() == 1 {
        pgm::try_save(image, path)
    } else {
        pgm::try_save(&image.extract_channel(0)?, path)
    };
    saved.with_context(|| format!("writing {}", path.display()))
}

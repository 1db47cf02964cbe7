use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use luma_core::{SceneDescription, SplitKind};
use luma_renderer::{build_camera, build_scene, render, RenderConfig, DEFAULT_BUCKET_SIZE};

/// Render a JSON scene description with the Luma path tracer.
#[derive(Parser, Debug)]
#[command(name = "luma", version)]
struct Cli {
    /// Scene description file
    scene: PathBuf,

    /// Output image; the format follows the extension
    #[arg(short = 'o', long = "output", default_value = "binary.ppm")]
    output: PathBuf,

    /// Samples per pixel (overrides the scene file)
    #[arg(long = "spp")]
    spp: Option<u32>,

    /// Base random seed
    #[arg(long = "seed", default_value_t = 0)]
    seed: u64,

    /// BVH split method (overrides the scene file)
    #[arg(long = "split", value_enum)]
    split: Option<Split>,

    /// Bucket edge length in pixels
    #[arg(long = "bucket-size", default_value_t = DEFAULT_BUCKET_SIZE)]
    bucket_size: u32,

    /// Worker threads (0 = one per core)
    #[arg(short = 't', long = "threads", default_value_t = 0)]
    threads: usize,

    /// More logging (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Split {
    Naive,
    Sah,
}

impl From<Split> for SplitKind {
    fn from(split: Split) -> Self {
        match split {
            Split::Naive => SplitKind::Naive,
            Split::Sah => SplitKind::Sah,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_default_env();
    // RUST_LOG wins unless -v was given
    if verbose > 0 || std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(level);
    }
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Starting Luma {}", env!("CARGO_PKG_VERSION"));

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure the render thread pool")?;
    }
    log::info!("Using {} render threads", rayon::current_num_threads());

    let start = Instant::now();
    let mut description = SceneDescription::load(&cli.scene)
        .with_context(|| format!("Failed to load scene {}", cli.scene.display()))?;
    if let Some(spp) = cli.spp {
        description.samples_per_pixel = spp;
    }
    if let Some(split) = cli.split {
        description.bvh.split = split.into();
    }

    let scene = build_scene(&description)
        .with_context(|| format!("Failed to assemble scene {}", cli.scene.display()))?;
    let camera = build_camera(&description);
    log::info!("Scene ready in {:.2?}", start.elapsed());

    let config = RenderConfig {
        samples_per_pixel: description.samples_per_pixel,
        bucket_size: cli.bucket_size,
        seed: cli.seed,
    };
    let image = render(&scene, &camera, &config);

    image
        .save(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    log::info!("Done in {:.2?}", start.elapsed());

    Ok(())
}

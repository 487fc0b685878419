use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::{RasterCache, RenderHandle, RenderParameters, RenderStatus};
use lumen_renderer::Renderer;

mod scene;

use scene::DemoScene;

/// Render a built-in scene with the Lumen path tracer and write it as an image.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Options {
    /// Render parameters as JSON. Flags below override individual fields.
    #[clap(long, short = 'p', value_name = "FILE")]
    params: Option<PathBuf>,

    /// Scene to render.
    #[clap(long, value_enum, default_value_t = DemoScene::Spheres)]
    scene: DemoScene,

    /// Image used to texture one object of the scene.
    #[clap(long, value_name = "FILE")]
    texture: Option<String>,

    /// Output image path; the format follows the extension.
    #[clap(long = "outfile", short = 'o', value_name = "FILE", default_value = "render.png")]
    output: PathBuf,

    /// Rewrite the output after every completed round.
    #[clap(long)]
    progressive: bool,

    #[clap(long, value_name = "PIXELS")]
    width: Option<u32>,

    #[clap(long, value_name = "PIXELS")]
    height: Option<u32>,

    /// Camera rays per pixel in each round.
    #[clap(long, short = 's', value_name = "NUM")]
    samples: Option<u32>,

    #[clap(long, short = 'r', value_name = "NUM")]
    rounds: Option<u32>,

    /// Square tile size in pixels.
    #[clap(long, value_name = "PIXELS")]
    tile_size: Option<u32>,

    #[clap(long, value_name = "NUM")]
    max_bounces: Option<u32>,

    #[clap(long, value_name = "NUM")]
    seed: Option<u64>,

    /// Scan every primitive on every ray instead of building a BVH.
    #[clap(long)]
    no_bvh: bool,

    /// Background color as three comma separated components.
    #[clap(long, value_name = "R,G,B", value_delimiter = ',', num_args = 3)]
    background: Option<Vec<f64>>,

    /// Rescale over-bright pixels instead of clamping them.
    #[clap(long)]
    scale_truncation: bool,
}

impl Options {
    /// Load the parameter file, if any, and apply the command-line overrides.
    fn render_parameters(&self) -> Result<RenderParameters> {
        let mut params = match &self.params {
            Some(path) => RenderParameters::from_json_file(path)
                .with_context(|| format!("Failed to load render parameters from {}", path.display()))?,
            None => RenderParameters::default(),
        };

        if let Some(width) = self.width {
            params.image_width = width;
        }
        if let Some(height) = self.height {
            params.image_height = height;
        }
        if let Some(samples) = self.samples {
            params.samples_per_round = samples;
        }
        if let Some(rounds) = self.rounds {
            params.round_count = rounds;
        }
        if let Some(size) = self.tile_size {
            params.tile_width = size;
            params.tile_height = size;
        }
        if let Some(bounces) = self.max_bounces {
            params.max_bounces = bounces;
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if let Some([r, g, b]) = self.background.as_deref().and_then(|c| <[f64; 3]>::try_from(c).ok()) {
            params.background_color = [r, g, b];
        }
        params.use_bvh &= !self.no_bvh;
        params.use_scaling_truncation |= self.scale_truncation;

        params.validate()?;
        Ok(params)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let options = Options::parse();
    let params = options.render_parameters()?;

    let texture = match &options.texture {
        Some(path) => Some(
            RasterCache::new()
                .load(path)
                .with_context(|| format!("Failed to load texture {path}"))?,
        ),
        None => None,
    };

    let (world, camera) = scene::build(options.scene, texture)?;
    log::info!("Rendering {:?} scene to {}", options.scene, options.output.display());

    let handle = RenderHandle::new();
    handle.transition(RenderStatus::Starting);
    let renderer = match Renderer::new(world, camera, params.clone()) {
        Ok(renderer) => renderer,
        Err(e) => {
            handle.fail(e.to_string());
            return Err(e.into());
        }
    };

    let accumulator = renderer.run(&handle, |accumulator| {
        if options.progressive {
            if let Err(e) = accumulator.to_rgb_image(&params).save(&options.output) {
                log::warn!("Failed to write progress image: {}", e);
            }
        }
    });

    accumulator
        .to_rgb_image(&params)
        .save(&options.output)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    log::info!(
        "Render {}: {} samples per pixel written to {}",
        handle.status(),
        accumulator.samples_per_pixel(),
        options.output.display()
    );
    Ok(())
}

//! Example: load render parameters and an optional texture raster
//!
//! Run with: cargo run --example load_params -- render.json [texture.png]

use std::env;

use lumen_core::{RasterCache, RenderParameters};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: {} <params.json> [texture]", args[0]);
        println!("\nExample:");
        println!("  cargo run --example load_params -- render.json");
        return;
    }

    let path = &args[1];
    println!("Loading render parameters: {}", path);

    let params = match RenderParameters::from_json_file(path) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("Failed to load parameters: {}", e);
            return;
        }
    };

    println!("Parameters valid");
    println!("  Image: {}x{} (aspect {:.3})", params.image_width, params.image_height, params.aspect_ratio());
    println!("  Tiles: {}x{}", params.tile_width, params.tile_height);
    println!(
        "  Samples: {} per round x {} rounds = {} per pixel",
        params.samples_per_round,
        params.round_count,
        params.total_samples_per_pixel()
    );
    println!("  Max bounces: {}", params.max_bounces);
    println!("  BVH: {}", if params.use_bvh { "on" } else { "off" });
    println!(
        "  Background: {:?} x {}",
        params.background_color, params.background_color_magnitude
    );

    if let Some(texture) = args.get(2) {
        let mut cache = RasterCache::new();
        match cache.load(texture) {
            Ok(raster) => println!(
                "\nTexture {}: {}x{} ({:.1} KB)",
                raster.path(),
                raster.width(),
                raster.height(),
                raster.size_bytes() as f64 / 1024.0
            ),
            Err(e) => eprintln!("\nFailed to load texture: {}", e),
        }
    }
}

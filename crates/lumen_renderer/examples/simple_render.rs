//! Simple path tracer example.
//!
//! Renders a field of random spheres and saves it as a PNG.

use std::sync::Arc;

use lumen_core::{RenderHandle, RenderParameters};
use lumen_renderer::{
    render, Camera, Color, Dielectric, Lambertian, Material, Metal, Point3, PrimitiveList, Sphere,
    Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let world = build_scene()?;
    let camera = Camera::new()
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);

    let params = RenderParameters {
        image_width: 800,
        image_height: 450,
        samples_per_round: 10,
        round_count: 5,
        max_bounces: 10,
        background_color: [0.5, 0.7, 1.0],
        ..RenderParameters::default()
    };

    let handle = RenderHandle::new();
    let accumulator = render(world, camera, params.clone(), &handle)?;

    let filename = "output.png";
    accumulator.to_rgb_image(&params).save(filename)?;
    log::info!("Saved to {}", filename);
    Ok(())
}

fn build_scene() -> Result<PrimitiveList, Box<dyn std::error::Error>> {
    let mut world = PrimitiveList::new();
    let glass: Arc<dyn Material> = Arc::new(Dielectric::clear(1.5)?);

    // Ground
    world.add(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::from_color(Color::splat(0.5))),
    )?);

    // Three main spheres
    world.add(Sphere::new(Point3::new(0.0, 1.0, 0.0), 1.0, glass.clone())?);
    world.add(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::from_color(Color::new(0.4, 0.2, 0.1))),
    )?);
    world.add(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::from_color(Color::new(0.7, 0.6, 0.5), 0.0)),
    )?);

    // Small random spheres
    let mut rng = StdRng::seed_from_u64(2024);
    for a in -5..5 {
        for b in -5..5 {
            let center = Point3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat: f64 = rng.gen();
            let material: Arc<dyn Material> = if choose_mat < 0.8 {
                let albedo = Color::new(
                    rng.gen::<f64>() * rng.gen::<f64>(),
                    rng.gen::<f64>() * rng.gen::<f64>(),
                    rng.gen::<f64>() * rng.gen::<f64>(),
                );
                Arc::new(Lambertian::from_color(albedo))
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    0.5 + 0.5 * rng.gen::<f64>(),
                    0.5 + 0.5 * rng.gen::<f64>(),
                    0.5 + 0.5 * rng.gen::<f64>(),
                );
                Arc::new(Metal::from_color(albedo, 0.5 * rng.gen::<f64>()))
            } else {
                glass.clone()
            };
            world.add(Sphere::new(center, 0.2, material)?);
        }
    }

    log::info!("Created {} objects", world.len());
    Ok(world)
}

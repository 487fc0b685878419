//! Built-in demo scenes.

use std::sync::Arc;

use clap::ValueEnum;
use lumen_core::Raster;
use lumen_math::{Point3, Vec3};
use lumen_renderer::{
    Camera, Color, ColorTexture, Cuboid, Cylinder, Dielectric, Disk, HollowCylinder, ImageTexture,
    Lambertian, Material, Metal, ParticipatingVolume, Plane, PrimitiveList, Pyramid, Quaternion,
    Rectangle, Rotation, SetupError, Sphere, Translation, Triangle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoScene {
    /// Three spheres, one per surface material, on a ground plane
    Spheres,
    /// A lit room with boxes, a pyramid, cylinders and a smoke volume
    Room,
}

/// Build the scene and a camera looking at it.
///
/// `texture` replaces the plain color of the textured object when given.
pub fn build(scene: DemoScene, texture: Option<Arc<Raster>>) -> Result<(PrimitiveList, Camera), SetupError> {
    match scene {
        DemoScene::Spheres => spheres(texture),
        DemoScene::Room => room(texture),
    }
}

fn solid(color: Color) -> Arc<dyn Material> {
    Arc::new(Lambertian::from_color(color))
}

fn light(color: Color) -> Arc<dyn Material> {
    Arc::new(Lambertian::from_color(Color::ZERO).with_emittance(Arc::new(ColorTexture::new(color))))
}

fn textured(texture: Option<Arc<Raster>>, fallback: Color) -> Arc<dyn Material> {
    match texture {
        Some(raster) => Arc::new(Lambertian::new(Arc::new(ImageTexture::new(raster, 2.2, 1.0)))),
        None => solid(fallback),
    }
}

fn spheres(texture: Option<Arc<Raster>>) -> Result<(PrimitiveList, Camera), SetupError> {
    let mut world = PrimitiveList::new();

    world.add(Plane::new(Point3::ZERO, Vec3::Y, solid(Color::new(0.8, 0.8, 0.0)))?);
    world.add(Sphere::new(
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        textured(texture, Color::new(0.1, 0.2, 0.5)),
    )?);
    world.add(Sphere::new(
        Point3::new(-2.2, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::clear(1.5)?),
    )?);
    world.add(Sphere::new(
        Point3::new(2.2, 1.0, 0.0),
        1.0,
        Arc::new(Metal::from_color(Color::new(0.8, 0.6, 0.2), 0.1)),
    )?);
    world.add(Disk::new(
        Point3::new(0.0, 6.0, 0.0),
        Vec3::NEG_Y,
        2.0,
        light(Color::splat(4.0)),
    )?);

    let camera = Camera::new()
        .with_position(Point3::new(0.0, 2.0, 7.0), Point3::new(0.0, 1.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.05, 7.0);
    Ok((world, camera))
}

fn room(texture: Option<Arc<Raster>>) -> Result<(PrimitiveList, Camera), SetupError> {
    let red = solid(Color::new(0.65, 0.05, 0.05));
    let white = solid(Color::splat(0.73));
    let green = solid(Color::new(0.12, 0.45, 0.15));

    let mut world = PrimitiveList::new();

    // Walls, floor and ceiling, facing into the room
    world.add(Rectangle::new(Point3::new(555.0, 0.0, 0.0), Point3::new(555.0, 555.0, 555.0), green)?.flipped());
    world.add(Rectangle::new(Point3::ZERO, Point3::new(0.0, 555.0, 555.0), red)?);
    world.add(Rectangle::new(Point3::ZERO, Point3::new(555.0, 0.0, 555.0), white.clone())?);
    world.add(Rectangle::new(Point3::new(0.0, 555.0, 0.0), Point3::new(555.0, 555.0, 555.0), white.clone())?.flipped());
    world.add(Rectangle::new(Point3::new(0.0, 0.0, 555.0), Point3::new(555.0, 555.0, 555.0), white.clone())?.flipped());

    world.add(
        Rectangle::new(Point3::new(213.0, 554.0, 227.0), Point3::new(343.0, 554.0, 332.0), light(Color::splat(15.0)))?
            .flipped(),
    );

    let tall = Cuboid::new(Point3::ZERO, Point3::new(165.0, 330.0, 165.0), white.clone())?;
    world.add(Translation::new(Rotation::y(tall, 15.0), Vec3::new(265.0, 0.0, 295.0)));

    let smoke_box = Cuboid::new(Point3::ZERO, Point3::splat(165.0), white.clone())?;
    world.add(ParticipatingVolume::new(
        Translation::new(Rotation::y(smoke_box, -18.0), Vec3::new(130.0, 0.0, 65.0)),
        0.01,
        Arc::new(ColorTexture::new(Color::splat(0.9))),
    )?);

    world.add(Pyramid::new(
        Point3::new(380.0, 0.0, 60.0),
        Point3::new(480.0, 0.0, 160.0),
        120.0,
        textured(texture, Color::new(0.8, 0.6, 0.3)),
    )?);

    world.add(Cylinder::new(
        Point3::new(90.0, 0.0, 400.0),
        Point3::new(90.0, 140.0, 400.0),
        45.0,
        Arc::new(Metal::from_color(Color::new(0.8, 0.85, 0.88), 0.0)),
    )?);

    let ring = HollowCylinder::new(Point3::ZERO, Point3::new(0.0, 30.0, 0.0), 30.0, 50.0, white)?;
    world.add(Translation::new(
        Quaternion::new(ring, Vec3::new(60.0, 0.0, 20.0), lumen_renderer::EulerOrder::Xyz),
        Vec3::new(400.0, 300.0, 300.0),
    ));

    world.add(Sphere::new(
        Point3::new(190.0, 90.0, 190.0),
        50.0,
        Arc::new(Dielectric::clear(1.5)?),
    )?);

    world.add(Triangle::new(
        Point3::new(300.0, 400.0, 554.0),
        Point3::new(450.0, 400.0, 554.0),
        Point3::new(375.0, 500.0, 554.0),
        solid(Color::new(0.2, 0.3, 0.8)),
    )?);

    let camera = Camera::new()
        .with_position(Point3::new(278.0, 278.0, -800.0), Point3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 800.0);
    Ok((world, camera))
}

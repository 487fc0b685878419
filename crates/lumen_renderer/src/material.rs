//! Material trait for surface scattering.

use std::sync::Arc;

use crate::sampling::{gen_f64, random_in_unit_sphere};
use crate::texture::{ColorTexture, Texture};
use crate::{hittable::HitRecord, Ray, SetupError};
use lumen_math::Vec3;
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Fraction of incoming light carried by a scattered ray at (u, v).
    fn reflectance(&self, u: f64, v: f64) -> Color;

    /// Light emitted at (u, v). Most materials return black.
    fn emittance(&self, _u: f64, _v: f64) -> Color {
        Color::ZERO
    }

    /// True for mirror-like materials whose scattering is (near) deterministic.
    fn is_specular(&self) -> bool {
        false
    }

    /// Scatter an incoming hit.
    ///
    /// Returns the continuation ray, or None if the ray is absorbed.
    fn scatter(&self, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Ray>;
}

/// Reflectance and emittance textures shared by every material kind.
#[derive(Clone)]
struct Surface {
    reflectance: Arc<dyn Texture>,
    emittance: Arc<dyn Texture>,
}

impl Surface {
    fn new(reflectance: Arc<dyn Texture>) -> Self {
        Self {
            reflectance,
            emittance: Arc::new(ColorTexture::black()),
        }
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    surface: Surface,
}

impl Lambertian {
    /// Create a Lambertian material with the given reflectance texture.
    pub fn new(reflectance: Arc<dyn Texture>) -> Self {
        Self {
            surface: Surface::new(reflectance),
        }
    }

    /// Create a Lambertian material with a constant albedo.
    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(ColorTexture::new(albedo)))
    }

    /// Make the surface emit light.
    pub fn with_emittance(mut self, emittance: Arc<dyn Texture>) -> Self {
        self.surface.emittance = emittance;
        self
    }
}

impl Material for Lambertian {
    fn reflectance(&self, u: f64, v: f64) -> Color {
        self.surface.reflectance.value(u, v)
    }

    fn emittance(&self, u: f64, v: f64) -> Color {
        self.surface.emittance.value(u, v)
    }

    fn scatter(&self, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Ray> {
        let normal = rec.facing_normal();
        let mut scatter_direction = normal + random_in_unit_sphere(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-12 {
            scatter_direction = normal;
        }

        Some(Ray::new(rec.point(), scatter_direction))
    }
}

/// Metal (specular) material.
#[derive(Clone)]
pub struct Metal {
    surface: Surface,
    fuzziness: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `reflectance`: The color of the metal
    /// - `fuzziness`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(reflectance: Arc<dyn Texture>, fuzziness: f64) -> Self {
        Self {
            surface: Surface::new(reflectance),
            fuzziness: fuzziness.clamp(0.0, 1.0),
        }
    }

    /// Create a Metal material with a constant color.
    pub fn from_color(albedo: Color, fuzziness: f64) -> Self {
        Self::new(Arc::new(ColorTexture::new(albedo)), fuzziness)
    }

    /// Make the surface emit light.
    pub fn with_emittance(mut self, emittance: Arc<dyn Texture>) -> Self {
        self.surface.emittance = emittance;
        self
    }
}

impl Material for Metal {
    fn reflectance(&self, u: f64, v: f64) -> Color {
        self.surface.reflectance.value(u, v)
    }

    fn emittance(&self, u: f64, v: f64) -> Color {
        self.surface.emittance.value(u, v)
    }

    fn is_specular(&self) -> bool {
        true
    }

    fn scatter(&self, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Ray> {
        let normal = rec.facing_normal();
        let reflected = reflect(rec.ray.direction().normalize(), normal);
        let scattered = reflected + self.fuzziness * random_in_unit_sphere(rng);

        // Fuzz pushed the reflection below the surface: absorbed
        if scattered.dot(normal) <= 0.0 {
            return None;
        }
        Some(Ray::new(rec.point(), scattered))
    }
}

/// Dielectric (glass) material.
#[derive(Clone)]
pub struct Dielectric {
    surface: Surface,
    /// Index of refraction relative to the surrounding medium
    refractive_index: f64,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `refractive_index`: 1.0 = air, 1.5 = glass, 2.4 = diamond
    pub fn new(reflectance: Arc<dyn Texture>, refractive_index: f64) -> Result<Self, SetupError> {
        if refractive_index.is_nan() || refractive_index <= 0.0 {
            return Err(SetupError::InvalidRefractiveIndex(refractive_index));
        }
        Ok(Self {
            surface: Surface::new(reflectance),
            refractive_index,
        })
    }

    /// Clear glass-like dielectric.
    pub fn clear(refractive_index: f64) -> Result<Self, SetupError> {
        Self::new(Arc::new(ColorTexture::new(Color::ONE)), refractive_index)
    }

    /// Schlick's approximation for reflectance
    pub fn schlick(cosine: f64, refractive_index: f64) -> f64 {
        let r0 = ((1.0 - refractive_index) / (1.0 + refractive_index)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn reflectance(&self, u: f64, v: f64) -> Color {
        self.surface.reflectance.value(u, v)
    }

    fn emittance(&self, u: f64, v: f64) -> Color {
        self.surface.emittance.value(u, v)
    }

    fn is_specular(&self) -> bool {
        true
    }

    fn scatter(&self, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Ray> {
        let unit_direction = rec.ray.direction().normalize();
        let d_dot_n = unit_direction.dot(rec.normal);

        // Leaving the medium when travelling along the normal
        let (outward_normal, eta_ratio, cos_incident) = if d_dot_n > 0.0 {
            (-rec.normal, self.refractive_index, d_dot_n)
        } else {
            (rec.normal, 1.0 / self.refractive_index, -d_dot_n)
        };

        let reflected = reflect(unit_direction, outward_normal);
        let direction = match refract(unit_direction, outward_normal, eta_ratio) {
            Some(refracted) => {
                // Schlick uses the angle on the low-index side of the interface
                let cosine = if d_dot_n > 0.0 {
                    (1.0 - eta_ratio * eta_ratio * (1.0 - cos_incident * cos_incident)).sqrt()
                } else {
                    cos_incident
                };
                if gen_f64(rng) < Self::schlick(cosine, self.refractive_index) {
                    reflected
                } else {
                    refracted
                }
            }
            // Total internal reflection
            None => reflected,
        };

        Some(Ray::new(rec.point(), direction))
    }
}

/// Isotropic phase function for participating media.
#[derive(Clone)]
pub struct Isotropic {
    surface: Surface,
}

impl Isotropic {
    /// Create an isotropic material with the given albedo texture.
    pub fn new(reflectance: Arc<dyn Texture>) -> Self {
        Self {
            surface: Surface::new(reflectance),
        }
    }

    /// Create an isotropic material with a constant albedo.
    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(ColorTexture::new(albedo)))
    }
}

impl Material for Isotropic {
    fn reflectance(&self, u: f64, v: f64) -> Color {
        self.surface.reflectance.value(u, v)
    }

    fn emittance(&self, u: f64, v: f64) -> Color {
        self.surface.emittance.value(u, v)
    }

    fn scatter(&self, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Ray> {
        let mut direction = random_in_unit_sphere(rng);
        while direction.length_squared() < 1e-12 {
            direction = random_in_unit_sphere(rng);
        }
        Some(Ray::new(rec.point(), direction))
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface whose normal faces the incoming side.
///
/// Returns None on total internal reflection.
#[inline]
pub(crate) fn refract(uv: Vec3, n: Vec3, eta_ratio: f64) -> Option<Vec3> {
    let dt = uv.dot(n);
    let discriminant = 1.0 - eta_ratio * eta_ratio * (1.0 - dt * dt);
    if discriminant <= 0.0 {
        return None;
    }
    Some(eta_ratio * (uv - n * dt) - n * discriminant.sqrt())
}

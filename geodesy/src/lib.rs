//! Distance and direction between coordinates.
//!
//! For two coordinates we use the Haversine formula:
//!
//! ```norust
//! d=2R*sin ^ −1(√(sin^2((Φ2​−Φ1​​)/2)+cos(Φ1​)cos(Φ2​)sin^2((λ2​−λ1​​)/2)))
//! ```
//!
//! where:
//!
//! - R – Earth's radius (R = 6371 km);
//! - λ1, φ₁ – First point longitude and latitude coordinates;
//! - λ2, φ₂ – Second point longitude and latitude coordinates;
//! - d – Distance between them along Earth's surface.
//!
//! Initial bearing follows the forward azimuth formula:
//!
//! ```norust
//! θ = atan2(sin(Δλ)cos(φ₂), cos(φ₁)sin(φ₂) − sin(φ₁)cos(φ₂)cos(Δλ))
//! ```

mod models;

pub use models::*;

/// Mean radius of Earth in kilometers
pub const R: f64 = 6371.0;

/// Great-circle distance from point A to point B
pub fn haversine(from: Position, to: Position) -> Distance {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let latitude_1 = from.latitude.to_radians();
    let latitude_2 = to.latitude.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + (d_lon / 2.0).sin().powi(2) * latitude_1.cos() * latitude_2.cos();

    // Rounding can push `a` a hair above 1 for antipodal points
    Distance::from_kilometers(R * 2.0 * a.min(1.0).sqrt().asin())
}

/// Initial great-circle bearing from point A to point B in degrees, normalized to `[0, 360)`.
pub fn bearing(from: Position, to: Position) -> f64 {
    let latitude_1 = from.latitude.to_radians();
    let latitude_2 = to.latitude.to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let y = d_lon.sin() * latitude_2.cos();
    let x = latitude_1.cos() * latitude_2.sin() - latitude_1.sin() * latitude_2.cos() * d_lon.cos();

    let degrees = y.atan2(x).to_degrees().rem_euclid(360.0);

    // rem_euclid may round up to exactly 360 for tiny negative angles
    if degrees >= 360.0 { 0.0 } else { degrees }
}

//! Fresnel boundary relations
//!
//! Angles are in radians and measured from the surface normal.

use crate::error::{CoatingError, Result};

/// Refraction angle from Snell's law, `asin(n1/n2 · sin α1)`.
///
/// Fails when the argument leaves [-1, 1] (total internal reflection).
pub fn angle(alpha1: f64, n1: f64, n2: f64) -> Result<f64> {
    let ratio = n1 / n2 * alpha1.sin();
    if !ratio.is_finite() || ratio.abs() > 1.0 {
        return Err(CoatingError::TotalInternalReflection { n1, n2, ratio });
    }
    Ok(ratio.asin())
}

/// Refraction angles into each of `n2` from a fixed first medium.
///
/// Inside a planar stack n·sin α is conserved, so this gives the propagation
/// angle in every layer directly from the incident medium.
pub fn angles(alpha1: f64, n1: f64, n2: &[f64]) -> Result<Vec<f64>> {
    n2.iter().map(|&n| angle(alpha1, n1, n)).collect()
}

/// Amplitude reflection coefficients `(ρ_s, ρ_p)` of a boundary
pub fn rho(alpha1: f64, n1: f64, alpha2: f64, n2: f64) -> (f64, f64) {
    let (cos1, cos2) = (alpha1.cos(), alpha2.cos());
    let a = n1 * cos1;
    let b = n2 * cos2;
    let c = n2 * cos1;
    let d = n1 * cos2;
    ((a - b) / (a + b), (c - d) / (c + d))
}

/// `rho` for one first medium against several second media
pub fn rhos(alpha1: f64, n1: f64, alpha2: &[f64], n2: &[f64]) -> Vec<(f64, f64)> {
    alpha2
        .iter()
        .zip(n2)
        .map(|(&a2, &n)| rho(alpha1, n1, a2, n))
        .collect()
}

/// Angle of incidence at which p-polarized light is not reflected
pub fn brewster_angle(n1: f64, n2: f64) -> f64 {
    (n2 / n1).atan()
}

/// Geometric thickness of a layer that is `fraction` wavelengths thick optically
pub fn x_wave(fraction: f64, n: f64, wavelength_nm: f64) -> f64 {
    fraction * wavelength_nm / n
}

pub fn quarter_wave(n: f64, wavelength_nm: f64) -> f64 {
    x_wave(0.25, n, wavelength_nm)
}

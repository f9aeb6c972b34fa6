//! Transfer-matrix engine for a planar multilayer
//!
//! A [`Stack`] is an ordered list of refractive indices (incident medium,
//! layers, exit medium), the layer thicknesses in nm, and an angle of
//! incidence. Boundary angles and Fresnel coefficients depend only on the
//! indices and the angle, so they are cached and reused across wavelengths;
//! only the propagation phase is recomputed per evaluation.

use std::f64::consts::PI;

use nalgebra::Matrix2;
use num_complex::Complex64;
use serde::Serialize;

use crate::error::{check_wavelength, CoatingError, Result};
use crate::fresnel;

/// Samples per layer used by [`Stack::efi`] when the caller has no preference
pub const DEFAULT_EFI_STEPS: usize = 30;

/// Validity of the cached boundary data.
///
/// `AnglesStale` keeps the previous Fresnel coefficients around, but they were
/// derived from stale angles and are recomputed by the next [`Stack::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    /// Nothing cached (new stack or indices changed)
    #[default]
    Fresh,
    /// Angle of incidence changed since the last update
    AnglesStale,
    /// Angles recomputed, coefficients not yet
    RhoStale,
    Valid,
}

impl CacheState {
    pub fn angles_valid(self) -> bool {
        matches!(self, CacheState::RhoStale | CacheState::Valid)
    }

    pub fn rho_valid(self) -> bool {
        matches!(self, CacheState::AnglesStale | CacheState::Valid)
    }

    pub fn is_valid(self) -> bool {
        self == CacheState::Valid
    }

    fn indices_changed(self) -> Self {
        CacheState::Fresh
    }

    fn angle_changed(self) -> Self {
        match self {
            CacheState::Valid | CacheState::AnglesStale => CacheState::AnglesStale,
            CacheState::Fresh | CacheState::RhoStale => CacheState::Fresh,
        }
    }

    fn angles_updated(self) -> Self {
        CacheState::RhoStale
    }

    fn rhos_updated(self) -> Self {
        CacheState::Valid
    }
}

/// How often each cache has been rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateCounts {
    pub angles: usize,
    pub rhos: usize,
}

/// A value for each polarization
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Polarized {
    pub s: f64,
    pub p: f64,
}

impl Polarized {
    /// `1 - x` per polarization, e.g. transmission from reflectivity of a lossless stack
    pub fn complement(self) -> Self {
        Self {
            s: 1.0 - self.s,
            p: 1.0 - self.p,
        }
    }
}

/// Reflection phase per polarization and the differential phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Phase {
    pub s: f64,
    pub p: f64,
    /// `(φ_p + π) − φ_s`
    pub delta: f64,
}

/// Normalized |E|² sampled through the stack depth
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfiProfile {
    /// Depth in nm; 0 is the first interface, negative values lie in the superstrate
    pub positions: Vec<f64>,
    pub intensity: Vec<f64>,
}

impl EfiProfile {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.positions.iter().copied().zip(self.intensity.iter().copied())
    }
}

#[derive(Debug, Clone)]
pub struct Stack {
    indices: Vec<f64>,
    thicknesses: Vec<f64>,
    /// radians
    aoi: f64,
    state: CacheState,
    angles: Vec<f64>,
    rhos: Vec<(f64, f64)>,
    counts: UpdateCounts,
}

impl Stack {
    /// Create a stack from N indices, N − 2 thicknesses (nm) and an angle of incidence (degrees).
    pub fn new(indices: Vec<f64>, thicknesses: Vec<f64>, angle_of_incidence: f64) -> Result<Self> {
        check_shape(&indices, &thicknesses)?;
        let mut stack = Self {
            indices,
            thicknesses,
            aoi: 0.0,
            state: CacheState::Fresh,
            angles: Vec::new(),
            rhos: Vec::new(),
            counts: UpdateCounts::default(),
        };
        stack.aoi = aoi_radians(angle_of_incidence)?;
        Ok(stack)
    }

    pub fn indices(&self) -> &[f64] {
        &self.indices
    }

    pub fn thicknesses(&self) -> &[f64] {
        &self.thicknesses
    }

    /// Number of layers between the two ambient media
    pub fn layer_count(&self) -> usize {
        self.thicknesses.len()
    }

    pub fn total_thickness(&self) -> f64 {
        self.thicknesses.iter().sum()
    }

    /// Angle of incidence in degrees
    pub fn angle_of_incidence(&self) -> f64 {
        self.aoi.to_degrees()
    }

    pub fn cache_state(&self) -> CacheState {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        self.state.is_valid()
    }

    pub fn update_counts(&self) -> UpdateCounts {
        self.counts
    }

    /// Propagation angle behind each boundary (radians); only current when the stack is valid
    pub fn boundary_angles(&self) -> &[f64] {
        &self.angles
    }

    /// `(ρ_s, ρ_p)` per boundary; only current when the stack is valid
    pub fn boundary_rhos(&self) -> &[(f64, f64)] {
        &self.rhos
    }

    pub fn set_angle_of_incidence(&mut self, degrees: f64) -> Result<()> {
        self.aoi = aoi_radians(degrees)?;
        self.state = self.state.angle_changed();
        Ok(())
    }

    /// Replace all indices; the layer count must stay the same.
    pub fn set_indices(&mut self, indices: Vec<f64>) -> Result<()> {
        check_shape(&indices, &self.thicknesses)?;
        self.indices = indices;
        self.state = self.state.indices_changed();
        Ok(())
    }

    pub fn set_index(&mut self, position: usize, n: f64) -> Result<()> {
        check_index(n)?;
        let count = self.indices.len();
        let slot = self
            .indices
            .get_mut(position)
            .ok_or(CoatingError::PositionOutOfRange { position, count })?;
        *slot = n;
        self.state = self.state.indices_changed();
        Ok(())
    }

    /// Replace all thicknesses; cached boundary data stays valid.
    pub fn set_thicknesses(&mut self, thicknesses: Vec<f64>) -> Result<()> {
        check_shape(&self.indices, &thicknesses)?;
        self.thicknesses = thicknesses;
        Ok(())
    }

    pub fn set_thickness(&mut self, layer: usize, thickness: f64) -> Result<()> {
        check_thickness(thickness)?;
        let count = self.thicknesses.len();
        let slot = self
            .thicknesses
            .get_mut(layer)
            .ok_or(CoatingError::PositionOutOfRange { position: layer, count })?;
        *slot = thickness;
        Ok(())
    }

    /// Replace the whole layer structure, including the layer count.
    pub fn set_layers(&mut self, indices: Vec<f64>, thicknesses: Vec<f64>) -> Result<()> {
        check_shape(&indices, &thicknesses)?;
        self.indices = indices;
        self.thicknesses = thicknesses;
        self.state = self.state.indices_changed();
        Ok(())
    }

    /// Bring the cached angles and Fresnel coefficients up to date.
    pub fn update(&mut self) -> Result<()> {
        if self.state.is_valid() {
            return Ok(());
        }
        if !self.state.angles_valid() {
            self.update_angles()?;
        }
        self.update_rhos()
    }

    fn update_angles(&mut self) -> Result<()> {
        self.angles = if self.aoi == 0.0 {
            vec![0.0; self.indices.len() - 1]
        } else {
            // n·sin α is invariant through the stack
            fresnel::angles(self.aoi, self.indices[0], &self.indices[1..])?
        };
        self.counts.angles += 1;
        self.state = self.state.angles_updated();
        tracing::debug!(
            "Recomputed {} boundary angles at AOI {:.3}°",
            self.angles.len(),
            self.angle_of_incidence()
        );
        Ok(())
    }

    fn update_rhos(&mut self) -> Result<()> {
        let mut n1 = self.indices[0];
        let mut a1 = self.aoi;
        let mut rhos = Vec::with_capacity(self.angles.len());
        for (&n2, &a2) in self.indices[1..].iter().zip(&self.angles) {
            let (rs, rp) = fresnel::rho(a1, n1, a2, n2);
            for rho in [rs, rp] {
                if rho.is_nan() || rho.abs() >= 1.0 {
                    return Err(CoatingError::OpaqueBoundary { rho: rho.abs() });
                }
            }
            rhos.push((rs, rp));
            n1 = n2;
            a1 = a2;
        }
        self.rhos = rhos;
        self.counts.rhos += 1;
        self.state = self.state.rhos_updated();
        tracing::debug!("Recomputed Fresnel coefficients for {} boundaries", self.rhos.len());
        Ok(())
    }

    /// Overall characteristic matrices `(M_s, M_p)` at a wavelength in nm.
    ///
    /// Boundary i is followed by propagation through medium i + 1; the exit
    /// medium adds no phase.
    pub fn propagate(&mut self, wavelength_nm: f64) -> Result<(Matrix2<Complex64>, Matrix2<Complex64>)> {
        check_wavelength(wavelength_nm)?;
        self.update()?;

        let mut ms = Matrix2::<Complex64>::identity();
        let mut mp = Matrix2::<Complex64>::identity();
        for (i, &(rs, rp)) in self.rhos.iter().enumerate() {
            let phase = match self.thicknesses.get(i) {
                Some(&d) => delta(d, self.indices[i + 1], self.angles[i], wavelength_nm),
                None => 0.0,
            };
            ms = ms * characteristic_matrix(rs, phase);
            mp = mp * characteristic_matrix(rp, phase);
        }
        Ok((ms, mp))
    }

    /// Power reflectance per polarization
    pub fn reflectivity(&mut self, wavelength_nm: f64) -> Result<Polarized> {
        let (ms, mp) = self.propagate(wavelength_nm)?;
        let s = amplitude_reflection(&ms)?.norm_sqr();
        let p = amplitude_reflection(&mp)?.norm_sqr();
        Ok(Polarized { s, p })
    }

    /// Power transmittance per polarization (lossless layers)
    pub fn transmission(&mut self, wavelength_nm: f64) -> Result<Polarized> {
        Ok(self.reflectivity(wavelength_nm)?.complement())
    }

    /// Reflection phase in radians
    pub fn phase(&mut self, wavelength_nm: f64) -> Result<Phase> {
        let (ms, mp) = self.propagate(wavelength_nm)?;
        let s = -amplitude_reflection(&ms)?.arg();
        let p = -amplitude_reflection(&mp)?.arg();
        Ok(Phase {
            s,
            p,
            delta: (p + PI) - s,
        })
    }

    /// Electric field intensity through the stack, `steps` samples per medium.
    ///
    /// This follows the admittance method at normal incidence with q = n and
    /// ignores both the angle of incidence and the polarization. The
    /// superstrate and substrate are sampled over half a wavelength each.
    pub fn efi(&self, wavelength_nm: f64, steps: usize) -> Result<EfiProfile> {
        check_wavelength(wavelength_nm)?;
        if steps == 0 {
            return Err(CoatingError::InvalidSteps);
        }
        if self.aoi != 0.0 {
            tracing::warn!(
                "EFI is computed at normal incidence, ignoring AOI {:.2}°",
                self.angle_of_incidence()
            );
        }

        let media = self.indices.len();
        let beta = |n: f64, h: f64| 2.0 * PI / wavelength_nm * n * h;

        let stack_matrix = self
            .indices[1..media - 1]
            .iter()
            .zip(&self.thicknesses)
            .fold(Matrix2::<Complex64>::identity(), |m, (&n, &h)| {
                m * admittance_matrix(beta(n, h), n)
            });

        let q0 = self.indices[0];
        let qs = self.indices[media - 1];
        let reference = 0.25
            * ((stack_matrix[(0, 0)] + stack_matrix[(1, 1)] * (qs / q0)).norm_sqr()
                + (stack_matrix[(1, 0)] / q0 + stack_matrix[(0, 1)] * qs).norm_sqr());
        if !(reference.is_finite() && reference > 0.0) {
            return Err(CoatingError::NonFinite { quantity: "EFI reference intensity" });
        }

        let mut positions = vec![0.0; steps * media];
        let mut intensity = vec![0.0; steps * media];
        let mut x = 0.0;
        let mut mz = stack_matrix;
        for (medium, &n) in self.indices.iter().enumerate() {
            let step = if medium == 0 {
                -wavelength_nm / 2.0 / n / steps as f64
            } else if medium == media - 1 {
                wavelength_nm / 2.0 / n / steps as f64
            } else {
                self.thicknesses[medium - 1] / steps as f64
            };

            for j in 0..steps {
                x += step;
                mz = admittance_matrix(beta(n, step), -n) * mz;
                let k = medium * steps + j;
                positions[k] = x;
                intensity[k] = (mz[(0, 0)].norm_sqr() + (mz[(0, 1)] * qs).norm_sqr()) / reference;
            }

            if medium == 0 {
                // walk back into the coating from the first interface
                mz = stack_matrix;
                x = 0.0;
            }
        }

        // the superstrate was sampled walking away from the coating
        positions[..steps].reverse();
        intensity[..steps].reverse();

        if intensity.iter().any(|v| !v.is_finite()) {
            return Err(CoatingError::NonFinite { quantity: "EFI" });
        }
        Ok(EfiProfile { positions, intensity })
    }
}

/// Propagation phase through a layer of thickness `d` (same unit as the wavelength)
pub fn delta(d: f64, n: f64, alpha: f64, wavelength: f64) -> f64 {
    2.0 * PI * n / wavelength * d * alpha.cos()
}

/// Boundary with amplitude reflectivity `rho` followed by a propagation phase `delta`
pub fn characteristic_matrix(rho: f64, delta: f64) -> Matrix2<Complex64> {
    let tau = (1.0 - rho * rho).sqrt();
    let forward = Complex64::from_polar(1.0, -delta);
    let backward = Complex64::from_polar(1.0, delta);
    Matrix2::new(
        forward / tau,
        backward * rho / tau,
        forward * rho / tau,
        backward / tau,
    )
}

/// Characteristic matrix of a homogeneous layer with phase thickness `beta` and admittance `q`
fn admittance_matrix(beta: f64, q: f64) -> Matrix2<Complex64> {
    let (sin, cos) = beta.sin_cos();
    Matrix2::new(
        Complex64::new(cos, 0.0),
        Complex64::new(0.0, sin / q),
        Complex64::new(0.0, q * sin),
        Complex64::new(cos, 0.0),
    )
}

fn amplitude_reflection(m: &Matrix2<Complex64>) -> Result<Complex64> {
    let r = m[(1, 0)] / m[(0, 0)];
    if r.re.is_finite() && r.im.is_finite() {
        Ok(r)
    } else {
        Err(CoatingError::NonFinite { quantity: "amplitude reflectivity" })
    }
}

fn aoi_radians(degrees: f64) -> Result<f64> {
    if (0.0..90.0).contains(&degrees) {
        Ok(degrees.to_radians())
    } else {
        Err(CoatingError::InvalidAngleOfIncidence(degrees))
    }
}

fn check_index(n: f64) -> Result<f64> {
    if n.is_finite() && n > 0.0 {
        Ok(n)
    } else {
        Err(CoatingError::InvalidIndex(n))
    }
}

fn check_thickness(d: f64) -> Result<f64> {
    if d.is_finite() && d >= 0.0 {
        Ok(d)
    } else {
        Err(CoatingError::InvalidThickness(d))
    }
}

fn check_shape(indices: &[f64], thicknesses: &[f64]) -> Result<()> {
    if indices.len() < 2 || thicknesses.len() + 2 != indices.len() {
        return Err(CoatingError::StackShape {
            indices: indices.len(),
            thicknesses: thicknesses.len(),
        });
    }
    for &n in indices {
        check_index(n)?;
    }
    for &d in thicknesses {
        check_thickness(d)?;
    }
    Ok(())
}

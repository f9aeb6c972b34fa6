//! Parameter sweeps over a coating
//!
//! Each sample carries its own `Result`, so one bad point (a Sellmeier pole,
//! TIR at grazing incidence) does not abort the rest of the curve.

use serde::Serialize;

use crate::coating::Coating;
use crate::error::{CoatingError, Result};
use crate::stack::{Phase, Polarized};

#[derive(Debug)]
pub struct SweepSample<T> {
    pub x: f64,
    pub value: Result<T>,
}

/// The successful points of a sweep, for tables and plots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve<T> {
    pub x: Vec<f64>,
    pub y: Vec<T>,
}

impl<T> Curve<T> {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

impl<T> FromIterator<SweepSample<T>> for Curve<T> {
    fn from_iter<I: IntoIterator<Item = SweepSample<T>>>(iter: I) -> Self {
        let mut curve = Curve { x: Vec::new(), y: Vec::new() };
        for sample in iter {
            match sample.value {
                Ok(value) => {
                    curve.x.push(sample.x);
                    curve.y.push(value);
                }
                Err(err) => tracing::debug!("Dropping sample at {}: {}", sample.x, err),
            }
        }
        curve
    }
}

/// `steps` evenly spaced points from `start` to `stop` inclusive
pub fn linspace(start: f64, stop: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (steps - 1) as f64;
            (0..steps).map(|i| start + step * i as f64).collect()
        }
    }
}

/// `steps` logarithmically spaced points from `start` to `stop` inclusive
pub fn logspace(start: f64, stop: f64, steps: usize) -> Result<Vec<f64>> {
    if !(start > 0.0 && stop > 0.0) {
        return Err(CoatingError::NonFinite { quantity: "logarithmic sweep bounds" });
    }
    Ok(linspace(start.log10(), stop.log10(), steps)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect())
}

/// Reflectivity against wavelength (nm) at a fixed AOI (degrees)
pub fn reflectivity_vs_wavelength(
    coating: &Coating,
    wavelengths: &[f64],
    aoi: f64,
) -> Vec<SweepSample<Polarized>> {
    wavelengths
        .iter()
        .map(|&x| SweepSample {
            x,
            value: coating.reflectivity(x, aoi),
        })
        .collect()
}

/// Reflectivity against AOI (degrees) at a fixed wavelength.
///
/// The indices don't depend on the angle, so one stack is reused and only the
/// boundary angles and coefficients are recomputed per point.
pub fn reflectivity_vs_angle(
    coating: &Coating,
    wavelength_nm: f64,
    angles: &[f64],
) -> Result<Vec<SweepSample<Polarized>>> {
    let mut stack = coating.create_stack(wavelength_nm, 0.0)?;
    Ok(angles
        .iter()
        .map(|&x| SweepSample {
            x,
            value: stack
                .set_angle_of_incidence(x)
                .and_then(|_| stack.reflectivity(wavelength_nm)),
        })
        .collect())
}

pub fn phase_vs_wavelength(
    coating: &Coating,
    wavelengths: &[f64],
    aoi: f64,
) -> Vec<SweepSample<Phase>> {
    wavelengths
        .iter()
        .map(|&x| SweepSample {
            x,
            value: coating
                .create_stack(x, aoi)
                .and_then(|mut stack| stack.phase(x)),
        })
        .collect()
}

/// Brownian displacement noise amplitude (m/√Hz) against frequency (Hz)
pub fn brownian_noise_vs_frequency(
    coating: &Coating,
    frequencies: &[f64],
    beam_size: f64,
    temperature: f64,
) -> Vec<SweepSample<f64>> {
    frequencies
        .iter()
        .map(|&x| SweepSample {
            x,
            value: coating
                .brownian_noise(x, beam_size, temperature)
                .map(f64::sqrt),
        })
        .collect()
}

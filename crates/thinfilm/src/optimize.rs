//! Objective function for thickness optimization
//!
//! Only the evaluation contract lives here; any minimizer that can call
//! `evaluate` with a trial vector of thicknesses can drive it.

use crate::coating::Coating;
use crate::error::{CoatingError, Result};

/// Smallest layer thickness (nm) a trial may use
pub const MIN_THICKNESS: f64 = 1.0;

pub struct ThicknessObjective<F> {
    coating: Coating,
    lambda0: f64,
    fom: F,
    evaluations: usize,
}

impl<F> ThicknessObjective<F>
where
    F: Fn(&Coating) -> Result<f64>,
{
    /// `lambda0` (nm) also bounds every trial thickness from above.
    pub fn new(coating: Coating, lambda0: f64, fom: F) -> Result<Self> {
        if !(lambda0.is_finite() && lambda0 > 0.0) {
            return Err(CoatingError::InvalidWavelength(lambda0));
        }
        Ok(Self {
            coating,
            lambda0,
            fom,
            evaluations: 0,
        })
    }

    pub fn coating(&self) -> &Coating {
        &self.coating
    }

    pub fn into_coating(self) -> Coating {
        self.coating
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Current layer thicknesses, a natural starting point for a search
    pub fn initial_thicknesses(&self) -> Vec<f64> {
        self.coating.layers().iter().map(|l| l.thickness()).collect()
    }

    /// Figure of merit for a trial; `+inf` for out-of-range or failed trials.
    pub fn evaluate(&mut self, thicknesses: &[f64]) -> f64 {
        self.evaluations += 1;
        if thicknesses
            .iter()
            .any(|&d| !(MIN_THICKNESS..=self.lambda0).contains(&d))
        {
            return f64::INFINITY;
        }
        if let Err(err) = self.coating.adjust_layers(thicknesses) {
            tracing::debug!("Rejected trial thicknesses: {}", err);
            return f64::INFINITY;
        }
        match (self.fom)(&self.coating) {
            Ok(value) if !value.is_nan() => value,
            Ok(_) => f64::INFINITY,
            Err(err) => {
                tracing::debug!("Figure of merit failed: {}", err);
                f64::INFINITY
            }
        }
    }
}

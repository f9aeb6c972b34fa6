//! Error taxonomy shared by the optical engine, material model and registry

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoatingError>;

/// Errors raised by material lookup, data loading and numerical evaluation.
///
/// Numeric-domain failures are reported here instead of leaking NaN into the
/// transfer-matrix arithmetic.
#[derive(Debug, Error)]
pub enum CoatingError {
    #[error("Undefined material {0}.")]
    MaterialNotDefined(String),

    #[error("Material {0} is already defined")]
    MaterialAlreadyDefined(String),

    #[error("Cannot read data file {path:?}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected format of data file {path:?} (line {line}): {reason}")]
    UnexpectedFileLayout {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Angle of incidence {0}° not in range 0..90 degrees")]
    InvalidAngleOfIncidence(f64),

    #[error("Wavelength must be positive and finite, got {0} nm")]
    InvalidWavelength(f64),

    #[error("Stack needs N >= 2 indices and N - 2 thicknesses, got {indices} indices and {thicknesses} thicknesses")]
    StackShape { indices: usize, thicknesses: usize },

    #[error("Position {position} is out of range for {count} entries")]
    PositionOutOfRange { position: usize, count: usize },

    #[error("Refractive index must be positive and finite, got {0}")]
    InvalidIndex(f64),

    #[error("Layer thickness must be non-negative and finite, got {0} nm")]
    InvalidThickness(f64),

    #[error("Total internal reflection: n1/n2 * sin(alpha1) = {ratio} for n1 = {n1}, n2 = {n2}")]
    TotalInternalReflection { n1: f64, n2: f64, ratio: f64 },

    #[error("Boundary reflectivity |rho| = {rho} leaves no transmitted amplitude")]
    OpaqueBoundary { rho: f64 },

    #[error("Sellmeier pole at {wavelength_nm} nm (C[{term}] = {c})")]
    SellmeierPole {
        wavelength_nm: f64,
        term: usize,
        c: f64,
    },

    #[error("Non-positive radicand {radicand} in dispersion formula at {wavelength_nm} nm")]
    NegativeRadicand { wavelength_nm: f64, radicand: f64 },

    #[error("{quantity} evaluated to a non-finite value")]
    NonFinite { quantity: &'static str },

    #[error("Coating has no layers")]
    EmptyCoating,

    #[error("Number of samples per layer must be at least 1")]
    InvalidSteps,

    #[error("Expected {expected} layer thicknesses, got {actual}")]
    LayerCountMismatch { expected: usize, actual: usize },

    #[error("Cannot parse job file {path:?}: {source}")]
    InvalidJobFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid definition for material {name}: {reason}")]
    InvalidMaterialSpec { name: String, reason: String },
}

impl CoatingError {
    /// True for the numeric-domain family (poles, radicands, TIR, non-finite results).
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            CoatingError::TotalInternalReflection { .. }
                | CoatingError::OpaqueBoundary { .. }
                | CoatingError::SellmeierPole { .. }
                | CoatingError::NegativeRadicand { .. }
                | CoatingError::NonFinite { .. }
        )
    }
}

/// Reject NaN results; infinities are legitimate for stiffness aggregates.
pub(crate) fn not_nan(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_nan() {
        Err(CoatingError::NonFinite { quantity })
    } else {
        Ok(value)
    }
}

pub(crate) fn check_wavelength(wavelength_nm: f64) -> Result<f64> {
    if wavelength_nm.is_finite() && wavelength_nm > 0.0 {
        Ok(wavelength_nm)
    } else {
        Err(CoatingError::InvalidWavelength(wavelength_nm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_classification() {
        assert!(CoatingError::NonFinite { quantity: "x" }.is_domain_error());
        assert!(!CoatingError::MaterialNotDefined("SiO2".into()).is_domain_error());
    }

    #[test]
    fn test_not_nan_allows_infinity() {
        assert_eq!(not_nan("Y", f64::INFINITY).unwrap(), f64::INFINITY);
        assert!(not_nan("Y", f64::NAN).is_err());
    }

    #[test]
    fn test_material_not_defined_message() {
        let err = CoatingError::MaterialNotDefined("Unobtainium".into());
        assert_eq!(err.to_string(), "Undefined material Unobtainium.");
    }
}

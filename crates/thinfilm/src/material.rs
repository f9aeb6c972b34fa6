//! Coating materials: refractive-index dispersion and mechanical constants

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::datafile::DataTable;
use crate::error::{check_wavelength, CoatingError, Result};

/// Sellmeier coefficients, evaluated with λ in µm
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sellmeier {
    pub b: [f64; 3],
    pub c: [f64; 3],
}

impl Sellmeier {
    /// n(λ) = sqrt(1 + Σ L·Bᵢ/(L − Cᵢ)), L = (λ_nm / 1000)²
    pub fn n(&self, wavelength_nm: f64) -> Result<f64> {
        let l = (wavelength_nm / 1000.0).powi(2);
        let mut sum = 0.0;
        for (term, (&b, &c)) in self.b.iter().zip(self.c.iter()).enumerate() {
            let denom = l - c;
            if denom == 0.0 {
                return Err(CoatingError::SellmeierPole { wavelength_nm, term, c });
            }
            if b == 0.0 {
                continue;
            }
            sum += l * b / denom;
        }

        let radicand = 1.0 + sum;
        if radicand.is_nan() || radicand <= 0.0 {
            return Err(CoatingError::NegativeRadicand { wavelength_nm, radicand });
        }
        let n = radicand.sqrt();
        if n.is_finite() {
            Ok(n)
        } else {
            Err(CoatingError::NonFinite { quantity: "Sellmeier index" })
        }
    }
}

/// Index data read from a two-column file the first time it is needed
#[derive(Debug, Clone)]
pub struct TabulatedIndex {
    path: PathBuf,
    data: OnceLock<DataTable>,
}

impl TabulatedIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: OnceLock::new(),
        }
    }

    /// Build from in-memory data; no file is ever read.
    pub fn from_table(path: impl Into<PathBuf>, table: DataTable) -> Self {
        Self {
            path: path.into(),
            data: OnceLock::from(table),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.data.get().is_some()
    }

    fn table(&self) -> Result<&DataTable> {
        if let Some(table) = self.data.get() {
            return Ok(table);
        }
        let table = DataTable::read(&self.path)?;
        Ok(self.data.get_or_init(|| table))
    }

    pub fn n(&self, wavelength_nm: f64) -> Result<f64> {
        let n = self.table()?.value(wavelength_nm);
        if n.is_finite() && n > 0.0 {
            Ok(n)
        } else {
            Err(CoatingError::InvalidIndex(n))
        }
    }
}

/// How the refractive index depends on wavelength
#[derive(Debug, Clone)]
pub enum Dispersion {
    Constant(f64),
    Sellmeier(Sellmeier),
    Tabulated(TabulatedIndex),
}

/// Mechanical constants used for coating thermal noise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mechanical {
    /// Young's modulus (Pa)
    pub youngs_modulus: f64,
    /// Poisson ratio
    pub poisson_ratio: f64,
    /// Loss angle (tan δ)
    pub loss_angle: f64,
}

impl Default for Mechanical {
    fn default() -> Self {
        Self {
            youngs_modulus: f64::INFINITY,
            poisson_ratio: 0.0,
            loss_angle: 0.0,
        }
    }
}

/// A coating material
#[derive(Debug, Clone)]
pub struct Material {
    name: Option<String>,
    notes: String,
    dispersion: Dispersion,
    mechanical: Mechanical,
}

impl Material {
    pub fn new(dispersion: Dispersion) -> Self {
        Self {
            name: None,
            notes: String::new(),
            dispersion,
            mechanical: Mechanical::default(),
        }
    }

    /// Wavelength independent index
    pub fn constant(n: f64) -> Self {
        Self::new(Dispersion::Constant(n))
    }

    pub fn sellmeier(b: [f64; 3], c: [f64; 3]) -> Self {
        Self::new(Dispersion::Sellmeier(Sellmeier { b, c }))
    }

    pub fn tabulated(path: impl Into<PathBuf>) -> Self {
        Self::new(Dispersion::Tabulated(TabulatedIndex::new(path)))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_mechanical(mut self, mechanical: Mechanical) -> Self {
        self.mechanical = mechanical;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn dispersion(&self) -> &Dispersion {
        &self.dispersion
    }

    pub fn mechanical(&self) -> &Mechanical {
        &self.mechanical
    }

    pub fn youngs_modulus(&self) -> f64 {
        self.mechanical.youngs_modulus
    }

    pub fn poisson_ratio(&self) -> f64 {
        self.mechanical.poisson_ratio
    }

    pub fn loss_angle(&self) -> f64 {
        self.mechanical.loss_angle
    }

    /// Refractive index at a vacuum wavelength in nm
    pub fn n(&self, wavelength_nm: f64) -> Result<f64> {
        check_wavelength(wavelength_nm)?;
        match &self.dispersion {
            Dispersion::Constant(n) => {
                if n.is_finite() && *n > 0.0 {
                    Ok(*n)
                } else {
                    Err(CoatingError::InvalidIndex(*n))
                }
            }
            Dispersion::Sellmeier(s) => s.n(wavelength_nm),
            Dispersion::Tabulated(t) => t.n(wavelength_nm),
        }
    }

    /// Equivalent Sellmeier coefficients; a constant index n maps to B₀ = n² − 1.
    /// Tabulated materials have none.
    pub fn sellmeier_coefficients(&self) -> Option<Sellmeier> {
        match &self.dispersion {
            Dispersion::Constant(n) => Some(Sellmeier {
                b: [n * n - 1.0, 0.0, 0.0],
                c: [0.0; 3],
            }),
            Dispersion::Sellmeier(s) => Some(*s),
            Dispersion::Tabulated(_) => None,
        }
    }

    /// Build from a serialized definition. Relative `n_file` paths resolve against `base_dir`.
    pub fn from_spec(name: &str, spec: &MaterialSpec, base_dir: Option<&Path>) -> Result<Self> {
        let invalid = |reason: &str| CoatingError::InvalidMaterialSpec {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let has_sellmeier = spec.b.is_some() || spec.c.is_some();
        let dispersion = match (&spec.n_file, spec.n, has_sellmeier) {
            (Some(file), None, false) if !file.is_empty() => {
                let path = PathBuf::from(file);
                let path = match base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path,
                };
                Dispersion::Tabulated(TabulatedIndex::new(path))
            }
            (Some(file), _, _) if !file.is_empty() => {
                return Err(invalid("n_file cannot be combined with n or B/C"));
            }
            (_, Some(_), true) => return Err(invalid("give either n or B/C, not both")),
            (_, Some(n), false) => {
                if !(n.is_finite() && n > 0.0) {
                    return Err(invalid("n must be positive"));
                }
                Dispersion::Constant(n)
            }
            (_, None, _) => Dispersion::Sellmeier(Sellmeier {
                b: spec.b.unwrap_or_default(),
                c: spec.c.unwrap_or_default(),
            }),
        };

        let mechanical = Mechanical {
            youngs_modulus: spec.youngs_modulus.unwrap_or(f64::INFINITY),
            poisson_ratio: spec.poisson_ratio.unwrap_or(0.0),
            loss_angle: spec.loss_angle.unwrap_or(0.0),
        };
        if mechanical.youngs_modulus.is_nan() || mechanical.youngs_modulus <= 0.0 {
            return Err(invalid("Y must be positive"));
        }

        Ok(Material::new(dispersion)
            .with_name(name)
            .with_notes(spec.notes.clone())
            .with_mechanical(mechanical))
    }

    /// Serializable definition of this material
    pub fn spec(&self) -> MaterialSpec {
        let (n, b, c, n_file) = match &self.dispersion {
            Dispersion::Constant(n) => (Some(*n), None, None, None),
            Dispersion::Sellmeier(s) => (None, Some(s.b), Some(s.c), None),
            Dispersion::Tabulated(t) => (None, None, None, Some(t.path().display().to_string())),
        };
        let finite = |v: f64| v.is_finite().then_some(v);
        MaterialSpec {
            n,
            b,
            c,
            n_file,
            youngs_modulus: finite(self.mechanical.youngs_modulus),
            poisson_ratio: Some(self.mechanical.poisson_ratio),
            loss_angle: Some(self.mechanical.loss_angle),
            notes: self.notes.clone(),
        }
    }
}

/// Serialized material definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    /// Constant refractive index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<f64>,
    #[serde(rename = "B", default, skip_serializing_if = "Option::is_none")]
    pub b: Option<[f64; 3]>,
    #[serde(rename = "C", default, skip_serializing_if = "Option::is_none")]
    pub c: Option<[f64; 3]>,
    /// Two-column (λ_nm, n) data file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_file: Option<String>,
    /// Young's modulus (Pa); absent means infinitely stiff
    #[serde(rename = "Y", default, skip_serializing_if = "Option::is_none")]
    pub youngs_modulus: Option<f64>,
    #[serde(rename = "sigma", default, skip_serializing_if = "Option::is_none")]
    pub poisson_ratio: Option<f64>,
    #[serde(rename = "phi", default, skip_serializing_if = "Option::is_none")]
    pub loss_angle: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

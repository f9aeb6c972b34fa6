//! thinfilm: optical and thermal-noise analysis of dielectric multilayer coatings
//!
//! This crate provides:
//! - Material models (constant index, Sellmeier, tabulated data) with mechanical constants
//! - A transfer-matrix engine for reflectivity, phase and field intensity of a layer stack
//! - Coating-level elastic/loss aggregation and Brownian thermal noise
//! - Sweeps, an optimizer objective and a text report driven by JSON job files
//!
//! Wavelengths and layer thicknesses are in nm, angles of incidence in degrees.
//! Mechanical quantities (beam size, coating thickness `d`) are in SI units.

pub mod error;
pub mod datafile;
pub mod material;
pub mod library;
pub mod fresnel;
pub mod stack;
pub mod coating;
pub mod sweep;
pub mod optimize;
pub mod config;
pub mod report;

pub use error::{CoatingError, Result};
pub use material::{Dispersion, Material, MaterialSpec, Mechanical, Sellmeier};
pub use library::MaterialLibrary;
pub use stack::{CacheState, EfiProfile, Phase, Polarized, Stack};
pub use coating::{Coating, Layer, MechanicalAggregate};
pub use config::{AnalysisConfig, Job, JobFile};
pub use optimize::ThicknessObjective;
pub use report::render_report;

use std::path::Path;

/// Main entry point: parse a JSON job and render its report
pub fn analyze(json: &str, base_dir: Option<&Path>) -> anyhow::Result<String> {
    let origin = base_dir.unwrap_or_else(|| Path::new("."));
    let job = JobFile::parse(json, origin)?.build(base_dir)?;
    let report = render_report(&job.coating, &job.analysis)?;
    Ok(report)
}

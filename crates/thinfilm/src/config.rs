//! JSON job files: material definitions, a coating and analysis settings

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::coating::Coating;
use crate::error::{CoatingError, Result};
use crate::library::MaterialLibrary;
use crate::material::MaterialSpec;
use crate::stack::DEFAULT_EFI_STEPS;

/// Top-level job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialSpec>,
    pub coating: CoatingSpec,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Coating layout; every key goes through the material registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoatingSpec {
    pub superstrate: String,
    pub substrate: String,
    /// `[key, thickness_nm]` pairs from the superstrate side
    #[serde(default)]
    pub layers: Vec<(String, f64)>,
}

/// Analysis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Design wavelength in nm
    #[serde(default = "default_lambda0")]
    pub lambda0: f64,
    /// Angle of incidence in degrees
    #[serde(default)]
    pub aoi: f64,
    /// Beam radius in µm
    #[serde(default = "default_beam_size")]
    pub beam_size: f64,
    /// Temperature in K
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Samples per sweep
    #[serde(default = "default_steps")]
    pub steps: usize,
    /// EFI samples per layer
    #[serde(default = "default_efi_steps")]
    pub efi_steps: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda_max: Option<f64>,
    #[serde(default = "default_freq_min")]
    pub freq_min: f64,
    #[serde(default = "default_freq_max")]
    pub freq_max: f64,
}

fn default_lambda0() -> f64 {
    1064.0
}
fn default_beam_size() -> f64 {
    62.0
}
fn default_temperature() -> f64 {
    290.0
}
fn default_steps() -> usize {
    200
}
fn default_efi_steps() -> usize {
    DEFAULT_EFI_STEPS
}
fn default_freq_min() -> f64 {
    1.0
}
fn default_freq_max() -> f64 {
    1e4
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            lambda0: default_lambda0(),
            aoi: 0.0,
            beam_size: default_beam_size(),
            temperature: default_temperature(),
            steps: default_steps(),
            efi_steps: default_efi_steps(),
            lambda_min: None,
            lambda_max: None,
            freq_min: default_freq_min(),
            freq_max: default_freq_max(),
        }
    }
}

impl AnalysisConfig {
    /// Spectrum range in nm, ±30 % around λ₀ unless set
    pub fn wavelength_range(&self) -> (f64, f64) {
        (
            self.lambda_min.unwrap_or(0.7 * self.lambda0),
            self.lambda_max.unwrap_or(1.3 * self.lambda0),
        )
    }

    /// Beam radius in m
    pub fn beam_size_m(&self) -> f64 {
        self.beam_size * 1e-6
    }
}

/// A loaded job: registry, coating and settings
#[derive(Debug)]
pub struct Job {
    pub library: MaterialLibrary,
    pub coating: Coating,
    pub analysis: AnalysisConfig,
}

impl JobFile {
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|source| CoatingError::InvalidJobFile {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CoatingError::UnreadableFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Build the registry and coating. Relative data paths resolve against `base_dir`.
    pub fn build(self, base_dir: Option<&Path>) -> Result<Job> {
        let mut library = MaterialLibrary::new();
        library.load_materials(&self.materials, base_dir)?;
        let coating = Coating::from_library(
            &library,
            &self.coating.superstrate,
            &self.coating.substrate,
            &self.coating.layers,
        )?;
        Ok(Job {
            library,
            coating,
            analysis: self.analysis,
        })
    }

    /// Describe an existing registry and coating
    pub fn from_job(job: &Job) -> Self {
        let key = |m: &crate::material::Material| match m.name() {
            Some(name) => name.to_string(),
            None => m.spec().n.map(|n| n.to_string()).unwrap_or_default(),
        };
        JobFile {
            materials: job.library.save_materials(),
            coating: CoatingSpec {
                superstrate: key(job.coating.superstrate()),
                substrate: key(job.coating.substrate()),
                layers: job
                    .coating
                    .layers()
                    .iter()
                    .map(|l| (key(l.material()), l.thickness()))
                    .collect(),
            },
            analysis: job.analysis.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| CoatingError::InvalidJobFile {
            path: Default::default(),
            source,
        })
    }
}

impl Job {
    /// Read a job file, resolving data files next to it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        JobFile::read(path)?.build(path.parent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const JOB: &str = r#"{
        "materials": {
            "SiO2": { "B": [0.6961663, 0.4079426, 0.8974794],
                      "C": [0.00467914826, 0.0135120631, 97.9340025],
                      "Y": 7.2e10, "sigma": 0.17, "phi": 4e-5 },
            "Ta2O5": { "n": 2.06, "Y": 1.4e11, "sigma": 0.23, "phi": 2.3e-4 }
        },
        "coating": {
            "superstrate": "1.0",
            "substrate": "SiO2",
            "layers": [["Ta2O5", 129.1], ["SiO2", 183.5]]
        },
        "analysis": { "lambda0": 1550, "steps": 50 }
    }"#;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.lambda0, 1064.0);
        assert_eq!(config.efi_steps, 30);
        let (lo, hi) = config.wavelength_range();
        assert!((lo - 744.8).abs() < 1e-9);
        assert!((hi - 1383.2).abs() < 1e-9);
        assert!((config.beam_size_m() - 62e-6).abs() < 1e-18);
    }

    #[test]
    fn test_parse_job() {
        let file = JobFile::parse(JOB, Path::new("job.json")).unwrap();
        assert_eq!(file.materials.len(), 2);
        assert_eq!(file.analysis.lambda0, 1550.0);
        assert_eq!(file.analysis.steps, 50);
        // unspecified fields fall back to defaults
        assert_eq!(file.analysis.temperature, 290.0);
        assert_eq!(file.coating.layers[1], ("SiO2".to_string(), 183.5));

        let job = file.build(None).unwrap();
        assert_eq!(job.library.list_materials(), vec!["SiO2", "Ta2O5"]);
        assert_eq!(job.coating.layers().len(), 2);
        assert!((job.coating.thickness() - 312.6).abs() < 1e-9);
        assert_eq!(job.coating.substrate().youngs_modulus(), 7.2e10);
    }

    #[test]
    fn test_missing_analysis_section() {
        let json = r#"{ "coating": { "superstrate": "1.0", "substrate": "1.5" } }"#;
        let file = JobFile::parse(json, Path::new("job.json")).unwrap();
        assert_eq!(file.analysis, AnalysisConfig::default());
        assert!(file.coating.layers.is_empty());
    }

    #[test]
    fn test_undefined_layer_material() {
        let json = r#"{ "coating": { "superstrate": "1.0", "substrate": "1.5",
                        "layers": [["HfO2", 100]] } }"#;
        let err = JobFile::parse(json, Path::new("job.json"))
            .unwrap()
            .build(None)
            .unwrap_err();
        assert!(matches!(err, CoatingError::MaterialNotDefined(name) if name == "HfO2"));
    }

    #[test]
    fn test_malformed_json() {
        let err = JobFile::parse("{ coating: ", Path::new("broken.json")).unwrap_err();
        assert!(matches!(err, CoatingError::InvalidJobFile { .. }));
    }

    #[test]
    fn test_round_trip_through_job() {
        let job = JobFile::parse(JOB, Path::new("job.json")).unwrap().build(None).unwrap();
        let file = JobFile::from_job(&job);
        assert_eq!(file.coating.superstrate, "1");
        assert_eq!(file.coating.substrate, "SiO2");

        let reparsed = JobFile::parse(&file.to_json().unwrap(), Path::new("again.json")).unwrap();
        assert_eq!(reparsed.coating, file.coating);
        assert_eq!(
            reparsed.materials.keys().collect::<Vec<_>>(),
            file.materials.keys().collect::<Vec<_>>()
        );
        let rebuilt = reparsed.build(None).unwrap();
        assert!((rebuilt.coating.reflectivity(1550.0, 0.0).unwrap().s
            - job.coating.reflectivity(1550.0, 0.0).unwrap().s)
            .abs()
            < 1e-12);
    }
}

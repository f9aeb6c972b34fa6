//! Coatings: materials and thicknesses bound to a superstrate and substrate
//!
//! A [`Coating`] builds a [`Stack`] for any wavelength/AOI on demand and
//! aggregates the per-layer mechanical constants into the effective loss
//! angle used for Brownian thermal noise.

use std::f64::consts::PI;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{not_nan, CoatingError, Result};
use crate::library::MaterialLibrary;
use crate::material::Material;
use crate::stack::{Polarized, Stack};

/// Boltzmann constant (J/K)
pub const BOLTZMANN: f64 = 1.3806503e-23;

/// One layer of a coating
#[derive(Debug, Clone)]
pub struct Layer {
    material: Arc<Material>,
    /// nm
    thickness: f64,
    /// m
    d: f64,
}

impl Layer {
    pub fn new(material: Arc<Material>, thickness_nm: f64) -> Result<Self> {
        let mut layer = Self {
            material,
            thickness: 0.0,
            d: 0.0,
        };
        layer.set_thickness(thickness_nm)?;
        Ok(layer)
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// Geometric thickness in nm
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Geometric thickness in m
    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn set_thickness(&mut self, thickness_nm: f64) -> Result<()> {
        if !(thickness_nm.is_finite() && thickness_nm >= 0.0) {
            return Err(CoatingError::InvalidThickness(thickness_nm));
        }
        self.thickness = thickness_nm;
        self.d = thickness_nm * 1e-9;
        Ok(())
    }
}

/// Coating-level elastic and loss figures
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MechanicalAggregate {
    pub y_para: f64,
    pub y_perp: f64,
    pub phi_para: f64,
    pub phi_perp: f64,
    pub sigma_para: f64,
    pub sigma_perp: f64,
}

#[derive(Debug, Clone)]
pub struct Coating {
    superstrate: Arc<Material>,
    substrate: Arc<Material>,
    layers: Vec<Layer>,
}

impl Coating {
    /// Layers are ordered from the superstrate side towards the substrate.
    pub fn new(superstrate: Arc<Material>, substrate: Arc<Material>, layers: Vec<Layer>) -> Self {
        Self {
            superstrate,
            substrate,
            layers,
        }
    }

    /// Resolve material keys (names or index literals) through a registry.
    pub fn from_library<S: AsRef<str>>(
        library: &MaterialLibrary,
        superstrate: &str,
        substrate: &str,
        layers: &[(S, f64)],
    ) -> Result<Self> {
        let layers = layers
            .iter()
            .map(|(key, thickness)| Layer::new(library.get_material(key.as_ref())?, *thickness))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(
            library.get_material(superstrate)?,
            library.get_material(substrate)?,
            layers,
        ))
    }

    pub fn superstrate(&self) -> &Arc<Material> {
        &self.superstrate
    }

    pub fn substrate(&self) -> &Arc<Material> {
        &self.substrate
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Total thickness in nm
    pub fn thickness(&self) -> f64 {
        self.layers.iter().map(Layer::thickness).sum()
    }

    /// Total thickness in m
    pub fn d(&self) -> f64 {
        self.thickness() * 1e-9
    }

    /// Optical stack at a wavelength (nm) and angle of incidence (degrees)
    pub fn create_stack(&self, wavelength_nm: f64, aoi: f64) -> Result<Stack> {
        let mut indices = Vec::with_capacity(self.layers.len() + 2);
        indices.push(self.superstrate.n(wavelength_nm)?);
        for layer in &self.layers {
            indices.push(layer.material.n(wavelength_nm)?);
        }
        indices.push(self.substrate.n(wavelength_nm)?);

        let thicknesses = self.layers.iter().map(Layer::thickness).collect();
        Stack::new(indices, thicknesses, aoi)
    }

    pub fn reflectivity(&self, wavelength_nm: f64, aoi: f64) -> Result<Polarized> {
        self.create_stack(wavelength_nm, aoi)?.reflectivity(wavelength_nm)
    }

    pub fn transmission(&self, wavelength_nm: f64, aoi: f64) -> Result<Polarized> {
        Ok(self.reflectivity(wavelength_nm, aoi)?.complement())
    }

    /// Append `repeat` copies of `layers`, with thickness given as optical
    /// thickness in wavelengths at `wavelength_nm` (0.25 = quarter wave).
    pub fn add_layers(
        &mut self,
        layers: &[(Arc<Material>, f64)],
        wavelength_nm: f64,
        repeat: usize,
    ) -> Result<()> {
        let new_layers = layers
            .iter()
            .map(|(material, fraction)| {
                let thickness = fraction * wavelength_nm / material.n(wavelength_nm)?;
                Layer::new(Arc::clone(material), thickness)
            })
            .collect::<Result<Vec<_>>>()?;
        self.add_layers_direct(&new_layers, repeat);
        Ok(())
    }

    /// Append `repeat` copies of layers with geometric thicknesses.
    pub fn add_layers_direct(&mut self, layers: &[Layer], repeat: usize) {
        for _ in 0..repeat {
            self.layers.extend_from_slice(layers);
        }
    }

    /// Overwrite every layer thickness (nm), in order.
    pub fn adjust_layers(&mut self, thicknesses: &[f64]) -> Result<()> {
        if thicknesses.len() != self.layers.len() {
            return Err(CoatingError::LayerCountMismatch {
                expected: self.layers.len(),
                actual: thicknesses.len(),
            });
        }
        if let Some(&bad) = thicknesses.iter().find(|t| !(t.is_finite() && **t >= 0.0)) {
            return Err(CoatingError::InvalidThickness(bad));
        }
        for (layer, &t) in self.layers.iter_mut().zip(thicknesses) {
            layer.set_thickness(t)?;
        }
        Ok(())
    }

    fn mechanical_layers(&self) -> Result<(f64, impl Iterator<Item = (f64, &Material)> + '_)> {
        if self.layers.is_empty() {
            return Err(CoatingError::EmptyCoating);
        }
        Ok((
            self.d(),
            self.layers.iter().map(|l| (l.d, l.material.as_ref())),
        ))
    }

    /// Parallel Young's modulus, thickness-weighted mean
    pub fn y_para(&self) -> Result<f64> {
        let (d, layers) = self.mechanical_layers()?;
        let sum: f64 = layers.map(|(di, m)| di * m.youngs_modulus()).sum();
        not_nan("Y_parallel", sum / d)
    }

    /// Perpendicular Young's modulus, series combination
    pub fn y_perp(&self) -> Result<f64> {
        let (d, layers) = self.mechanical_layers()?;
        let sum: f64 = layers.map(|(di, m)| di / m.youngs_modulus()).sum();
        not_nan("Y_perp", d / sum)
    }

    pub fn phi_para(&self) -> Result<f64> {
        let y_para = self.y_para()?;
        let (d, layers) = self.mechanical_layers()?;
        let sum: f64 = layers
            .map(|(di, m)| m.youngs_modulus() * m.loss_angle() * di)
            .sum();
        not_nan("phi_parallel", sum / (d * y_para))
    }

    pub fn phi_perp(&self) -> Result<f64> {
        let y_perp = self.y_perp()?;
        let (d, layers) = self.mechanical_layers()?;
        let sum: f64 = layers
            .map(|(di, m)| di * m.loss_angle() / m.youngs_modulus())
            .sum();
        not_nan("phi_perp", y_perp / d * sum)
    }

    /// Unweighted mean of the layer Poisson ratios
    pub fn sigma_para(&self) -> Result<f64> {
        let (_, layers) = self.mechanical_layers()?;
        let sum: f64 = layers.map(|(_, m)| m.poisson_ratio()).sum();
        not_nan("sigma_parallel", sum / self.layers.len() as f64)
    }

    pub fn sigma_perp(&self) -> Result<f64> {
        let (_, layers) = self.mechanical_layers()?;
        let (num, den) = layers.fold((0.0, 0.0), |(num, den), (di, m)| {
            let yd = m.youngs_modulus() * di;
            (num + m.poisson_ratio() * yd, den + yd)
        });
        not_nan("sigma_perp", num / den)
    }

    pub fn mechanical_aggregate(&self) -> Result<MechanicalAggregate> {
        Ok(MechanicalAggregate {
            y_para: self.y_para()?,
            y_perp: self.y_perp()?,
            phi_para: self.phi_para()?,
            phi_perp: self.phi_perp()?,
            sigma_para: self.sigma_para()?,
            sigma_perp: self.sigma_perp()?,
        })
    }

    /// Effective coating loss angle for a Gaussian beam of radius `beam_size` (m)
    pub fn phi(&self, beam_size: f64) -> Result<f64> {
        if !(beam_size.is_finite() && beam_size > 0.0) {
            return Err(CoatingError::NonFinite { quantity: "beam size" });
        }
        let MechanicalAggregate {
            y_para,
            y_perp,
            phi_para,
            phi_perp,
            sigma_para,
            sigma_perp,
        } = self.mechanical_aggregate()?;
        let d = self.d();
        let y_sub = self.substrate.youngs_modulus();
        let sigma_sub = self.substrate.poisson_ratio();

        let phi = d / (PI.sqrt() * beam_size * y_perp)
            * (phi_perp
                * (y_sub / (1.0 - sigma_sub.powi(2))
                    - 2.0 * sigma_perp.powi(2) * y_sub * y_para
                        / (y_perp * (1.0 - sigma_sub.powi(2)) * (1.0 - sigma_para)))
                + y_para * sigma_perp * (1.0 - 2.0 * sigma_sub)
                    / ((1.0 - sigma_para) * (1.0 - sigma_sub))
                    * (phi_para - phi_perp)
                + y_para * y_perp * (1.0 + sigma_sub) * (phi_para * (1.0 - 2.0 * sigma_sub).powi(2))
                    / (y_sub * (1.0 - sigma_para.powi(2)) * (1.0 - sigma_sub)));

        if phi.is_finite() {
            Ok(phi)
        } else {
            Err(CoatingError::NonFinite { quantity: "effective loss angle" })
        }
    }

    /// Brownian displacement noise power spectral density (m²/Hz)
    pub fn brownian_noise(&self, frequency: f64, beam_size: f64, temperature: f64) -> Result<f64> {
        let y_sub = self.substrate.youngs_modulus();
        let sigma_sub = self.substrate.poisson_ratio();
        let psd = 2.0 * BOLTZMANN * temperature
            / (PI.powi(3).sqrt() * frequency * beam_size * y_sub)
            * (1.0 - sigma_sub.powi(2))
            * self.phi(beam_size)?;
        if psd.is_finite() {
            Ok(psd)
        } else {
            Err(CoatingError::NonFinite { quantity: "Brownian noise" })
        }
    }
}

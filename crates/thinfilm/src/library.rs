//! Per-session material registry

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::error::{CoatingError, Result};
use crate::material::{Material, MaterialSpec};

/// Named materials for one project/session.
///
/// Lookups hand out shared references; unregistering a material only removes
/// it from the registry, layers already holding it keep working.
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: HashMap<String, Arc<Material>>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named material. Anonymous materials and duplicate names are rejected.
    pub fn register(&mut self, material: Material) -> Result<Arc<Material>> {
        let name = material
            .name()
            .ok_or_else(|| CoatingError::InvalidMaterialSpec {
                name: String::new(),
                reason: "only named materials can be registered".to_string(),
            })?
            .to_string();

        if self.materials.contains_key(&name) {
            return Err(CoatingError::MaterialAlreadyDefined(name));
        }
        let material = Arc::new(material);
        self.materials.insert(name, Arc::clone(&material));
        Ok(material)
    }

    pub fn unregister(&mut self, name: &str) -> Option<Arc<Material>> {
        self.materials.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn list_materials(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a key: a positive numeric literal yields a fresh constant-index
    /// material, anything else must be a registered name.
    pub fn get_material(&self, key: &str) -> Result<Arc<Material>> {
        if let Some(n) = parse_index_literal(key) {
            return Ok(Arc::new(Material::constant(n)));
        }
        self.materials
            .get(key)
            .cloned()
            .ok_or_else(|| CoatingError::MaterialNotDefined(key.to_string()))
    }

    /// Replace the registry contents with a set of definitions.
    pub fn load_materials(
        &mut self,
        specs: &BTreeMap<String, MaterialSpec>,
        base_dir: Option<&Path>,
    ) -> Result<()> {
        self.materials.clear();
        for (name, spec) in specs {
            self.register(Material::from_spec(name, spec, base_dir)?)?;
        }
        tracing::info!("Loaded {} materials", self.materials.len());
        Ok(())
    }

    /// Definitions of all registered materials
    pub fn save_materials(&self) -> BTreeMap<String, MaterialSpec> {
        self.materials
            .iter()
            .map(|(name, m)| (name.clone(), m.spec()))
            .collect()
    }
}

fn parse_index_literal(key: &str) -> Option<f64> {
    key.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_and_lookup() {
        let mut lib = MaterialLibrary::new();
        lib.register(Material::constant(1.44).with_name("TestMaterial")).unwrap();

        assert!(lib.contains("TestMaterial"));
        assert_eq!(lib.get_material("TestMaterial").unwrap().n(1.0).unwrap(), 1.44);
        assert_eq!(lib.get_material("3.0").unwrap().n(1.0).unwrap(), 3.0);
        assert!(matches!(
            lib.get_material("UndefinedMaterial"),
            Err(CoatingError::MaterialNotDefined(_))
        ));
    }

    #[test]
    fn test_duplicate_name() {
        let mut lib = MaterialLibrary::new();
        lib.register(Material::constant(1.44).with_name("TestMaterial")).unwrap();
        let err = lib
            .register(Material::constant(2.0).with_name("TestMaterial"))
            .unwrap_err();
        assert!(matches!(err, CoatingError::MaterialAlreadyDefined(name) if name == "TestMaterial"));
        // the original entry is untouched
        assert_eq!(lib.get_material("TestMaterial").unwrap().n(1.0).unwrap(), 1.44);
    }

    #[test]
    fn test_anonymous_material_cannot_register() {
        let mut lib = MaterialLibrary::new();
        assert!(lib.register(Material::constant(1.5)).is_err());
    }

    #[test]
    fn test_numeric_keys_are_independent() {
        let lib = MaterialLibrary::new();
        let a = lib.get_material("1.45").unwrap();
        let b = lib.get_material("1.45").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(a.name().is_none());
        // non-positive literals are not indices
        assert!(lib.get_material("-1.0").is_err());
        assert!(lib.get_material("inf").is_err());
    }

    #[test]
    fn test_unregister_keeps_held_references() {
        let mut lib = MaterialLibrary::new();
        let held = lib.register(Material::constant(2.1).with_name("Ta2O5")).unwrap();
        assert!(lib.unregister("Ta2O5").is_some());
        assert!(lib.get_material("Ta2O5").is_err());
        assert_eq!(held.n(1064.0).unwrap(), 2.1);
        // the name is free again
        assert!(lib.register(Material::constant(2.0).with_name("Ta2O5")).is_ok());
    }

    #[test]
    fn test_load_and_list() {
        let specs: BTreeMap<String, MaterialSpec> = serde_json::from_str(
            r#"{
                "SiO2": {"n": 1.45, "Y": 7.2e10, "sigma": 0.17, "phi": 4e-5},
                "Ta2O5": {"n": 2.06, "Y": 1.4e11, "sigma": 0.23, "phi": 2.3e-4}
            }"#,
        )
        .unwrap();

        let mut lib = MaterialLibrary::new();
        lib.register(Material::constant(9.9).with_name("Stale")).unwrap();
        lib.load_materials(&specs, None).unwrap();

        assert_eq!(lib.list_materials(), vec!["SiO2", "Ta2O5"]);
        assert_eq!(lib.save_materials(), specs_with_defaults(&specs));
    }

    fn specs_with_defaults(specs: &BTreeMap<String, MaterialSpec>) -> BTreeMap<String, MaterialSpec> {
        specs
            .iter()
            .map(|(k, v)| {
                let mut v = v.clone();
                v.poisson_ratio.get_or_insert(0.0);
                v.loss_angle.get_or_insert(0.0);
                (k.clone(), v)
            })
            .collect()
    }
}

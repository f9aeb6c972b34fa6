//! End-to-end checks of the optical engine through the public API

use std::sync::Arc;

use thinfilm::{Coating, CoatingError, Material, MaterialLibrary, Mechanical};

const DICHROIC: [f64; 16] = [
    364.0, 114.0, 181.0, 113.0, 181.0, 113.0, 178.0, 112.0, 178.0, 115.0, 178.0, 111.0, 173.0, 108.0,
    196.0, 129.0,
];

fn dichroic() -> Coating {
    let lib = MaterialLibrary::new();
    let layers: Vec<(&str, f64)> = DICHROIC
        .iter()
        .enumerate()
        .map(|(i, &d)| (if i % 2 == 0 { "1.45" } else { "2.35" }, d))
        .collect();
    Coating::from_library(&lib, "1.0", "1.52", &layers).unwrap()
}

#[test]
fn dichroic_reflects_1064_and_transmits_808() {
    let coating = dichroic();
    let r1064 = coating.reflectivity(1064.0, 0.0).unwrap();
    let r808 = coating.reflectivity(808.0, 0.0).unwrap();
    assert!((r1064.s - 0.99863176).abs() < 5e-9);
    assert!((r1064.s - 0.99863).abs() < 5e-6);
    assert!((r808.s - 0.000242).abs() < 5e-7);
    // s and p coincide at normal incidence
    assert!((r1064.s - r1064.p).abs() < 1e-12);
}

#[test]
fn stack_reuse_matches_fresh_evaluation() {
    let coating = dichroic();
    let mut stack = coating.create_stack(1064.0, 0.0).unwrap();
    let first = stack.reflectivity(1064.0).unwrap();
    stack.set_angle_of_incidence(30.0).unwrap();
    let tilted = stack.reflectivity(1064.0).unwrap();
    stack.set_angle_of_incidence(0.0).unwrap();
    let back = stack.reflectivity(1064.0).unwrap();

    assert_eq!(first, back);
    assert!((tilted.s - 0.9990482095).abs() < 5e-9);
    assert!((tilted.p - 0.9959060877).abs() < 5e-9);
    let counts = stack.update_counts();
    assert_eq!(counts.angles, 3);
    assert_eq!(counts.rhos, 3);
}

#[test]
fn efi_of_dichroic_covers_whole_stack() {
    let coating = dichroic();
    let stack = coating.create_stack(1064.0, 0.0).unwrap();
    let efi = stack.efi(1064.0, 30).unwrap();
    assert_eq!(efi.len(), 18 * 30);
    assert!((efi.positions[0] - (-532.0)).abs() < 1e-9);
    assert!((efi.positions[efi.len() - 1] - 2894.0).abs() < 1e-9);
    assert!(efi.intensity.iter().all(|i| i.is_finite() && *i >= 0.0));
}

#[test]
fn quarter_wave_mirror_noise() {
    let silica = Arc::new(Material::constant(1.45).with_name("SiO2").with_mechanical(Mechanical {
        youngs_modulus: 7.2e10,
        poisson_ratio: 0.17,
        loss_angle: 4e-5,
    }));
    let tantala = Arc::new(Material::constant(2.06).with_name("Ta2O5").with_mechanical(Mechanical {
        youngs_modulus: 1.4e11,
        poisson_ratio: 0.23,
        loss_angle: 2.3e-4,
    }));
    let mut coating = Coating::new(Arc::new(Material::constant(1.0)), Arc::clone(&silica), vec![]);
    coating.add_layers(&[(silica, 0.25), (tantala, 0.25)], 1064.0, 8).unwrap();

    let phi = coating.phi(62e-6).unwrap();
    assert!((phi - 4.8334552869472905e-06).abs() < 1e-15);
    let asd = coating.brownian_noise(1.0, 62e-6, 290.0).unwrap().sqrt();
    assert!((asd - 3.888590177861633e-17).abs() < 1e-25);
}

#[test]
fn grazing_incidence_into_denser_superstrate_fails() {
    // glass superstrate, air layer: TIR beyond ~41.8°
    let lib = MaterialLibrary::new();
    let coating = Coating::from_library(&lib, "1.5", "1.5", &[("1.0", 100.0)]).unwrap();
    assert!(coating.reflectivity(1064.0, 30.0).is_ok());
    let err = coating.reflectivity(1064.0, 60.0).unwrap_err();
    assert!(matches!(err, CoatingError::TotalInternalReflection { .. }));
}

//! Loading job files from disk

use std::fs;

use pretty_assertions::assert_eq;
use thinfilm::{analyze, CoatingError, Dispersion, Job};

const JOB: &str = r#"{
    "materials": {
        "AlGaAs": { "n_file": "algaas.txt", "notes": "measured" },
        "SiO2": { "n": 1.45, "Y": 7.2e10, "sigma": 0.17, "phi": 4e-5 }
    },
    "coating": {
        "superstrate": "1.0",
        "substrate": "SiO2",
        "layers": [["AlGaAs", 100.0], ["SiO2", 150.0]]
    },
    "analysis": { "lambda0": 1000, "steps": 3, "efi_steps": 2 }
}"#;

const INDEX_DATA: &str = "# lambda_nm n\n900 3.10\n1000 3.00\n1100 2.95\n";

#[test]
fn relative_data_files_resolve_next_to_the_job() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("algaas.txt"), INDEX_DATA).unwrap();
    let job_path = dir.path().join("mirror.json");
    fs::write(&job_path, JOB).unwrap();

    let job = Job::load(&job_path).unwrap();
    assert_eq!(job.library.list_materials(), vec!["AlGaAs", "SiO2"]);

    let algaas = job.coating.layers()[0].material();
    assert_eq!(algaas.notes(), "measured");
    match algaas.dispersion() {
        Dispersion::Tabulated(table) => {
            assert_eq!(table.path(), dir.path().join("algaas.txt"));
            assert!(!table.is_loaded());
        }
        other => panic!("unexpected dispersion {:?}", other),
    }
    assert!((algaas.n(950.0).unwrap() - 3.05).abs() < 1e-12);

    let stack = job.coating.create_stack(1000.0, 0.0).unwrap();
    assert_eq!(stack.indices(), &[1.0, 3.0, 1.45, 1.45]);
}

#[test]
fn missing_data_file_surfaces_on_first_use() {
    let dir = tempfile::tempdir().unwrap();
    let job_path = dir.path().join("mirror.json");
    fs::write(&job_path, JOB).unwrap();

    let job = Job::load(&job_path).unwrap();
    let err = job.coating.reflectivity(1000.0, 0.0).unwrap_err();
    assert!(matches!(err, CoatingError::UnreadableFile { .. }));
}

#[test]
fn missing_job_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Job::load(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, CoatingError::UnreadableFile { .. }));
}

#[test]
fn analyze_with_base_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("algaas.txt"), INDEX_DATA).unwrap();
    let report = analyze(JOB, Some(dir.path())).unwrap();
    assert!(report.contains("AlGaAs"));
    assert!(report.contains("## Electric field intensity"));
}

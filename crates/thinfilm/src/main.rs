//! coating-calc: CLI tool for analysing dielectric coatings described in JSON job files

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use thinfilm::{render_report, Job};

#[derive(Parser, Debug)]
#[command(name = "coating-calc")]
#[command(about = "Reflectivity, field intensity and thermal noise of multilayer coatings")]
#[command(version)]
struct Args {
    /// Input JSON job file (materials, coating, analysis)
    #[arg(short, long)]
    input: PathBuf,

    /// Output report file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Design wavelength in nm
    #[arg(long)]
    wavelength: Option<f64>,

    /// Angle of incidence in degrees
    #[arg(long)]
    aoi: Option<f64>,

    /// Beam radius in µm
    #[arg(long)]
    beam_size: Option<f64>,

    /// Temperature in K
    #[arg(long)]
    temperature: Option<f64>,

    /// Samples per sweep
    #[arg(long)]
    steps: Option<usize>,

    /// Print the report to stdout instead of a file
    #[arg(long)]
    stdout: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    let mut job = Job::load(&args.input)
        .with_context(|| format!("Failed to load job file: {:?}", args.input))?;

    // Command-line overrides
    let analysis = &mut job.analysis;
    if let Some(wavelength) = args.wavelength {
        analysis.lambda0 = wavelength;
    }
    if let Some(aoi) = args.aoi {
        analysis.aoi = aoi;
    }
    if let Some(beam_size) = args.beam_size {
        analysis.beam_size = beam_size;
    }
    if let Some(temperature) = args.temperature {
        analysis.temperature = temperature;
    }
    if let Some(steps) = args.steps {
        analysis.steps = steps;
    }

    tracing::info!(
        "Analysing {} layers at {} nm",
        job.coating.layers().len(),
        job.analysis.lambda0
    );
    let report = render_report(&job.coating, &job.analysis).context("Analysis failed")?;

    match args.output {
        Some(path) if !args.stdout => {
            fs::write(&path, &report)
                .with_context(|| format!("Failed to write output file: {:?}", path))?;
            eprintln!("Wrote coating report: {:?}", path);
        }
        _ => println!("{}", report),
    }

    Ok(())
}

//! Plain-text coating report

use anyhow::Result;
use minijinja::{context, Environment};

use crate::coating::Coating;
use crate::config::AnalysisConfig;
use crate::material::{Dispersion, Material};
use crate::stack::Polarized;
use crate::sweep::{self, Curve};

const REPORT_TEMPLATE: &str = r##"# Coating report
# Generated: {{ timestamp }}
#
# Design wavelength: {{ lambda0 }} nm
# Angle of incidence: {{ aoi }} deg

## Layers
# superstrate  {{ superstrate }}
{% for layer in layers -%}
{{ layer.index }}  {{ layer.material }}  {{ layer.thickness }} nm  n = {{ layer.n }}
{% endfor -%}
# substrate    {{ substrate }}
# total thickness: {{ total_thickness }} nm

## Optical properties at {{ lambda0 }} nm
R_s = {{ r.s }}    R_p = {{ r.p }}
T_s = {{ t.s }}    T_p = {{ t.p }}
phi_s = {{ phase.s }}  phi_p = {{ phase.p }}  delta = {{ phase.delta }} rad

## Mechanical properties
{% if mechanics -%}
Y_para     = {{ mechanics.y_para }} Pa
Y_perp     = {{ mechanics.y_perp }} Pa
phi_para   = {{ mechanics.phi_para }}
phi_perp   = {{ mechanics.phi_perp }}
sigma_para = {{ mechanics.sigma_para }}
sigma_perp = {{ mechanics.sigma_perp }}
{% if phi_eff -%}
phi_eff({{ beam_size }} um) = {{ phi_eff }}
{% endif -%}
{% else -%}
# not available: {{ mechanics_error }}
{% endif %}
## Reflectivity spectrum
# lambda_nm  R_s  R_p
{% for row in spectrum -%}
{{ row.x }}  {{ row.s }}  {{ row.p }}
{% endfor %}
## Electric field intensity (normal incidence)
# depth_nm  |E|^2
{% for row in efi -%}
{{ row.x }}  {{ row.i }}
{% endfor -%}
{% if noise %}
## Brownian noise at {{ temperature }} K
# f_Hz  m/sqrt(Hz)
{% for row in noise -%}
{{ row.x }}  {{ row.a }}
{% endfor -%}
{% endif -%}
"##;

/// Display name: registry name, or the index for anonymous constant materials
pub fn material_label(material: &Material) -> String {
    match (material.name(), material.dispersion()) {
        (Some(name), _) => name.to_string(),
        (None, Dispersion::Constant(n)) => format!("n={}", n),
        (None, _) => "(unnamed)".to_string(),
    }
}

fn fixed(value: f64, precision: usize) -> String {
    format!("{:.*}", precision, value)
}

fn sci(value: f64) -> String {
    format!("{:.6e}", value)
}

pub fn render_report(coating: &Coating, config: &AnalysisConfig) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("report", REPORT_TEMPLATE)?;
    let template = env.get_template("report")?;

    let lambda0 = config.lambda0;
    let mut stack = coating.create_stack(lambda0, config.aoi)?;
    let r = stack.reflectivity(lambda0)?;
    let t = r.complement();
    let phase = stack.phase(lambda0)?;

    let layers: Vec<_> = coating
        .layers()
        .iter()
        .enumerate()
        .map(|(i, layer)| -> Result<_> {
            Ok(context! {
                index => i + 1,
                material => material_label(layer.material()),
                thickness => fixed(layer.thickness(), 3),
                n => fixed(layer.material().n(lambda0)?, 6),
            })
        })
        .collect::<Result<_>>()?;

    let (mechanics, mechanics_error) = match coating.mechanical_aggregate() {
        Ok(m) => (
            Some(context! {
                y_para => sci(m.y_para),
                y_perp => sci(m.y_perp),
                phi_para => sci(m.phi_para),
                phi_perp => sci(m.phi_perp),
                sigma_para => fixed(m.sigma_para, 6),
                sigma_perp => fixed(m.sigma_perp, 6),
            }),
            String::new(),
        ),
        Err(err) => (None, err.to_string()),
    };
    let phi_eff = match mechanics {
        Some(_) => coating.phi(config.beam_size_m()).ok(),
        None => None,
    };

    let (lo, hi) = config.wavelength_range();
    let spectrum: Curve<Polarized> =
        sweep::reflectivity_vs_wavelength(coating, &sweep::linspace(lo, hi, config.steps), config.aoi)
            .into_iter()
            .collect();
    let spectrum: Vec<_> = spectrum
        .x
        .iter()
        .zip(&spectrum.y)
        .map(|(&x, r)| context! { x => fixed(x, 3), s => fixed(r.s, 9), p => fixed(r.p, 9) })
        .collect();

    let efi = coating
        .create_stack(lambda0, 0.0)?
        .efi(lambda0, config.efi_steps)?;
    let efi: Vec<_> = efi
        .iter()
        .map(|(x, i)| context! { x => fixed(x, 3), i => sci(i) })
        .collect();

    let noise: Vec<_> = if phi_eff.is_some() {
        let freqs = sweep::logspace(config.freq_min, config.freq_max, config.steps)?;
        let curve: Curve<f64> =
            sweep::brownian_noise_vs_frequency(coating, &freqs, config.beam_size_m(), config.temperature)
                .into_iter()
                .collect();
        curve
            .x
            .iter()
            .zip(&curve.y)
            .map(|(&x, &a)| context! { x => sci(x), a => sci(a) })
            .collect()
    } else {
        Vec::new()
    };

    let output = template.render(context! {
        timestamp => chrono::Utc::now().to_rfc3339(),
        lambda0 => fixed(lambda0, 2),
        aoi => fixed(config.aoi, 2),
        beam_size => fixed(config.beam_size, 1),
        temperature => fixed(config.temperature, 1),
        superstrate => material_label(coating.superstrate()),
        substrate => material_label(coating.substrate()),
        total_thickness => fixed(coating.thickness(), 3),
        layers => layers,
        r => context! { s => fixed(r.s, 9), p => fixed(r.p, 9) },
        t => context! { s => sci(t.s), p => sci(t.p) },
        phase => context! {
            s => fixed(phase.s, 6),
            p => fixed(phase.p, 6),
            delta => fixed(phase.delta, 6),
        },
        mechanics => mechanics,
        mechanics_error => mechanics_error,
        phi_eff => phi_eff.map(sci),
        spectrum => spectrum,
        efi => efi,
        noise => noise,
    })?;

    Ok(output)
}

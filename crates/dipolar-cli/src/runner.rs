//! Job runner: geometry → scattering context → beam → incident fields.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use ndarray::Array2;
use num_complex::Complex64;
use serde::Serialize;

use dipolar_compute::{ComputeBackend, CpuBackend, DeviceInfo, SerialBackend};
use dipolar_core::beam::field_file::save_field;
use dipolar_core::{
    Beam, BeamFieldGenerator, BeamModel, IncidentFrame, IncidentPolarization, Orientation,
    ScatteringContext, SecondaryWaves, Substrate, SymmetryFlags,
};
use dipolar_geometry::discretise::discretise_primitive;

use crate::config::{ComputeConfig, JobConfig, SubstrateIndex};

/// Incident field for one polarisation.
#[derive(Debug, Serialize)]
pub struct PolarisationField {
    pub polarisation: IncidentPolarization,
    #[serde(serialize_with = "serialize_field")]
    pub field: Array2<Complex64>,
    pub secondary: Option<SecondaryWaves>,
}

/// Everything a run produces.
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub description: Option<String>,
    pub symmetry: SymmetryFlags,
    pub beam_center: [f64; 3],
    pub beam_asymmetric: bool,
    pub wavenumber: f64,
    pub dipoles: Vec<[f64; 3]>,
    pub fields: Vec<PolarisationField>,
}

/// Job prepared up to beam initialisation.
pub struct PreparedJob {
    pub context: ScatteringContext,
    pub dipoles: Vec<[f64; 3]>,
    pub symmetry: SymmetryFlags,
    pub beam: Beam,
}

/// Build the scattering context from the illumination and substrate sections.
pub fn build_context(job: &JobConfig) -> Result<ScatteringContext> {
    let ill = &job.illumination;
    let frame = match ill.polarisation_x {
        Some(pol_x) => IncidentFrame::new(ill.propagation, pol_x),
        None => IncidentFrame::from_propagation(ill.propagation),
    }
    .context("Invalid incident frame in [illumination]")?;

    let mut ctx = ScatteringContext::from_wavelength(ill.wavelength, frame)
        .context("Invalid wavelength in [illumination]")?;

    if let Some(angles) = ill.orientation {
        let orientation = Orientation::from_euler_zyz_deg(angles[0], angles[1], angles[2]);
        if !orientation.is_identity() {
            if job.substrate.is_some() {
                bail!("Particle orientation cannot be combined with a substrate");
            }
            ctx = ctx.with_orientation(orientation);
        }
    }

    if let Some(sub) = &job.substrate {
        let substrate = match &sub.index {
            SubstrateIndex::Complex([re, im]) => {
                Substrate::dielectric(Complex64::new(*re, *im), sub.height)
            }
            SubstrateIndex::Keyword(k) if k.eq_ignore_ascii_case("inf") => {
                Substrate::perfect_conductor(sub.height)
            }
            SubstrateIndex::Keyword(other) => {
                bail!("Substrate index must be [re, im] or \"inf\", got \"{other}\"")
            }
        }
        .context("Invalid [substrate]")?;
        ctx = ctx.with_substrate(substrate);
    }
    Ok(ctx)
}

/// Discretise every object and collect the symmetries the shapes keep.
pub fn build_dipoles(job: &JobConfig) -> Result<(Vec<[f64; 3]>, SymmetryFlags)> {
    let mut dipoles = Vec::new();
    let mut symmetry = SymmetryFlags::all();

    for obj in &job.geometry.object {
        let lattice = discretise_primitive(&obj.shape, obj.dipole_spacing)
            .with_context(|| format!("Object '{}'", obj.label()))?;
        symmetry.narrow(&obj.shape.symmetry());
        println!(
            "  Object '{}': {} dipoles (spacing={})",
            obj.label(),
            lattice.len(),
            obj.dipole_spacing
        );
        dipoles.extend(lattice);
    }

    if dipoles.is_empty() {
        bail!("No dipoles generated, check the [[geometry.object]] entries");
    }
    Ok((dipoles, symmetry))
}

/// Geometry, context and beam, without generating any field.
pub fn prepare(job: &JobConfig) -> Result<PreparedJob> {
    let context = build_context(job)?;
    let (dipoles, mut symmetry) = build_dipoles(job)?;

    // The interface is never mirrored by the z reflection
    if context.substrate().is_some() {
        symmetry.break_reflect_z();
    }

    let beam = Beam::initialize(&job.beam, &context, &mut symmetry)
        .with_context(|| format!("Cannot initialise beam '{}'", job.beam.kind))?;
    log::info!("Symmetries kept: {symmetry}");

    Ok(PreparedJob {
        context,
        dipoles,
        symmetry,
        beam,
    })
}

/// Run a full job: both polarisations, or Y only for a single-file beam.
pub fn run_job(job: &JobConfig) -> Result<RunOutput> {
    let prepared = prepare(job)?;
    let backend = create_backend(&job.compute)?;
    let generator = BeamFieldGenerator::new(backend);

    let PreparedJob {
        context,
        dipoles,
        symmetry,
        beam,
    } = prepared;

    let mut fields = Vec::with_capacity(2);
    for which in IncidentPolarization::both() {
        if let BeamModel::File(files) = beam.model() {
            if files.path_for(which).is_none() {
                log::warn!("No field file for {which} polarisation; generating Y only");
                continue;
            }
        }
        let mut field = Array2::zeros((dipoles.len(), 3));
        let secondary = generator
            .generate(&beam, &context, which, &dipoles, &mut field)
            .with_context(|| format!("Cannot generate {which}-polarised incident field"))?;
        fields.push(PolarisationField {
            polarisation: which,
            field,
            secondary,
        });
    }

    Ok(RunOutput {
        description: beam.description().map(str::to_string),
        symmetry,
        beam_center: beam.center(),
        beam_asymmetric: beam.is_asymmetric(),
        wavenumber: context.wavenumber(),
        dipoles,
        fields,
    })
}

/// Output file for one polarisation.
pub fn field_path(dir: &Path, which: IncidentPolarization) -> PathBuf {
    dir.join(format!("IncBeam-{which}.dat"))
}

/// Write `IncBeam-Y.dat` / `IncBeam-X.dat` into `dir`.
pub fn write_fields(output: &RunOutput, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(output.fields.len());
    for f in &output.fields {
        let path = field_path(dir, f.polarisation);
        save_field(&path, &output.dipoles, &f.field)?;
        println!("Incident field ({}) written to: {}", f.polarisation, path.display());
        written.push(path);
    }
    Ok(written)
}

/// Write the run summary as JSON.
pub fn write_summary_json(output: &RunOutput, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(output).context("JSON serialisation error")?;
    std::fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))?;
    println!("Summary (JSON) written to: {}", path.display());
    Ok(())
}

/// Field rows as `[[re, im]; 3]`.
fn serialize_field<S: serde::Serializer>(
    field: &Array2<Complex64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(field.nrows()))?;
    for row in field.rows() {
        let entry: Vec<[f64; 2]> = row.iter().map(|c| [c.re, c.im]).collect();
        seq.serialize_element(&entry)?;
    }
    seq.end()
}

/// Create a compute backend from the `[compute]` section.
fn create_backend(config: &ComputeConfig) -> Result<Arc<dyn ComputeBackend>> {
    let backend: Arc<dyn ComputeBackend> = match config.backend.as_str() {
        "serial" => Arc::new(SerialBackend),
        "cpu" => match config.threads {
            Some(n) => Arc::new(CpuBackend::with_threads(n).context("Cannot build thread pool")?),
            None => Arc::new(CpuBackend::new()),
        },
        other => bail!("Unsupported backend '{other}'. Valid backends: cpu, serial"),
    };
    println!("Backend: {}", describe_backend(&backend.device_info()));
    Ok(backend)
}

fn describe_backend(info: &DeviceInfo) -> String {
    match info.compute_units {
        Some(n) => format!("{} ({n} compute units)", info.name),
        None => info.name.clone(),
    }
}

//! TOML configuration deserialisation for incident-field jobs.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use dipolar_core::BeamConfig;
use dipolar_geometry::primitives::Primitive;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub beam: BeamConfig,
    pub illumination: IlluminationConfig,
    #[serde(default)]
    pub substrate: Option<SubstrateConfig>,
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub compute: ComputeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Wavelength and incident frame.
#[derive(Debug, Deserialize)]
pub struct IlluminationConfig {
    /// Vacuum wavelength, same length unit as the geometry.
    pub wavelength: f64,
    #[serde(default = "default_propagation")]
    pub propagation: [f64; 3],
    /// X polarisation; derived from the propagation direction when absent.
    #[serde(default)]
    pub polarisation_x: Option<[f64; 3]>,
    /// ZYZ Euler angles of the particle, in degrees.
    #[serde(default)]
    pub orientation: Option<[f64; 3]>,
}

fn default_propagation() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

/// Planar substrate below the particle.
#[derive(Debug, Deserialize)]
pub struct SubstrateConfig {
    pub index: SubstrateIndex,
    /// Height of the particle origin above the interface.
    pub height: f64,
}

/// Complex refractive index `[re, im]`, or `"inf"` for a perfect reflector.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubstrateIndex {
    Complex([f64; 2]),
    Keyword(String),
}

/// Geometry configuration from TOML.
#[derive(Debug, Deserialize)]
pub struct GeometryConfig {
    pub object: Vec<ObjectConfig>,
}

/// A single particle shape.
#[derive(Debug, Deserialize)]
pub struct ObjectConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub dipole_spacing: f64,
    #[serde(flatten)]
    pub shape: Primitive,
}

impl ObjectConfig {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.shape.name())
    }
}

/// Backend used to fill the field buffers.
#[derive(Debug, Deserialize)]
pub struct ComputeConfig {
    /// "cpu" (thread pool) or "serial". Default: "cpu".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Worker threads for the CPU backend; all cores when absent.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            threads: None,
        }
    }
}

fn default_backend() -> String {
    "cpu".into()
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to also save a JSON summary (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}

/// Parse a TOML job configuration.
pub fn parse_config(content: &str) -> anyhow::Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    Ok(config)
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read job file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid job file {}", path.display()))
}

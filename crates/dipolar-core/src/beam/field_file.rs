//! Plain-text incident-field files.
//!
//! One dipole per line, in the same order as the dipole coordinates:
//! ```text
//! x y z |E|^2 Ex.r Ex.i Ey.r Ey.i Ez.r Ez.i
//! 0.0 0.0 0.0 1.0 1.0 0.0 0.0 0.0 0.0 0.0
//! ...
//! ```
//!
//! Blank lines, lines starting with `#` and a non-numeric header line are
//! skipped. Coordinates and `|E|^2` are informational; only the six field
//! columns are read back.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use num_complex::Complex64;
use thiserror::Error;

use crate::context::IncidentPolarization;

/// Header written above the data columns.
pub const FIELD_HEADER: &str = "x y z |E|^2 Ex.r Ex.i Ey.r Ey.i Ez.r Ez.i";

const COLUMNS: usize = 10;

#[derive(Debug, Error)]
pub enum FieldFileError {
    #[error("Cannot access field file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Field file '{path}', line {line}: {message}")]
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("Field file '{path}' holds {found} dipoles, expected {expected}")]
    CountMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
}

/// Collaborator that supplies an externally computed incident field.
pub trait FieldSource: Send + Sync {
    /// Fill `buffer` (`N × 3`) with the field stored at `path` for polarisation `which`.
    fn read_field(
        &self,
        path: &Path,
        which: IncidentPolarization,
        buffer: &mut Array2<Complex64>,
    ) -> Result<(), FieldFileError>;
}

/// Reads the text format described in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFieldReader;

impl FieldSource for TextFieldReader {
    fn read_field(
        &self,
        path: &Path,
        which: IncidentPolarization,
        buffer: &mut Array2<Complex64>,
    ) -> Result<(), FieldFileError> {
        let content = fs::read_to_string(path).map_err(|source| FieldFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rows = parse_field(&content).map_err(|(line, message)| FieldFileError::Format {
            path: path.to_path_buf(),
            line,
            message,
        })?;
        if rows.len() != buffer.nrows() {
            return Err(FieldFileError::CountMismatch {
                path: path.to_path_buf(),
                expected: buffer.nrows(),
                found: rows.len(),
            });
        }
        for (mut dst, src) in buffer.rows_mut().into_iter().zip(&rows) {
            for c in 0..3 {
                dst[c] = src[c];
            }
        }
        log::debug!("Read {} field vectors ({which} polarisation) from {}", rows.len(), path.display());
        Ok(())
    }
}

/// Parse the field columns. Errors carry the 1-based line number.
pub fn parse_field(content: &str) -> Result<Vec<[Complex64; 3]>, (usize, String)> {
    let mut rows = Vec::new();
    let mut header_seen = false;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let values: Result<Vec<f64>, _> = parts.iter().map(|p| p.parse::<f64>()).collect();
        let values = match values {
            Ok(v) => v,
            // Header line
            Err(_) if !header_seen && rows.is_empty() => {
                header_seen = true;
                continue;
            }
            Err(_) => {
                return Err((line_no, format!("Non-numeric entry in '{line}'")));
            }
        };
        if values.len() != COLUMNS {
            return Err((
                line_no,
                format!("Expected {COLUMNS} columns ({FIELD_HEADER}), got {}", values.len()),
            ));
        }
        rows.push([
            Complex64::new(values[4], values[5]),
            Complex64::new(values[6], values[7]),
            Complex64::new(values[8], values[9]),
        ]);
    }
    Ok(rows)
}

/// Format a field buffer alongside its dipole coordinates.
pub fn format_field(coords: &[[f64; 3]], field: &Array2<Complex64>) -> String {
    let mut out = String::with_capacity(coords.len() * 120);
    out.push_str(FIELD_HEADER);
    out.push('\n');
    for (r, e) in coords.iter().zip(field.rows()) {
        let intensity: f64 = e.iter().map(|c| c.norm_sqr()).sum();
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "{} {} {} {:.10e} {:.10e} {:.10e} {:.10e} {:.10e} {:.10e} {:.10e}",
            r[0], r[1], r[2], intensity, e[0].re, e[0].im, e[1].re, e[1].im, e[2].re, e[2].im
        );
    }
    out
}

/// Write a field buffer to `path` in the text format.
pub fn save_field(
    path: &Path,
    coords: &[[f64; 3]],
    field: &Array2<Complex64>,
) -> Result<(), FieldFileError> {
    fs::write(path, format_field(coords, field)).map_err(|source| FieldFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Field files of a `read` beam: file 1 holds the Y polarisation, the
/// optional file 2 the X polarisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBeam {
    pub y_file: PathBuf,
    pub x_file: Option<PathBuf>,
}

impl FileBeam {
    pub fn path_for(&self, which: IncidentPolarization) -> Option<&Path> {
        match which {
            IncidentPolarization::Y => Some(&self.y_file),
            IncidentPolarization::X => self.x_file.as_deref(),
        }
    }
}

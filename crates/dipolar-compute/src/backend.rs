//! Compute backend trait and device abstraction.
//!
//! The [`ComputeBackend`] trait abstracts over the execution environment used
//! to evaluate per-dipole quantities, so that the beam code in `dipolar-core`
//! stays device-agnostic. Every row of an `(N, 3)` field buffer depends only on
//! the coordinates of its own dipole, which makes the fill trivially parallel.

use ndarray::Array2;
use num_complex::Complex64;
use thiserror::Error;

/// A complex 3-vector: the field at one dipole.
pub type FieldVector = [Complex64; 3];

/// Errors originating from compute backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Buffer shape mismatch: expected ({expected}, 3), got ({rows}, {cols})")]
    ShapeMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Describes the capabilities of a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub compute_units: Option<usize>,
}

/// The type of compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Serial,
    Cpu,
}

/// Abstraction over compute backends.
pub trait ComputeBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Overwrite every row `i` of `buffer` with `row_fn(i)`.
    ///
    /// `buffer` must have shape `(n, 3)`. Rows are independent, so the order
    /// of evaluation is unspecified.
    fn fill_rows(
        &self,
        buffer: &mut Array2<Complex64>,
        row_fn: &(dyn Fn(usize) -> FieldVector + Send + Sync),
    ) -> Result<(), ComputeError>;
}

/// Check that `buffer` holds one 3-vector per dipole.
pub fn check_shape(buffer: &Array2<Complex64>, n: usize) -> Result<(), ComputeError> {
    let (rows, cols) = buffer.dim();
    if rows != n || cols != 3 {
        return Err(ComputeError::ShapeMismatch {
            expected: n,
            rows,
            cols,
        });
    }
    Ok(())
}

/// Single-threaded backend. Useful as a reference and inside callers that
/// already parallelise at a coarser level (e.g. over orientations).
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "CPU (serial)".into(),
            backend_type: BackendType::Serial,
            compute_units: Some(1),
        }
    }

    fn fill_rows(
        &self,
        buffer: &mut Array2<Complex64>,
        row_fn: &(dyn Fn(usize) -> FieldVector + Send + Sync),
    ) -> Result<(), ComputeError> {
        if buffer.ncols() != 3 {
            return Err(ComputeError::ShapeMismatch {
                expected: buffer.nrows(),
                rows: buffer.nrows(),
                cols: buffer.ncols(),
            });
        }
        for (i, mut row) in buffer.rows_mut().into_iter().enumerate() {
            let v = row_fn(i);
            for c in 0..3 {
                row[c] = v[c];
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_shape() {
        let buf = Array2::<Complex64>::zeros((4, 3));
        assert!(check_shape(&buf, 4).is_ok());
        assert!(check_shape(&buf, 5).is_err());

        let bad = Array2::<Complex64>::zeros((4, 2));
        assert!(matches!(
            check_shape(&bad, 4),
            Err(ComputeError::ShapeMismatch { cols: 2, .. })
        ));
    }

    #[test]
    fn test_serial_fill_overwrites_every_row() {
        let mut buf = Array2::from_elem((3, 3), Complex64::new(9.0, 9.0));
        SerialBackend
            .fill_rows(&mut buf, &|i| {
                let v = Complex64::new(i as f64, 0.0);
                [v, v * 2.0, v * 3.0]
            })
            .unwrap();
        for i in 0..3 {
            assert_eq!(buf[[i, 0]], Complex64::new(i as f64, 0.0));
            assert_eq!(buf[[i, 2]], Complex64::new(3.0 * i as f64, 0.0));
        }
    }
}

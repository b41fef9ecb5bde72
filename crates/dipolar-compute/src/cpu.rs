//! CPU compute backend using Rayon for shared-memory parallelism.

use ndarray::{Array2, Axis};
use num_complex::Complex64;
use rayon::prelude::*;

use crate::backend::{BackendType, ComputeBackend, ComputeError, DeviceInfo, FieldVector};

/// CPU backend that parallelises work across threads via Rayon.
pub struct CpuBackend {
    num_threads: usize,
    /// Dedicated pool when a thread count was requested; otherwise the global pool.
    pool: Option<rayon::ThreadPool>,
}

impl CpuBackend {
    /// Create a new CPU backend using the global Rayon pool.
    pub fn new() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
            pool: None,
        }
    }

    /// Create a CPU backend with a dedicated pool of `num_threads` workers.
    pub fn with_threads(num_threads: usize) -> Result<Self, ComputeError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| ComputeError::ThreadPool(e.to_string()))?;
        log::debug!("Dedicated rayon pool with {} threads", pool.current_num_threads());
        Ok(Self {
            num_threads: pool.current_num_threads(),
            pool: Some(pool),
        })
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("CPU ({} threads)", self.num_threads),
            backend_type: BackendType::Cpu,
            compute_units: Some(self.num_threads),
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

        let fill = |buffer: &mut Array2<Complex64>| {
            buffer
                .axis_iter_mut(Axis(0))
                .into_par_iter()
                .enumerate()
                .for_each(|(i, mut row)| {
                    let v = row_fn(i);
                    for c in 0..3 {
                        row[c] = v[c];
                    }
                });
        };

        match &self.pool {
            Some(pool) => pool.install(|| fill(buffer)),
            None => fill(buffer),
        }
        Ok(())
    }
}

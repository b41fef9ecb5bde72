//! # Dipolar Compute
//!
//! Compute backend abstraction for the Dipolar framework. This crate
//! provides a [`ComputeBackend`](backend::ComputeBackend) trait that isolates
//! the beam code from device-specific execution details.
//!
//! ## Available backends
//!
//! | Backend | Feature flag | Status |
//! |---------|-------------|--------|
//! | Serial | always | Implemented |
//! | CPU (Rayon) | `cpu` (default) | Implemented |

pub mod backend;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use backend::{
    check_shape, BackendType, ComputeBackend, ComputeError, DeviceInfo, FieldVector, SerialBackend,
};

#[cfg(feature = "cpu")]
pub use cpu::CpuBackend;

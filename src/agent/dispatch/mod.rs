//! Agent subprocess dispatch and execution.
//!
//! This module provides:
//!
//! - The [`AgentRunner`] seam: run one task, always get a result back
//! - [`ProcessRunner`], which launches registered agents as child processes
//!   with a per-call timeout and output capture
//! - [`dispatch_many`], a bounded worker pool over any runner

mod executor;
mod pool;

pub use executor::{AgentRunner, ProcessRunner};
pub use pool::{DEFAULT_BATCH_TIMEOUT, DEFAULT_MAX_WORKERS, DispatchOptions, dispatch_many};

//! Agent execution subsystem.
//!
//! This module provides the core agent orchestration capabilities:
//!
//! - **Types**: Task requests, payloads, and uniform result records
//! - **Registry**: Agent name to executable mapping with availability
//! - **Dispatch**: Subprocess execution with timeout, and the bounded
//!   worker pool that fans batches out across agents
//!
//! # Design Philosophy
//!
//! Agents are independent executables invoked with a single JSON argument.
//! Every invocation is a separate OS process, so a crash or hang in one
//! agent cannot affect another. The orchestrator never inspects payloads or
//! parses agent output; both are opaque contracts between caller and agent.

mod registry;
mod types;
pub mod dispatch;

// Re-export public API
pub use dispatch::{
    AgentRunner, DEFAULT_BATCH_TIMEOUT, DEFAULT_MAX_WORKERS, DispatchOptions, ProcessRunner,
    dispatch_many,
};
pub use registry::{AgentDescriptor, AgentRegistry};
pub use types::{
    AgentResult, FailureKind, NOT_REGISTERED_OUTPUT, Payload, TIMEOUT_OUTPUT, TaskRequest,
};

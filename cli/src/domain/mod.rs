//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod cluster;
pub mod config;
pub mod error;
pub mod forward;
pub mod logs;
pub mod pods;
pub mod release;
pub mod status;
pub mod tool;
pub mod values;

pub use cluster::{CLUSTER_NAME, CONTROL_PLANE_CONTAINER, ClusterState};
pub use config::DevConfig;
pub use error::{ClusterError, EnvironmentError, ParseError, ReleaseError};
pub use forward::{FORWARDS, ForwardRecord, ForwardSpec, ForwardStatus};
pub use pods::{PodPhase, PodStatus, Readiness};
pub use status::StatusReport;
pub use tool::{CheckResult, MinorVersion, Platform, REQUIRED_TOOLS, ToolRequirement, ToolStatus};

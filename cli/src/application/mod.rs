//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod ports;
pub mod services;
pub mod wait;

pub use ports::{
    AssetLocator, Bootstrap, ClusterApi, ClusterEngine, ClusterInspector, ClusterLifecycle,
    Clock, CommandRunner, ContainerDaemon, ForwardRecordStore, PackageManager, ProcessTable,
    ProgressReporter, ReleaseDeployer, ReleaseSpec, ToolLocator, ValuesStore,
};

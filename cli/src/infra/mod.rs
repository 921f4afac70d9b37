//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the
//! search path, package managers, the container daemon, the cluster and
//! chart CLIs, and on-disk documents.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod assets;
pub mod command_runner;
pub mod config;
pub mod daemon;
pub mod helm;
pub mod kind;
pub mod kubectl;
pub mod package_manager;
pub mod process;
pub mod search_path;
pub mod state;
pub mod values;

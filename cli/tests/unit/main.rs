//! Unit tests for the cdp-dev CLI
//!
//! These tests use hand-written fakes for every port and run fast without
//! external I/O.

mod cluster_service;
mod forwards_service;
mod helpers;
mod preflight_service;
mod property_tests;

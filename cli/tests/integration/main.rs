//! Integration tests for the cdp-dev CLI
//!
//! These tests spawn the actual binary and check argument handling and
//! configuration loading. None of them reach Docker, kind, kubectl, or helm.

mod cli_tests;

//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the process-scoped pieces every command shares: the
//! output context, the loaded config, the detected platform, and the
//! executable search path. Adapters are built from it on demand so each
//! one sees the same search path.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::{DevConfig, Platform};
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};
use crate::infra::config::YamlConfigStore;
use crate::infra::daemon::DockerDaemon;
use crate::infra::helm::HelmCli;
use crate::infra::kind::KindProvisioner;
use crate::infra::kubectl::KubectlCli;
use crate::infra::package_manager::{self, SystemPackageManager};
use crate::infra::search_path::{SearchPath, SystemToolLocator};
use crate::infra::state::StateManager;
use crate::output::{HumanRenderer, OutputContext, TerminalReporter};

/// Environment variable that answers every confirmation with yes.
pub const YES_ENV: &str = "CDP_DEV_YES";

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
#[allow(clippy::struct_excessive_bools)]
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
    /// Skip interactive prompts.
    pub yes: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// User configuration with defaults applied.
    pub config: DevConfig,
    /// Host platform, detected once.
    pub platform: Platform,
    /// Executable search path shared by every runner and the tool locator.
    pub search: Arc<SearchPath>,
    /// When `true`, confirmations are answered yes without prompting.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `CDP_DEV_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// JSON mode silences progress output so stdout carries one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let ci_env = std::env::var_os("CI").is_some() || std::env::var_os(YES_ENV).is_some();
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let config = YamlConfigStore.load()?;
        tracing::debug!(?config, "configuration loaded");

        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet || flags.json),
            mode,
            config,
            platform: Platform::current(),
            search: Arc::new(SearchPath::new()),
            non_interactive: flags.yes || ci_env,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    #[must_use]
    pub fn renderer(&self) -> HumanRenderer<'_> {
        HumanRenderer::new(&self.output)
    }

    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Command runner with the default timeout and the shared search path.
    #[must_use]
    pub fn runner(&self) -> TokioCommandRunner {
        TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT, Arc::clone(&self.search))
    }

    #[must_use]
    pub fn locator(&self) -> SystemToolLocator {
        SystemToolLocator::new(Arc::clone(&self.search), self.platform)
    }

    #[must_use]
    pub fn daemon(&self) -> DockerDaemon<TokioCommandRunner> {
        DockerDaemon::new(self.runner(), self.platform)
    }

    #[must_use]
    pub fn package_manager(&self) -> Option<SystemPackageManager<TokioCommandRunner>> {
        package_manager::for_platform(self.platform, self.runner())
    }

    #[must_use]
    pub fn provisioner(&self) -> KindProvisioner<TokioCommandRunner> {
        KindProvisioner::new(self.runner())
    }

    #[must_use]
    pub fn kubectl(&self) -> KubectlCli<TokioCommandRunner> {
        KubectlCli::new(self.runner())
    }

    #[must_use]
    pub fn helm(&self) -> HelmCli<TokioCommandRunner> {
        HelmCli::new(self.runner())
    }

    /// Forward record store under the home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn state_mgr(&self) -> Result<StateManager> {
        StateManager::new()
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `CDP_DEV_YES`
    /// env), returns `true` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.non_interactive {
            return Ok(true);
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("confirmation needs an interactive terminal; pass --yes to skip it")
    }
}

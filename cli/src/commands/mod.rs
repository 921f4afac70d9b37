//! Command implementations

pub mod destroy;
pub mod doctor;
pub mod install;
pub mod logs;
pub mod start;
pub mod status;
pub mod stop;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::forwards;
use crate::application::services::preflight::Resolver;
use crate::application::wait::TokioClock;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::daemon::DockerDaemon;
use crate::infra::process::OsProcessTable;
use crate::infra::search_path::SystemToolLocator;

/// Production collaborators for a preflight run, owned by the caller.
pub(crate) struct PreflightDeps {
    locator: SystemToolLocator,
    runner: TokioCommandRunner,
    daemon: DockerDaemon<TokioCommandRunner>,
}

impl PreflightDeps {
    pub(crate) fn new(app: &AppContext) -> Self {
        Self {
            locator: app.locator(),
            runner: app.runner(),
            daemon: app.daemon(),
        }
    }

    pub(crate) fn resolver<'a>(
        &'a self,
        app: &AppContext,
        clock: &'a TokioClock,
    ) -> Resolver<'a, SystemToolLocator, TokioCommandRunner, DockerDaemon<TokioCommandRunner>, TokioClock>
    {
        Resolver {
            locator: &self.locator,
            runner: &self.runner,
            daemon: &self.daemon,
            clock,
            platform: app.platform,
        }
    }
}

/// Print the forward table summary after install or start.
pub(crate) async fn print_ready(app: &AppContext) -> Result<()> {
    let store = app.state_mgr()?;
    let statuses = forwards::status(&OsProcessTable, &store).await?;
    app.renderer().render_ready(&statuses);
    Ok(())
}

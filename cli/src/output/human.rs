//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::domain::{CheckResult, ClusterState, ForwardStatus, PodStatus, StatusReport};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the preflight table with a daemon row and remediation hints.
    pub fn render_doctor(&self, daemon_running: bool, checks: &[CheckResult]) {
        if self.ctx.quiet {
            return;
        }
        println!();
        println!("  {}", "Local Environment Check".style(self.ctx.styles.header));
        println!();
        println!(
            "    {}",
            format!(
                "{:<10} {:<6} {:<10} {:<9} {}",
                "TOOL", "FOUND", "VERSION", "REQUIRED", "STATUS"
            )
            .style(self.ctx.styles.dim)
        );
        for check in checks {
            let status = if check.satisfied {
                format!("{}", "ok".style(self.ctx.styles.success))
            } else if check.found {
                format!("{}", "outdated".style(self.ctx.styles.warning))
            } else {
                format!("{}", "missing".style(self.ctx.styles.error))
            };
            println!("    {} {status}", format_check_row(check));
        }
        println!();
        self.print_check(daemon_running, "Docker daemon is running");

        let failing: Vec<&CheckResult> = checks.iter().filter(|c| !c.satisfied).collect();
        if !failing.is_empty() {
            println!();
            println!("  {}", "Fix:".style(self.ctx.styles.bold));
            for check in failing {
                println!("    {:<10} {}", check.tool, check.hint);
            }
        }
        if !daemon_running {
            println!("    {:<10} start Docker Desktop or `sudo systemctl start docker`", "docker");
        }
        println!();
    }

    /// Render cluster, pod, and forward status.
    pub fn render_status(&self, report: &StatusReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        let state = match report.state {
            ClusterState::PresentRunning => {
                format!("{}", report.state.label().style(self.ctx.styles.success))
            }
            ClusterState::PresentStopped => {
                format!("{}", report.state.label().style(self.ctx.styles.warning))
            }
            ClusterState::Absent => format!("{}", report.state.label().style(self.ctx.styles.dim)),
        };
        self.ctx.kv("Cluster:", &format!("{} ({state})", report.cluster));

        match report.state {
            ClusterState::Absent => {
                println!();
                self.ctx.info("Run 'cdp-dev install' to create the local environment.");
                return;
            }
            ClusterState::PresentStopped => {
                println!();
                self.ctx.info("Run 'cdp-dev start' to resume it.");
            }
            ClusterState::PresentRunning => {
                self.ctx.kv("Pods:", &report.readiness().to_string());
                println!();
                self.render_pods(&report.pods);
            }
        }

        println!();
        self.render_forwards(&report.forwards);
        println!();
    }

    /// Render the pod table.
    pub fn render_pods(&self, pods: &[PodStatus]) {
        if pods.is_empty() {
            println!("    {}", "no pods".style(self.ctx.styles.dim));
            return;
        }
        println!(
            "    {}",
            format!("{:<16} {:<48} {:<10} {}", "NAMESPACE", "NAME", "PHASE", "READY")
                .style(self.ctx.styles.dim)
        );
        for pod in pods {
            println!(
                "    {:<16} {:<48} {:<10} {}",
                pod.namespace,
                pod.name,
                pod.phase.to_string(),
                ready_column(pod)
            );
        }
    }

    /// Render the port-forward table.
    pub fn render_forwards(&self, forwards: &[ForwardStatus]) {
        self.ctx.header("Port forwards:");
        for fwd in forwards {
            let state = if fwd.active {
                format!("{}", "active".style(self.ctx.styles.success))
            } else {
                format!("{}", "down".style(self.ctx.styles.error))
            };
            println!("    {:<14} {:<24} {state}", fwd.name, fwd.url);
        }
    }

    /// Closing summary after a successful install or start.
    pub fn render_ready(&self, forwards: &[ForwardStatus]) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.success("Local data platform is ready");
        for fwd in forwards {
            self.ctx.kv(&format!("{}:", fwd.name), &fwd.url);
        }
        println!();
        self.ctx.info("Stop with 'cdp-dev stop'; inspect with 'cdp-dev status'.");
    }

    fn print_check(&self, ok: bool, msg: &str) {
        if ok {
            println!("    {} {msg}", "\u{2713}".style(self.ctx.styles.success));
        } else {
            println!("    {} {msg}", "\u{2717}".style(self.ctx.styles.error));
        }
    }
}

/// One preflight row without the status column.
#[must_use]
pub fn format_check_row(check: &CheckResult) -> String {
    format!(
        "{:<10} {:<6} {:<10} {:<9}",
        check.tool,
        if check.found { "yes" } else { "no" },
        check.version,
        format!(">= {}", check.required),
    )
}

/// `ready/total` containers, or `-` when none are reported.
#[must_use]
pub fn ready_column(pod: &PodStatus) -> String {
    if pod.containers_ready.is_empty() {
        return "-".to_string();
    }
    let ready = pod.containers_ready.iter().filter(|r| **r).count();
    format!("{ready}/{}", pod.containers_ready.len())
}

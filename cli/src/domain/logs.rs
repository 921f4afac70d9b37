//! Log targets: which pods `cdp-dev logs <service>` tails.

use crate::domain::release::RELEASE_NAMESPACE;

/// A named log source resolved to a namespace and label selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogTarget {
    pub service: &'static str,
    pub namespace: &'static str,
    pub selector: &'static str,
}

/// Services accepted by `cdp-dev logs`.
pub const LOG_TARGETS: &[LogTarget] = &[
    LogTarget {
        service: "airflow",
        namespace: RELEASE_NAMESPACE,
        selector: "app.kubernetes.io/name=airflow",
    },
    LogTarget {
        service: "scheduler",
        namespace: RELEASE_NAMESPACE,
        selector: "component=scheduler",
    },
    LogTarget {
        service: "webserver",
        namespace: RELEASE_NAMESPACE,
        selector: "component=webserver",
    },
    LogTarget {
        service: "worker",
        namespace: RELEASE_NAMESPACE,
        selector: "component=worker",
    },
    LogTarget {
        service: "triggerer",
        namespace: RELEASE_NAMESPACE,
        selector: "component=triggerer",
    },
];

/// Case-insensitive lookup.
#[must_use]
pub fn log_target(service: &str) -> Option<&'static LogTarget> {
    LOG_TARGETS
        .iter()
        .find(|t| t.service.eq_ignore_ascii_case(service))
}

impl LogTarget {
    /// Arguments for `kubectl logs`.
    #[must_use]
    pub fn kubectl_args(&self, lines: u32, follow: bool) -> Vec<String> {
        let mut args: Vec<String> = [
            "logs",
            "--selector",
            self.selector,
            "--namespace",
            self.namespace,
            "--tail",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        args.push(lines.to_string());
        args.extend(["--max-log-requests", "10", "--prefix"].map(String::from));
        if follow {
            args.push("--follow".to_string());
        }
        args
    }
}

//! Tool requirements, version parsing, and check classification.
//!
//! Pure data and functions: nothing here spawns a process or touches the
//! filesystem. The preflight service feeds probe results in and gets
//! classifications out.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

// ── Platform ─────────────────────────────────────────────────────────────────

/// Host platform, detected once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
    Other,
}

impl Platform {
    /// Platform of the running binary.
    #[must_use]
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` string to a platform.
    #[must_use]
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            "windows" => Self::Windows,
            _ => Self::Other,
        }
    }
}

// ── Versions ─────────────────────────────────────────────────────────────────

/// A `(major, minor)` pair. Patch levels are never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MinorVersion {
    pub major: u32,
    pub minor: u32,
}

impl MinorVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for MinorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Pattern is a compile-time constant
    Regex::new(r"(\d+)\.(\d+)").expect("valid version regex")
});

/// Extract the first `major.minor` pair found anywhere in `raw`.
///
/// `"helm version v3.12.0"` → `Some(3.12)`. Returns `None` when no pair
/// is present or a component overflows `u32`.
#[must_use]
pub fn parse_version(raw: &str) -> Option<MinorVersion> {
    let caps = VERSION_RE.captures(raw)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some(MinorVersion::new(major, minor))
}

// ── Requirements ─────────────────────────────────────────────────────────────

/// Per-platform package identifiers. `None` means the tool is never
/// installed through that package manager.
#[derive(Debug, Clone, Copy)]
pub struct PackageIds {
    pub homebrew: Option<&'static str>,
    pub chocolatey: Option<&'static str>,
}

/// Per-platform manual install hints.
#[derive(Debug, Clone, Copy)]
pub struct InstallHints {
    pub macos: &'static str,
    pub linux: &'static str,
    pub windows: &'static str,
}

impl InstallHints {
    /// Hint for `platform`, falling back to the Linux hint.
    #[must_use]
    pub fn for_platform(&self, platform: Platform) -> &'static str {
        match platform {
            Platform::MacOs => self.macos,
            Platform::Windows => self.windows,
            Platform::Linux | Platform::Other => self.linux,
        }
    }
}

/// An external tool this system depends on. Declared statically, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct ToolRequirement {
    pub name: &'static str,
    pub min_version: MinorVersion,
    /// Version-probe command; the first element is the program.
    pub probe: &'static [&'static str],
    pub packages: PackageIds,
    pub hints: InstallHints,
}

/// Name of the container runtime executable.
pub const DOCKER: &str = "docker";

/// Every tool the system needs, in check order.
pub const REQUIRED_TOOLS: &[ToolRequirement] = &[
    ToolRequirement {
        name: DOCKER,
        min_version: MinorVersion::new(24, 0),
        probe: &["docker", "version", "--format", "{{.Server.Version}}"],
        packages: PackageIds {
            homebrew: None,
            chocolatey: None,
        },
        hints: InstallHints {
            macos: "https://docs.docker.com/desktop/install/mac-install/",
            linux: "https://docs.docker.com/engine/install/",
            windows: "https://docs.docker.com/desktop/install/windows-install/",
        },
    },
    ToolRequirement {
        name: "kubectl",
        min_version: MinorVersion::new(1, 28),
        probe: &["kubectl", "version", "--client", "--output=yaml"],
        packages: PackageIds {
            homebrew: Some("kubectl"),
            chocolatey: Some("kubernetes-cli"),
        },
        hints: InstallHints {
            macos: "brew install kubectl",
            linux: "https://kubernetes.io/docs/tasks/tools/install-kubectl-linux/",
            windows: "choco install kubernetes-cli",
        },
    },
    ToolRequirement {
        name: "helm",
        min_version: MinorVersion::new(3, 14),
        probe: &["helm", "version", "--short"],
        packages: PackageIds {
            homebrew: Some("helm"),
            chocolatey: Some("kubernetes-helm"),
        },
        hints: InstallHints {
            macos: "brew install helm",
            linux: "https://helm.sh/docs/intro/install/",
            windows: "choco install kubernetes-helm",
        },
    },
    ToolRequirement {
        name: "kind",
        min_version: MinorVersion::new(0, 23),
        probe: &["kind", "version"],
        packages: PackageIds {
            homebrew: Some("kind"),
            chocolatey: Some("kind"),
        },
        hints: InstallHints {
            macos: "brew install kind",
            linux: "https://kind.sigs.k8s.io/docs/user/quick-start/#installation",
            windows: "choco install kind",
        },
    },
];

/// Look up a requirement by tool name.
#[must_use]
pub fn requirement(name: &str) -> Option<&'static ToolRequirement> {
    REQUIRED_TOOLS.iter().find(|t| t.name == name)
}

// ── Classification ───────────────────────────────────────────────────────────

/// What a version probe produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutput {
    /// The probe ran and printed this text (stdout and stderr combined).
    Text(String),
    /// The probe could not be run, exited non-zero, or timed out.
    Failed,
}

/// Per-tool state after probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ToolStatus {
    Absent,
    PresentOutdated { found: MinorVersion },
    /// `found` is `None` when the version could not be determined.
    PresentOk { found: Option<MinorVersion> },
}

impl ToolStatus {
    #[must_use]
    pub fn is_satisfied(self) -> bool {
        matches!(self, Self::PresentOk { .. })
    }
}

/// Classify a tool from its existence flag and probe output.
///
/// Fail-open: a tool that exists but whose probe fails, or whose output
/// contains no parsable version, counts as `PresentOk`.
#[must_use]
pub fn classify(exists: bool, probe: &ProbeOutput, min: MinorVersion) -> ToolStatus {
    if !exists {
        return ToolStatus::Absent;
    }
    let found = match probe {
        ProbeOutput::Text(text) => parse_version(text),
        ProbeOutput::Failed => None,
    };
    match found {
        Some(v) if v < min => ToolStatus::PresentOutdated { found: v },
        found => ToolStatus::PresentOk { found },
    }
}

/// One row of a preflight report. Produced fresh on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub tool: String,
    pub found: bool,
    /// Detected version, `"unknown"` when unparsable, `"—"` when absent.
    pub version: String,
    pub required: MinorVersion,
    pub satisfied: bool,
    /// Remediation hint; empty when satisfied.
    pub hint: String,
    #[serde(skip)]
    pub status: ToolStatus,
}

impl CheckResult {
    /// Build a report row for `req` in state `status`.
    #[must_use]
    pub fn new(req: &ToolRequirement, status: ToolStatus, platform: Platform) -> Self {
        let (found, version) = match status {
            ToolStatus::Absent => (false, "—".to_string()),
            ToolStatus::PresentOutdated { found } => (true, found.to_string()),
            ToolStatus::PresentOk { found } => (
                true,
                found.map_or_else(|| "unknown".to_string(), |v| v.to_string()),
            ),
        };
        let satisfied = status.is_satisfied();
        Self {
            tool: req.name.to_string(),
            found,
            version,
            required: req.min_version,
            satisfied,
            hint: if satisfied {
                String::new()
            } else {
                req.hints.for_platform(platform).to_string()
            },
            status,
        }
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────

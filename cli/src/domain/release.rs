//! Identity of the deployed application release.

/// Helm release name.
pub const RELEASE_NAME: &str = "airflow";

/// Namespace the release is installed into.
pub const RELEASE_NAMESPACE: &str = "airflow";

/// Chart reference passed to `helm upgrade --install`.
pub const CHART: &str = "apache-airflow/airflow";

/// Chart repositories added before install: `(name, url)`.
pub const CHART_REPOS: &[(&str, &str)] = &[("apache-airflow", "https://airflow.apache.org")];

/// Values document file name under the `helm/values/` directory.
pub const VALUES_FILE: &str = "airflow.yaml";

/// Cluster config file under the `helm/kind/` directory.
pub const KIND_CONFIG_FILE: &str = "kind-config.yaml";

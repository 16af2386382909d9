//! Defaults shared by the dashboard tools.
//! Every value here can be overridden through `dashboard-tools.toml`.

// Identity used when hashing dashboard paths into UIDs
pub const DEFAULT_PROJECT_ID: &str = "lhotari/pulsar-grafana-dashboards";

// Fields removed only at the dashboard root
pub const TOP_LEVEL_FIELDS: &[&str] = &[
    "id",
    "version",
    "iteration",
    "links",
    "gnetId",
    "liveNow",
    "preload",
    "timepicker",
    "annotations",
];

// Fields removed at every nesting level
pub const RECURSIVE_FIELDS: &[&str] = &[
    "$$hashKey",
    "__requires",
    "pluginVersion",
    "__inputs",
    "prometheusLink",
];

// Dashboard display defaults
pub const DEFAULT_REFRESH: &str = "30s";
pub const DEFAULT_TIME_FROM: &str = "now-15m";
pub const DEFAULT_TIME_TO: &str = "now";
pub const DEFAULT_TIMEZONE: &str = "utc";

// Helm values generation
pub const DEFAULT_GITHUB_REPO: &str = "lhotari/pulsar-grafana-dashboards";
pub const DEFAULT_GITHUB_BRANCH: &str = "master";
pub const GITHUB_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_GRAFANA_DASHBOARDS_PATH: &str = "/var/lib/grafana/dashboards";
pub const ROOT_PROVIDER_NAME: &str = "dashboards";

// Grafana API
pub const DEFAULT_GRAFANA_URL: &str = "http://localhost:3000";
pub const DEFAULT_GRAFANA_TIMEOUT_SECONDS: u64 = 30;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard-tools.toml";

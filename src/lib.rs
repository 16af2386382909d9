pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod logging;
pub mod paths;
pub mod uid;

// Dashboard normalization and its batch report
pub mod normalize;
pub mod report;

// Peripheral tools sharing the same document handling
pub mod grafana;
pub mod metric_names;
pub mod provisioning;

use serde::{Deserialize, Serialize};

/// A simple queue, keyed by name.
///
/// Rate specs are kept raw (`"upload/download"` in bits per second) and
/// split into rendered halves in the configured unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Queue {
    #[serde(rename = ".id")]
    pub id: String,
    pub name: String,
    pub target: String,
    pub comment: String,
    pub enabled: bool,
    pub max_limit: String,
    pub limit_at: String,
    pub burst_limit: String,
    pub burst_threshold: String,
    pub burst_time: String,
    pub rate: String,

    pub upload_max_limit: String,
    pub download_max_limit: String,
    pub upload_limit_at: String,
    pub download_limit_at: String,
    pub upload_burst_limit: String,
    pub download_burst_limit: String,
    pub upload_burst_threshold: String,
    pub download_burst_threshold: String,
    pub upload_burst_time: String,
    pub download_burst_time: String,
    pub upload_rate: String,
    pub download_rate: String,
}

/// A `/system/script` entry, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Script {
    #[serde(rename = ".id")]
    pub id: String,
    pub name: String,
    pub comment: String,
    pub last_started: String,
    pub run_count: i64,
}

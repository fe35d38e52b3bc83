use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A derived usage percentage, or `unknown` when its counters are
/// missing or the total is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Usage {
    Percent(i64),
    #[default]
    Unknown,
}

impl Usage {
    /// `round((total - free) / total * 100)`.
    pub fn from_counters(total: Option<i64>, free: Option<i64>) -> Self {
        match (total, free) {
            (Some(total), Some(free)) if total > 0 => {
                let used = (total - free).clamp(0, total);
                Self::Percent((used * 200 + total) / (total * 2))
            }
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{p}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for Usage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Percent(p) => serializer.serialize_i64(*p),
            Self::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for Usage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Text(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Int(p) => Self::Percent(p),
            Repr::Text(s) => s.parse().map_or(Self::Unknown, Self::Percent),
        })
    }
}

/// `/system/resource` singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Resource {
    pub platform: String,
    pub board_name: String,
    pub version: String,
    pub uptime: String,
    pub cpu_load: String,
    pub total_memory: Option<i64>,
    pub free_memory: Option<i64>,
    pub total_hdd_space: Option<i64>,
    pub free_hdd_space: Option<i64>,
    pub memory_usage: Usage,
    pub hdd_usage: Usage,
}

impl Resource {
    pub(crate) fn compute_usage(&mut self) {
        self.memory_usage = Usage::from_counters(self.total_memory, self.free_memory);
        self.hdd_usage = Usage::from_counters(self.total_hdd_space, self.free_hdd_space);
    }
}

/// `/system/routerboard` singleton, fetched at connect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Routerboard {
    pub routerboard: bool,
    pub model: String,
    pub serial_number: String,
    pub firmware: String,
    pub upgrade_firmware: String,
}

/// `/system/package/update` singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FirmwareUpdate {
    pub available: bool,
    pub status: String,
    pub channel: String,
    pub installed_version: String,
    pub latest_version: String,
}

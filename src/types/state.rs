//! Core state types: MonitorStatus

use serde::{Deserialize, Serialize};

/// Data availability of the monitor.
///
/// `Unconfigured` → `ConfiguredNoData` on the first configuration delivery,
/// → `Live` once a batch has been processed. Never moves backwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MonitorStatus {
    /// No configuration delivered yet
    #[default]
    Unconfigured,
    /// Configuration present, zero batches processed
    ConfiguredNoData,
    /// At least one batch processed
    Live,
}

impl MonitorStatus {
    /// Whether the frame carries real readings.
    pub fn has_data(&self) -> bool {
        matches!(self, MonitorStatus::Live)
    }
}

impl std::fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorStatus::Unconfigured => write!(f, "Unconfigured"),
            MonitorStatus::ConfiguredNoData => write!(f, "Configured (no data)"),
            MonitorStatus::Live => write!(f, "Live"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", MonitorStatus::Unconfigured), "Unconfigured");
        assert_eq!(format!("{}", MonitorStatus::ConfiguredNoData), "Configured (no data)");
        assert_eq!(format!("{}", MonitorStatus::Live), "Live");
    }

    #[test]
    fn test_status_ordering_follows_lifecycle() {
        assert!(MonitorStatus::Unconfigured < MonitorStatus::ConfiguredNoData);
        assert!(MonitorStatus::ConfiguredNoData < MonitorStatus::Live);
        assert!(MonitorStatus::Live.has_data());
        assert!(!MonitorStatus::ConfiguredNoData.has_data());
    }
}

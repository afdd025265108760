//! Workflow variants served by the dispatch bay.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::lot::Lot;
use crate::domain::types::{RollCount, TypeConstraintError};

/// Which dispatch-bay workflow a session runs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowVariant {
    /// Pick rolls from storage for a dispatch order.
    Pick,
    /// Load previously picked rolls onto the vehicle.
    Load,
    /// Pick and load in one pass, tracking lot weights.
    PickLoad,
}

impl WorkflowVariant {
    pub const ALL: [WorkflowVariant; 3] = [
        WorkflowVariant::Pick,
        WorkflowVariant::Load,
        WorkflowVariant::PickLoad,
    ];

    /// Path segment and wire name of the variant.
    pub const fn as_str(self) -> &'static str {
        match self {
            WorkflowVariant::Pick => "pick",
            WorkflowVariant::Load => "load",
            WorkflowVariant::PickLoad => "pick-load",
        }
    }

    /// Number of `#`-separated fields a scan label must carry.
    pub const fn scan_field_count(self) -> usize {
        match self {
            WorkflowVariant::Pick | WorkflowVariant::Load => 3,
            WorkflowVariant::PickLoad => 4,
        }
    }

    /// Roll count a lot must reach before it is finished.
    pub fn target_count(self, lot: &Lot) -> RollCount {
        match self {
            WorkflowVariant::Pick | WorkflowVariant::PickLoad => lot.total_ready_rolls,
            WorkflowVariant::Load => lot.total_dispatched_rolls,
        }
    }

    /// Whether accepted scans are verified against the storage captures.
    pub const fn cross_checks_storage(self) -> bool {
        matches!(self, WorkflowVariant::Load | WorkflowVariant::PickLoad)
    }

    /// Whether validation refuses orders with a fully dispatched lot.
    pub const fn rejects_dispatched_orders(self) -> bool {
        matches!(self, WorkflowVariant::PickLoad)
    }

    /// Whether gross/net totals are accumulated per lot and persisted on submit.
    pub const fn tracks_lot_weights(self) -> bool {
        matches!(self, WorkflowVariant::PickLoad)
    }

    /// Human readable title used by templates and the scan station.
    pub const fn title(self) -> &'static str {
        match self {
            WorkflowVariant::Pick => "Pick roll capture",
            WorkflowVariant::Load => "Load capture",
            WorkflowVariant::PickLoad => "Picking and loading",
        }
    }
}

impl Display for WorkflowVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowVariant {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pick" => Ok(WorkflowVariant::Pick),
            "load" => Ok(WorkflowVariant::Load),
            "pick-load" => Ok(WorkflowVariant::PickLoad),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown workflow variant `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_segments() {
        for variant in WorkflowVariant::ALL {
            assert_eq!(variant.as_str().parse::<WorkflowVariant>(), Ok(variant));
        }
        assert!("dispatch".parse::<WorkflowVariant>().is_err());
    }

    #[test]
    fn serializes_as_kebab_case() {
        let json = serde_json::to_string(&WorkflowVariant::PickLoad).unwrap();
        assert_eq!(json, "\"pick-load\"");
    }
}

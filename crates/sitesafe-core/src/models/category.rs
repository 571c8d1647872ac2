use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::AppError;

/// Category of a personnel violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    #[serde(rename = "PPE")]
    Ppe,
    #[serde(rename = "Fall Protection")]
    FallProtection,
    #[serde(rename = "Lift/AWP", alias = "Lift")]
    LiftAwp,
    #[serde(rename = "Scaffold")]
    Scaffold,
    #[serde(rename = "Housekeeping")]
    Housekeeping,
    #[serde(rename = "Electrical")]
    Electrical,
    #[serde(rename = "Hot Work")]
    HotWork,
    #[serde(rename = "Rigging")]
    Rigging,
    #[serde(rename = "LOTO")]
    Loto,
    #[serde(rename = "Excavation/Trenching")]
    ExcavationTrenching,
    #[serde(rename = "Traffic Control")]
    TrafficControl,
    #[serde(rename = "Tools/Equipment")]
    ToolsEquipment,
    #[serde(rename = "Other")]
    Other,
}

impl ViolationType {
    pub const ALL: [ViolationType; 13] = [
        ViolationType::Ppe,
        ViolationType::FallProtection,
        ViolationType::LiftAwp,
        ViolationType::Scaffold,
        ViolationType::Housekeeping,
        ViolationType::Electrical,
        ViolationType::HotWork,
        ViolationType::Rigging,
        ViolationType::Loto,
        ViolationType::ExcavationTrenching,
        ViolationType::TrafficControl,
        ViolationType::ToolsEquipment,
        ViolationType::Other,
    ];

    /// Label as stored and displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationType::Ppe => "PPE",
            ViolationType::FallProtection => "Fall Protection",
            ViolationType::LiftAwp => "Lift/AWP",
            ViolationType::Scaffold => "Scaffold",
            ViolationType::Housekeeping => "Housekeeping",
            ViolationType::Electrical => "Electrical",
            ViolationType::HotWork => "Hot Work",
            ViolationType::Rigging => "Rigging",
            ViolationType::Loto => "LOTO",
            ViolationType::ExcavationTrenching => "Excavation/Trenching",
            ViolationType::TrafficControl => "Traffic Control",
            ViolationType::ToolsEquipment => "Tools/Equipment",
            ViolationType::Other => "Other",
        }
    }
}

impl FromStr for ViolationType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        // Older rows were written with the short "Lift" label.
        if wanted.eq_ignore_ascii_case("lift") {
            return Ok(ViolationType::LiftAwp);
        }
        ViolationType::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::Validation(format!("Unknown violation type: {}", s)))
    }
}

impl Display for ViolationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Severity of a personnel violation, also used as the risk level of a site issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Risk level of a site issue.
pub type RiskLevel = Severity;

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl FromStr for Severity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Severity::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::Validation(format!("Unknown severity: {}", s)))
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_type_labels_parse_back() {
        for v in ViolationType::ALL {
            assert_eq!(v.as_str().parse::<ViolationType>().unwrap(), v);
        }
    }

    #[test]
    fn legacy_lift_label_is_accepted() {
        assert_eq!("Lift".parse::<ViolationType>().unwrap(), ViolationType::LiftAwp);
        let parsed: ViolationType = serde_json::from_str("\"Lift\"").unwrap();
        assert_eq!(parsed, ViolationType::LiftAwp);
    }

    #[test]
    fn serde_uses_display_labels() {
        assert_eq!(
            serde_json::to_string(&ViolationType::ExcavationTrenching).unwrap(),
            "\"Excavation/Trenching\""
        );
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"Critical\"");
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert!("Asbestos".parse::<ViolationType>().is_err());
        assert!("Extreme".parse::<Severity>().is_err());
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
    }
}

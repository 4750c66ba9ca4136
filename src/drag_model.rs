use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Standard reference projectile a ballistic coefficient is quoted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DragModel {
    /// Flat-base spitzer reference, the traditional catalogue standard
    G1,
    /// Long boat-tail reference, closer to modern match bullets
    G7,
}

impl DragModel {
    pub const ALL: [DragModel; 2] = [DragModel::G1, DragModel::G7];
}

impl FromStr for DragModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "G1" => Ok(DragModel::G1),
            "G7" => Ok(DragModel::G7),
            _ => Err(format!("unknown drag model: {s}")),
        }
    }
}

impl std::fmt::Display for DragModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_model_from_str() {
        assert_eq!("G1".parse::<DragModel>(), Ok(DragModel::G1));
        assert_eq!("G7".parse::<DragModel>(), Ok(DragModel::G7));
    }

    #[test]
    fn test_drag_model_from_str_case_insensitive() {
        assert_eq!("g1".parse::<DragModel>(), Ok(DragModel::G1));
        assert_eq!(" g7 ".parse::<DragModel>(), Ok(DragModel::G7));
    }

    #[test]
    fn test_drag_model_from_str_invalid() {
        assert!("G9".parse::<DragModel>().is_err());
        assert!("".parse::<DragModel>().is_err());
        assert!("invalid".parse::<DragModel>().is_err());
    }

    #[test]
    fn test_drag_model_display_round_trips() {
        for model in DragModel::ALL {
            assert_eq!(model.to_string().parse::<DragModel>(), Ok(model));
        }
    }

    #[test]
    fn test_drag_model_serde() {
        assert_eq!(serde_json::to_string(&DragModel::G7).unwrap(), "\"G7\"");
        let parsed: DragModel = serde_json::from_str("\"G1\"").unwrap();
        assert_eq!(parsed, DragModel::G1);
    }
}

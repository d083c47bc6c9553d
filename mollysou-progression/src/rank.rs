use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Cosmetic/discount tier derived from a user's level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rank {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

/// Display data for a rank tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankInfo {
    pub name: &'static str,
    pub color: &'static str,
    pub border_color: &'static str,
    pub discount: &'static str,
    pub gradient: [&'static str; 2],
}

impl Rank {
    /// First match wins, highest tier first.
    pub fn for_level(level: u32) -> Self {
        match level {
            200.. => Self::Diamond,
            100.. => Self::Platinum,
            50.. => Self::Gold,
            30.. => Self::Silver,
            _ => Self::Bronze,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "BRONZE",
            Self::Silver => "SILVER",
            Self::Gold => "GOLD",
            Self::Platinum => "PLATINUM",
            Self::Diamond => "DIAMOND",
        }
    }

    pub fn info(self) -> RankInfo {
        match self {
            Self::Diamond => RankInfo {
                name: self.as_str(),
                color: "#1E3A8A",
                border_color: "#0BC5EA",
                discount: "50% discount",
                gradient: ["#1E3A8A", "#3B82F6"],
            },
            Self::Platinum => RankInfo {
                name: self.as_str(),
                color: "#0BC5EA",
                border_color: "#1E3A8A",
                discount: "20% discount",
                gradient: ["#06B6D4", "#0BC5EA"],
            },
            Self::Gold => RankInfo {
                name: self.as_str(),
                color: "#FFD700",
                border_color: "#FFA500",
                discount: "15% discount",
                gradient: ["#FFF8DC", "#FFD700"],
            },
            Self::Silver => RankInfo {
                name: self.as_str(),
                color: "#C0C0C0",
                border_color: "#A9A9A9",
                discount: "10% discount",
                gradient: ["#F0F0F0", "#C0C0C0"],
            },
            Self::Bronze => RankInfo {
                name: self.as_str(),
                color: "#CD7F32",
                border_color: "#8B4513",
                discount: "5% discount",
                gradient: ["#DEB887", "#CD7F32"],
            },
        }
    }
}

/// Rank descriptor for an arbitrary level, no user required.
pub fn rank_info(level: u32) -> RankInfo {
    Rank::for_level(level).info()
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseRankError(String);

impl fmt::Display for ParseRankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rank `{}`", self.0)
    }
}

impl std::error::Error for ParseRankError {}

impl FromStr for Rank {
    type Err = ParseRankError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BRONZE" => Ok(Self::Bronze),
            "SILVER" => Ok(Self::Silver),
            "GOLD" => Ok(Self::Gold),
            "PLATINUM" => Ok(Self::Platinum),
            "DIAMOND" => Ok(Self::Diamond),
            _ => Err(ParseRankError(raw.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_boundaries() {
        assert_eq!(Rank::for_level(1), Rank::Bronze);
        assert_eq!(Rank::for_level(29), Rank::Bronze);
        assert_eq!(Rank::for_level(30), Rank::Silver);
        assert_eq!(Rank::for_level(49), Rank::Silver);
        assert_eq!(Rank::for_level(50), Rank::Gold);
        assert_eq!(Rank::for_level(99), Rank::Gold);
        assert_eq!(Rank::for_level(100), Rank::Platinum);
        assert_eq!(Rank::for_level(199), Rank::Platinum);
        assert_eq!(Rank::for_level(200), Rank::Diamond);
        assert_eq!(Rank::for_level(500), Rank::Diamond);
    }

    #[test]
    fn rank_info_descriptors() {
        let gold = rank_info(75);
        assert_eq!(gold.name, "GOLD");
        assert_eq!(gold.border_color, "#FFA500");
        assert_eq!(gold.discount, "15% discount");
        assert_eq!(gold.gradient, ["#FFF8DC", "#FFD700"]);

        let bronze = rank_info(0);
        assert_eq!(bronze.name, "BRONZE");
        assert_eq!(bronze.gradient, ["#DEB887", "#CD7F32"]);
    }

    #[test]
    fn rank_info_serializes_camel_case() {
        let json = serde_json::to_value(rank_info(250)).unwrap();
        assert_eq!(json["name"], "DIAMOND");
        assert_eq!(json["borderColor"], "#0BC5EA");
        assert_eq!(json["gradient"][1], "#3B82F6");
    }

    #[test]
    fn parses_stored_rank_names() {
        assert_eq!("PLATINUM".parse::<Rank>(), Ok(Rank::Platinum));
        assert_eq!(" silver ".parse::<Rank>(), Ok(Rank::Silver));
        assert!("WOOD".parse::<Rank>().is_err());
        assert_eq!(Rank::Gold.to_string(), "GOLD");
    }
}

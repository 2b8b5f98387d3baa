use serde::{Deserialize, Serialize};

/// Статус страхового случая
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    #[default]
    Open,
    InProgress,
    Settled,
    Closed,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Open => "open",
            ClaimStatus::InProgress => "in_progress",
            ClaimStatus::Settled => "settled",
            ClaimStatus::Closed => "closed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "open" => Some(ClaimStatus::Open),
            "in_progress" => Some(ClaimStatus::InProgress),
            "settled" => Some(ClaimStatus::Settled),
            "closed" => Some(ClaimStatus::Closed),
            _ => None,
        }
    }
}

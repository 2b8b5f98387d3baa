use serde::{Deserialize, Serialize};

/// Статус записи о комиссии
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    #[default]
    Open,
    Closed,
    /// Загружена пакетным импортом
    Imported,
}

impl CommissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionStatus::Open => "open",
            CommissionStatus::Closed => "closed",
            CommissionStatus::Imported => "imported",
        }
    }

    /// Парсинг из строки (регистр не важен)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "open" => Some(CommissionStatus::Open),
            "closed" => Some(CommissionStatus::Closed),
            "imported" => Some(CommissionStatus::Imported),
            _ => None,
        }
    }
}

impl std::fmt::Display for CommissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for status in [
            CommissionStatus::Open,
            CommissionStatus::Closed,
            CommissionStatus::Imported,
        ] {
            assert_eq!(CommissionStatus::from_code(status.as_str()), Some(status));
        }
        assert_eq!(CommissionStatus::from_code(" Closed "), Some(CommissionStatus::Closed));
        assert_eq!(CommissionStatus::from_code("archived"), None);
    }
}

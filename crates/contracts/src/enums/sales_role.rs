use serde::{Deserialize, Serialize};

/// Роль пользователя в отделе продаж
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesRole {
    /// Директор: видит и меняет все записи, утверждает планы
    SalesDirector,
    /// Менеджер по продажам: работает только со своими записями
    SalesRep,
}

impl SalesRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesRole::SalesDirector => "sales_director",
            SalesRole::SalesRep => "sales_rep",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "sales_director" => Some(SalesRole::SalesDirector),
            "sales_rep" => Some(SalesRole::SalesRep),
            _ => None,
        }
    }

    pub fn is_director(&self) -> bool {
        matches!(self, SalesRole::SalesDirector)
    }
}

impl std::fmt::Display for SalesRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Служебные поля каждой записи учета: сделки, чека, продавца, цели.
///
/// `version` равна числу сохранений; у записи, еще не попавшей в базу, она 0.
/// Таблицы хранят эти поля в колонках `created_at`, `updated_at`, `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

impl EntityMetadata {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Отметка очередного сохранения: время изменения и номер версии
    pub fn record_write(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}

impl Default for EntityMetadata {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_write_bumps_version_and_keeps_creation_time() {
        let mut metadata = EntityMetadata::new();
        let created = metadata.created_at;
        assert_eq!(metadata.version, 0);

        metadata.record_write();
        metadata.record_write();
        assert_eq!(metadata.version, 2);
        assert_eq!(metadata.created_at, created);
        assert!(metadata.updated_at >= created);
    }
}

use serde::{Deserialize, Serialize};

/// Результат импорта
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ImportCommissionsResponse {
    pub inserted_count: usize,
    pub skipped: Vec<SkippedRow>,
    /// Предупреждения валидатора разделений (не блокируют импорт)
    pub warnings: Vec<String>,
}

/// Строка, которая не была загружена
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedRow {
    /// Номер строки данных, с 1 (без учета заголовка)
    pub row_index: usize,
    pub reason: String,
}

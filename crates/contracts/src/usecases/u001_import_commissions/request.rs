use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Запрос на импорт: строки таблицы в виде "заголовок колонки → значение"
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImportCommissionsRequest {
    pub rows: Vec<HashMap<String, String>>,
    /// Имя исходного файла, только для лога
    #[serde(default)]
    pub file_name: Option<String>,
}

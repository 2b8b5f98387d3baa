//! Загрузка строк импорта из CSV-файла.

use std::collections::HashMap;

use anyhow::Result;

use crate::shared::error::ServiceError;

/// Разобрать CSV в строки "заголовок → значение".
/// Полностью пустые строки пропускаются.
pub fn parse_csv(csv_text: &str) -> Result<Vec<HashMap<String, String>>> {
    // Strip UTF-8 BOM if present
    let text = csv_text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            return Err(ServiceError::validation(format!(
                "Failed to read CSV headers: {}",
                e
            )));
        }
    };

    tracing::info!(
        "Import CSV headers: {:?}",
        headers.iter().collect::<Vec<_>>()
    );

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            ServiceError::validation(format!("Malformed CSV record {}: {}", index + 1, e))
        })?;
        if record.iter().all(|value| value.is_empty()) {
            continue;
        }

        let row: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_by_header() {
        let text = "\u{FEFF}Client Name,Salesperson,Initial Estimate\n\
                    Seaside Villas,Dana Ruiz,\"$1,250,000\"\n\
                    ,,\n\
                    Palm Court , Eli Park,90000\n";
        let rows = parse_csv(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Client Name"], "Seaside Villas");
        assert_eq!(rows[0]["Initial Estimate"], "$1,250,000");
        assert_eq!(rows[1]["Salesperson"], "Eli Park");
    }

    #[test]
    fn short_rows_are_tolerated() {
        let rows = parse_csv("Client Name,Salesperson,Year\nHarbor,Dana\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].contains_key("Year"));
    }
}

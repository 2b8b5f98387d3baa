//! Денежные значения: разбор пользовательского ввода и форматирование

/// Разбор суммы из текстового поля формы.
///
/// Отбрасывает `$`, `%`, пробелы и разделители тысяч. Любой некорректный
/// ввод превращается в 0, ошибка не возвращается.
pub fn parse_amount(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, '$' | '%' | ',' | ' ' | '\u{a0}' | '\t'))
        .collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Округление до центов
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Форматирует сумму в долларах: `1234.5` → `$1,234.50`
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, fraction)
}

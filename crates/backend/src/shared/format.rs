/// Форматирует число с разделителями тысяч (запятыми)
///
/// # Примеры
/// ```ignore
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// Сумма в лемпирах с двумя знаками: `L 1,495.00`, `-L 12.50`
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}L {}.{:02}",
        sign,
        group_thousands(&(cents / 100).to_string()),
        cents % 100
    )
}

/// Сумма с двумя знаками без символа валюты (для CSV)
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

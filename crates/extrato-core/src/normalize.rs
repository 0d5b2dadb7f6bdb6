//! Normalization of raw statement fields into canonical transactions
//!
//! Every coercion here is parse-or-reject: a field that cannot be read
//! yields `None` and the record is dropped by the caller.

use chrono::NaiveDate;

use crate::models::{CanonicalTransaction, Direction, RawExtraction};

/// Placeholder used when a record has no usable description
pub const DEFAULT_DESCRIPTION_PLACEHOLDER: &str = "Transação sem descrição";

/// Descriptions longer than this are cut (in chars)
pub const DEFAULT_MAX_DESCRIPTION_CHARS: usize = 100;

/// Settings for description cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub description_placeholder: String,
    pub max_description_chars: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            description_placeholder: DEFAULT_DESCRIPTION_PLACEHOLDER.to_string(),
            max_description_chars: DEFAULT_MAX_DESCRIPTION_CHARS,
        }
    }
}

/// Turn a raw extraction into a canonical transaction.
///
/// Returns `None` when the date or amount cannot be read. An unreadable
/// running balance is dropped without rejecting the record.
pub(crate) fn normalize(
    raw: RawExtraction,
    options: &NormalizeOptions,
) -> Option<CanonicalTransaction> {
    let date = parse_date(&raw.date)?;
    let signed = signed_amount(&raw)?;

    let running_balance = raw.balance.as_deref().and_then(parse_amount);
    let category = raw
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    Some(CanonicalTransaction {
        date,
        description: clean_description(&raw.description, options),
        amount: signed.abs(),
        direction: Direction::from_signed(signed),
        category,
        running_balance,
        source_line: raw.source_line,
    })
}

/// Signed value of a record: the amount field, or credit minus debit
fn signed_amount(raw: &RawExtraction) -> Option<f64> {
    if let Some(amount) = raw.amount.as_deref() {
        return parse_amount(amount);
    }

    let debit = present(raw.debit.as_deref());
    let credit = present(raw.credit.as_deref());
    if debit.is_none() && credit.is_none() {
        return None;
    }

    let debit = match debit {
        Some(text) => parse_amount(text)?.abs(),
        None => 0.0,
    };
    let credit = match credit {
        Some(text) => parse_amount(text)?.abs(),
        None => 0.0,
    };

    Some(credit - debit)
}

fn present(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.trim().is_empty())
}

/// Accepted statement date formats, tried in order
const DATE_FORMATS: [&str; 3] = [
    "%d/%m/%Y", // 15/01/2024
    "%d-%m-%Y", // 15-01-2024
    "%Y-%m-%d", // 2024-01-15
];

/// Parse a statement date.
///
/// Day and month may be one or two digits; the year must have four. The
/// result must be a real calendar date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if !has_four_digit_year(s) {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// `YYYY-` at the start, or `/YYYY` / `-YYYY` at the end
fn has_four_digit_year(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 6 {
        return false;
    }
    let digits = |part: &[u8]| part.iter().all(u8::is_ascii_digit);
    let tail = bytes.len() - 4;

    (digits(&bytes[..4]) && bytes[4] == b'-')
        || (digits(&bytes[tail..]) && matches!(bytes[tail - 1], b'/' | b'-'))
}

/// Parse a statement amount, keeping its sign.
///
/// Handles `R$` markers, `(X)` negatives, decimal commas and thousands
/// separators (`1.234,56` and `1,234.56`). Non-finite values are rejected.
pub fn parse_amount(s: &str) -> Option<f64> {
    let mut cleaned: String = s
        .replace("R$", "")
        .replace('$', "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.len() >= 2 && cleaned.starts_with('(') && cleaned.ends_with(')') {
        cleaned = format!("-{}", &cleaned[1..cleaned.len() - 1]);
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    cleaned = match (last_comma, last_dot) {
        // 1,234.56
        (Some(comma), Some(dot)) if dot > comma => cleaned.replace(',', ""),
        // 1.234,56 or 150,00
        (Some(_), _) => cleaned.replace('.', "").replace(',', "."),
        _ => cleaned,
    };

    let value: f64 = cleaned.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Trim, unquote and collapse whitespace; fall back to the placeholder
pub fn clean_description(s: &str, options: &NormalizeOptions) -> String {
    let unquoted = s.trim().trim_matches(|c: char| c == '"' || c == '\'');
    let collapsed = unquoted.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        return options.description_placeholder.clone();
    }

    match collapsed.char_indices().nth(options.max_description_chars) {
        Some((idx, _)) => collapsed[..idx].trim_end().to_string(),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, description: &str, amount: &str) -> RawExtraction {
        RawExtraction {
            date: date.to_string(),
            description: description.to_string(),
            amount: Some(amount.to_string()),
            source_line: format!("{} {} {}", date, description, amount),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("15/01/2024"), Some(expected));
        assert_eq!(parse_date("15-01-2024"), Some(expected));
        assert_eq!(parse_date("2024-01-15"), Some(expected));
        assert_eq!(parse_date(" 5/1/2024 "), NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn test_parse_date_rejects_other_shapes() {
        assert_eq!(parse_date("01/15/24"), None);
        assert_eq!(parse_date("20240115"), None);
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_date("15/01/2024 10:00"), None);
        assert_eq!(parse_date("15/01/24"), None);
        assert_eq!(parse_date("2024/01/15"), None);
        assert_eq!(parse_date("15/01/02024"), None);
        assert_eq!(parse_date("Data"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_date_keeps_components() {
        for (text, y, m, d) in [
            ("01/12/2023", 2023, 12, 1),
            ("29/02/2024", 2024, 2, 29),
            ("31/12/1999", 1999, 12, 31),
        ] {
            let date = parse_date(text).unwrap();
            assert_eq!(date, NaiveDate::from_ymd_opt(y, m, d).unwrap());
            assert_eq!(date.format("%Y-%m-%d").to_string(), format!("{y:04}-{m:02}-{d:02}"));
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("150,00"), Some(150.0));
        assert_eq!(parse_amount("-45.90"), Some(-45.9));
        assert_eq!(parse_amount("R$ 1.234,56"), Some(1234.56));
        assert_eq!(parse_amount("-R$ 10,50"), Some(-10.5));
        assert_eq!(parse_amount("(100,25)"), Some(-100.25));
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("+12"), Some(12.0));
        // Without a comma the dot is read as the decimal point
        assert_eq!(parse_amount("1.500"), Some(1.5));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("Valor"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("1,2,3"), None);
    }

    #[test]
    fn test_clean_description() {
        let options = NormalizeOptions::default();
        assert_eq!(clean_description("  \"PIX   RECEBIDO\" ", &options), "PIX RECEBIDO");
        assert_eq!(clean_description("   ", &options), DEFAULT_DESCRIPTION_PLACEHOLDER);

        let short = NormalizeOptions {
            max_description_chars: 5,
            ..Default::default()
        };
        assert_eq!(clean_description("PAGAMENTO", &short), "PAGAM");
        assert_eq!(clean_description("AÇÚCAR ÉÉÉ", &short), "AÇÚCA");
    }

    #[test]
    fn test_normalize_comma_amount_is_income() {
        let tx = normalize(raw("15/01/2024", "PIX", "150,00"), &NormalizeOptions::default())
            .unwrap();
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(tx.amount, 150.0);
        assert_eq!(tx.direction, Direction::Income);
    }

    #[test]
    fn test_normalize_parenthesized_amount_is_expense() {
        let tx = normalize(raw("15/01/2024", "TARIFA", "(12,34)"), &NormalizeOptions::default())
            .unwrap();
        assert_eq!(tx.amount, 12.34);
        assert_eq!(tx.direction, Direction::Expense);
    }

    #[test]
    fn test_normalize_drops_bad_records() {
        let options = NormalizeOptions::default();
        assert!(normalize(raw("ontem", "PIX", "10,00"), &options).is_none());
        assert!(normalize(raw("15/01/2024", "PIX", "dez reais"), &options).is_none());
    }

    #[test]
    fn test_normalize_debit_credit() {
        let options = NormalizeOptions::default();
        let debit = RawExtraction {
            date: "15/01/2024".to_string(),
            description: "PIX ENVIADO".to_string(),
            debit: Some("1.500,00".to_string()),
            balance: Some("3.200,50".to_string()),
            ..Default::default()
        };
        let tx = normalize(debit, &options).unwrap();
        assert_eq!(tx.amount, 1500.0);
        assert_eq!(tx.direction, Direction::Expense);
        assert_eq!(tx.running_balance, Some(3200.5));

        let credit = RawExtraction {
            date: "15/01/2024".to_string(),
            debit: Some(String::new()),
            credit: Some("80,00".to_string()),
            balance: Some("saldo?".to_string()),
            ..Default::default()
        };
        let tx = normalize(credit, &options).unwrap();
        assert_eq!(tx.amount, 80.0);
        assert_eq!(tx.direction, Direction::Income);
        assert_eq!(tx.description, DEFAULT_DESCRIPTION_PLACEHOLDER);
        assert_eq!(tx.running_balance, None);

        let neither = RawExtraction {
            date: "15/01/2024".to_string(),
            ..Default::default()
        };
        assert!(normalize(neither, &options).is_none());
    }

    #[test]
    fn test_normalize_category_trimmed() {
        let mut with_category = raw("2024-01-10", "Uber", "-45.90");
        with_category.category = Some(" transporte ".to_string());
        let tx = normalize(with_category, &NormalizeOptions::default()).unwrap();
        assert_eq!(tx.category, Some("transporte".to_string()));

        let mut blank = raw("2024-01-10", "Uber", "-45.90");
        blank.category = Some("  ".to_string());
        let tx = normalize(blank, &NormalizeOptions::default()).unwrap();
        assert_eq!(tx.category, None);
    }
}

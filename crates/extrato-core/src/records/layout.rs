//! Debit/credit/balance heuristics for PDF statement text
//!
//! Extracted PDF text loses its columns, so a line like
//! `15/01/2024 PIX ENVIADO FULANO 1.500,00 3.200,50` only tells us how many
//! money values were printed. The count decides what each value means:
//!
//! | values | meaning                                   |
//! |--------|-------------------------------------------|
//! | 1      | debit for PIX/transfer lines, else balance |
//! | 2      | debit, balance                            |
//! | 3+     | debit, credit, balance                    |

use tracing::debug;

use super::{positional, Patterns, PdfLayout};
use crate::models::RawExtraction;
use crate::normalize::parse_date;

/// Keywords that mark a lone value as a movement instead of a balance
const TRANSFER_KEYWORDS: &[&str] = &["pix", "transferencia", "transferência"];

#[derive(Debug, PartialEq)]
enum LineReading {
    Movement(RawExtraction),
    /// Dated line that only prints the running balance
    BalanceOnly,
    NoMatch,
}

fn read_debit_credit_balance(line: &str, patterns: &Patterns) -> LineReading {
    let Some(date) = patterns.layout_date.find(line) else {
        return LineReading::NoMatch;
    };
    if parse_date(date.as_str()).is_none() {
        return LineReading::NoMatch;
    }

    let rest = &line[date.end()..];
    let values: Vec<_> = patterns.money.find_iter(rest).collect();
    let Some(first) = values.first() else {
        return LineReading::NoMatch;
    };

    let description = rest[..first.start()].trim().to_string();
    let text = |i: usize| values.get(i).map(|m| m.as_str().to_string());

    let mut record = RawExtraction {
        date: date.as_str().to_string(),
        description,
        source_line: line.to_string(),
        ..Default::default()
    };

    match values.len() {
        1 => {
            let lowered = record.description.to_lowercase();
            if !TRANSFER_KEYWORDS.iter().any(|k| lowered.contains(k)) {
                return LineReading::BalanceOnly;
            }
            record.debit = text(0);
        }
        2 => {
            record.debit = text(0);
            record.balance = text(1);
        }
        _ => {
            record.debit = text(0);
            record.credit = text(1);
            record.balance = text(2);
        }
    }

    LineReading::Movement(record)
}

/// Read PDF lines with the given layout; lines it cannot place go through
/// the positional pattern instead
pub(super) fn extract(text: &str, kind: PdfLayout, patterns: &Patterns) -> Vec<RawExtraction> {
    let read = match kind {
        PdfLayout::DebitCreditBalance => read_debit_credit_balance,
    };

    let mut records = Vec::new();
    let mut balance_lines = 0usize;

    for line in text.lines() {
        match read(line, patterns) {
            LineReading::Movement(record) => records.push(record),
            LineReading::BalanceOnly => balance_lines += 1,
            LineReading::NoMatch => {
                records.extend(positional::extract(line, patterns));
            }
        }
    }

    if balance_lines > 0 {
        debug!("Skipped {} balance-only lines", balance_lines);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Patterns {
        Patterns::compile().unwrap()
    }

    #[test]
    fn test_two_values_are_debit_and_balance() {
        let records = extract(
            "15/01/2024 PIX ENVIADO FULANO 1.500,00 3.200,50",
            PdfLayout::DebitCreditBalance,
            &patterns(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "PIX ENVIADO FULANO");
        assert_eq!(records[0].debit.as_deref(), Some("1.500,00"));
        assert_eq!(records[0].credit, None);
        assert_eq!(records[0].balance.as_deref(), Some("3.200,50"));
        assert_eq!(records[0].amount, None);
    }

    #[test]
    fn test_three_values() {
        let records = extract(
            "16/01/2024 ESTORNO TARIFA 10,00 25,00 3.215,50",
            PdfLayout::DebitCreditBalance,
            &patterns(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].debit.as_deref(), Some("10,00"));
        assert_eq!(records[0].credit.as_deref(), Some("25,00"));
        assert_eq!(records[0].balance.as_deref(), Some("3.215,50"));
    }

    #[test]
    fn test_single_value_depends_on_keywords() {
        let patterns = patterns();
        let text = "17/01/2024 SALDO ANTERIOR 3.215,50\n\
                    18/01/2024 TRANSFERENCIA PARA POUPANCA 200,00";
        let records = extract(text, PdfLayout::DebitCreditBalance, &patterns);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "TRANSFERENCIA PARA POUPANCA");
        assert_eq!(records[0].debit.as_deref(), Some("200,00"));
        assert_eq!(
            read_debit_credit_balance("17/01/2024 SALDO ANTERIOR 3.215,50", &patterns),
            LineReading::BalanceOnly
        );
    }

    #[test]
    fn test_unplaced_lines_fall_back_to_positional() {
        let text = "Extrato Bradesco\n\
                    19/01/2024 DEPOSITO 1500\n\
                    sem data 10,00";
        let records = extract(text, PdfLayout::DebitCreditBalance, &patterns());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "DEPOSITO");
        assert_eq!(records[0].amount.as_deref(), Some("1500"));
    }

    #[test]
    fn test_invalid_date_is_no_match() {
        assert_eq!(
            read_debit_credit_balance("31/02/2024 PIX 10,00 20,00", &patterns()),
            LineReading::NoMatch
        );
    }
}

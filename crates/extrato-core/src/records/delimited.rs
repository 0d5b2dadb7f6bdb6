//! Delimited (CSV-like) statement lines

use csv::{ReaderBuilder, Trim};

use super::{AmountColumns, DelimitedLayout, Delimiter};
use crate::models::RawExtraction;
use crate::normalize::{parse_amount, parse_date};

/// Split one line into trimmed fields, honoring quoted values
fn split_fields(line: &str, delimiter: Delimiter) -> Option<Vec<String>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter.byte_for(line))
        .from_reader(line.as_bytes());

    let record = rdr.records().next()?.ok()?;
    Some(record.iter().map(|field| field.to_string()).collect())
}

fn field(fields: &[String], index: usize) -> Option<&str> {
    fields.get(index).map(|s| s.as_str())
}

fn non_blank(fields: &[String], index: usize) -> Option<String> {
    field(fields, index)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Pull one record per line that has a valid date and a readable amount
pub(super) fn extract(text: &str, layout: &DelimitedLayout) -> Vec<RawExtraction> {
    text.lines()
        .filter_map(|line| extract_line(line, layout))
        .collect()
}

fn extract_line(line: &str, layout: &DelimitedLayout) -> Option<RawExtraction> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let fields = split_fields(trimmed, layout.delimiter)?;
    if fields.len() < layout.min_fields {
        return None;
    }

    let date = field(&fields, layout.date)?;
    parse_date(date)?;

    let mut record = RawExtraction {
        date: date.to_string(),
        description: field(&fields, layout.description)
            .unwrap_or_default()
            .to_string(),
        category: layout.category.and_then(|i| non_blank(&fields, i)),
        balance: layout.balance.and_then(|i| non_blank(&fields, i)),
        source_line: line.to_string(),
        ..Default::default()
    };

    match layout.amount {
        AmountColumns::Signed(i) => {
            let amount = field(&fields, i)?;
            parse_amount(amount)?;
            record.amount = Some(amount.to_string());
        }
        AmountColumns::DebitCredit { debit, credit } => {
            let debit = non_blank(&fields, debit);
            let credit = non_blank(&fields, credit);
            let readable = |value: &Option<String>| {
                value.as_deref().map_or(true, |v| parse_amount(v).is_some())
            };
            if (debit.is_none() && credit.is_none()) || !readable(&debit) || !readable(&credit) {
                return None;
            }
            record.debit = debit;
            record.credit = credit;
        }
    }

    Some(record)
}

/// True when some line has at least three fields and starts with a date
pub(crate) fn has_delimited_rows(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .filter(|line| line.contains(',') || line.contains(';'))
        .filter_map(|line| split_fields(line, Delimiter::Auto))
        .any(|fields| fields.len() >= 3 && parse_date(&fields[0]).is_some())
}

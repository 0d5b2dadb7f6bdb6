//! Statement preview parsing

use std::path::{Path, PathBuf};

use anyhow::Result;
use extrato_core::{Direction, FailureKind, ParseOutcome, StatementImporter};
use serde_json::json;
use tokio::task::{self, JoinError};
use tracing::warn;

use super::{format_brl, truncate};

/// Parse every file on a blocking worker, keeping input order.
///
/// A worker that dies only fails its own file.
pub async fn parse_files(
    importer: &StatementImporter,
    files: &[PathBuf],
) -> Vec<(PathBuf, ParseOutcome)> {
    let handles: Vec<_> = files
        .iter()
        .map(|file| {
            let importer = importer.clone();
            let path = file.clone();
            task::spawn_blocking(move || importer.parse_file(&path))
        })
        .collect();

    let mut outcomes = Vec::with_capacity(files.len());
    for (file, handle) in files.iter().zip(handles) {
        let outcome = handle.await.unwrap_or_else(|e| worker_failed(file, e));
        outcomes.push((file.clone(), outcome));
    }
    outcomes
}

/// Outcome for a file whose parse worker panicked or was cancelled
pub fn worker_failed(file: &Path, e: JoinError) -> ParseOutcome {
    warn!("Parse worker failed for {}: {}", file.display(), e);
    ParseOutcome::failed(
        FailureKind::ExtractionFailed,
        format!("Falha ao processar o arquivo: {}", e),
    )
}

pub async fn cmd_parse(importer: &StatementImporter, files: &[PathBuf], json: bool) -> Result<()> {
    let outcomes = parse_files(importer, files).await;

    if json {
        let value: Vec<_> = outcomes
            .iter()
            .map(|(file, outcome)| {
                json!({
                    "file": file.display().to_string(),
                    "outcome": outcome,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for (file, outcome) in &outcomes {
        print_outcome(file, outcome);
    }
    Ok(())
}

fn print_outcome(file: &Path, outcome: &ParseOutcome) {
    println!();
    println!("📄 {}", file.display());

    if !outcome.success {
        for error in &outcome.errors {
            println!("   ❌ {}", error);
        }
        return;
    }

    println!(
        "   🏦 {}",
        outcome.institution_detected.as_deref().unwrap_or("-")
    );

    if outcome.transactions.is_empty() {
        println!("   No transactions found.");
        return;
    }

    println!();
    println!(
        "   {:<10}  {:<40}  {:>14}  {:<7}",
        "Date", "Description", "Amount", "Type"
    );
    println!("   {}", "─".repeat(77));
    for tx in &outcome.transactions {
        let kind = match tx.direction {
            Direction::Income => "INCOME",
            Direction::Expense => "EXPENSE",
        };
        println!(
            "   {:<10}  {:<40}  {:>14}  {:<7}",
            tx.date.format("%d/%m/%Y"),
            truncate(&tx.description, 40),
            format_brl(tx.signed_amount()),
            kind
        );
    }

    println!();
    println!("   Transactions: {}", outcome.total_transactions);
    println!("   💰 Income:   {}", format_brl(outcome.summary.income));
    println!("   💸 Expenses: {}", format_brl(outcome.summary.expenses));
    println!("   📊 Balance:  {}", format_brl(outcome.summary.balance));
}

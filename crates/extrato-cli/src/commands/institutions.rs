//! Institution listing and identification

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use extrato_core::{
    Detector, ExtractionStyle, InstitutionProfile, ProfileRegistry, StatementImporter,
};

/// Short description of how a profile is detected
fn detector_summary(detector: &Detector) -> String {
    match detector {
        Detector::Signatures { content, filename } => {
            let mut hints: Vec<&str> = Vec::new();
            for hint in content.iter().chain(filename) {
                if !hints.contains(&hint.as_str()) {
                    hints.push(hint);
                }
            }
            hints.join(", ")
        }
        other => format!("({})", other.kind()),
    }
}

fn style_summary(style: &ExtractionStyle) -> String {
    match style {
        ExtractionStyle::Delimited(layout) => {
            format!("{} '{}'", style.kind(), layout.delimiter.as_str())
        }
        ExtractionStyle::Positional {
            pdf_layout: Some(_),
        } => format!("{} + pdf layout", style.kind()),
        _ => style.kind().to_string(),
    }
}

/// One display line per profile, in detection order
pub fn institution_lines(profiles: &[InstitutionProfile]) -> Vec<String> {
    profiles
        .iter()
        .enumerate()
        .map(|(i, profile)| {
            format!(
                "{:>3}. {:<26} {:<22} {}",
                i + 1,
                profile.name,
                style_summary(&profile.style),
                detector_summary(&profile.detector)
            )
        })
        .collect()
}

/// Detail lines for the institution called `name`
pub fn institution_details(registry: &ProfileRegistry, name: &str) -> Result<Vec<String>> {
    let profile = registry
        .get(name)
        .with_context(|| format!("Unknown institution: {}", name))?;
    let position = registry
        .profiles()
        .iter()
        .position(|p| p.name == profile.name)
        .map_or(0, |i| i + 1);

    Ok(vec![
        format!("Name:      {}", profile.name),
        format!("Order:     {}", position),
        format!("Style:     {}", style_summary(&profile.style)),
        format!("Detection: {}", detector_summary(&profile.detector)),
        format!(
            "Fallback:  {}",
            if profile.is_fallback() { "yes" } else { "no" }
        ),
    ])
}

pub fn cmd_institutions(importer: &StatementImporter, name: Option<&str>) -> Result<()> {
    let registry = importer.registry();

    if let Some(name) = name {
        println!();
        for line in institution_details(registry, name)? {
            println!("🏦 {}", line);
        }
        return Ok(());
    }

    let profiles = registry.profiles();
    let fallbacks = profiles.iter().filter(|p| p.is_fallback()).count();

    println!();
    println!(
        "🏦 Institutions ({} named, {} fallbacks), in detection order:",
        profiles.len() - fallbacks,
        fallbacks
    );
    println!();
    for line in institution_lines(profiles) {
        println!("   {}", line);
    }
    Ok(())
}

/// Detect the institution of `file` without parsing its transactions
pub fn identify_file(importer: &StatementImporter, file: &Path) -> Result<String> {
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let reader = BufReader::new(
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?,
    );

    Ok(importer.identify(reader, &filename)?)
}

pub fn cmd_identify(importer: &StatementImporter, file: &Path) -> Result<()> {
    let institution = identify_file(importer, file)?;
    println!("🏦 {}: {}", file.display(), institution);
    Ok(())
}

//! Check command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use me_facts::Unit;
use me_lint::{Diagnostic, LintLevel, Linter, MissingErrorConfig, MissingErrorRule};
use me_span::FileSpan;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A diagnostic with its rendered location
#[derive(Debug, Serialize)]
pub struct Finding {
    /// Fact file the unit was loaded from
    pub source: PathBuf,
    /// Source file name recorded in the unit
    pub file: String,
    /// One-based line, when the unit has a line table
    pub line: Option<u32>,
    /// One-based column, when the unit has a line table
    pub column: Option<u32>,
    /// The diagnostic itself
    #[serde(flatten)]
    pub diagnostic: Diagnostic,
}

impl Finding {
    fn new(source: &Path, unit: &Unit, diagnostic: Diagnostic) -> Self {
        let (file, position) = locate(unit, diagnostic.span);
        Self {
            source: source.to_path_buf(),
            file,
            line: position.map(|(line, _)| line),
            column: position.map(|(_, column)| column),
            diagnostic,
        }
    }

    /// `file:line:col`, or `file:@offset` without a line table
    pub fn location(&self) -> String {
        match (self.line, self.column) {
            (Some(line), Some(column)) => format!("{}:{line}:{column}", self.file),
            _ => format!("{}:@{}", self.file, self.diagnostic.span.span.start),
        }
    }
}

fn locate(unit: &Unit, span: FileSpan) -> (String, Option<(u32, u32)>) {
    match unit.file(span.file) {
        Some(file) => (file.name.clone(), file.line_col(span.span.start)),
        None => (span.file.to_string(), None),
    }
}

/// Run the missing-error check over every fact file under `paths`
///
/// Returns the number of findings.
pub fn run_check(paths: &[PathBuf], wrappers: &str, format: &str) -> Result<usize> {
    if !matches!(format, "text" | "json") {
        anyhow::bail!("Unknown format: {}", format);
    }

    let fact_files = find_fact_files(paths)?;
    if fact_files.is_empty() {
        anyhow::bail!("No fact files found in {:?}", paths);
    }
    tracing::debug!(files = fact_files.len(), wrappers, "checking");

    let linter = Linter::with_rules(vec![Box::new(MissingErrorRule::new(MissingErrorConfig {
        wrappers: wrappers.to_string(),
    }))]);

    let findings = check_files(&linter, &fact_files)?;

    let output = match format {
        "json" => render_json(&findings)?,
        _ => render_text(&findings),
    };
    println!("{output}");

    Ok(findings.len())
}

/// Lint every fact file in order
pub fn check_files(linter: &Linter, fact_files: &[PathBuf]) -> Result<Vec<Finding>> {
    let mut findings = Vec::new();

    for path in fact_files {
        let unit = load_unit(path)?;
        let diagnostics = linter
            .lint_unit(&unit)
            .with_context(|| format!("Failed to check {}", path.display()))?;
        findings.extend(
            diagnostics
                .into_iter()
                .map(|diagnostic| Finding::new(path, &unit, diagnostic)),
        );
    }

    Ok(findings)
}

/// Read and decode one fact file
pub fn load_unit(path: &Path) -> Result<Unit> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fact file {}", path.display()))?;
    Unit::from_json(&text).with_context(|| format!("Failed to load fact file {}", path.display()))
}

/// Expand `paths` into fact files; directories are scanned one level deep
pub fn find_fact_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found = Vec::new();
            let entries = std::fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {}", path.display()))?;
            for entry in entries {
                let file_path = entry?.path();
                if file_path.is_file() && file_path.extension().is_some_and(|ext| ext == "json") {
                    found.push(file_path);
                }
            }
            found.sort();
            files.extend(found);
        } else {
            anyhow::bail!("Path does not exist: {}", path.display());
        }
    }

    Ok(files)
}

/// Findings as a pretty-printed JSON array
pub fn render_json(findings: &[Finding]) -> Result<String> {
    Ok(serde_json::to_string_pretty(findings)?)
}

/// One colored line per finding, then a summary line
pub fn render_text(findings: &[Finding]) -> String {
    let mut lines: Vec<String> = findings
        .iter()
        .map(|finding| {
            let level = match finding.diagnostic.level {
                LintLevel::Error => "error".red().bold(),
                LintLevel::Warning => "warning".yellow().bold(),
                LintLevel::Info => "info".cyan().bold(),
            };
            format!(
                "{}: {}: {} [{}]",
                finding.location().bold(),
                level,
                finding.diagnostic.message,
                finding.diagnostic.rule
            )
        })
        .collect();

    if findings.is_empty() {
        lines.push(format!("{} No issues found", "Success:".green().bold()));
    } else {
        lines.push(format!("{} {} issues found", "Summary:".bold(), findings.len()));
    }
    lines.join("\n")
}

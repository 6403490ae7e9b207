//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.
//! Diagnostics always go to stderr so stdout stays parseable.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use jamfpro_core::{Diagnostic, Diagnostics, OperationReport, Outcome, Severity};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are not
/// plain `Tabled` rows.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Operation reports ────────────────────────────────────────────────

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Attribute")]
    attribute: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render an operation report. Plain output is the tracked ID.
pub fn render_report(
    format: &OutputFormat,
    report: &OperationReport,
    color: bool,
) -> Result<String, CliError> {
    render_single(format, report, |r| report_detail(r, color), |r| r.id().to_owned())
}

fn report_detail(report: &OperationReport, color: bool) -> String {
    let outcome = report.outcome.to_string();
    let outcome = if color {
        match report.outcome {
            Outcome::Success => outcome.green().to_string(),
            Outcome::Drift => outcome.yellow().to_string(),
            Outcome::Failure => outcome.red().bold().to_string(),
        }
    } else {
        outcome
    };

    let id = if report.id().is_empty() { "-" } else { report.id() };
    let mut out = format!("{} {} {id}: {outcome}", report.operation, report.kind);

    if let Some(state) = &report.state {
        let rows: Vec<StateRow> = state
            .iter()
            .map(|(name, value)| StateRow {
                attribute: name.clone(),
                value: value.display(),
            })
            .collect();
        out.push('\n');
        out.push_str(&render_table(&rows));
    }
    out
}

/// Write every diagnostic to stderr, errors in red and warnings in yellow.
pub fn print_diagnostics(diagnostics: &Diagnostics, color: bool) {
    let mut stderr = io::stderr().lock();
    for diagnostic in diagnostics.iter() {
        let _ = writeln!(stderr, "{}", format_diagnostic(diagnostic, color));
    }
}

fn format_diagnostic(diagnostic: &Diagnostic, color: bool) -> String {
    let label = match diagnostic.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    let label = match (color, diagnostic.severity) {
        (false, _) => label.to_owned(),
        (true, Severity::Error) => label.red().bold().to_string(),
        (true, Severity::Warning) => label.yellow().bold().to_string(),
    };

    let mut line = format!("{label}: {}", diagnostic.summary);
    if let Some(attribute) = &diagnostic.attribute {
        line.push_str(&format!(" (at {attribute})"));
    }
    if !diagnostic.detail.is_empty() {
        line.push_str("\n  ");
        line.push_str(&diagnostic.detail);
    }
    line
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(rendered)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Internal(format!("YAML rendering failed: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn diagnostics_render_attribute_and_detail() {
        let diagnostic = Diagnostic::error("Missing required argument", "The argument \"name\" is required.")
            .with_attribute("name");
        assert_eq!(
            format_diagnostic(&diagnostic, false),
            "error: Missing required argument (at name)\n  The argument \"name\" is required."
        );
    }

    #[test]
    fn plain_list_is_one_id_per_line() {
        #[derive(serde::Serialize)]
        struct Item {
            id: &'static str,
        }
        #[derive(Tabled)]
        struct Row {
            id: &'static str,
        }

        let items = [Item { id: "1" }, Item { id: "2" }];
        let out = render_list(&OutputFormat::Plain, &items, |i| Row { id: i.id }, |i| i.id.to_owned()).unwrap();
        assert_eq!(out, "1\n2");
    }
}

//! Resource operations: create, read, update, delete, lookup.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use jamfpro_core::resources;
use jamfpro_core::{
    Backend, FailureKind, LookupQuery, OperationReport, OperationTimeouts, Provider,
};

use crate::cli::{Command, GlobalOpts, LookupArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle<B: Backend>(cmd: Command, provider: &Provider<B>, global: &GlobalOpts) -> Result<(), CliError> {
    let report = match cmd {
        Command::Create(args) => {
            let schema = resources::require(&args.kind)?;
            let desired = load_desired(&args.file)?;
            provider.create(schema, &desired).await
        }
        Command::Read(args) => {
            let schema = resources::require(&args.kind)?;
            provider.read(schema, &args.id).await
        }
        Command::Update(args) => {
            let schema = resources::require(&args.kind)?;
            let desired = load_desired(&args.file)?;
            provider.update(schema, &args.id, &desired).await
        }
        Command::Delete(args) => {
            let schema = resources::require(&args.kind)?;
            provider.delete(schema, &args.id).await
        }
        Command::Lookup(args) => {
            let schema = resources::require(&args.kind)?;
            provider.lookup(schema, &lookup_query(args)?).await
        }
        other => {
            return Err(CliError::Internal(format!("not a resource command: {other:?}")));
        }
    };

    report_outcome(&report, provider.timeouts(), global)
}

fn lookup_query(args: LookupArgs) -> Result<LookupQuery, CliError> {
    match (args.id, args.name) {
        (Some(id), None) => Ok(LookupQuery::ById(id)),
        (None, Some(name)) => Ok(LookupQuery::ByName(name)),
        _ => Err(CliError::Validation {
            field: "lookup".into(),
            reason: "pass exactly one of --id or --name".into(),
        }),
    }
}

/// Print the report, then turn a failed outcome into a non-zero exit.
/// Drift is not an error: the object is gone and its ID was cleared.
fn report_outcome(
    report: &OperationReport,
    timeouts: &OperationTimeouts,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    if global.quiet {
        let mut errors = jamfpro_core::Diagnostics::new();
        for diagnostic in report.diagnostics.errors() {
            errors.push(diagnostic.clone());
        }
        output::print_diagnostics(&errors, color);
    } else {
        output::print_diagnostics(&report.diagnostics, color);
    }

    let rendered = output::render_report(&global.output, report, color)?;
    output::print_output(&rendered, global.quiet);

    if report.is_failure() {
        return Err(failure_error(report, timeouts));
    }
    Ok(())
}

/// Pick the error, and so the exit code, for a failed report. Backend
/// failures keep their class; validation and hydration failures are general.
fn failure_error(report: &OperationReport, timeouts: &OperationTimeouts) -> CliError {
    let detail = || {
        report
            .diagnostics
            .errors()
            .next()
            .map(|d| d.detail.clone())
            .unwrap_or_default()
    };
    match &report.failure {
        Some(FailureKind::Authentication) => CliError::AuthFailed { message: detail() },
        Some(FailureKind::NotFound) => CliError::NotFound {
            identifier: format!("{} {}", report.kind, report.id()),
        },
        Some(FailureKind::Timeout) => CliError::Timeout {
            seconds: timeouts.for_operation(report.operation).timeout.as_secs(),
        },
        Some(FailureKind::Connection { url }) => CliError::ConnectionFailed {
            url: url.clone(),
            reason: detail(),
        },
        Some(FailureKind::Rejected { code }) => CliError::ApiError {
            message: detail(),
            code: code.clone(),
        },
        None => CliError::OperationFailed {
            kind: report.kind.to_owned(),
            operation: report.operation.to_string(),
            errors: report.diagnostics.error_count(),
        },
    }
}

/// Read desired configuration from a resource file.
///
/// `.toml` files are parsed as TOML, anything else as JSON; `-` reads
/// JSON from stdin.
pub fn load_desired(path: &Path) -> Result<Value, CliError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(serde_json::from_str(&buf)?);
    }

    let contents = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        let table: toml::Table = toml::from_str(&contents)?;
        Ok(serde_json::to_value(table)?)
    } else {
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;
    use std::time::Duration;

    use jamfpro_core::{Diagnostic, Diagnostics, Operation, Outcome, ResourceId};
    use serde_json::json;

    use super::*;
    use crate::error::exit_code;

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn toml_resource_files_become_json_objects() {
        let file = write_file(
            ".toml",
            r#"
name = "Engineering"
site_id = "-1"

[[criteria]]
name = "Operating System Version"
search_type = "like"
value = "14."
"#,
        );

        let desired = load_desired(file.path()).unwrap();
        assert_eq!(desired["name"], json!("Engineering"));
        assert_eq!(desired["criteria"][0]["search_type"], json!("like"));
    }

    #[test]
    fn json_resource_files_are_parsed_verbatim() {
        let file = write_file(".json", r#"{"name": "Finance", "priority": 5}"#);
        assert_eq!(load_desired(file.path()).unwrap(), json!({"name": "Finance", "priority": 5}));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let file = write_file(".toml", "name = ");
        assert!(matches!(load_desired(file.path()), Err(CliError::Toml(_))));
    }

    #[test]
    fn lookup_requires_exactly_one_query() {
        let both = LookupArgs {
            kind: "building".into(),
            id: Some("1".into()),
            name: Some("HQ".into()),
        };
        assert!(lookup_query(both).is_err());

        let by_name = LookupArgs {
            kind: "building".into(),
            id: None,
            name: Some("HQ".into()),
        };
        assert_eq!(lookup_query(by_name).unwrap(), LookupQuery::ByName("HQ".into()));
    }

    fn failed(operation: Operation, failure: Option<FailureKind>) -> OperationReport {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::error("Failed", "server said no"));
        OperationReport {
            kind: "building",
            operation,
            outcome: Outcome::Failure,
            id: ResourceId::parse("7"),
            state: None,
            diagnostics,
            failure,
        }
    }

    #[test]
    fn backend_failures_keep_their_exit_code() {
        let mut timeouts = OperationTimeouts::uniform(Duration::from_secs(30));
        timeouts.read = jamfpro_core::RetryPolicy::with_timeout(Duration::from_secs(45));

        let cases = [
            (Some(FailureKind::Authentication), exit_code::AUTH),
            (Some(FailureKind::NotFound), exit_code::NOT_FOUND),
            (Some(FailureKind::Timeout), exit_code::TIMEOUT),
            (
                Some(FailureKind::Connection {
                    url: "https://example.jamfcloud.com/".into(),
                }),
                exit_code::CONNECTION,
            ),
            (Some(FailureKind::Rejected { code: None }), exit_code::GENERAL),
            (None, exit_code::GENERAL),
        ];
        for (failure, code) in cases {
            let err = failure_error(&failed(Operation::Update, failure.clone()), &timeouts);
            assert_eq!(err.exit_code(), code, "{failure:?}");
        }

        let err = failure_error(&failed(Operation::Lookup, Some(FailureKind::Timeout)), &timeouts);
        assert!(matches!(err, CliError::Timeout { seconds: 45 }));
    }

    #[test]
    fn auth_failures_carry_the_server_detail() {
        let timeouts = OperationTimeouts::uniform(Duration::from_secs(30));
        let err = failure_error(&failed(Operation::Create, Some(FailureKind::Authentication)), &timeouts);
        assert!(err.to_string().contains("server said no"));
    }
}

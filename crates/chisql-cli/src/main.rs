//! ChiSQL command-line driver.
//!
//! Reads a SQL source file, parses every statement, folds CREATE TABLE
//! statements into an in-memory schema, and prints each statement's tree to
//! stdout: the SRA form for queries followed by the lowered RA form.
//! Diagnostics go to stderr; the exit code is non-zero when any statement
//! failed to parse or lower. `RUST_LOG` controls tracing verbosity.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as CliParser;
use tracing_subscriber::EnvFilter;

use chisql_ast::{Statement, TreeForm};
use chisql_desugar::{desugar_query, MemorySchema};
use chisql_error::ChiError;
use chisql_parser::Parser;

#[derive(CliParser)]
#[command(name = "chisql", version, about = "SQL front-end: parse and lower to relational algebra")]
struct Cli {
    /// Path to the SQL source file.
    file: PathBuf,

    /// Print only the parsed trees; skip lowering to relational algebra.
    #[arg(long)]
    sra_only: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = match std::fs::read_to_string(&cli.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("chisql: {}: {}", cli.file.display(), ChiError::from(e));
            return ExitCode::FAILURE;
        }
    };

    let (output, diagnostics) = compile(&source, cli.sra_only);
    print!("{output}");
    for diag in &diagnostics {
        eprintln!("chisql: {diag}");
    }
    if diagnostics.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Parse and lower a source text. Returns the printable tree output and the
/// diagnostics for every statement that failed; good statements still
/// produce output when others fail.
fn compile(source: &str, sra_only: bool) -> (String, Vec<String>) {
    let mut parser = Parser::from_sql(source);
    let (stmts, errors) = parser.parse_all();

    let mut diagnostics: Vec<String> = errors
        .into_iter()
        .map(|e| ChiError::from(e).to_string())
        .collect();

    // DDL in the same file supplies the schema the desugarer consults.
    let schema = MemorySchema::from_statements(&stmts);

    let mut output = String::new();
    for stmt in &stmts {
        let _ = writeln!(output, "{}", stmt.tree());
        if let Statement::Query(query) = stmt {
            if !sra_only {
                match desugar_query(query, &schema) {
                    Ok(ra) => {
                        let _ = writeln!(output, "{}", ra.tree());
                    }
                    Err(e) => diagnostics.push(ChiError::from(e).to_string()),
                }
            }
        }
    }
    (output, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_feeds_the_query_schema() {
        let (out, diags) = compile(
            "CREATE TABLE t (w INT, x INT, y INT);\nSELECT *, x + y AS z FROM t;",
            false,
        );
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "CreateTable(t, [w INT, x INT, y INT])");
        assert_eq!(lines[1], "Project([*, (Add(x, y), z)], Table(t))");
        assert_eq!(
            lines[2],
            "Pi([w, x, y, z], Rho(Add(x, y), z, Pi([w, x, y, Add(x, y)], RATable(t))))"
        );
    }

    #[test]
    fn sra_only_skips_lowering() {
        let (out, diags) = compile("SELECT a FROM nowhere;", true);
        assert!(diags.is_empty(), "lowering skipped, so no schema failure");
        assert_eq!(out.trim(), "Project([a], Table(nowhere))");
    }

    #[test]
    fn desugar_failure_is_diagnosed_and_does_not_mask_output() {
        let (out, diags) = compile("SELECT * FROM ghost;", false);
        assert_eq!(out.trim(), "Project([*], Table(ghost))");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].contains("no such table: ghost"), "{diags:?}");
    }

    #[test]
    fn parse_errors_report_with_locus_and_recovery() {
        let (out, diags) = compile("SELECT FROM;\nDELETE FROM t;", false);
        assert_eq!(out.trim(), "Delete(t)");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].starts_with("1:"), "locus expected: {diags:?}");
    }

    #[test]
    fn source_files_read_from_disk() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "DELETE FROM t WHERE x > 3;").expect("write");
        let source = std::fs::read_to_string(file.path()).expect("read back");
        let (out, diags) = compile(&source, false);
        assert!(diags.is_empty());
        assert_eq!(out.trim(), "Delete(t, Gt(x, 3))");
    }
}

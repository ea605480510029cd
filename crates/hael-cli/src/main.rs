//! `hael`: run a Hael script, evaluate a snippet, or start a REPL.

mod repl;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hael_eval::{EvalConfig, Interpreter, Object, Outcome};
use hael_lexer::{KeywordError, Keywords, Lexer};
use hael_types::{SourceFile, SyntaxErrors};
use thiserror::Error;

/// Hael is a small dynamically-typed scripting language with first-class
/// functions, closures, arrays and hashes.
#[derive(Parser, Debug)]
#[command(name = "hael", version, about, long_about = None)]
struct Cli {
    /// Script to run. Without a script or `--eval`, starts a REPL.
    file: Option<PathBuf>,

    /// Evaluate SOURCE instead of reading a script.
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "file")]
    eval: Option<String>,

    /// Spelling of the true literal.
    #[arg(long, default_value = Keywords::DEFAULT_TRUE)]
    true_keyword: String,

    /// Spelling of the false literal.
    #[arg(long, default_value = Keywords::DEFAULT_FALSE)]
    false_keyword: String,

    /// Maximum number of nested function calls.
    #[arg(long, default_value_t = EvalConfig::DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,

    /// Print syntax errors as JSON.
    #[arg(long)]
    json_errors: bool,

    /// Print the token stream as JSON instead of running.
    #[arg(long, conflicts_with = "dump_ast")]
    dump_tokens: bool,

    /// Print the parsed program as JSON instead of running.
    #[arg(long)]
    dump_ast: bool,
}

impl Cli {
    fn keywords(&self) -> Result<Keywords, KeywordError> {
        Keywords::try_new(self.true_keyword.as_str(), self.false_keyword.as_str())
    }

    fn eval_config(&self) -> EvalConfig {
        EvalConfig {
            max_call_depth: self.max_depth,
            echo_output: true,
        }
    }

    /// The script or snippet to run, or `None` for the REPL.
    fn source_file(&self) -> Result<Option<SourceFile>, CliError> {
        if let Some(path) = &self.file {
            let text = fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            })?;
            return Ok(Some(SourceFile::new(path.display().to_string(), text)));
        }
        Ok(self
            .eval
            .as_deref()
            .map(|source| SourceFile::new("<eval>", source)))
    }
}

/// Host-level failures. Language errors are reported through [`Status`].
#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid keyword: {0}")]
    Keyword(#[from] KeywordError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    RuntimeError,
    SyntaxError,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::RuntimeError => ExitCode::from(1),
            Status::SyntaxError => ExitCode::from(2),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("HAEL_LOG", "warn")).init();

    let result = match cli.source_file() {
        Ok(Some(source_file)) => {
            let mut stdout = io::stdout();
            execute(&cli, &source_file, &mut stdout)
        }
        Ok(None) => cli.keywords().map_err(CliError::from).and_then(|keywords| {
            repl::start(keywords, cli.eval_config())
                .map(|()| Status::Success)
                .map_err(CliError::from)
        }),
        Err(err) => Err(err),
    };

    match result {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("hael: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Run (or dump) one source file, writing results to `out`.
fn execute(cli: &Cli, source_file: &SourceFile, out: &mut impl Write) -> Result<Status, CliError> {
    log::debug!("running {}", source_file.name);
    let keywords = cli.keywords()?;

    if cli.dump_tokens {
        let tokens = Lexer::with_keywords(source_file, keywords).lex();
        writeln!(out, "{}", serde_json::to_string_pretty(&tokens)?)?;
        return Ok(Status::Success);
    }

    if cli.dump_ast {
        let result = hael_parser::parse_with_keywords(source_file, keywords);
        if result.has_errors() {
            report_syntax_errors(&result.errors, cli.json_errors, out)?;
            return Ok(Status::SyntaxError);
        }
        writeln!(out, "{}", serde_json::to_string_pretty(&result.program)?)?;
        return Ok(Status::Success);
    }

    let mut interp = Interpreter::with_config(keywords, cli.eval_config());
    match interp.run_file(source_file) {
        Outcome::SyntaxErrors(errors) => {
            report_syntax_errors(&errors, cli.json_errors, out)?;
            Ok(Status::SyntaxError)
        }
        Outcome::Value(Object::Error(err)) => {
            writeln!(out, "ERROR: {err}")?;
            Ok(Status::RuntimeError)
        }
        Outcome::Value(Object::Null) => Ok(Status::Success),
        Outcome::Value(value) => {
            writeln!(out, "{value}")?;
            Ok(Status::Success)
        }
    }
}

/// Print syntax errors either as JSON or as `file:line:col: code message`
/// lines followed by the offending source line.
fn report_syntax_errors(
    errors: &SyntaxErrors,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(errors)?)?;
        return Ok(());
    }
    for error in errors {
        writeln!(out, "{error}")?;
        writeln!(out, "    {}", error.source_line)?;
    }
    let hidden = errors.total_errors - errors.errors.len();
    if hidden > 0 {
        writeln!(out, "... and {hidden} more errors")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hael").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    fn run(args: &[&str], source: &str) -> (Status, String) {
        let cli = cli(args);
        let mut out = Vec::new();
        let status = execute(&cli, &SourceFile::new("<eval>", source), &mut out)
            .expect("execute succeeds");
        (status, String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn test_defaults() {
        let cli = cli(&[]);
        assert!(cli.file.is_none() && cli.eval.is_none());
        assert_eq!(cli.keywords(), Ok(Keywords::default()));
        assert_eq!(cli.eval_config().max_call_depth, 128);
        assert!(cli.eval_config().echo_output);
    }

    #[test]
    fn test_eval_conflicts_with_file() {
        assert!(Cli::try_parse_from(["hael", "script.hl", "-e", "1"]).is_err());
        assert!(Cli::try_parse_from(["hael", "--dump-tokens", "--dump-ast"]).is_err());
    }

    #[test]
    fn test_eval_source_file() {
        let source_file = cli(&["-e", "1 + 1"])
            .source_file()
            .expect("no I/O")
            .expect("snippet given");
        assert_eq!(source_file.name, "<eval>");
    }

    #[test]
    fn test_missing_script_is_read_error() {
        let err = cli(&["/nonexistent/script.hl"])
            .source_file()
            .expect_err("file does not exist");
        assert!(matches!(err, CliError::Read { .. }));
    }

    #[test]
    fn test_prints_final_value() {
        assert_eq!(run(&[], "1 + 2 * 3"), (Status::Success, "7\n".to_string()));
        assert_eq!(run(&[], "$x = 1;"), (Status::Success, String::new()));
    }

    #[test]
    fn test_prints_self_containing_array() {
        assert_eq!(
            run(&[], "$a = []; push(a, a);"),
            (Status::Success, "[[...]]\n".to_string())
        );
    }

    #[test]
    fn test_runtime_error_status() {
        assert_eq!(
            run(&[], "5 + good;"),
            (
                Status::RuntimeError,
                "ERROR: type mismatch: INTEGER + BOOLEAN\n".to_string()
            )
        );
    }

    #[test]
    fn test_syntax_error_report() {
        let (status, out) = run(&[], "$ = 5;");
        assert_eq!(status, Status::SyntaxError);
        assert_eq!(
            out,
            "<eval>:1:3: E100 expected IDENT, got ASSIGN '='\n    $ = 5;\n"
        );
    }

    #[test]
    fn test_json_errors() {
        let (status, out) = run(&["--json-errors"], "$ = 5;");
        assert_eq!(status, Status::SyntaxError);
        let json: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
        assert_eq!(json["total_errors"], 1);
        assert_eq!(json["errors"][0]["code"], 100);
    }

    #[test]
    fn test_custom_keywords() {
        assert_eq!(
            run(&["--true-keyword", "yes", "--false-keyword", "no"], "!no"),
            (Status::Success, "true\n".to_string())
        );
    }

    #[test]
    fn test_rejects_unusable_keywords() {
        let err = execute(
            &cli(&["--true-keyword", "if"]),
            &SourceFile::new("<eval>", "1"),
            &mut Vec::new(),
        )
        .expect_err("`if` is reserved");
        assert_eq!(err.to_string(), "invalid keyword: 'if' is already a keyword");

        assert_eq!(
            cli(&["--true-keyword", "on", "--false-keyword", "on"]).keywords(),
            Err(KeywordError::Duplicate("on".into()))
        );
    }

    #[test]
    fn test_max_depth() {
        let (status, out) = run(&["--max-depth", "4"], "$f ==> (n) { f(n) }; f(0)");
        assert_eq!(status, Status::RuntimeError);
        assert_eq!(out, "ERROR: maximum call depth of 4 exceeded\n");
    }

    #[test]
    fn test_dump_tokens() {
        let (status, out) = run(&["--dump-tokens"], "$x = 1;");
        assert_eq!(status, Status::Success);
        let json: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
        let kinds: Vec<_> = json
            .as_array()
            .expect("token array")
            .iter()
            .map(|t| t["kind"].clone())
            .collect();
        assert_eq!(
            kinds,
            ["Let", "Ident", "Assign", "Int", "Semicolon", "Eof"]
                .map(serde_json::Value::from)
                .to_vec()
        );
    }

    #[test]
    fn test_dump_ast() {
        let (status, out) = run(&["--dump-ast"], "$x = 1;");
        assert_eq!(status, Status::Success);
        let json: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
        assert_eq!(json["stmts"][0]["Let"]["name"]["name"], "x");
    }
}

//! Line-oriented read-eval-print loop.
//!
//! Every line runs in the same [`Interpreter`], so bindings made on one
//! line stay visible on the next.

use std::io::{self, BufRead, Write};

use hael_eval::{EvalConfig, Interpreter, Object, Outcome};
use hael_lexer::Keywords;

const PROMPT: &str = ">> ";

/// Run the REPL on stdin/stdout until end of input.
pub fn start(keywords: Keywords, config: EvalConfig) -> io::Result<()> {
    let mut interp = Interpreter::with_config(keywords, config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(&mut interp, stdin.lock(), stdout)
}

fn run(interp: &mut Interpreter, mut input: impl BufRead, mut out: impl Write) -> io::Result<()> {
    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        match interp.run(&line) {
            Outcome::SyntaxErrors(errors) => {
                for error in &errors {
                    writeln!(out, "\t{}", error.message)?;
                }
            }
            Outcome::Value(Object::Null) => {}
            Outcome::Value(value) => writeln!(out, "{value}")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(interp: &mut Interpreter, input: &str) -> String {
        let mut out = Vec::new();
        run(interp, input.as_bytes(), &mut out).expect("in-memory I/O");
        String::from_utf8(out).expect("utf-8 output")
    }

    fn session(input: &str) -> String {
        session_with(&mut Interpreter::new(), input)
    }

    #[test]
    fn test_bindings_persist_between_lines() {
        let out = session("$add ==> (a, b) { a + b };\nadd(2, 3)\n");
        assert_eq!(out, ">> >> 5\n>> \n");
    }

    #[test]
    fn test_errors_do_not_end_session() {
        let out = session("$ = 1;\n5 + good\n\n1\n");
        assert_eq!(
            out,
            ">> \texpected IDENT, got ASSIGN '='\n>> ERROR: type mismatch: INTEGER + BOOLEAN\n>> >> 1\n>> \n"
        );
    }

    #[test]
    fn test_printed_lines_are_not_retained() {
        let config = EvalConfig {
            echo_output: true,
            ..EvalConfig::default()
        };
        let mut interp = Interpreter::with_config(Keywords::default(), config);
        let out = session_with(&mut interp, &"print(1);\n".repeat(1000));
        assert_eq!(out, format!("{}\n", ">> ".repeat(1001)));
        assert!(interp.evaluator().output.is_empty());
    }
}

//! Host session: source text in, rendered result out.
//!
//! An [`Interpreter`] owns one evaluator and one root environment, so each
//! [`run`](Interpreter::run) sees the bindings made by earlier runs. This is
//! what a REPL uses to keep `$x = 5;` alive for the next line.

use hael_lexer::Keywords;
use hael_parser::Parser;
use hael_types::{SourceFile, SyntaxErrors};

use crate::env::Environment;
use crate::evaluator::{EvalConfig, Evaluator};
use crate::object::Object;

/// Result of running one piece of source.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The source did not parse; nothing was evaluated.
    SyntaxErrors(SyntaxErrors),
    /// The program's final value, possibly an [`Object::Error`].
    Value(Object),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        match self {
            Outcome::SyntaxErrors(_) => true,
            Outcome::Value(value) => value.is_error(),
        }
    }
}

/// A persistent interpreter session.
pub struct Interpreter {
    keywords: Keywords,
    evaluator: Evaluator,
    env: Environment,
}

impl Interpreter {
    /// A session with the default keywords and evaluator settings.
    pub fn new() -> Self {
        Self::with_config(Keywords::default(), EvalConfig::default())
    }

    pub fn with_config(keywords: Keywords, config: EvalConfig) -> Self {
        Self {
            keywords,
            evaluator: Evaluator::new(config),
            env: Environment::new(),
        }
    }

    /// Parse and evaluate `source` in the session's root environment.
    pub fn run(&mut self, source: &str) -> Outcome {
        self.run_file(&SourceFile::new("<input>", source))
    }

    /// Parse and evaluate a named source file in the session's root
    /// environment.
    pub fn run_file(&mut self, source_file: &SourceFile) -> Outcome {
        let result = Parser::with_keywords(source_file, self.keywords.clone()).parse_program();
        if result.has_errors() {
            log::debug!(
                "skipping evaluation of {}: {} syntax errors",
                source_file.name,
                result.errors.total_errors
            );
            return Outcome::SyntaxErrors(result.errors);
        }
        Outcome::Value(self.evaluator.eval_program(&result.program, &self.env))
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    /// The root environment shared by every run.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    /// Drain the lines printed since the last call.
    pub fn take_output(&mut self) -> Vec<String> {
        self.evaluator.take_output()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_persist_across_runs() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.run("$x = 5;"), Outcome::Value(Object::Null));
        assert_eq!(interp.run("x * 2"), Outcome::Value(Object::Integer(10)));
        assert_eq!(interp.env().names(), vec!["x".to_string()]);
    }

    #[test]
    fn test_syntax_errors_skip_evaluation() {
        let mut interp = Interpreter::new();
        let outcome = interp.run("print(1); $ = 5;");
        assert!(matches!(outcome, Outcome::SyntaxErrors(ref e) if e.total_errors == 1));
        assert!(outcome.is_error());
        assert!(interp.take_output().is_empty());
    }

    #[test]
    fn test_custom_keywords() {
        let mut interp = Interpreter::with_config(Keywords::new("yes", "no"), EvalConfig::default());
        assert_eq!(interp.run("!no"), Outcome::Value(Object::Boolean(true)));
    }
}

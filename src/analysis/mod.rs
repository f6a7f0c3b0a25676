//! Analysis requests, normalized results, and the invoker that talks to the
//! engine.

pub mod response;

use thiserror::Error;

use crate::engine::{Engine, EngineError};
use crate::states::settings::Settings;

pub use response::parse_response;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("malformed engine response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("engine response is missing `{0}`")]
    MissingField(&'static str),
    #[error("engine response has invalid `{field}` position {value}")]
    InvalidPosition { field: &'static str, value: i64 },
}

/// Snapshot of everything one analysis cycle needs. Built fresh per cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub grammar_text: String,
    pub code_text: String,
    pub optimize: bool,
    pub packrat: bool,
}

impl AnalysisRequest {
    pub fn new(grammar_text: &str, code_text: &str, settings: &Settings) -> Self {
        Self {
            grammar_text: grammar_text.to_string(),
            code_text: code_text.to_string(),
            optimize: settings.optimize.is_enabled(),
            packrat: settings.packrat,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.grammar_text.is_empty()
    }
}

/// 1-based position in the grammar buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarLocation {
    pub line: usize,
    pub col: usize,
}

/// One diagnostic, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub line: usize,
    pub col: usize,
    pub message: String,
    /// Set on code errors raised by a specific grammar rule.
    pub grammar_ref: Option<GrammarLocation>,
}

/// Source-side results; only exist when the grammar loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAnalysis {
    pub valid: bool,
    pub errors: Vec<ErrorEntry>,
    pub ast: String,
    pub ast_optimized: String,
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub grammar_errors: Vec<ErrorEntry>,
    pub source: Option<SourceAnalysis>,
}

impl AnalysisResult {
    pub fn grammar_valid(&self) -> bool {
        self.source.is_some()
    }

    pub fn source_valid(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.valid)
    }
}

/// What the last cycle produced. Replaced wholesale every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalysisOutcome {
    /// Nothing has run yet, or the grammar buffer is empty.
    #[default]
    Skipped,
    Completed(AnalysisResult),
    /// The engine call or its response was unusable.
    Failed(String),
}

impl AnalysisOutcome {
    pub fn from_result(result: Result<AnalysisOutcome, AnalysisError>) -> Self {
        result.unwrap_or_else(|err| {
            tracing::error!(%err, "analysis failed");
            AnalysisOutcome::Failed(err.to_string())
        })
    }
}

/// Wraps the engine and turns its raw output into an [`AnalysisOutcome`].
#[derive(Debug)]
pub struct AnalysisInvoker<E> {
    engine: E,
    calls: u64,
}

impl<E: Engine> AnalysisInvoker<E> {
    pub fn new(engine: E) -> Self {
        Self { engine, calls: 0 }
    }

    #[cfg(test)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Number of engine calls made so far.
    #[cfg(test)]
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Run one analysis. An empty grammar is not an error: the engine is not
    /// called and the outcome is `Skipped`.
    ///
    /// Taking `&mut self` means a second call cannot start while one is
    /// running; the controller's `AnalysisPhase` covers the deferred window
    /// before dispatch.
    pub fn analyze(&mut self, request: &AnalysisRequest) -> Result<AnalysisOutcome, AnalysisError> {
        if request.is_empty() {
            tracing::debug!("grammar is empty, skipping analysis");
            return Ok(AnalysisOutcome::Skipped);
        }

        self.calls += 1;
        let raw = self.engine.lint(
            &request.grammar_text,
            &request.code_text,
            request.optimize,
            request.packrat,
        )?;
        let result = parse_response(&raw)?;
        tracing::info!(
            cycle = self.calls,
            grammar_valid = result.grammar_valid(),
            source_valid = result.source_valid(),
            grammar_errors = result.grammar_errors.len(),
            code_errors = result.source.as_ref().map_or(0, |s| s.errors.len()),
            "analysis completed"
        );
        Ok(AnalysisOutcome::Completed(result))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Scripted engine that records every request it sees.
    #[derive(Debug, Default)]
    pub(crate) struct FakeEngine {
        pub response: RefCell<String>,
        pub seen: RefCell<Vec<AnalysisRequest>>,
    }

    impl FakeEngine {
        pub fn replying(response: &str) -> Self {
            Self {
                response: RefCell::new(response.to_string()),
                seen: RefCell::default(),
            }
        }

        pub fn call_count(&self) -> usize {
            self.seen.borrow().len()
        }
    }

    impl Engine for FakeEngine {
        fn lint(
            &self,
            grammar: &str,
            code: &str,
            optimize: bool,
            packrat: bool,
        ) -> Result<String, EngineError> {
            self.seen.borrow_mut().push(AnalysisRequest {
                grammar_text: grammar.to_string(),
                code_text: code.to_string(),
                optimize,
                packrat,
            });
            Ok(self.response.borrow().clone())
        }
    }

    pub(crate) const VALID_A: &str = r#"{"grammar_valid": true, "source_valid": true, "grammar": [], "code": [], "ast": "+ start\n  - 'a'\n", "astOptimized": "- start ('a')\n", "profile": "  id       total      %     success        fail  definition\n"}"#;

    fn request(grammar: &str) -> AnalysisRequest {
        AnalysisRequest {
            grammar_text: grammar.to_string(),
            code_text: "a".to_string(),
            optimize: true,
            packrat: false,
        }
    }

    #[test]
    fn empty_grammar_never_reaches_engine() {
        let mut invoker = AnalysisInvoker::new(FakeEngine::replying(VALID_A));
        let outcome = invoker.analyze(&request("")).unwrap();
        assert_eq!(outcome, AnalysisOutcome::Skipped);
        assert_eq!(invoker.engine().call_count(), 0);
        assert_eq!(invoker.calls(), 0);
    }

    #[test]
    fn forwards_flags_to_engine() {
        let mut invoker = AnalysisInvoker::new(FakeEngine::replying(VALID_A));
        let req = AnalysisRequest {
            packrat: true,
            optimize: false,
            ..request("start <- 'a'")
        };
        let outcome = invoker.analyze(&req).unwrap();
        assert!(matches!(outcome, AnalysisOutcome::Completed(ref r) if r.source_valid()));
        assert_eq!(invoker.engine().seen.borrow()[0], req);
    }

    #[test]
    fn malformed_response_is_an_error() {
        let mut invoker = AnalysisInvoker::new(FakeEngine::replying("{\"grammar_valid\": true"));
        let err = invoker.analyze(&request("start <- 'a'")).unwrap_err();
        assert!(matches!(err, AnalysisError::Decode(_)));

        let outcome = AnalysisOutcome::from_result(Err(err));
        assert!(matches!(outcome, AnalysisOutcome::Failed(_)));
    }

    #[test]
    fn request_reads_settings() {
        let settings = Settings {
            optimize: crate::states::settings::OptimizationMode::None,
            packrat: true,
            ..Settings::default()
        };
        let req = AnalysisRequest::new("g", "c", &settings);
        assert!(!req.optimize);
        assert!(req.packrat);
        assert_eq!(req.grammar_text, "g");
        assert_eq!(req.code_text, "c");
    }
}

//! Engine response decoding.
//!
//! The engine speaks a loose JSON dialect: source-side fields are omitted
//! when the grammar fails to load, and cross references are optional. This
//! module turns that into the strict [`AnalysisResult`] shape, rejecting
//! anything that does not fit instead of guessing.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{AnalysisError, AnalysisResult, ErrorEntry, GrammarLocation, SourceAnalysis};

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(alias = "line")]
    ln: i64,
    col: i64,
    #[serde(alias = "message")]
    msg: String,
    #[serde(default, alias = "refLine")]
    gln: Option<i64>,
    #[serde(default, alias = "refCol")]
    gcol: Option<i64>,
}

/// Source-side fields stay untyped until the grammar is known to be valid;
/// leftovers next to an invalid grammar are never inspected.
#[derive(Debug, Deserialize)]
struct RawResponse {
    grammar_valid: bool,
    grammar: Vec<RawEntry>,
    #[serde(default)]
    source_valid: Option<Value>,
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    ast: Option<Value>,
    #[serde(default, rename = "astOptimized")]
    ast_optimized: Option<Value>,
    #[serde(default)]
    profile: Option<Value>,
}

fn position(value: i64, field: &'static str) -> Result<usize, AnalysisError> {
    usize::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or(AnalysisError::InvalidPosition { field, value })
}

fn entry(raw: RawEntry) -> Result<ErrorEntry, AnalysisError> {
    let line = position(raw.ln, "ln")?;
    let col = position(raw.col, "col")?;
    // A cross reference needs both halves.
    let grammar_ref = match (raw.gln, raw.gcol) {
        (Some(gln), Some(gcol)) => Some(GrammarLocation {
            line: position(gln, "gln")?,
            col: position(gcol, "gcol")?,
        }),
        _ => None,
    };
    Ok(ErrorEntry {
        line,
        col,
        message: raw.msg,
        grammar_ref,
    })
}

fn required<T: DeserializeOwned>(
    value: Option<Value>,
    field: &'static str,
) -> Result<T, AnalysisError> {
    let value = value.ok_or(AnalysisError::MissingField(field))?;
    Ok(serde_json::from_value(value)?)
}

pub fn parse_response(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let response: RawResponse = serde_json::from_str(raw)?;

    let grammar_errors = response
        .grammar
        .into_iter()
        .map(entry)
        .collect::<Result<Vec<_>, _>>()?;

    if !response.grammar_valid {
        return Ok(AnalysisResult {
            grammar_errors,
            source: None,
        });
    }

    let code_errors = required::<Vec<RawEntry>>(response.code, "code")?
        .into_iter()
        .map(entry)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalysisResult {
        grammar_errors,
        source: Some(SourceAnalysis {
            valid: required(response.source_valid, "source_valid")?,
            errors: code_errors,
            ast: required(response.ast, "ast")?,
            ast_optimized: required(response.ast_optimized, "astOptimized")?,
            profile: required(response.profile, "profile")?,
        }),
    })
}

//! Grammar engine seam.
//!
//! The playground treats the PEG engine as a pure function returning a JSON
//! document. On the desktop it is an external program fed through temporary
//! files, the same way the exporter hands frames to ffmpeg.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to stage engine input: {0}")]
    Stage(#[source] std::io::Error),
    #[error("failed to run engine '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("engine output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// `lint(grammar, code, optimize, packrat) -> json`
pub trait Engine {
    fn lint(
        &self,
        grammar: &str,
        code: &str,
        optimize: bool,
        packrat: bool,
    ) -> Result<String, EngineError>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn lint(
        &self,
        grammar: &str,
        code: &str,
        optimize: bool,
        packrat: bool,
    ) -> Result<String, EngineError> {
        (**self).lint(grammar, code, optimize, packrat)
    }
}

impl<E: Engine + ?Sized> Engine for &E {
    fn lint(
        &self,
        grammar: &str,
        code: &str,
        optimize: bool,
        packrat: bool,
    ) -> Result<String, EngineError> {
        (**self).lint(grammar, code, optimize, packrat)
    }
}

/// Runs `<program> [args..] --opt=all|none [--packrat] <grammar> <code>` and
/// reads the JSON response from stdout.
///
/// The report has the shape of the web build's `lint()` result (`grammar`,
/// `code`, `ast`, `astOptimized`) plus `grammar_valid`, `source_valid` and
/// `profile`. The stock `peglint` binary prints plain `path:line:col` text
/// instead, so the program is usually a small wrapper around the library.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn stage(text: &str, suffix: &str) -> Result<tempfile::NamedTempFile, EngineError> {
        let mut file = tempfile::Builder::new()
            .prefix("peg-playground-")
            .suffix(suffix)
            .tempfile()
            .map_err(EngineError::Stage)?;
        file.write_all(text.as_bytes()).map_err(EngineError::Stage)?;
        file.flush().map_err(EngineError::Stage)?;
        Ok(file)
    }
}

impl Engine for CommandEngine {
    fn lint(
        &self,
        grammar: &str,
        code: &str,
        optimize: bool,
        packrat: bool,
    ) -> Result<String, EngineError> {
        let grammar_file = Self::stage(grammar, ".peg")?;
        let code_file = Self::stage(code, ".txt")?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(if optimize { "--opt=all" } else { "--opt=none" });
        if packrat {
            cmd.arg("--packrat");
        }
        cmd.arg(grammar_file.path()).arg(code_file.path());

        tracing::debug!(program = %self.program.display(), optimize, packrat, "invoking engine");
        let output = cmd.output().map_err(|source| EngineError::Spawn {
            command: self.program.display().to_string(),
            source,
        })?;

        let stdout = String::from_utf8(output.stdout)?;
        if !output.status.success() && stdout.trim().is_empty() {
            return Err(EngineError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if !output.status.success() {
            tracing::debug!(status = %output.status, "engine exited non-zero but produced a report");
        }
        Ok(stdout)
    }
}

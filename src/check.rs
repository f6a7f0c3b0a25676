//! `check` subcommand: one analysis cycle over files, printed to stdout.

use std::fmt::Write as _;

use anyhow::{Context, Result};

use crate::analysis::{AnalysisInvoker, AnalysisOutcome, AnalysisRequest};
use crate::cli::{CheckArgs, OutputFormat};
use crate::diagnostics::{DiagnosticsView, ErrorItem, ErrorList, Validity};
use crate::engine::Engine;
use crate::states::settings::{OptimizationMode, Settings};

pub const EXIT_OK: i32 = 0;
pub const EXIT_INVALID: i32 = 1;
pub const EXIT_ENGINE_FAILURE: i32 = 2;

pub fn run<E: Engine>(engine: E, args: &CheckArgs) -> Result<i32> {
    let grammar = std::fs::read_to_string(&args.grammar)
        .with_context(|| format!("can't open the grammar file '{}'", args.grammar.display()))?;
    let code = match (&args.source, &args.code) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("can't open the code file '{}'", path.display()))?,
        (None, None) => String::new(),
    };

    let settings = Settings {
        optimize: OptimizationMode::from(args.opt),
        packrat: args.packrat,
        ..Settings::default()
    };
    let request = AnalysisRequest::new(&grammar, &code, &settings);

    let mut invoker = AnalysisInvoker::new(engine);
    let outcome = match invoker.analyze(&request) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("error: {err}");
            return Ok(EXIT_ENGINE_FAILURE);
        }
    };

    let view = DiagnosticsView::render(&outcome);
    let report = match args.format {
        OutputFormat::Text => text_report(&view, args),
        OutputFormat::Html => html_report(&view, args),
    };
    print!("{report}");

    Ok(exit_code(&outcome, &view, has_code(args)))
}

fn exit_code(outcome: &AnalysisOutcome, view: &DiagnosticsView, has_code: bool) -> i32 {
    match outcome {
        AnalysisOutcome::Failed(_) => EXIT_ENGINE_FAILURE,
        // An empty grammar file loads nothing.
        AnalysisOutcome::Skipped => EXIT_INVALID,
        AnalysisOutcome::Completed(_) => {
            let grammar_ok = view.grammar_validity == Validity::Valid;
            let code_ok = !has_code || view.code_validity == Validity::Valid;
            if grammar_ok && code_ok {
                EXIT_OK
            } else {
                EXIT_INVALID
            }
        }
    }
}

fn has_code(args: &CheckArgs) -> bool {
    args.code.is_some() || args.source.is_some()
}

fn source_name(args: &CheckArgs) -> String {
    match (&args.source, args.code.as_deref()) {
        (Some(_), _) => "[commandline]".to_string(),
        (None, Some(path)) => path.display().to_string(),
        (None, None) => "[code]".to_string(),
    }
}

fn write_items(out: &mut String, name: &str, items: &[ErrorItem]) {
    for item in items {
        let _ = writeln!(out, "{}:{}: {}", name, item.label, item.message);
    }
}

fn artifacts(view: &DiagnosticsView, args: &CheckArgs) -> Vec<(&'static str, String)> {
    let mut sections = Vec::new();
    if args.ast {
        let ast = if OptimizationMode::from(args.opt).is_enabled() {
            &view.ast_optimized
        } else {
            &view.ast
        };
        sections.push(("ast", ast.clone()));
    }
    if args.profile {
        sections.push(("profile", view.profile.clone()));
    }
    sections
}

pub fn text_report(view: &DiagnosticsView, args: &CheckArgs) -> String {
    let mut out = String::new();
    write_items(&mut out, &args.grammar.display().to_string(), &view.grammar_errors);
    write_items(&mut out, &source_name(args), &view.code_errors);
    for (_, text) in artifacts(view, args) {
        out.push_str(&text);
        if !text.is_empty() && !text.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

pub fn html_report(view: &DiagnosticsView, args: &CheckArgs) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<section id=\"grammar-info\">{}</section>", view.list_html(ErrorList::Grammar));
    let _ = writeln!(out, "<section id=\"code-info\">{}</section>", view.list_html(ErrorList::Code));
    for (id, text) in artifacts(view, args) {
        let _ = writeln!(
            out,
            "<pre id=\"{}\">{}</pre>",
            id,
            crate::diagnostics::escape_html(&text)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::{FakeEngine, VALID_A};
    use crate::cli::OptArg;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn args(grammar: PathBuf, code: Option<PathBuf>) -> CheckArgs {
        CheckArgs {
            grammar,
            code,
            source: None,
            opt: OptArg::All,
            packrat: false,
            ast: false,
            profile: false,
            format: OutputFormat::Text,
        }
    }

    const SOURCE_INVALID: &str = r#"{
        "grammar_valid": true, "source_valid": false, "grammar": [],
        "code": [{"ln": 2, "col": 3, "msg": "syntax error, unexpected <end>."}],
        "ast": "", "astOptimized": "", "profile": ""
    }"#;

    #[test]
    fn valid_input_exits_zero() {
        let td = tempdir().expect("tempdir");
        let g = td.path().join("a.peg");
        let c = td.path().join("a.txt");
        std::fs::write(&g, "start <- 'a'").unwrap();
        std::fs::write(&c, "a").unwrap();

        let code = run(FakeEngine::replying(VALID_A), &args(g, Some(c))).unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[test]
    fn source_errors_exit_one_and_print_locations() {
        let td = tempdir().expect("tempdir");
        let g = td.path().join("a.peg");
        std::fs::write(&g, "start <- 'a' 'b'").unwrap();
        let c = td.path().join("in.txt");
        std::fs::write(&c, "a").unwrap();

        let a = args(g, Some(c.clone()));
        let code = run(FakeEngine::replying(SOURCE_INVALID), &a).unwrap();
        assert_eq!(code, EXIT_INVALID);

        let view = DiagnosticsView::render(&AnalysisOutcome::Completed(
            crate::analysis::parse_response(SOURCE_INVALID).unwrap(),
        ));
        assert_eq!(
            text_report(&view, &a),
            format!("{}:2:3: syntax error, unexpected <end>.\n", c.display())
        );
        assert!(html_report(&view, &a).contains("unexpected &lt;end&gt;."));
    }

    #[test]
    fn ast_flag_prints_optimized_tree() {
        let view = DiagnosticsView::render(&AnalysisOutcome::Completed(
            crate::analysis::parse_response(VALID_A).unwrap(),
        ));
        let mut a = args(PathBuf::from("a.peg"), Some(PathBuf::from("a.txt")));
        a.ast = true;
        assert_eq!(text_report(&view, &a), "- start ('a')\n");
        a.opt = OptArg::None;
        assert_eq!(text_report(&view, &a), "+ start\n  - 'a'\n");
    }

    #[test]
    fn grammar_only_check_ignores_code_badge() {
        let td = tempdir().expect("tempdir");
        let g = td.path().join("a.peg");
        std::fs::write(&g, "start <- 'a'").unwrap();
        // Engine says the (empty) source fails, but no code file was given.
        let code = run(FakeEngine::replying(SOURCE_INVALID), &args(g, None)).unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[test]
    fn inline_source_is_sent_and_named_commandline() {
        let td = tempdir().expect("tempdir");
        let g = td.path().join("a.peg");
        std::fs::write(&g, "start <- 'a' 'b'").unwrap();

        let mut a = args(g, None);
        a.source = Some("a".to_string());
        let engine = FakeEngine::replying(SOURCE_INVALID);
        assert_eq!(run(&engine, &a).unwrap(), EXIT_INVALID);
        assert_eq!(engine.seen.borrow()[0].code_text, "a");

        let view = DiagnosticsView::render(&AnalysisOutcome::Completed(
            crate::analysis::parse_response(SOURCE_INVALID).unwrap(),
        ));
        assert_eq!(
            text_report(&view, &a),
            "[commandline]:2:3: syntax error, unexpected <end>.\n"
        );
    }

    #[test]
    fn missing_grammar_file_is_an_error() {
        let td = tempdir().expect("tempdir");
        let res = run(
            FakeEngine::replying(VALID_A),
            &args(td.path().join("nope.peg"), None),
        );
        assert!(res.is_err());
    }

    #[test]
    fn broken_engine_output_exits_two() {
        let td = tempdir().expect("tempdir");
        let g = td.path().join("a.peg");
        std::fs::write(&g, "start <- 'a'").unwrap();
        let code = run(FakeEngine::replying("oops"), &args(g, None)).unwrap();
        assert_eq!(code, EXIT_ENGINE_FAILURE);
    }
}

//! Diagnostic rendering.
//!
//! `DiagnosticsView::render` is a pure function of the latest outcome: every
//! call builds a complete view from scratch, so nothing from an earlier cycle
//! can leak into the next one. Clicking an item does not touch the editors
//! directly; it yields [`EditorCommand`]s the controller applies.

use crate::analysis::{AnalysisOutcome, ErrorEntry};
use crate::editor::{Editor, EditorSet, EditorSlot};
use crate::states::settings::Panel;

pub const FAILURE_BANNER: &str = "The analyzer returned an unusable result. Diagnostics were cleared.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Unset,
    Valid,
    Invalid,
}

impl Validity {
    fn from_flag(valid: bool) -> Self {
        if valid {
            Validity::Valid
        } else {
            Validity::Invalid
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorList {
    Grammar,
    Code,
}

/// Zero-based cursor target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorTarget {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorItem {
    /// `"<line>:<col>"`
    pub label: String,
    pub message: String,
    pub target: CursorTarget,
    pub grammar_ref: Option<CursorTarget>,
    line: usize,
    col: usize,
    ref_line_col: Option<(usize, usize)>,
}

impl ErrorItem {
    fn from_entry(entry: &ErrorEntry) -> Self {
        Self {
            label: format!("{}:{}", entry.line, entry.col),
            message: entry.message.clone(),
            target: CursorTarget {
                row: entry.line - 1,
                col: entry.col - 1,
            },
            grammar_ref: entry.grammar_ref.map(|g| CursorTarget {
                row: g.line - 1,
                col: g.col - 1,
            }),
            line: entry.line,
            col: entry.col,
            ref_line_col: entry.grammar_ref.map(|g| (g.line, g.col)),
        }
    }

    pub fn html(&self) -> String {
        let data = match self.ref_line_col {
            Some((gln, gcol)) => format!(
                r#"data-ln="{}" data-col="{}" data-gln="{}" data-gcol="{}""#,
                self.line, self.col, gln, gcol
            ),
            None => format!(r#"data-ln="{}" data-col="{}""#, self.line, self.col),
        };
        format!(
            "<li {}><span>{}</span> <span>{}</span></li>",
            data,
            self.label,
            escape_html(&self.message)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    MoveCursor { row: usize, col: usize },
    ScrollToLine { row: usize },
    Focus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorCommand {
    pub slot: EditorSlot,
    pub action: EditorAction,
}

impl EditorCommand {
    pub fn apply<Ed: Editor>(self, editors: &mut EditorSet<Ed>) {
        let editor = editors.get_mut(self.slot);
        match self.action {
            EditorAction::MoveCursor { row, col } => editor.move_cursor_to(row, col),
            EditorAction::ScrollToLine { row } => editor.scroll_to_line(row, true, false),
            EditorAction::Focus => editor.focus(),
        }
    }
}

fn jump(slot: EditorSlot, target: CursorTarget, focus: bool) -> impl Iterator<Item = EditorCommand> {
    let mut cmds = vec![
        EditorCommand {
            slot,
            action: EditorAction::MoveCursor {
                row: target.row,
                col: target.col,
            },
        },
        EditorCommand {
            slot,
            action: EditorAction::ScrollToLine { row: target.row },
        },
    ];
    if focus {
        cmds.push(EditorCommand {
            slot,
            action: EditorAction::Focus,
        });
    }
    cmds.into_iter()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagnosticsView {
    pub grammar_validity: Validity,
    pub code_validity: Validity,
    pub grammar_errors: Vec<ErrorItem>,
    pub code_errors: Vec<ErrorItem>,
    pub ast: String,
    pub ast_optimized: String,
    pub profile: String,
    pub banner: Option<String>,
}

impl DiagnosticsView {
    pub fn render(outcome: &AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Skipped => Self::default(),
            AnalysisOutcome::Failed(_) => Self {
                banner: Some(FAILURE_BANNER.to_string()),
                ..Self::default()
            },
            AnalysisOutcome::Completed(result) => {
                let mut view = Self {
                    grammar_validity: Validity::from_flag(result.grammar_valid()),
                    grammar_errors: result.grammar_errors.iter().map(ErrorItem::from_entry).collect(),
                    ..Self::default()
                };
                if let Some(source) = &result.source {
                    view.code_validity = Validity::from_flag(source.valid);
                    view.code_errors = source.errors.iter().map(ErrorItem::from_entry).collect();
                    view.ast = source.ast.clone();
                    view.ast_optimized = source.ast_optimized.clone();
                    view.profile = source.profile.clone();
                }
                view
            }
        }
    }

    pub fn items(&self, list: ErrorList) -> &[ErrorItem] {
        match list {
            ErrorList::Grammar => &self.grammar_errors,
            ErrorList::Code => &self.code_errors,
        }
    }

    pub fn panel_text(&self, panel: Panel) -> &str {
        match panel {
            Panel::Ast => &self.ast,
            Panel::AstOptimized => &self.ast_optimized,
            Panel::Profile => &self.profile,
        }
    }

    /// Commands for a click on `list[index]`.
    ///
    /// Grammar items jump within the grammar editor. Code items jump within
    /// the code editor, which keeps focus, and also move the grammar editor
    /// to the rule that raised the error when the item carries one.
    pub fn navigate(&self, list: ErrorList, index: usize) -> Vec<EditorCommand> {
        let Some(item) = self.items(list).get(index) else {
            return Vec::new();
        };
        match list {
            ErrorList::Grammar => jump(EditorSlot::Grammar, item.target, true).collect(),
            ErrorList::Code => {
                let mut cmds: Vec<_> = jump(EditorSlot::Code, item.target, true).collect();
                if let Some(target) = item.grammar_ref {
                    cmds.extend(jump(EditorSlot::Grammar, target, false));
                }
                cmds
            }
        }
    }

    pub fn list_html(&self, list: ErrorList) -> String {
        error_list_html(self.items(list))
    }
}

pub fn error_list_html(items: &[ErrorItem]) -> String {
    let mut html = String::from("<ul>");
    for item in items {
        html.push_str(&item.html());
    }
    html.push_str("</ul>");
    html
}

pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for ch in unsafe_text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

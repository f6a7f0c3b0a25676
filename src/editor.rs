//! Editor capability.
//!
//! The controller never talks to egui directly; it drives editors through
//! [`Editor`]. [`EditorBuffer`] is the model behind every text area in the
//! desktop host: it stores the text and queues cursor/scroll/focus requests
//! that `code_panel` applies on the next frame.

use crate::states::settings::{Buffer, Panel};

/// Minimal text-editor surface the playground relies on.
pub trait Editor {
    fn value(&self) -> &str;
    fn set_value(&mut self, text: &str);
    /// Insert at the cursor.
    fn insert(&mut self, text: &str);
    /// Zero-based row and column.
    fn move_cursor_to(&mut self, row: usize, col: usize);
    fn scroll_to_line(&mut self, row: usize, center: bool, animate: bool);
    fn focus(&mut self);
    /// Re-measure after the surrounding layout changed.
    fn resize(&mut self);
}

/// Every text area the playground owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorSlot {
    Grammar,
    Code,
    Info(Panel),
}

impl From<Buffer> for EditorSlot {
    fn from(buffer: Buffer) -> Self {
        match buffer {
            Buffer::Grammar => EditorSlot::Grammar,
            Buffer::Code => EditorSlot::Code,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub row: usize,
    pub center: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EditorBuffer {
    text: String,
    read_only: bool,
    /// Last known cursor position (row, col), zero-based.
    cursor: (usize, usize),
    cursor_dirty: bool,
    scroll: Option<ScrollRequest>,
    focus_requested: bool,
    layout_dirty: bool,
}

impl EditorBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Info panels: cursor hidden, text not editable.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Mutable access for the widget; edits must be reported to the
    /// controller through `Playground::on_buffer_edited`.
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    /// Record where the widget's cursor is after user interaction.
    pub fn sync_cursor(&mut self, char_index: usize) {
        self.cursor = row_col_of_char(&self.text, char_index);
    }

    pub fn take_cursor_request(&mut self) -> Option<usize> {
        if std::mem::take(&mut self.cursor_dirty) {
            Some(char_index_of(&self.text, self.cursor.0, self.cursor.1))
        } else {
            None
        }
    }

    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.scroll.take()
    }

    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    pub fn take_layout_request(&mut self) -> bool {
        std::mem::take(&mut self.layout_dirty)
    }

    #[cfg(test)]
    pub fn has_focus_request(&self) -> bool {
        self.focus_requested
    }

    #[cfg(test)]
    pub fn pending_scroll(&self) -> Option<ScrollRequest> {
        self.scroll
    }

    #[cfg(test)]
    pub fn needs_layout(&self) -> bool {
        self.layout_dirty
    }
}

impl Editor for EditorBuffer {
    fn value(&self) -> &str {
        &self.text
    }

    fn set_value(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.cursor = (0, 0);
        self.cursor_dirty = true;
    }

    fn insert(&mut self, text: &str) {
        let at = byte_offset_of(&self.text, self.cursor.0, self.cursor.1);
        self.text.insert_str(at, text);
        let end = self.text[..at + text.len()].chars().count();
        self.cursor = row_col_of_char(&self.text, end);
        self.cursor_dirty = true;
    }

    fn move_cursor_to(&mut self, row: usize, col: usize) {
        self.cursor = (row, col);
        self.cursor_dirty = true;
    }

    /// The widget always jumps; `animate` has no effect here.
    fn scroll_to_line(&mut self, row: usize, center: bool, _animate: bool) {
        self.scroll = Some(ScrollRequest { row, center });
    }

    fn focus(&mut self) {
        self.focus_requested = true;
    }

    fn resize(&mut self) {
        self.layout_dirty = true;
    }
}

/// The two buffer editors plus one read-only editor per info panel.
#[derive(Debug, Default, Clone)]
pub struct EditorSet<Ed> {
    pub grammar: Ed,
    pub code: Ed,
    pub ast: Ed,
    pub ast_optimized: Ed,
    pub profile: Ed,
}

impl<Ed: Editor> EditorSet<Ed> {
    pub fn get(&self, slot: EditorSlot) -> &Ed {
        match slot {
            EditorSlot::Grammar => &self.grammar,
            EditorSlot::Code => &self.code,
            EditorSlot::Info(Panel::Ast) => &self.ast,
            EditorSlot::Info(Panel::AstOptimized) => &self.ast_optimized,
            EditorSlot::Info(Panel::Profile) => &self.profile,
        }
    }

    pub fn get_mut(&mut self, slot: EditorSlot) -> &mut Ed {
        match slot {
            EditorSlot::Grammar => &mut self.grammar,
            EditorSlot::Code => &mut self.code,
            EditorSlot::Info(Panel::Ast) => &mut self.ast,
            EditorSlot::Info(Panel::AstOptimized) => &mut self.ast_optimized,
            EditorSlot::Info(Panel::Profile) => &mut self.profile,
        }
    }
}

impl EditorSet<EditorBuffer> {
    /// Buffer editors are writable, info panels are not.
    pub fn desktop() -> Self {
        Self {
            grammar: EditorBuffer::new(),
            code: EditorBuffer::new(),
            ast: EditorBuffer::read_only(),
            ast_optimized: EditorBuffer::read_only(),
            profile: EditorBuffer::read_only(),
        }
    }
}

/// Byte offset of (row, col), clamped to the end of the line / text.
pub fn byte_offset_of(text: &str, row: usize, col: usize) -> usize {
    let mut offset = 0usize;
    for (i, line) in text.split('\n').enumerate() {
        if i == row {
            let within = line
                .char_indices()
                .nth(col)
                .map(|(b, _)| b)
                .unwrap_or(line.len());
            return offset + within;
        }
        offset += line.len() + 1;
    }
    text.len()
}

/// Character index of (row, col), which is what egui cursors use.
pub fn char_index_of(text: &str, row: usize, col: usize) -> usize {
    text[..byte_offset_of(text, row, col)].chars().count()
}

pub fn row_col_of_char(text: &str, char_index: usize) -> (usize, usize) {
    let mut row = 0;
    let mut col = 0;
    for ch in text.chars().take(char_index) {
        if ch == '\n' {
            row += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (row, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_clamp_past_line_end() {
        let text = "ab\ncdef\n\u{e9}x";
        assert_eq!(byte_offset_of(text, 0, 0), 0);
        assert_eq!(byte_offset_of(text, 1, 2), 5);
        assert_eq!(byte_offset_of(text, 0, 10), 2);
        assert_eq!(byte_offset_of(text, 2, 1), 10);
        assert_eq!(byte_offset_of(text, 9, 0), text.len());
        assert_eq!(char_index_of(text, 2, 1), 9);
    }

    #[test]
    fn row_col_round_trips_char_index() {
        let text = "start <- 'a'\n  / 'b'\n";
        let idx = char_index_of(text, 1, 4);
        assert_eq!(row_col_of_char(text, idx), (1, 4));
    }

    #[test]
    fn set_value_resets_cursor_and_queues_request() {
        let mut ed = EditorBuffer::new();
        ed.move_cursor_to(3, 3);
        ed.set_value("abc");
        assert_eq!(ed.value(), "abc");
        assert_eq!(ed.cursor(), (0, 0));
        assert_eq!(ed.take_cursor_request(), Some(0));
        assert_eq!(ed.take_cursor_request(), None);
    }

    #[test]
    fn insert_after_clear_appends_verbatim() {
        let mut ed = EditorBuffer::read_only();
        ed.set_value("");
        ed.insert("+ start\n  - 'a'");
        assert_eq!(ed.value(), "+ start\n  - 'a'");
        assert_eq!(ed.cursor(), (1, 7));
    }

    #[test]
    fn requests_are_consumed_once() {
        let mut ed = EditorBuffer::new();
        ed.scroll_to_line(4, true, true);
        ed.focus();
        ed.resize();
        assert_eq!(
            ed.take_scroll_request(),
            Some(ScrollRequest { row: 4, center: true })
        );
        assert!(ed.take_focus_request());
        assert!(ed.take_layout_request());
        assert_eq!(ed.take_scroll_request(), None);
        assert!(!ed.take_focus_request());
        assert!(!ed.take_layout_request());
    }
}

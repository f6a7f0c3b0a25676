//! Text editor widget: a line gutter plus a `TextEdit`, backed by an
//! [`EditorBuffer`]. Cursor, scroll, and focus requests queued on the
//! buffer by the controller are applied here on the next frame.

mod gutter;
mod highlighter;

use eframe::egui;

use crate::editor::{char_index_of, Editor, EditorBuffer};

pub use gutter::GutterMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Grammar,
    Plain,
}

/// Header strip above an editor (similar to tabs in VSCode).
pub fn header(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    let top_bar_bg = egui::Color32::from_rgb(37, 37, 38);
    let top_bar_stroke = egui::Color32::from_rgb(51, 51, 51);

    egui::Frame::none()
        .fill(top_bar_bg)
        .inner_margin(egui::vec2(12.0, 6.0))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(title)
                        .color(egui::Color32::from_rgb(224, 224, 224))
                        .size(13.0),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), add_contents);
            });
        });

    let rect = ui.max_rect();
    ui.painter().hline(
        rect.x_range(),
        ui.cursor().top(),
        egui::Stroke::new(1.0, top_bar_stroke),
    );
    ui.add_space(1.0);
}

/// Draw `buffer` and return true when the user changed its text.
pub fn show(
    ui: &mut egui::Ui,
    id_source: &str,
    buffer: &mut EditorBuffer,
    syntax: Syntax,
    markers: &[GutterMarker],
) -> bool {
    let font_id = egui::FontId::monospace(14.0);
    let text_edit_id = ui.make_persistent_id(id_source);

    if let Some(char_idx) = buffer.take_cursor_request() {
        let mut te_state = egui::TextEdit::load_state(ui.ctx(), text_edit_id).unwrap_or_default();
        te_state
            .cursor
            .set_char_range(Some(egui::text::CCursorRange::one(egui::text::CCursor::new(char_idx))));
        egui::TextEdit::store_state(ui.ctx(), text_edit_id, te_state);
    }
    let scroll = buffer.take_scroll_request();
    let focus = buffer.take_focus_request();
    if buffer.take_layout_request() {
        ui.ctx().request_repaint();
    }

    let layout_font = font_id.clone();
    let mut layouter = move |ui: &egui::Ui, string: &str, _wrap_width: f32| {
        let mut layout_job = egui::text::LayoutJob::default();
        match syntax {
            Syntax::Grammar => highlighter::highlight_grammar(&mut layout_job, string, &layout_font),
            Syntax::Plain => highlighter::plain(&mut layout_job, string, &layout_font),
        }
        // Disable wrap to keep line numbers synced
        layout_job.wrap.max_width = f32::INFINITY;
        ui.fonts(|f| f.layout_job(layout_job))
    };

    let available_rect = ui.available_rect_before_wrap();
    ui.painter()
        .rect_filled(available_rect, 0.0, egui::Color32::from_rgb(10, 10, 10));

    let mut changed = false;
    egui::ScrollArea::both()
        .id_source(id_source)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.set_min_height(ui.available_height());

            let num_lines = buffer.value().split('\n').count().max(1);
            let digits = num_lines.to_string().len().max(2);
            let gutter_width = digits as f32 * ui.fonts(|f| f.glyph_width(&font_id, '0')) + 32.0;

            ui.horizontal_top(|ui| {
                ui.spacing_mut().item_spacing.x = 0.0;

                let gutter_response = ui.allocate_rect(
                    egui::Rect::from_min_size(
                        ui.cursor().min,
                        egui::vec2(gutter_width, ui.available_height()),
                    ),
                    egui::Sense::click(),
                );
                ui.add_space(4.0);

                let read_only = buffer.is_read_only();
                let output = if read_only {
                    let mut text: &str = buffer.value();
                    egui::TextEdit::multiline(&mut text)
                        .id(text_edit_id)
                        .font(egui::TextStyle::Monospace)
                        .frame(false)
                        .desired_width(f32::INFINITY)
                        .layouter(&mut layouter)
                        .show(ui)
                } else {
                    egui::TextEdit::multiline(buffer.text_mut())
                        .id(text_edit_id)
                        .font(egui::TextStyle::Monospace)
                        .code_editor()
                        .frame(false)
                        .desired_width(f32::INFINITY)
                        .lock_focus(true)
                        .layouter(&mut layouter)
                        .show(ui)
                };

                if !read_only {
                    changed = output.response.changed();
                    if let Some(range) = output.cursor_range {
                        buffer.sync_cursor(range.primary.ccursor.index);
                    }
                }

                if let Some(target) = gutter::render_gutter(
                    ui,
                    &gutter_response,
                    &output,
                    text_edit_id,
                    buffer.value(),
                    markers,
                ) {
                    buffer.move_cursor_to(target.row, target.col);
                    buffer.focus();
                    ui.ctx().request_repaint();
                }

                if let Some(request) = scroll {
                    let char_idx = char_index_of(buffer.value(), request.row, 0);
                    let cursor = output.galley.from_ccursor(egui::text::CCursor::new(char_idx));
                    let row_rect = output
                        .galley
                        .pos_from_cursor(&cursor)
                        .translate(output.galley_pos.to_vec2());
                    let align = if request.center {
                        Some(egui::Align::Center)
                    } else {
                        None
                    };
                    ui.scroll_to_rect(row_rect, align);
                }

                if focus {
                    output.response.request_focus();
                }
            });
        });

    changed
}

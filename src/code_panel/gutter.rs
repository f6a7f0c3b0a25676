use eframe::egui;

use crate::diagnostics::CursorTarget;

/// An error location shown as a dot next to its line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GutterMarker {
    pub target: CursorTarget,
    pub message: String,
}

/// Paint line numbers and error dots into the reserved gutter rect.
///
/// Returns where the cursor should go when the gutter was clicked: the
/// start of the clicked line, or the error column when the click landed on
/// a dot.
pub(crate) fn render_gutter(
    ui: &egui::Ui,
    gutter_response: &egui::Response,
    output: &egui::text_edit::TextEditOutput,
    text_edit_id: egui::Id,
    text: &str,
    markers: &[GutterMarker],
) -> Option<CursorTarget> {
    let gutter_rect = gutter_response.rect;
    let font_id = egui::FontId::monospace(14.0);

    let mut active_line_idx: usize = 0;
    if let Some(te_state) = egui::TextEdit::load_state(ui.ctx(), text_edit_id) {
        if let Some(range) = te_state.cursor.char_range() {
            active_line_idx = text
                .chars()
                .take(range.primary.index)
                .filter(|&c| c == '\n')
                .count();
        }
    }

    let mut full_gutter_rect = gutter_rect;
    full_gutter_rect.set_bottom(ui.clip_rect().bottom().max(output.response.rect.bottom()));

    let gutter_painter = ui.painter().with_clip_rect(full_gutter_rect);
    gutter_painter.rect_filled(full_gutter_rect, 0.0, egui::Color32::from_rgb(24, 24, 24));
    let gutter_text_color = egui::Color32::from_gray(100);

    let galley = &output.galley;
    let galley_pos = output.galley_pos;

    let mut current_logical_line = 0;
    for row in &galley.rows {
        let cursor = galley.cursor_from_pos(egui::vec2(0.0, row.rect.center().y));
        let row_start_idx = cursor.ccursor.index;
        let is_start_of_logical_line =
            row_start_idx == 0 || text.chars().nth(row_start_idx - 1) == Some('\n');
        if !is_start_of_logical_line {
            continue;
        }

        let line_index = current_logical_line;
        current_logical_line += 1;

        let y = galley_pos.y + row.rect.top();
        if y + row.rect.height() < ui.clip_rect().top() {
            continue;
        }
        if y > ui.clip_rect().bottom() {
            break;
        }

        let color = if line_index == active_line_idx {
            egui::Color32::from_rgb(220, 220, 220)
        } else {
            gutter_text_color
        };
        gutter_painter.text(
            egui::pos2(full_gutter_rect.right() - 8.0, y),
            egui::Align2::RIGHT_TOP,
            format!("{}", line_index + 1),
            font_id.clone(),
            color,
        );

        if let Some(marker) = markers.iter().find(|m| m.target.row == line_index) {
            let dot_center =
                egui::pos2(full_gutter_rect.left() + 14.0, y + row.rect.height() * 0.5);
            gutter_painter.circle_filled(dot_center, 5.0, egui::Color32::from_rgb(200, 80, 80));

            if let Some(pointer_pos) = ui.ctx().pointer_hover_pos() {
                let hit_rect =
                    egui::Rect::from_center_size(dot_center, egui::vec2(16.0, row.rect.height()));
                if hit_rect.contains(pointer_pos) {
                    ui.ctx().output_mut(|out| out.cursor_icon = egui::CursorIcon::Help);
                    egui::show_tooltip_text(
                        ui.ctx(),
                        text_edit_id.with("gutter_marker"),
                        marker.message.as_str(),
                    );
                }
            }
        }
    }

    if !gutter_response.clicked() {
        return None;
    }
    let pos = ui.ctx().pointer_interact_pos()?;
    let cursor = galley.cursor_from_pos(egui::vec2(0.0, pos.y - galley_pos.y));
    let row = text
        .chars()
        .take(cursor.ccursor.index)
        .filter(|&c| c == '\n')
        .count();

    let marker_hit_x = full_gutter_rect.left() + 4.0..=full_gutter_rect.left() + 28.0;
    if marker_hit_x.contains(&pos.x) {
        if let Some(marker) = markers.iter().find(|m| m.target.row == row) {
            return Some(marker.target);
        }
    }
    Some(CursorTarget { row, col: 0 })
}

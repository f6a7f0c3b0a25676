//! Validity badges and clickable error lists.

use eframe::egui;

use crate::code_panel::GutterMarker;
use crate::diagnostics::{DiagnosticsView, ErrorList, Validity};

const VALID_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 200, 140);
const INVALID_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 100, 100);

/// Badge next to an editor title. Nothing is drawn while unset.
pub fn badge(ui: &mut egui::Ui, validity: Validity) {
    let (text, color) = match validity {
        Validity::Unset => return,
        Validity::Valid => ("Valid", VALID_COLOR),
        Validity::Invalid => ("Invalid", INVALID_COLOR),
    };
    egui::Frame::none()
        .fill(color.linear_multiply(0.2))
        .stroke(egui::Stroke::new(1.0, color))
        .rounding(4.0)
        .inner_margin(egui::vec2(6.0, 1.0))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(color).size(11.0));
        });
}

/// Render `list` and return the index of the clicked item, if any.
pub fn error_list(ui: &mut egui::Ui, view: &DiagnosticsView, list: ErrorList) -> Option<usize> {
    let items = view.items(list);
    if items.is_empty() {
        return None;
    }

    let mut clicked = None;
    egui::ScrollArea::vertical()
        .id_source(("error_list", list_name(list)))
        .max_height(120.0)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for (index, item) in items.iter().enumerate() {
                let text = egui::text::LayoutJob::simple_singleline(
                    format!("{}  {}", item.label, item.message),
                    egui::FontId::monospace(12.0),
                    INVALID_COLOR,
                );
                let response = ui
                    .add(egui::Label::new(text).sense(egui::Sense::click()))
                    .on_hover_cursor(egui::CursorIcon::PointingHand);
                if response.clicked() {
                    clicked = Some(index);
                }
            }
        });
    clicked
}

/// Gutter dots for the editor that `list` refers to.
pub fn markers(view: &DiagnosticsView, list: ErrorList) -> Vec<GutterMarker> {
    view.items(list)
        .iter()
        .map(|item| GutterMarker {
            target: item.target,
            message: item.message.clone(),
        })
        .collect()
}

/// Banner shown after a failed analysis cycle.
pub fn banner(ui: &mut egui::Ui, view: &DiagnosticsView) {
    if let Some(message) = &view.banner {
        egui::Frame::none()
            .fill(egui::Color32::from_rgb(60, 30, 30))
            .inner_margin(egui::vec2(12.0, 6.0))
            .show(ui, |ui| {
                ui.colored_label(INVALID_COLOR, message);
            });
    }
}

fn list_name(list: ErrorList) -> &'static str {
    match list {
        ErrorList::Grammar => "grammar",
        ErrorList::Code => "code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{parse_response, AnalysisOutcome};

    #[test]
    fn markers_follow_item_targets() {
        let result = parse_response(
            r#"{"grammar_valid": false,
                "grammar": [{"ln": 3, "col": 7, "msg": "'B' is not defined."}]}"#,
        )
        .unwrap();
        let view = DiagnosticsView::render(&AnalysisOutcome::Completed(result));

        let marks = markers(&view, ErrorList::Grammar);
        assert_eq!(marks.len(), 1);
        assert_eq!((marks[0].target.row, marks[0].target.col), (2, 6));
        assert_eq!(marks[0].message, "'B' is not defined.");
        assert!(markers(&view, ErrorList::Code).is_empty());
    }
}

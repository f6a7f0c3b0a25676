use std::time::Duration;

use eframe::egui;

use crate::code_panel::{self, Syntax};
use crate::controller::Playground;
use crate::diagnostics::ErrorList;
use crate::diagnostics_panel;
use crate::editor::{EditorBuffer, EditorSet, EditorSlot};
use crate::engine::Engine;
use crate::states::debounce::DEBOUNCE_WINDOW_SECS;
use crate::states::settings::{Buffer, OptimizationMode, Panel};
use crate::states::storage::KeyValueStore;

pub struct PlaygroundApp<E, S> {
    playground: Playground<E, S, EditorBuffer>,
    engine_signaled: bool,
}

pub fn create_app<E: Engine, S: KeyValueStore>(engine: E, store: S) -> PlaygroundApp<E, S> {
    PlaygroundApp {
        playground: Playground::startup(engine, store, EditorSet::desktop()),
        engine_signaled: false,
    }
}

/// Everything the user did during one frame. Applied after drawing so the
/// widgets never hold a borrow of the controller while it mutates.
#[derive(Default)]
struct FrameEvents {
    edited: Vec<Buffer>,
    optimize: Option<OptimizationMode>,
    packrat: Option<bool>,
    auto_refresh: Option<bool>,
    panels: Vec<(Panel, bool)>,
    parse_clicked: bool,
    error_clicked: Option<(ErrorList, usize)>,
}

impl FrameEvents {
    fn schedules_commit(&self) -> bool {
        !self.edited.is_empty()
            || self.optimize.is_some()
            || self.packrat.is_some()
            || self.auto_refresh.is_some()
    }
}

impl<E: Engine, S: KeyValueStore> eframe::App for PlaygroundApp<E, S> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);

        // A request queued last frame runs now; its overlay is already on screen.
        if let Some(wait) = self.playground.tick(now) {
            ctx.request_repaint_after(Duration::from_secs_f64(wait));
        }
        if !self.engine_signaled {
            self.engine_signaled = true;
            self.playground.on_engine_ready();
        }

        let mut events = FrameEvents::default();

        egui::TopBottomPanel::top("toolbar_panel").show(ctx, |ui| {
            toolbar(ui, &self.playground, &mut events);
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            status_bar(ui, &self.playground);
        });

        if self.playground.diagnostics().banner.is_some() {
            egui::TopBottomPanel::top("banner_panel")
                .frame(egui::Frame::none())
                .show(ctx, |ui| diagnostics_panel::banner(ui, self.playground.diagnostics()));
        }

        egui::SidePanel::left("grammar_panel")
            .resizable(true)
            .default_width(ctx.screen_rect().width() * 0.5)
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let validity = self.playground.diagnostics().grammar_validity;
                code_panel::header(ui, "Grammar", |ui| diagnostics_panel::badge(ui, validity));

                egui::TopBottomPanel::bottom("grammar_errors")
                    .resizable(false)
                    .show_separator_line(false)
                    .show_inside(ui, |ui| {
                        if let Some(index) = diagnostics_panel::error_list(
                            ui,
                            self.playground.diagnostics(),
                            ErrorList::Grammar,
                        ) {
                            events.error_clicked = Some((ErrorList::Grammar, index));
                        }
                    });

                let markers = diagnostics_panel::markers(self.playground.diagnostics(), ErrorList::Grammar);
                let editor = &mut self.playground.editors_mut().grammar;
                if code_panel::show(ui, "grammar_editor", editor, Syntax::Grammar, &markers) {
                    events.edited.push(Buffer::Grammar);
                }
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let panels = self.playground.state().view.panels();
                let panel_height = ui.available_height() / (panels.visible().count() + 1) as f32;

                for panel in panels.visible().collect::<Vec<_>>().into_iter().rev() {
                    egui::TopBottomPanel::bottom(egui::Id::new(("info_panel", panel.title())))
                        .resizable(true)
                        .default_height(panel_height)
                        .frame(egui::Frame::none())
                        .show_inside(ui, |ui| {
                            code_panel::header(ui, panel.title(), |_| {});
                            let editor = self
                                .playground
                                .editors_mut()
                                .get_mut(EditorSlot::Info(panel));
                            code_panel::show(ui, panel.title(), editor, Syntax::Plain, &[]);
                        });
                }

                let validity = self.playground.diagnostics().code_validity;
                code_panel::header(ui, "Input", |ui| diagnostics_panel::badge(ui, validity));

                egui::TopBottomPanel::bottom("code_errors")
                    .resizable(false)
                    .show_separator_line(false)
                    .show_inside(ui, |ui| {
                        if let Some(index) = diagnostics_panel::error_list(
                            ui,
                            self.playground.diagnostics(),
                            ErrorList::Code,
                        ) {
                            events.error_clicked = Some((ErrorList::Code, index));
                        }
                    });

                let markers = diagnostics_panel::markers(self.playground.diagnostics(), ErrorList::Code);
                let editor = &mut self.playground.editors_mut().code;
                if code_panel::show(ui, "code_editor", editor, Syntax::Plain, &markers) {
                    events.edited.push(Buffer::Code);
                }
            });

        self.apply(&events, now);

        if self.playground.state().is_busy() {
            busy_overlay(ctx);
            ctx.request_repaint();
        } else if events.schedules_commit() {
            ctx.request_repaint_after(Duration::from_secs_f64(DEBOUNCE_WINDOW_SECS));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.playground.flush_pending();
    }
}

impl<E: Engine, S: KeyValueStore> PlaygroundApp<E, S> {
    fn apply(&mut self, events: &FrameEvents, now: f64) {
        let pg = &mut self.playground;
        for buffer in &events.edited {
            pg.on_buffer_edited(*buffer, now);
        }
        if let Some(mode) = events.optimize {
            pg.set_optimize_mode(mode, now);
        }
        if let Some(packrat) = events.packrat {
            pg.set_packrat(packrat, now);
        }
        if let Some(auto_refresh) = events.auto_refresh {
            pg.set_auto_refresh(auto_refresh, now);
        }
        for (panel, visible) in &events.panels {
            pg.set_panel_visible(*panel, *visible);
        }
        if events.parse_clicked {
            pg.request_parse();
        }
        if let Some((list, index)) = events.error_clicked {
            pg.on_error_clicked(list, index);
        }
    }
}

fn toolbar<E: Engine, S: KeyValueStore>(
    ui: &mut egui::Ui,
    playground: &Playground<E, S, EditorBuffer>,
    events: &mut FrameEvents,
) {
    let settings = *playground.settings();
    ui.horizontal(|ui| {
        let mut optimize = settings.optimize;
        egui::ComboBox::from_id_source("optimize_mode")
            .selected_text(optimize.label())
            .show_ui(ui, |ui| {
                for mode in [OptimizationMode::All, OptimizationMode::None] {
                    ui.selectable_value(&mut optimize, mode, mode.label());
                }
            });
        if optimize != settings.optimize {
            events.optimize = Some(optimize);
        }

        let mut packrat = settings.packrat;
        if ui.checkbox(&mut packrat, "Packrat").changed() {
            events.packrat = Some(packrat);
        }

        let mut auto_refresh = settings.auto_refresh;
        if ui.checkbox(&mut auto_refresh, "Auto refresh").changed() {
            events.auto_refresh = Some(auto_refresh);
        }

        if ui
            .add_enabled(playground.parse_enabled(), egui::Button::new("Parse"))
            .clicked()
        {
            events.parse_clicked = true;
        }

        ui.separator();

        for panel in Panel::ALL {
            let mut visible = settings.panels.is_visible(panel);
            if ui.checkbox(&mut visible, panel.title()).changed() {
                events.panels.push((panel, visible));
            }
        }
    });
}

fn status_bar<E: Engine, S: KeyValueStore>(
    ui: &mut egui::Ui,
    playground: &Playground<E, S, EditorBuffer>,
) {
    ui.horizontal(|ui| {
        let (row, col) = playground.editors().grammar.cursor();
        ui.label(egui::RichText::new(format!("Grammar  Ln {}, Col {}", row + 1, col + 1)).weak());
        ui.separator();
        let (row, col) = playground.editors().code.cursor();
        ui.label(egui::RichText::new(format!("Input  Ln {}, Col {}", row + 1, col + 1)).weak());

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if playground.state().is_busy() {
                ui.label(egui::RichText::new("Analyzing…").weak());
            } else if playground.state().commit_pending() {
                ui.label(egui::RichText::new("Pending changes…").weak());
            }
        });
    });
}

/// Full-window layer that swallows pointer input while the engine runs.
fn busy_overlay(ctx: &egui::Context) {
    let screen_rect = ctx.input(|i| i.screen_rect());
    egui::Area::new("busy_overlay")
        .fixed_pos(egui::pos2(0.0, 0.0))
        .interactable(true)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.allocate_rect(screen_rect, egui::Sense::click_and_drag());
            ui.painter()
                .rect_filled(screen_rect, 0.0, egui::Color32::from_black_alpha(120));
            ui.painter().text(
                screen_rect.center(),
                egui::Align2::CENTER_CENTER,
                "Analyzing…",
                egui::FontId::proportional(18.0),
                egui::Color32::from_rgb(224, 224, 224),
            );
        });
}

//! Playground controller.
//!
//! Owns both buffers, the toggles, and the last analysis outcome, and moves
//! them through the edit → debounce → analyze → render cycle. Every UI event
//! maps onto one named transition below, so each step can be driven directly
//! from tests without a window.
//!
//! Two things can make the controller wait: the debounce window after an
//! edit, and the one-frame deferral before an engine call (so the busy
//! overlay is painted before the UI thread blocks). Both are resolved in
//! [`Playground::tick`].

use crate::analysis::{AnalysisInvoker, AnalysisOutcome, AnalysisRequest};
use crate::diagnostics::{DiagnosticsView, ErrorList};
use crate::editor::{Editor, EditorSet, EditorSlot};
use crate::engine::Engine;
use crate::states::debounce::Debouncer;
use crate::states::settings::{Buffer, OptimizationMode, Panel, PersistedSettings, Settings};
use crate::states::storage::KeyValueStore;
use crate::states::view_state::ViewState;

/// Where the current analysis cycle is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalysisPhase {
    #[default]
    Idle,
    /// Built and waiting for the next tick; the overlay is already up.
    Pending(AnalysisRequest),
    /// The engine call is executing.
    Running,
}

/// Work deferred by the debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Persist buffers and toggles, then analyze when auto-refresh is on.
    Commit,
}

#[derive(Debug, Default)]
pub struct PlaygroundState {
    pub grammar_text: String,
    pub code_text: String,
    pub settings: Settings,
    pub view: ViewState,
    pub outcome: AnalysisOutcome,
    pub diagnostics: DiagnosticsView,
    pub phase: AnalysisPhase,
    debounce: Debouncer<DeferredAction>,
    engine_ready: bool,
}

impl PlaygroundState {
    pub fn buffer(&self, buffer: Buffer) -> &str {
        match buffer {
            Buffer::Grammar => &self.grammar_text,
            Buffer::Code => &self.code_text,
        }
    }

    fn buffer_mut(&mut self, buffer: Buffer) -> &mut String {
        match buffer {
            Buffer::Grammar => &mut self.grammar_text,
            Buffer::Code => &mut self.code_text,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase != AnalysisPhase::Idle
    }

    pub fn commit_pending(&self) -> bool {
        self.debounce.is_pending()
    }
}

pub struct Playground<E, S, Ed> {
    state: PlaygroundState,
    invoker: AnalysisInvoker<E>,
    persisted: PersistedSettings<S>,
    editors: EditorSet<Ed>,
}

impl<E, S, Ed> Playground<E, S, Ed>
where
    E: Engine,
    S: KeyValueStore,
    Ed: Editor,
{
    /// Load persisted buffers and toggles and put them into the editors.
    pub fn startup(engine: E, store: S, mut editors: EditorSet<Ed>) -> Self {
        let persisted = PersistedSettings::new(store);
        let settings = persisted.load_settings();
        let grammar_text = persisted.load_buffer(Buffer::Grammar);
        let code_text = persisted.load_buffer(Buffer::Code);

        for (slot, text) in [(EditorSlot::Grammar, &grammar_text), (EditorSlot::Code, &code_text)] {
            let editor = editors.get_mut(slot);
            editor.set_value(text);
            editor.move_cursor_to(0, 0);
        }

        let view = ViewState::new(settings.panels);
        view.relayout(&mut editors);

        tracing::info!(
            optimize = settings.optimize.as_str(),
            packrat = settings.packrat,
            auto_refresh = settings.auto_refresh,
            grammar_len = grammar_text.len(),
            code_len = code_text.len(),
            "playground started"
        );

        Self {
            state: PlaygroundState {
                grammar_text,
                code_text,
                settings,
                view,
                ..PlaygroundState::default()
            },
            invoker: AnalysisInvoker::new(engine),
            persisted,
            editors,
        }
    }

    pub fn state(&self) -> &PlaygroundState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn diagnostics(&self) -> &DiagnosticsView {
        &self.state.diagnostics
    }

    pub fn editors(&self) -> &EditorSet<Ed> {
        &self.editors
    }

    pub fn editors_mut(&mut self) -> &mut EditorSet<Ed> {
        &mut self.editors
    }

    #[cfg(test)]
    pub fn engine(&self) -> &E {
        self.invoker.engine()
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        self.persisted.store()
    }

    /// The manual "Parse" trigger only exists while auto-refresh is off.
    pub fn parse_enabled(&self) -> bool {
        !self.state.settings.auto_refresh
    }

    /// One-time signal that the engine finished initializing.
    pub fn on_engine_ready(&mut self) {
        if self.state.engine_ready {
            return;
        }
        self.state.engine_ready = true;
        tracing::debug!("engine ready");
        if self.state.settings.auto_refresh {
            self.begin_analysis();
        }
    }

    /// The widget for `buffer` reported a change.
    pub fn on_buffer_edited(&mut self, buffer: Buffer, now: f64) {
        let text = self.editors.get(buffer.into()).value().to_string();
        *self.state.buffer_mut(buffer) = text;
        self.state.debounce.schedule(DeferredAction::Commit, now);
    }

    /// Explicit "Parse" click. Ignored while auto-refresh is on.
    pub fn request_parse(&mut self) -> bool {
        if !self.parse_enabled() {
            tracing::debug!("parse requested while auto-refresh is on, ignoring");
            return false;
        }
        self.begin_analysis();
        true
    }

    pub fn set_optimize_mode(&mut self, mode: OptimizationMode, now: f64) {
        self.state.settings.optimize = mode;
        self.persisted.save_settings(&self.state.settings);
        self.state.debounce.schedule(DeferredAction::Commit, now);
    }

    pub fn set_packrat(&mut self, packrat: bool, now: f64) {
        self.state.settings.packrat = packrat;
        self.persisted.save_settings(&self.state.settings);
        self.state.debounce.schedule(DeferredAction::Commit, now);
    }

    pub fn set_auto_refresh(&mut self, auto_refresh: bool, now: f64) {
        self.state.settings.auto_refresh = auto_refresh;
        self.persisted.save_settings(&self.state.settings);
        self.state.debounce.schedule(DeferredAction::Commit, now);
    }

    pub fn set_panel_visible(&mut self, panel: Panel, visible: bool) {
        self.state
            .view
            .set_panel_visible(panel, visible, &mut self.persisted, &mut self.editors);
        self.state.settings.panels = self.state.view.panels();
    }

    /// Click on an error list item.
    pub fn on_error_clicked(&mut self, list: ErrorList, index: usize) {
        for cmd in self.state.diagnostics.navigate(list, index) {
            cmd.apply(&mut self.editors);
        }
    }

    /// Advance timers. Returns how long the host may sleep before calling
    /// again, or `None` when nothing is waiting.
    pub fn tick(&mut self, now: f64) -> Option<f64> {
        // Dispatch before firing the debounce so a request queued by this
        // tick still gets a frame with the overlay on screen.
        self.dispatch_pending();

        if let Some(DeferredAction::Commit) = self.state.debounce.poll(now) {
            self.commit();
        }

        if self.state.is_busy() {
            Some(0.0)
        } else {
            self.state.debounce.remaining(now)
        }
    }

    /// Persist an edit still waiting in the debounce window. Used on exit;
    /// no analysis is started.
    pub fn flush_pending(&mut self) {
        if let Some(DeferredAction::Commit) = self.state.debounce.flush() {
            tracing::debug!("flushing pending commit");
            self.persist();
        }
    }

    fn persist(&mut self) {
        self.persisted
            .save_buffer(Buffer::Grammar, &self.state.grammar_text);
        self.persisted.save_buffer(Buffer::Code, &self.state.code_text);
        self.persisted.save_settings(&self.state.settings);
    }

    fn commit(&mut self) {
        self.persist();
        if self.state.settings.auto_refresh {
            self.begin_analysis();
        }
    }

    /// Start a cycle from the current buffers. An empty grammar clears
    /// everything right away; otherwise the request waits one tick.
    fn begin_analysis(&mut self) {
        let request = AnalysisRequest::new(
            &self.state.grammar_text,
            &self.state.code_text,
            &self.state.settings,
        );
        if request.is_empty() {
            self.apply_outcome(AnalysisOutcome::Skipped);
            return;
        }
        match &self.state.phase {
            AnalysisPhase::Pending(_) => tracing::debug!("replacing queued analysis request"),
            AnalysisPhase::Running => {
                tracing::warn!("analysis already running, dropping request");
                return;
            }
            AnalysisPhase::Idle => {}
        }
        self.state.phase = AnalysisPhase::Pending(request);
    }

    fn dispatch_pending(&mut self) {
        let AnalysisPhase::Pending(request) = std::mem::take(&mut self.state.phase) else {
            return;
        };
        self.state.phase = AnalysisPhase::Running;
        let outcome = AnalysisOutcome::from_result(self.invoker.analyze(&request));
        self.state.phase = AnalysisPhase::Idle;
        self.apply_outcome(outcome);
    }

    fn apply_outcome(&mut self, outcome: AnalysisOutcome) {
        let diagnostics = DiagnosticsView::render(&outcome);
        for panel in Panel::ALL {
            let editor = self.editors.get_mut(EditorSlot::Info(panel));
            editor.set_value("");
            editor.insert(diagnostics.panel_text(panel));
        }
        self.state.diagnostics = diagnostics;
        self.state.outcome = outcome;
    }
}

use super::settings::{Panel, PanelVisibility, PersistedSettings};
use super::storage::KeyValueStore;
use crate::editor::{Editor, EditorSet, EditorSlot};

/// Which optional panels are shown. Independent of analysis results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    panels: PanelVisibility,
}

impl ViewState {
    pub fn new(panels: PanelVisibility) -> Self {
        Self { panels }
    }

    pub fn panels(&self) -> PanelVisibility {
        self.panels
    }

    #[cfg(test)]
    pub fn is_visible(&self, panel: Panel) -> bool {
        self.panels.is_visible(panel)
    }

    /// Toggle a panel, persist it, and re-layout every editor that is on
    /// screen afterwards. The egui host does not notice container changes on
    /// its own, so each visible editor gets an explicit `resize`.
    pub fn set_panel_visible<S, Ed>(
        &mut self,
        panel: Panel,
        visible: bool,
        persisted: &mut PersistedSettings<S>,
        editors: &mut EditorSet<Ed>,
    ) where
        S: KeyValueStore,
        Ed: Editor,
    {
        self.panels.set(panel, visible);
        persisted.save_panel(panel, visible);
        tracing::debug!(panel = panel.title(), visible, "panel visibility changed");
        self.relayout(editors);
    }

    pub fn relayout<Ed: Editor>(&self, editors: &mut EditorSet<Ed>) {
        editors.get_mut(EditorSlot::Code).resize();
        for panel in self.panels.visible() {
            editors.get_mut(EditorSlot::Info(panel)).resize();
        }
    }
}

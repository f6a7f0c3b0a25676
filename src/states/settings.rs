use super::storage::KeyValueStore;

pub const KEY_GRAMMAR_TEXT: &str = "grammarText";
pub const KEY_CODE_TEXT: &str = "codeText";
pub const KEY_OPTIMIZATION_MODE: &str = "optimizationMode";
pub const KEY_PACKRAT: &str = "packrat";
pub const KEY_AUTO_REFRESH: &str = "autoRefresh";

/// One of the two user-editable documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Buffer {
    Grammar,
    Code,
}

impl Buffer {
    pub fn storage_key(self) -> &'static str {
        match self {
            Buffer::Grammar => KEY_GRAMMAR_TEXT,
            Buffer::Code => KEY_CODE_TEXT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationMode {
    #[default]
    All,
    None,
}

impl OptimizationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OptimizationMode::All => "all",
            OptimizationMode::None => "none",
        }
    }

    /// Unknown values fall back to the default.
    pub fn parse(value: &str) -> Self {
        match value {
            "none" => OptimizationMode::None,
            _ => OptimizationMode::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OptimizationMode::All => "All optimizations",
            OptimizationMode::None => "No optimization",
        }
    }

    pub fn is_enabled(self) -> bool {
        self == OptimizationMode::All
    }
}

/// Optional read-only panels next to the code editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Panel {
    Ast,
    AstOptimized,
    Profile,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::Ast, Panel::AstOptimized, Panel::Profile];

    pub fn storage_key(self) -> &'static str {
        match self {
            Panel::Ast => "show-ast",
            Panel::AstOptimized => "show-ast-optimized",
            Panel::Profile => "show-profile",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::Ast => "AST",
            Panel::AstOptimized => "Optimized AST",
            Panel::Profile => "Profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelVisibility {
    pub ast: bool,
    pub ast_optimized: bool,
    pub profile: bool,
}

impl PanelVisibility {
    pub fn is_visible(&self, panel: Panel) -> bool {
        match panel {
            Panel::Ast => self.ast,
            Panel::AstOptimized => self.ast_optimized,
            Panel::Profile => self.profile,
        }
    }

    pub fn set(&mut self, panel: Panel, visible: bool) {
        match panel {
            Panel::Ast => self.ast = visible,
            Panel::AstOptimized => self.ast_optimized = visible,
            Panel::Profile => self.profile = visible,
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = Panel> + '_ {
        Panel::ALL.into_iter().filter(|p| self.is_visible(*p))
    }
}

/// UI toggles mirrored to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    pub optimize: OptimizationMode,
    pub packrat: bool,
    pub auto_refresh: bool,
    pub panels: PanelVisibility,
}

fn parse_flag(value: Option<String>) -> bool {
    value.as_deref() == Some("true")
}

fn flag_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Typed accessor over a [`KeyValueStore`].
///
/// Reads fall back to defaults; writes are best-effort and never fail the
/// caller. A failed write is logged and the session carries on in memory.
#[derive(Debug)]
pub struct PersistedSettings<S> {
    store: S,
}

impl<S: KeyValueStore> PersistedSettings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load_buffer(&self, buffer: Buffer) -> String {
        self.store.get_item(buffer.storage_key()).unwrap_or_default()
    }

    pub fn load_settings(&self) -> Settings {
        let mut panels = PanelVisibility::default();
        for panel in Panel::ALL {
            panels.set(panel, parse_flag(self.store.get_item(panel.storage_key())));
        }
        Settings {
            optimize: self
                .store
                .get_item(KEY_OPTIMIZATION_MODE)
                .map(|v| OptimizationMode::parse(&v))
                .unwrap_or_default(),
            packrat: parse_flag(self.store.get_item(KEY_PACKRAT)),
            auto_refresh: parse_flag(self.store.get_item(KEY_AUTO_REFRESH)),
            panels,
        }
    }

    pub fn save_buffer(&mut self, buffer: Buffer, text: &str) {
        self.save(buffer.storage_key(), text);
    }

    /// Persist the analysis toggles. Panel flags are saved separately when
    /// they change.
    pub fn save_settings(&mut self, settings: &Settings) {
        self.save(KEY_OPTIMIZATION_MODE, settings.optimize.as_str());
        self.save(KEY_PACKRAT, flag_str(settings.packrat));
        self.save(KEY_AUTO_REFRESH, flag_str(settings.auto_refresh));
    }

    pub fn save_panel(&mut self, panel: Panel, visible: bool) {
        self.save(panel.storage_key(), flag_str(visible));
    }

    fn save(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set_item(key, value) {
            tracing::warn!(key, %err, "could not persist setting");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::storage::{MemoryStore, StoreError};

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get_item(&self, _key: &str) -> Option<String> {
            None
        }

        fn set_item(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Write {
                path: key.into(),
                source: std::io::Error::other("quota exceeded"),
            })
        }
    }

    #[test]
    fn defaults_when_store_is_empty() {
        let persisted = PersistedSettings::new(MemoryStore::new());
        let settings = persisted.load_settings();
        assert_eq!(settings.optimize, OptimizationMode::All);
        assert!(!settings.packrat);
        assert!(!settings.auto_refresh);
        assert_eq!(settings.panels, PanelVisibility::default());
        assert_eq!(persisted.load_buffer(Buffer::Grammar), "");
    }

    #[test]
    fn flags_require_exact_true() {
        let mut store = MemoryStore::new();
        store.set_item(KEY_PACKRAT, "TRUE").unwrap();
        store.set_item(KEY_AUTO_REFRESH, "1").unwrap();
        store.set_item("show-ast", "true").unwrap();
        store.set_item(KEY_OPTIMIZATION_MODE, "only").unwrap();

        let settings = PersistedSettings::new(store).load_settings();
        assert!(!settings.packrat);
        assert!(!settings.auto_refresh);
        assert!(settings.panels.ast);
        assert_eq!(settings.optimize, OptimizationMode::All);
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut persisted = PersistedSettings::new(MemoryStore::new());
        let mut settings = Settings {
            optimize: OptimizationMode::None,
            packrat: true,
            auto_refresh: true,
            ..Settings::default()
        };
        settings.panels.set(Panel::Profile, true);

        persisted.save_settings(&settings);
        persisted.save_panel(Panel::Profile, true);
        persisted.save_buffer(Buffer::Code, "1 + 2");

        assert_eq!(persisted.load_settings(), settings);
        assert_eq!(persisted.load_buffer(Buffer::Code), "1 + 2");
    }

    #[test]
    fn write_failures_are_swallowed() {
        let mut persisted = PersistedSettings::new(FailingStore);
        persisted.save_buffer(Buffer::Grammar, "start <- 'a'");
        persisted.save_settings(&Settings::default());
        assert_eq!(persisted.load_buffer(Buffer::Grammar), "");
    }
}

pub mod debounce;
pub mod settings;
pub mod storage;
pub mod view_state;

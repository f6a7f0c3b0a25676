//! Logging setup.
//!
//! Everything logs through `tracing`. The filter comes from `-v`/`-q` or
//! `--log-level`; `RUST_LOG` wins when neither flag was given.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(level: LevelFilter, use_env_filter: bool) {
    let filter = if use_env_filter {
        EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy()
    } else {
        EnvFilter::default().add_directive(level.into())
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .try_init();
}

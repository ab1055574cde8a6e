//! Logging setup for the `gxp` binary.
//!
//! Events go to stderr and, when the log directory is writable, to
//! `<logs_dir>/gxp.log`. `RUST_LOG` overrides the default `info` level.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Once};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Name of the log file inside the log directory.
pub const LOG_FILE_NAME: &str = "gxp.log";

static INIT: Once = Once::new();

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging. Only the first call takes effect.
pub fn init(logs_dir: &Path) {
    INIT.call_once(|| {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter());

        let file = std::fs::create_dir_all(logs_dir).and_then(|()| {
            OpenOptions::new().create(true).append(true).open(logs_dir.join(LOG_FILE_NAME))
        });
        let (file_layer, file_error) = match file {
            Ok(file) => (
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Arc::new(file))
                        .with_ansi(false)
                        .with_filter(filter()),
                ),
                None,
            ),
            Err(e) => (None, Some(e)),
        };

        tracing_subscriber::registry().with(stderr_layer).with(file_layer).init();

        if let Some(e) = file_error {
            tracing::warn!(dir = %logs_dir.display(), error = %e, "file logging disabled");
        }
    });
}

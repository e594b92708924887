//! Logging infrastructure for structured console and file output.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::{Verbosity, init_subscriber};
pub use types::{Log, TaskEntry, TaskStatus};

/// Create a [`Logger`] backed by an isolated per-thread tracing subscriber
/// whose [`FileLayer`](subscriber::FileLayer) writes to `<tmp>/test.log`.
///
/// The returned guard must be kept alive for the duration of the test;
/// dropping it restores the previous thread-local dispatcher.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard)
{
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let file_layer = subscriber::FileLayer::at(&tmp.path().join("test.log"))
        .expect("failed to create file layer");
    let log = Logger::new("test", false);
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}

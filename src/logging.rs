//! Log output for toune-remote
//!
//! The terminal belongs to the UI, so events go to a daily file under the
//! configured log directory (`.logs/` by default). The returned guard must be
//! held until shutdown; dropping it flushes what is still buffered.

use std::path::Path;

use anyhow::Context;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub const LOG_FILE_PREFIX: &str = "toune-remote";
pub const LOG_FILE_SUFFIX: &str = "log";

/// Used when neither `TOUNE_LOG` nor `RUST_LOG` gives a usable filter.
pub const DEFAULT_FILTER: &str = "toune_remote=debug,reqwest=info,warn";

/// Install the file subscriber.
///
/// Filter directives come from `configured` (`TOUNE_LOG`), then `RUST_LOG`,
/// then [`DEFAULT_FILTER`].
pub fn init_logging(dir: &Path, configured: Option<&str>) -> anyhow::Result<WorkerGuard> {
    let appender = open_log_file(dir)?;

    // Writes happen on a worker thread so the poll and tick loops never wait on disk
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = configured.or(rust_log.as_deref());

    file_subscriber(writer, filter_for(directives))
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    tracing::info!(
        dir = %dir.display(),
        filter = directives.unwrap_or(DEFAULT_FILTER),
        "Logging to file"
    );
    Ok(guard)
}

fn open_log_file(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)
        .with_context(|| format!("cannot open log file in {}", dir.display()))
}

/// Parse `directives`; a typo in them falls back to the default filter
/// instead of silencing everything.
fn filter_for(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn file_subscriber<W>(writer: W, filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer)
}

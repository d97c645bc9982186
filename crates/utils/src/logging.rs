//! provides logging helpers

use std::path::Path;

use tracing::Subscriber;
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::{self};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Registry;
use tracing_subscriber::Layer;

/// Environment variable selecting a log file instead of stderr.
pub const LOG_PATH_ENV_VAR: &str = "MPI_BRINGUP_LOG_PATH";

const DEFAULT_LOG_FILE: &str = "mpi-bringup.log";

/// Builds the formatting layer.
///
/// With `log_path` set, events go to a daily rolling file through a non-blocking
/// writer and the returned guard must be kept alive until shutdown. A path that
/// names an existing directory gets the default file name inside it.
pub fn get_fmt_layer<S>(
    log_path: Option<String>,
) -> (Box<dyn Layer<S> + Send + Sync + 'static>, Option<WorkerGuard>)
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let Some(log_path) = log_path.filter(|p| !p.is_empty()) else {
        let stderr_layer = layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed();
        return (stderr_layer, None);
    };

    let (dir, prefix) = split_log_path(Path::new(&log_path));
    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(3)
        .build(&dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("cannot open log file in {dir}: {e}, logging to stderr");
            let stderr_layer = layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .boxed();
            return (stderr_layer, None);
        }
    };
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .boxed();
    (file_layer, Some(guard))
}

fn split_log_path(path: &Path) -> (String, String) {
    if path.is_dir() {
        return (path.display().to_string(), DEFAULT_LOG_FILE.to_string());
    }
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
    (dir.display().to_string(), file)
}

/// initiate the global tracing subscriber
pub fn init(log_path: Option<String>) -> Option<WorkerGuard> {
    let env_filter = filter::EnvFilter::builder()
        .with_default_directive(filter::LevelFilter::INFO.into())
        .from_env_lossy();

    let (fmt_layer, guard) = get_fmt_layer::<Registry>(log_path);

    registry().with(fmt_layer.with_filter(env_filter)).init();
    guard
}

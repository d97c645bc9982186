//! provides logging helpers

use std::env;

use utils::logging::WorkerGuard;
use utils::logging::LOG_PATH_ENV_VAR;

/// initiate the global tracing subscriber
///
/// Logs go to stderr unless `MPI_BRINGUP_LOG_PATH` names a log file; the
/// returned guard flushes that file when dropped.
pub fn init() -> Option<WorkerGuard> {
    let log_path = env::var(LOG_PATH_ENV_VAR).ok();
    utils::logging::init(log_path)
}

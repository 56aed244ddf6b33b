use flexi_logger::{Logger, LoggerHandle};
use log::info;
use once_cell::sync::OnceCell;

const DEFAULT_LEVEL: &str = "info";

static TEST_LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

/// Installs a stderr logger once per process.
///
/// The level is read from `RUST_LOG` and falls back to `info`. Later calls
/// are no-ops.
pub fn init_test_logging() -> Result<(), String> {
    TEST_LOGGER.get_or_try_init(|| -> Result<LoggerHandle, String> {
        let handle = Logger::try_with_env_or_str(DEFAULT_LEVEL)
            .map_err(|err| format!("invalid log level spec: {err}"))?
            .log_to_stderr()
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;
        info!("event=test_logging_init module=harness status=ok level={DEFAULT_LEVEL}");
        Ok(handle)
    })?;
    Ok(())
}

use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

/// Where `share-search` keeps its log files, next to the default database.
pub fn default_log_dir() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("telegram-share-search");
    path.push("logs");
    path
}

/// Start file logging. Debug builds log at `RUST_LOG` (default `debug`) and
/// mirror to stderr; stdout stays free for result lines. Release builds keep
/// errors only, in three rotated 10 MB files.
///
/// Buffered lines are flushed when the returned handle drops.
pub fn init(log_dir: &Path) -> Result<LoggerHandle, flexi_logger::FlexiLoggerError> {
    let files = FileSpec::default()
        .directory(log_dir)
        .basename("share-search");

    let logger = if cfg!(debug_assertions) {
        Logger::try_with_env_or_str("debug")?
            .log_to_file(files)
            .duplicate_to_stderr(Duplicate::All)
    } else {
        Logger::try_with_str("error")?.log_to_file(files).rotate(
            Criterion::Size(10_000_000),
            Naming::Numbers,
            Cleanup::KeepLogFiles(3),
        )
    };

    logger.write_mode(WriteMode::BufferAndFlush).start()
}

use std::path::PathBuf;

use flexi_logger::{Age, Cleanup, Criterion, FileSpec, Logger, Naming};
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<()> = OnceCell::new();

/// Log to rotated files under `logs/`. The console stays reserved for
/// prompts and progress output.
pub fn init() -> anyhow::Result<()> {
    LOGGER.get_or_try_init(|| -> anyhow::Result<()> {
        let log_dir = log_dir();
        std::fs::create_dir_all(&log_dir)?;
        Logger::try_with_env_or_str("info")?
            .log_to_file(
                FileSpec::default()
                    .directory(&log_dir)
                    .basename("pdf2audio")
                    .suffix("log"),
            )
            .rotate(
                Criterion::AgeOrSize(Age::Day, 5_000_000),
                Naming::Numbers,
                Cleanup::KeepLogFiles(5),
            )
            .start()?;
        Ok(())
    })?;
    Ok(())
}

fn log_dir() -> PathBuf {
    PathBuf::from("logs")
}

use std::{fs::File, path::Path};

use anyhow::Context;
use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;

/// Where log records go.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

/// Installs the global logger.
///
/// `filter` uses the `RUST_LOG` syntax (e.g. `info` or `dragontris_engine=debug`).
pub fn init(target: LogTarget<'_>, filter: &str) -> anyhow::Result<()> {
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Warn).parse_filters(filter);
    match target {
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
        }
        LogTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            builder
                .target(Target::Pipe(Box::new(file)))
                .write_style(WriteStyle::Never);
        }
    }
    builder.try_init().context("Failed to install logger")?;
    Ok(())
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Failed to read log file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Root process {0:?} is not a node of the process graph")]
    RootNotFound(String),

    /// A record does not carry a column the reconciler needs
    #[error("Missing column {column:?} in {source_log} log record #{index}")]
    MissingColumn {
        column: String,
        source_log: LogSource,
        index: usize,
    },

    #[error("Empty {column} in {source_log} log record #{index}")]
    EmptyIdentifier {
        column: String,
        source_log: LogSource,
        index: usize,
    },
}

/// Which of the two trace logs a record comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Init,
    Trace,
}

impl std::fmt::Display for LogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogSource::Init => write!(f, "init"),
            LogSource::Trace => write!(f, "trace"),
        }
    }
}

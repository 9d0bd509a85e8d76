//! Session execution modes

use std::fmt;

/// How submitted commands are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionMode {
    /// Send each command and read its reply right away
    #[default]
    Normal,

    /// Send each command right away, the remote side queues it until commit
    Transaction,

    /// Buffer commands locally and send them as one batch on exec
    Pipeline,
}

impl SessionMode {
    /// Whether commands are being collected for a later exec
    pub fn is_batching(&self) -> bool {
        !matches!(self, SessionMode::Normal)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionMode::Normal => "normal",
            SessionMode::Transaction => "transaction",
            SessionMode::Pipeline => "pipeline",
        };
        f.write_str(name)
    }
}

use tokio::sync::oneshot;

use super::data::{PathOpt, StrOpt, USizeOpt};
use crate::{ArcPath, ArcStr, log::LogLevel};

/// Messages that can be sent to the configuration actor.
#[derive(Debug)]
pub enum Message {
    /// Load configuration from file
    Load {
        tx: oneshot::Sender<anyhow::Result<()>>,
    },
    /// Save configuration to file
    Save {
        tx: oneshot::Sender<anyhow::Result<()>>,
    },
    GetPath {
        opt: PathOpt,
        tx: oneshot::Sender<ArcPath>,
    },
    SetPath {
        opt: PathOpt,
        path: ArcPath,
    },
    GetStr {
        opt: StrOpt,
        tx: oneshot::Sender<ArcStr>,
    },
    SetStr {
        opt: StrOpt,
        value: ArcStr,
    },
    GetLogLevel {
        tx: oneshot::Sender<LogLevel>,
    },
    SetLogLevel {
        level: LogLevel,
    },
    GetUSize {
        opt: USizeOpt,
        tx: oneshot::Sender<usize>,
    },
    SetUSize {
        opt: USizeOpt,
        value: usize,
    },
}

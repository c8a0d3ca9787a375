use std::{fs::Metadata, io};

use tokio::{fs::File, sync::oneshot};

use crate::ArcPath;

/// How a file should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read only, the file must exist
    Read,
    /// Write from the start, creating and truncating
    Write,
    /// Write at the end, creating if needed
    Append,
}

/// Messages that can be sent to the filesystem actor.
#[derive(Debug)]
pub enum Message {
    /// Opens a file with the given mode
    Open {
        path: ArcPath,
        mode: OpenMode,
        tx: oneshot::Sender<io::Result<File>>,
    },
    /// Creates a directory and its parents
    MkDir {
        path: ArcPath,
        tx: oneshot::Sender<io::Result<()>>,
    },
    /// Lists the entries of a directory
    ReadDir {
        path: ArcPath,
        tx: oneshot::Sender<io::Result<Vec<ArcPath>>>,
    },
    /// Removes a file
    RemoveFile {
        path: ArcPath,
        tx: oneshot::Sender<io::Result<()>>,
    },
    /// Reads the metadata of a file or directory
    Metadata {
        path: ArcPath,
        tx: oneshot::Sender<io::Result<Metadata>>,
    },
    /// Checks whether a path exists
    Exists {
        path: ArcPath,
        tx: oneshot::Sender<bool>,
    },
}

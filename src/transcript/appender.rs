//! Append-only transcript writer
//!
//! Every call creates the log directory if needed, opens the file in
//! create-or-append mode and writes exactly one line. Writers are serialized
//! so concurrent callers never interleave partial lines.

use log::debug;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::TranscriptError;

pub struct LogAppender {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LogAppender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `line` followed by a newline.
    ///
    /// Trailing line terminators already present in `line` are stripped so one
    /// call always produces one line in the file.
    pub async fn append(&self, line: &str) -> Result<(), TranscriptError> {
        let _guard = self.write_lock.lock().await;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| TranscriptError::CreateDir(dir.to_path_buf(), e))?;
        }

        let mut record = line.trim_end_matches(['\r', '\n']).to_string();
        record.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| TranscriptError::Write(self.path.clone(), e))?;

        file.write_all(record.as_bytes())
            .await
            .map_err(|e| TranscriptError::Write(self.path.clone(), e))?;
        file.flush()
            .await
            .map_err(|e| TranscriptError::Write(self.path.clone(), e))?;

        debug!("Appended {} bytes to {}", record.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn creates_directory_and_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log").join("file.log");
        let appender = LogAppender::new(&path);

        appender.append("first").await.unwrap();
        appender.append("second\n").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[tokio::test]
    async fn keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.log");
        std::fs::write(&path, "already here\n").unwrap();

        LogAppender::new(&path).append("new entry").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "already here\nnew entry\n");
    }

    #[tokio::test]
    async fn concurrent_appends_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.log");
        let appender = Arc::new(LogAppender::new(&path));

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..32 {
            let appender = Arc::clone(&appender);
            tasks.spawn(async move { appender.append(&format!("line-{i:02}")).await });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 32);
        lines.sort();
        assert_eq!(lines[0], "line-00");
        assert_eq!(lines[31], "line-31");
    }

    #[tokio::test]
    async fn reports_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("log");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = LogAppender::new(blocker.join("file.log"))
            .append("entry")
            .await
            .unwrap_err();
        assert!(matches!(err, TranscriptError::CreateDir(_, _)));
    }
}

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::application::TranscriptLog;
use crate::domain::{DomainError, Sender};

/// Plaintext transcript, one `timestamp role: text` line per entry.
///
/// No redaction, size bound or rotation is applied.
pub struct FileTranscriptLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileTranscriptLog {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Formats one transcript line. Line breaks inside `text` are escaped so an
/// entry never spans lines.
pub fn format_transcript_line(timestamp: DateTime<Utc>, role: Sender, text: &str) -> String {
    let escaped = text.replace('\r', "\\r").replace('\n', "\\n");
    format!(
        "{} {}: {}\n",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        role,
        escaped
    )
}

#[async_trait]
impl TranscriptLog for FileTranscriptLog {
    async fn append(&self, role: Sender, text: &str) -> Result<(), DomainError> {
        let line = format_transcript_line(Utc::now(), role, text);
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

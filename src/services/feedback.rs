use chrono::{DateTime, Local};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::{
    error::{AppError, AppResult},
    models::{Feedback, FeedbackReceipt, MAX_RATING},
};

const FILE_PREFIX: &str = "commentaire_";

/// Stores visitor comments as one text file per comment
#[derive(Debug, Clone)]
pub struct CommentStore {
    dir: PathBuf,
}

impl CommentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validates and stores feedback, naming the file after the current time
    pub async fn save(&self, feedback: &Feedback) -> AppResult<FeedbackReceipt> {
        self.save_at(feedback, Local::now()).await
    }

    /// Stores feedback as `commentaire_<YYYYMMDDHHMMSS>.txt`
    ///
    /// A second comment within the same second gets a `_<n>` suffix instead
    /// of overwriting the first one.
    pub async fn save_at(
        &self,
        feedback: &Feedback,
        at: DateTime<Local>,
    ) -> AppResult<FeedbackReceipt> {
        validate(feedback)?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let stem = format!("{}{}", FILE_PREFIX, at.format("%Y%m%d%H%M%S"));
        let mut attempt = 0u32;

        loop {
            let file_name = match attempt {
                0 => format!("{}.txt", stem),
                n => format!("{}_{}.txt", stem, n),
            };
            let path = self.dir.join(&file_name);

            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match opened {
                Ok(mut file) => {
                    file.write_all(feedback.comment.as_bytes()).await?;
                    file.flush().await?;

                    tracing::info!(
                        file = %file_name,
                        rating = feedback.rating,
                        "Comment saved"
                    );

                    return Ok(FeedbackReceipt {
                        file_name,
                        rating: feedback.rating,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn validate(feedback: &Feedback) -> AppResult<()> {
    if !(0..=MAX_RATING).contains(&feedback.rating) {
        return Err(AppError::InvalidInput(format!(
            "Rating must be between 0 and {}",
            MAX_RATING
        )));
    }

    if feedback.comment.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Comment cannot be empty".to_string(),
        ));
    }

    Ok(())
}

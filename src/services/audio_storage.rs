use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::error::Result;

pub const AUDIO_SUBDIR: &str = "practice_audio";
const HASH_PREFIX_LEN: usize = 12;

/// Writes practice recordings under `<media_root>/practice_audio/`.
#[derive(Clone, Debug)]
pub struct AudioStorage {
    media_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAudio {
    /// Path relative to the media root, always `/`-separated.
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

impl AudioStorage {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    /// `user{uid}_q{qid}_{sha256 prefix}_{filename}`. The content hash keeps
    /// two different uploads with the same original name apart.
    pub fn file_name_for(user_id: i64, question_id: i64, original_name: &str, data: &[u8]) -> String {
        let digest = hex::encode(Sha256::digest(data));
        format!(
            "user{}_q{}_{}_{}",
            user_id,
            question_id,
            &digest[..HASH_PREFIX_LEN],
            sanitize_file_name(original_name)
        )
    }

    pub fn locate(&self, user_id: i64, question_id: i64, original_name: &str, data: &[u8]) -> StoredAudio {
        let file_name = Self::file_name_for(user_id, question_id, original_name, data);
        StoredAudio {
            relative_path: format!("{}/{}", AUDIO_SUBDIR, file_name),
            absolute_path: self.media_root.join(AUDIO_SUBDIR).join(file_name),
        }
    }

    pub async fn save(
        &self,
        user_id: i64,
        question_id: i64,
        original_name: &str,
        data: &[u8],
    ) -> Result<StoredAudio> {
        let stored = self.locate(user_id, question_id, original_name, data);
        tokio::fs::create_dir_all(self.media_root.join(AUDIO_SUBDIR)).await?;
        tokio::fs::write(&stored.absolute_path, data).await?;
        tracing::info!(
            path = %stored.absolute_path.display(),
            bytes = data.len(),
            "stored practice audio"
        );
        Ok(stored)
    }
}

/// Keeps the last path component and replaces anything outside
/// `[A-Za-z0-9._-]`, so a client-supplied name cannot escape the directory.
fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "audio".to_string()
    } else {
        cleaned.to_string()
    }
}

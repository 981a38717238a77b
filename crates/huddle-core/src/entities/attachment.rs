//! Attachment - a file reference carried by a message

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::FileId;

/// Largest accepted attachment (10 MiB)
pub const MAX_FILE_SIZE: i64 = 10 * 1024 * 1024;

pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Attachment value object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    file_id: FileId,
    file_name: String,
    file_size: i64,
    mime_type: String,
}

impl Attachment {
    /// Create a new Attachment
    pub fn new(
        file_id: FileId,
        file_name: impl Into<String>,
        file_size: i64,
        mime_type: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let file_name = file_name.into();
        let mime_type = mime_type.into();

        if file_name.trim().is_empty() || file_name.chars().count() > MAX_FILE_NAME_LENGTH {
            return Err(DomainError::InvalidFileName);
        }
        if file_size <= 0 || file_size > MAX_FILE_SIZE {
            return Err(DomainError::InvalidFileSize { max: MAX_FILE_SIZE });
        }
        if mime_type.trim().is_empty() || !mime_type.contains('/') {
            return Err(DomainError::InvalidMimeType);
        }

        Ok(Self {
            file_id,
            file_name,
            file_size,
            mime_type,
        })
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_size(&self) -> i64 {
        self.file_size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

use serde::Serialize;

use super::VersionRecord;
use crate::status::{Candidate, Status};
use crate::uri::Extension;

/// A version that transcribes a single manuscript.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscriptionRecord {
    pub uri: String,
    pub manuscript: String,
    pub book_uri: String,
    pub tok_length: u64,
    pub extension: Extension,
    pub status: Status,
}

impl TranscriptionRecord {
    pub fn candidate(&self, version: &VersionRecord, low_priority: bool) -> Candidate {
        Candidate {
            uri: self.uri.clone(),
            extension: self.extension,
            length: self.tok_length,
            declared_primary: version.declared_primary,
            low_priority,
            file_present: version.text_path.is_some(),
        }
    }
}

/// `None` unless the version names a manuscript.
pub fn extract_transcription(version: &VersionRecord) -> Option<TranscriptionRecord> {
    let manuscript = version.manuscript.as_ref()?;
    Some(TranscriptionRecord {
        uri: version.uri.clone(),
        manuscript: manuscript.clone(),
        book_uri: version.book_uri.clone(),
        tok_length: version.tok_length,
        extension: version.extension,
        status: Status::Secondary,
    })
}

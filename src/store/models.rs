//! Document models for the store layer.
//!
//! These types mirror the documents held by the external store, using the
//! store's field names on the wire. They are kept apart from the domain
//! [`FileRecord`] so the cache never depends on the wire representation.

use crate::domain::error::{DriveError, Result};
use crate::domain::FileRecord;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Fields of a file document as written to the store.
///
/// `timestamp` is assigned by the store on create (milliseconds since the Unix
/// epoch). Clients always send `None`, which stands for "server timestamp".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFields {
    pub name: String,

    #[serde(rename = "type")]
    pub mime_type: String,

    pub size: u64,

    /// Encoded payload (`data:<mime>;base64,...`).
    pub data: String,

    /// Upload instant as ISO-8601 text.
    #[serde(rename = "uploadDate")]
    pub upload_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl DocumentFields {
    /// Builds the metadata record for a freshly encoded upload.
    ///
    /// The upload date is rendered like JavaScript's `toISOString`
    /// (`2024-01-05T10:00:00.000Z`) and the timestamp is left for the store.
    #[must_use]
    pub fn for_upload(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        data: String,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            data,
            upload_date: uploaded_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            timestamp: None,
        }
    }
}

/// A stored document: store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: DocumentFields,
}

impl Document {
    /// Converts the document into the cached domain record.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Store`] if `uploadDate` is not valid ISO-8601 or
    /// the timestamp is out of range.
    pub fn to_file_record(&self) -> Result<FileRecord> {
        let upload_date = DateTime::parse_from_rfc3339(&self.fields.upload_date)
            .map_err(|e| {
                DriveError::Store(format!("document {} has invalid uploadDate: {e}", self.id))
            })?
            .with_timezone(&Utc);

        let timestamp = match self.fields.timestamp {
            Some(millis) => Some(Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
                DriveError::Store(format!("document {} has invalid timestamp {millis}", self.id))
            })?),
            None => None,
        };

        Ok(FileRecord {
            id: self.id.clone(),
            name: self.fields.name.clone(),
            mime_type: self.fields.mime_type.clone(),
            size: self.fields.size,
            upload_date,
            data: self.fields.data.clone(),
            timestamp,
        })
    }
}

/// One delivery on a collection subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotEvent {
    /// The full collection, ordered by timestamp descending.
    Documents(Vec<Document>),

    /// The stream failed; no further snapshots should be expected.
    Failed(String),
}

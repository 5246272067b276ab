//! JSON metadata files stored next to the media they describe.
//!
//! Sidecars are owned by whoever edits the media directory. They are read on
//! every pass and only ever created, never rewritten.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::warn;

pub const COLLECTION_SIDECAR_FILE_NAME: &str = "metadata.json";
pub const SIDECAR_EXTENSION: &str = "json";

/// Documented keys of a collection's `metadata.json`.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct CollectionSidecar {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Documented keys of an episode's `<stem>.json`.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct EpisodeSidecar {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, with = "iso8601", skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Outcome of looking up a sidecar on disk.
#[derive(Debug, PartialEq)]
pub enum SidecarRead<T> {
    Absent,
    /// The file exists but could not be read or parsed.
    Corrupt(String),
    Present(T),
}

impl<T> SidecarRead<T> {
    pub fn exists(&self) -> bool {
        !matches!(self, SidecarRead::Absent)
    }

    pub fn into_present(self) -> Option<T> {
        match self {
            SidecarRead::Present(value) => Some(value),
            _ => None,
        }
    }
}

pub fn read_sidecar<T: DeserializeOwned>(path: &Path) -> SidecarRead<T> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return SidecarRead::Absent,
        Err(err) => return SidecarRead::Corrupt(format!("could not read file: {}", err)),
    };
    match serde_json::from_str(&text) {
        Ok(value) => SidecarRead::Present(value),
        Err(err) => SidecarRead::Corrupt(err.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Created,
    /// Someone else created the file first, it was left untouched.
    AlreadyExists,
}

/// Creates `path` with the pretty-printed JSON of `value`.
///
/// An existing file is never opened for writing.
pub fn create_sidecar<T: Serialize>(path: &Path, value: &T) -> io::Result<PersistOutcome> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Ok(PersistOutcome::AlreadyExists)
        }
        Err(err) => return Err(err),
    };

    if let Err(err) = file.write_all(json.as_bytes()).and_then(|_| file.sync_all()) {
        // A truncated sidecar would read as corrupt forever.
        drop(file);
        discard_partial(path);
        return Err(err);
    }
    Ok(PersistOutcome::Created)
}

/// Removes a sidecar whose write failed halfway. Returns whether it is gone.
fn discard_partial(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(err) if err.kind() == io::ErrorKind::NotFound => true,
        Err(err) => {
            warn!(
                "Could not remove partial sidecar {}, it will read as corrupt: {}",
                path.display(),
                err
            );
            false
        }
    }
}

/// Parses the timestamp formats accepted in `publication_date`.
///
/// RFC 3339 is what gets written. The space separated form and naive
/// timestamps (taken as UTC) are accepted for hand edited files.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

mod iso8601 {
    use super::parse_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            parse_timestamp(&s)
                .ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 timestamp {:?}", s)))
        })
        .transpose()
    }
}

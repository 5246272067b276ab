use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub name: String,
}

impl Author {
    pub fn new<S: Into<String>>(name: S) -> Author {
        Author { name: name.into() }
    }

    pub fn from_names(names: &[String]) -> Vec<Author> {
        names.iter().map(|name| Author::new(name.as_str())).collect()
    }

    pub fn names(authors: &[Author]) -> Vec<String> {
        authors.iter().map(|a| a.name.clone()).collect()
    }
}

/// Playable media of an episode, always computed from the file on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
    pub size_bytes: u64,
    /// `None` when the audio stream could not be probed.
    pub duration: Option<Duration>,
}

impl MediaRef {
    pub const MIME_TYPE: &'static str = "audio/mpeg";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    pub description: String,
    pub website: String,
    pub language: String,
    pub explicit: bool,
    pub complete: bool,
    pub feed_url: String,
    pub image: Option<String>,
    pub authors: Vec<Author>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Episode {
    pub title: String,
    pub summary: String,
    pub link: Option<String>,
    pub authors: Vec<Author>,
    pub publication_date: DateTime<Utc>,
    pub media: MediaRef,
    pub image: Option<String>,
}

/// A collection together with the episodes discovered under its directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feed {
    pub collection: Collection,
    pub episodes: Vec<Episode>,
}

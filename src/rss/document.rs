//! RSS 2.0 document with the iTunes podcast extensions, shaped for
//! `quick_xml`'s serde serializer (`@name` fields become attributes).

use crate::feed::{Author, Collection, Episode, Feed, MediaRef};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

const RSS_VERSION: &str = "2.0";
const ITUNES_NAMESPACE: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
const GENERATOR: &str = concat!("podcast-feed-server ", env!("CARGO_PKG_VERSION"));
const DOCS: &str = "http://www.rssboard.org/rss-specification";

#[derive(Serialize, Debug)]
#[serde(rename = "rss")]
pub struct RssDocument {
    #[serde(rename = "@version")]
    pub version: &'static str,

    #[serde(rename = "@xmlns:itunes")]
    pub xmlns_itunes: &'static str,

    #[serde(rename = "@xmlns:atom")]
    pub xmlns_atom: &'static str,

    pub channel: Channel,
}

#[derive(Serialize, Debug)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,

    #[serde(rename = "atom:link")]
    pub atom_link: AtomLink,

    #[serde(rename = "itunes:author", skip_serializing_if = "Option::is_none")]
    pub itunes_author: Option<String>,

    #[serde(rename = "itunes:explicit")]
    pub itunes_explicit: &'static str,

    /// Only present when the podcast will never be updated again.
    #[serde(rename = "itunes:complete", skip_serializing_if = "Option::is_none")]
    pub itunes_complete: Option<&'static str>,

    #[serde(rename = "itunes:image", skip_serializing_if = "Option::is_none")]
    pub itunes_image: Option<ItunesImage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ChannelImage>,

    #[serde(rename = "lastBuildDate")]
    pub last_build_date: String,

    pub generator: &'static str,
    pub docs: &'static str,

    #[serde(rename = "item")]
    pub items: Vec<Item>,
}

#[derive(Serialize, Debug)]
pub struct AtomLink {
    #[serde(rename = "@href")]
    pub href: String,
    #[serde(rename = "@rel")]
    pub rel: &'static str,
    #[serde(rename = "@type")]
    pub mime_type: &'static str,
}

#[derive(Serialize, Debug)]
pub struct ItunesImage {
    #[serde(rename = "@href")]
    pub href: String,
}

#[derive(Serialize, Debug)]
pub struct ChannelImage {
    pub url: String,
    pub title: String,
    pub link: String,
}

#[derive(Serialize, Debug)]
pub struct Item {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    pub description: String,

    #[serde(rename = "itunes:author", skip_serializing_if = "Option::is_none")]
    pub itunes_author: Option<String>,

    #[serde(rename = "pubDate")]
    pub pub_date: String,

    pub enclosure: Enclosure,
    pub guid: Guid,

    #[serde(rename = "itunes:duration", skip_serializing_if = "Option::is_none")]
    pub itunes_duration: Option<String>,

    #[serde(rename = "itunes:image", skip_serializing_if = "Option::is_none")]
    pub itunes_image: Option<ItunesImage>,
}

#[derive(Serialize, Debug)]
pub struct Enclosure {
    #[serde(rename = "@url")]
    pub url: String,
    #[serde(rename = "@length")]
    pub length: u64,
    #[serde(rename = "@type")]
    pub mime_type: &'static str,
}

#[derive(Serialize, Debug)]
pub struct Guid {
    #[serde(rename = "@isPermaLink")]
    pub is_perma_link: &'static str,
    #[serde(rename = "$text")]
    pub value: String,
}

fn joined_names(authors: &[Author]) -> Option<String> {
    if authors.is_empty() {
        return None;
    }
    Some(Author::names(authors).join(", "))
}

/// `HH:MM:SS`, hours are not capped at 24.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

impl RssDocument {
    pub fn new(feed: &Feed, built_at: DateTime<Utc>) -> RssDocument {
        RssDocument {
            version: RSS_VERSION,
            xmlns_itunes: ITUNES_NAMESPACE,
            xmlns_atom: ATOM_NAMESPACE,
            channel: Channel::new(&feed.collection, &feed.episodes, built_at),
        }
    }
}

impl Channel {
    fn new(collection: &Collection, episodes: &[Episode], built_at: DateTime<Utc>) -> Channel {
        Channel {
            title: collection.name.clone(),
            link: collection.website.clone(),
            description: collection.description.clone(),
            language: collection.language.clone(),
            atom_link: AtomLink {
                href: collection.feed_url.clone(),
                rel: "self",
                mime_type: "application/rss+xml",
            },
            itunes_author: joined_names(&collection.authors),
            itunes_explicit: if collection.explicit { "true" } else { "false" },
            itunes_complete: collection.complete.then_some("Yes"),
            itunes_image: collection.image.clone().map(|href| ItunesImage { href }),
            image: collection.image.clone().map(|url| ChannelImage {
                url,
                title: collection.name.clone(),
                link: collection.website.clone(),
            }),
            last_build_date: built_at.to_rfc2822(),
            generator: GENERATOR,
            docs: DOCS,
            items: episodes.iter().map(Item::from).collect(),
        }
    }
}

impl From<&Episode> for Item {
    fn from(episode: &Episode) -> Item {
        let MediaRef {
            url,
            size_bytes,
            duration,
        } = &episode.media;
        Item {
            title: episode.title.clone(),
            link: episode.link.clone(),
            description: episode.summary.clone(),
            itunes_author: joined_names(&episode.authors),
            pub_date: episode.publication_date.to_rfc2822(),
            enclosure: Enclosure {
                url: url.clone(),
                length: *size_bytes,
                mime_type: MediaRef::MIME_TYPE,
            },
            guid: Guid {
                is_perma_link: "false",
                value: url.clone(),
            },
            itunes_duration: duration.map(format_duration),
            itunes_image: episode.image.clone().map(|href| ItunesImage { href }),
        }
    }
}

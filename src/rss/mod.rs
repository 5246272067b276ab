//! Renders a [`Feed`] as an RSS document.

mod document;

pub use document::{format_duration, RssDocument};

use crate::feed::Feed;
use chrono::{DateTime, Utc};
use quick_xml::se::SeError;
use serde::Serialize;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

pub fn render_feed(feed: &Feed) -> Result<String, SeError> {
    render_feed_at(feed, Utc::now())
}

pub fn render_feed_at(feed: &Feed, built_at: DateTime<Utc>) -> Result<String, SeError> {
    let document = RssDocument::new(feed, built_at);

    let mut xml = String::from(XML_DECLARATION);
    let mut serializer = quick_xml::se::Serializer::new(&mut xml);
    serializer.indent(' ', 2);
    document.serialize(serializer)?;
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Author, Collection, Episode, MediaRef};
    use chrono::TimeZone;
    use std::time::Duration;

    fn collection() -> Collection {
        Collection {
            name: "Test Archive".to_string(),
            description: "Stuff to listen to later".to_string(),
            website: "http://localhost:9111".to_string(),
            language: "en-US".to_string(),
            explicit: false,
            complete: false,
            feed_url: "http://localhost:9111/feeds/Test/rss".to_string(),
            image: None,
            authors: vec![Author::new("Anthology")],
        }
    }

    fn episode(title: &str) -> Episode {
        Episode {
            title: title.to_string(),
            summary: "Some Summary".to_string(),
            link: None,
            authors: vec![Author::new("Anthology")],
            publication_date: Utc.with_ymd_and_hms(2021, 1, 2, 3, 4, 5).unwrap(),
            media: MediaRef {
                url: "http://localhost:9111/Test/My+Episode.mp3".to_string(),
                size_bytes: 1234,
                duration: Some(Duration::from_secs(3723)),
            },
            image: None,
        }
    }

    fn render(feed: &Feed) -> String {
        render_feed_at(feed, Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn renders_channel_and_items() {
        let feed = Feed {
            collection: collection(),
            episodes: vec![episode("First"), episode("Second")],
        };

        let xml = render(&feed);

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<rss version=\"2.0\""));
        assert!(xml.contains("<title>Test Archive</title>"));
        assert!(xml.contains("<language>en-US</language>"));
        assert!(xml.contains("href=\"http://localhost:9111/feeds/Test/rss\""));
        assert!(xml.contains("<itunes:explicit>false</itunes:explicit>"));
        assert!(!xml.contains("itunes:complete"));
        assert!(xml.contains("Jan 2022 00:00:00 +0000</lastBuildDate>"));
        assert_eq!(xml.matches("<item>").count(), 2);
        assert!(xml.contains("<title>First</title>"));
        assert!(xml.contains("url=\"http://localhost:9111/Test/My+Episode.mp3\""));
        assert!(xml.contains("length=\"1234\""));
        assert!(xml.contains("type=\"audio/mpeg\""));
        assert!(xml.contains("Jan 2021 03:04:05 +0000</pubDate>"));
        assert!(xml.contains("<itunes:duration>01:02:03</itunes:duration>"));
        assert!(xml.contains("<itunes:author>Anthology</itunes:author>"));
    }

    #[test]
    fn omits_missing_images_link_and_duration() {
        let mut ep = episode("Plain");
        ep.media.duration = None;
        let feed = Feed {
            collection: collection(),
            episodes: vec![ep],
        };

        let xml = render(&feed);

        assert!(!xml.contains("itunes:image"));
        assert!(!xml.contains("<image>"));
        assert!(!xml.contains("<link>http://example"));
        assert!(!xml.contains("itunes:duration"));
    }

    #[test]
    fn renders_images_and_flags_when_present() {
        let mut c = collection();
        c.image = Some("http://localhost:9111/Test/Test.jpg".to_string());
        c.explicit = true;
        c.complete = true;
        let mut ep = episode("Pic");
        ep.image = Some("http://localhost:9111/Test/Pic.png".to_string());
        ep.link = Some("http://example.com/pic".to_string());
        let feed = Feed {
            collection: c,
            episodes: vec![ep],
        };

        let xml = render(&feed);

        assert!(xml.contains("href=\"http://localhost:9111/Test/Test.jpg\""));
        assert!(xml.contains("<url>http://localhost:9111/Test/Test.jpg</url>"));
        assert!(xml.contains("href=\"http://localhost:9111/Test/Pic.png\""));
        assert!(xml.contains("<link>http://example.com/pic</link>"));
        assert!(xml.contains("<itunes:explicit>true</itunes:explicit>"));
        assert!(xml.contains("<itunes:complete>Yes</itunes:complete>"));
    }

    #[test]
    fn escapes_text() {
        let feed = Feed {
            collection: collection(),
            episodes: vec![episode("Q&A <live>")],
        };

        let xml = render(&feed);

        assert!(xml.contains("Q&amp;A &lt;live"));
        assert!(!xml.contains("<live>"));
    }

    #[test]
    fn empty_feed_has_no_items() {
        let feed = Feed {
            collection: collection(),
            episodes: vec![],
        };

        let xml = render(&feed);

        assert!(!xml.contains("<item>"));
        assert!(xml.contains("</channel>"));
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_duration(Duration::from_secs(59)), "00:00:59");
        assert_eq!(format_duration(Duration::from_secs(90_061)), "25:01:01");
    }
}

use chrono::{DateTime, Utc};
use quick_xml::events::BytesStart;

use super::xml::{xml_chars, XmlWriter};
use super::{EmitError, Emitter, OutputFormat};
use crate::feed::Feed;

/// Re-serializes the upstream channel as RSS 2.0 with the enriched item
/// descriptions.
///
/// Channel fields are written back as they arrived; optional ones are only
/// written when upstream had them. The generation timestamp is not used, so
/// RSS output depends on the feed alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct RssEmitter;

impl Emitter for RssEmitter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Rss
    }

    fn default_file_name(&self) -> &'static str {
        "feed.rss"
    }

    fn render(&self, feed: &Feed, _generated_at: DateTime<Utc>) -> Result<String, EmitError> {
        let mut xml = XmlWriter::new(OutputFormat::Rss);
        xml.declaration()?;

        let mut rss = BytesStart::new("rss");
        let version = xml_chars(feed.version.as_deref().unwrap_or("2.0"));
        rss.push_attribute(("version", version.as_ref()));
        xml.start(rss)?;
        xml.start(BytesStart::new("channel"))?;

        xml.text_element("title", &feed.title)?;
        xml.text_element("link", &feed.link)?;
        xml.text_element("description", &feed.description)?;
        if let Some(last_build_date) = &feed.last_build_date {
            xml.text_element("lastBuildDate", last_build_date)?;
        }
        if let Some(docs) = &feed.docs {
            xml.text_element("docs", docs)?;
        }
        if let Some(language) = &feed.language {
            xml.text_element("language", language)?;
        }

        for item in &feed.items {
            xml.start(BytesStart::new("item"))?;
            xml.text_element("title", &item.title)?;
            xml.text_element("link", &item.link)?;
            xml.text_element("description", &item.description)?;
            xml.end("item")?;
        }

        xml.end("channel")?;
        xml.end("rss")?;
        xml.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{parse_feed, Item};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn enriched_feed() -> Feed {
        Feed {
            title: "Feissarimokat".to_string(),
            link: "https://www.feissarimokat.com/".to_string(),
            description: "Hauskoja kuvia".to_string(),
            version: Some("2.0".to_string()),
            last_build_date: Some("Sat, 17 Oct 2026 08:00:00 +0300".to_string()),
            docs: None,
            language: Some("fi".to_string()),
            items: vec![
                Item::new(
                    "Kissa & koira",
                    "https://www.feissarimokat.com/kissa/",
                    "<p>Kissa</p>\n\n<img src=\"https://static.feissarimokat.com/img/1.jpg\" alt=\"Kissa & koira\">\n",
                ),
                Item::new("Tyhjä", "https://www.feissarimokat.com/tyhja/", "\n\n"),
            ],
        }
    }

    #[test]
    fn test_render_document_shape() {
        let feed = Feed {
            title: "T".to_string(),
            link: "https://example.com/".to_string(),
            description: "D".to_string(),
            items: vec![Item::new("A", "https://example.com/a", "<b>x</b>\n\n")],
            ..Feed::default()
        };

        let rendered = RssEmitter.render(&feed, generated_at()).unwrap();
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>T</title>
    <link>https://example.com/</link>
    <description>D</description>
    <item>
      <title>A</title>
      <link>https://example.com/a</link>
      <description>&lt;b&gt;x&lt;/b&gt;

</description>
    </item>
  </channel>
</rss>
"#;
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_round_trip_preserves_items() {
        let feed = enriched_feed();
        let rendered = RssEmitter.render(&feed, generated_at()).unwrap();
        let reparsed = parse_feed(rendered.as_bytes()).unwrap();

        assert_eq!(reparsed, feed);
    }

    #[test]
    fn test_optional_channel_fields_only_when_present() {
        let rendered = RssEmitter.render(&enriched_feed(), generated_at()).unwrap();
        assert!(rendered.contains("<language>fi</language>"));
        assert!(rendered.contains("<lastBuildDate>"));
        assert!(!rendered.contains("<docs>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let feed = enriched_feed();
        let first = RssEmitter.render(&feed, generated_at()).unwrap();
        let later = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        let second = RssEmitter.render(&feed, later).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_independent_parser_reads_output() {
        let feed = enriched_feed();
        let rendered = RssEmitter.render(&feed, generated_at()).unwrap();

        let parsed = feed_rs::parser::parse(rendered.as_bytes()).unwrap();
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(
            parsed.entries[0].title.as_ref().map(|t| t.content.as_str()),
            Some("Kissa & koira")
        );
        assert_eq!(
            parsed.entries[0].links.first().map(|l| l.href.as_str()),
            Some("https://www.feissarimokat.com/kissa/")
        );
    }

    #[test]
    fn test_control_character_from_page_is_replaced() {
        let selector = crate::content::image_selector("div.postbody").unwrap();
        let images = crate::content::extract_image_urls(
            r#"<div class="postbody"><img src="/a&#1;b.jpg"></div>"#,
            &selector,
            "https://static.feissarimokat.com",
        );
        let item = Item::new("A", "https://example.com/a", "x");
        let feed = Feed {
            items: vec![Item {
                description: crate::content::enrich(&item, &images),
                ..item
            }],
            ..Feed::default()
        };

        let rendered = RssEmitter.render(&feed, generated_at()).unwrap();
        assert!(!rendered.contains('\u{1}'));
        assert!(rendered.contains("https://static.feissarimokat.com/a\u{FFFD}b.jpg"));
    }
}

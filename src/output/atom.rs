use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::BytesStart;

use super::xml::{xml_chars, XmlWriter};
use super::{EmitError, Emitter, OutputFormat};
use crate::feed::Feed;

const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Author name put on the generated feed.
pub const DEFAULT_AUTHOR: &str = "Feissarimokat";

/// Builds a fresh Atom 1.0 envelope around the enriched items.
///
/// Upstream items carry no dates, so every timestamp in the document is the
/// generation time. Entry IDs are the item links.
#[derive(Debug, Clone)]
pub struct AtomEmitter {
    author: String,
}

impl AtomEmitter {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
        }
    }
}

impl Default for AtomEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHOR)
    }
}

impl Emitter for AtomEmitter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Atom
    }

    fn default_file_name(&self) -> &'static str {
        "feed.xml"
    }

    fn render(&self, feed: &Feed, generated_at: DateTime<Utc>) -> Result<String, EmitError> {
        let timestamp = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut xml = XmlWriter::new(OutputFormat::Atom);
        xml.declaration()?;

        let mut root = BytesStart::new("feed");
        root.push_attribute(("xmlns", ATOM_NAMESPACE));
        xml.start(root)?;

        xml.text_element("title", &feed.title)?;
        xml.text_element("id", &feed.link)?;
        xml.text_element("updated", &timestamp)?;
        xml.text_element("subtitle", &feed.description)?;
        xml.empty(alternate_link(&feed.link))?;

        xml.start(BytesStart::new("author"))?;
        xml.text_element("name", &self.author)?;
        xml.end("author")?;

        for item in &feed.items {
            xml.start(BytesStart::new("entry"))?;
            xml.text_element("title", &item.title)?;
            xml.text_element("id", &item.link)?;
            xml.text_element("updated", &timestamp)?;
            xml.text_element("published", &timestamp)?;
            xml.empty(alternate_link(&item.link))?;

            let mut content = BytesStart::new("content");
            content.push_attribute(("type", "html"));
            xml.text_element_with(content, &item.description)?;

            xml.end("entry")?;
        }

        xml.end("feed")?;
        xml.finish()
    }
}

fn alternate_link(href: &str) -> BytesStart<'static> {
    let mut link = BytesStart::new("link");
    link.push_attribute(("href", xml_chars(href).as_ref()));
    link.push_attribute(("rel", "alternate"));
    link
}

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::types::{Feed, Item};

/// Errors that can occur while parsing an upstream RSS document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML was malformed at the given byte offset.
    #[error("XML parse error at position {position}: {message}")]
    Xml { position: u64, message: String },

    /// Well-formed XML, but not an RSS document.
    #[error("Document has no RSS <channel> element")]
    MissingChannel,
}

/// Where the reader currently is, relative to the elements we care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    Rss,
    Channel,
    Item,
}

/// Parses an RSS 2.0 document into a [`Feed`].
///
/// Only the `rss@version` attribute, the channel fields `title`, `link`,
/// `description`, `lastBuildDate`, `docs`, `language` and each item's `title`,
/// `link`, `description` are read. Everything else is skipped, including
/// namespaced lookalikes such as `<atom:link>`. Missing text fields default to
/// empty strings. Whitespace inside fields is preserved.
///
/// # Errors
///
/// - [`ParseError::Xml`] if the document is not well-formed XML, including a
///   document that ends with elements still open
/// - [`ParseError::MissingChannel`] if there is no `<rss><channel>` element
pub fn parse_feed(bytes: &[u8]) -> Result<Feed, ParseError> {
    // SEC-002: quick-xml (0.37) never expands <!ENTITY> declarations. Only the
    // five XML builtins are resolved by `unescape()`.
    let mut reader = Reader::from_reader(bytes);

    let mut feed = Feed::default();
    let mut seen_channel = false;
    let mut scope = Scope::Root;
    let mut current_item: Option<Item> = None;
    // Name and accumulated text of the field element we are inside, if any.
    let mut field: Option<(Vec<u8>, String)> = None;
    // Depth of unknown elements nested below the current scope or field.
    let mut skip_depth: usize = 0;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml_error(&reader, e))?;

        match event {
            Event::Start(e) => {
                if skip_depth > 0 || field.is_some() {
                    skip_depth += 1;
                } else {
                    match (scope, e.name().as_ref()) {
                        (Scope::Root, b"rss") => {
                            scope = Scope::Rss;
                            feed.version = read_version(&e, &reader)?;
                        }
                        (Scope::Rss, b"channel") => {
                            scope = Scope::Channel;
                            seen_channel = true;
                        }
                        (Scope::Channel, b"item") => {
                            scope = Scope::Item;
                            current_item = Some(Item::default());
                        }
                        (Scope::Channel, name) if is_channel_field(name) => {
                            field = Some((name.to_vec(), String::new()));
                        }
                        (Scope::Item, name) if is_item_field(name) => {
                            field = Some((name.to_vec(), String::new()));
                        }
                        _ => skip_depth += 1,
                    }
                }
            }
            Event::Empty(e) => {
                if skip_depth == 0 && field.is_none() {
                    match (scope, e.name().as_ref()) {
                        (Scope::Rss, b"channel") => seen_channel = true,
                        (Scope::Channel, b"item") => feed.items.push(Item::default()),
                        (Scope::Channel, name) if is_channel_field(name) => {
                            set_channel_field(&mut feed, name, String::new());
                        }
                        (Scope::Item, name) if is_item_field(name) => {
                            if let Some(item) = current_item.as_mut() {
                                set_item_field(item, name, String::new());
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::Text(t) => {
                if skip_depth == 0 {
                    if let Some((_, text)) = field.as_mut() {
                        let unescaped = t.unescape().map_err(|e| xml_error(&reader, e))?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Event::CData(c) => {
                if skip_depth == 0 {
                    if let Some((_, text)) = field.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&c));
                    }
                }
            }
            Event::End(_) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                } else if let Some((name, text)) = field.take() {
                    match scope {
                        Scope::Channel => set_channel_field(&mut feed, &name, text),
                        Scope::Item => {
                            if let Some(item) = current_item.as_mut() {
                                set_item_field(item, &name, text);
                            }
                        }
                        Scope::Root | Scope::Rss => {}
                    }
                } else {
                    scope = match scope {
                        Scope::Item => {
                            if let Some(item) = current_item.take() {
                                feed.items.push(item);
                            }
                            Scope::Channel
                        }
                        Scope::Channel => Scope::Rss,
                        Scope::Rss | Scope::Root => Scope::Root,
                    };
                }
            }
            Event::Eof => {
                // quick-xml reports EOF without complaint even with elements
                // still open, so a cut-off body would otherwise parse.
                if scope != Scope::Root || field.is_some() || skip_depth > 0 {
                    return Err(xml_error(&reader, "unexpected end of document"));
                }
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    if !seen_channel {
        return Err(ParseError::MissingChannel);
    }

    Ok(feed)
}

fn is_channel_field(name: &[u8]) -> bool {
    matches!(
        name,
        b"title" | b"link" | b"description" | b"lastBuildDate" | b"docs" | b"language"
    )
}

fn is_item_field(name: &[u8]) -> bool {
    matches!(name, b"title" | b"link" | b"description")
}

fn set_channel_field(feed: &mut Feed, name: &[u8], text: String) {
    match name {
        b"title" => feed.title = text,
        b"link" => feed.link = text,
        b"description" => feed.description = text,
        b"lastBuildDate" => feed.last_build_date = Some(text),
        b"docs" => feed.docs = Some(text),
        b"language" => feed.language = Some(text),
        _ => {}
    }
}

fn set_item_field(item: &mut Item, name: &[u8], text: String) {
    match name {
        b"title" => item.title = text,
        b"link" => item.link = text,
        b"description" => item.description = text,
        _ => {}
    }
}

fn read_version(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Option<String>, ParseError> {
    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed attribute on <rss>");
                continue;
            }
        };
        if attr.key.as_ref() == b"version" {
            let value = attr
                .decode_and_unescape_value(reader.decoder())
                .map_err(|e| xml_error(reader, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn xml_error(reader: &Reader<&[u8]>, e: impl std::fmt::Display) -> ParseError {
    ParseError::Xml {
        position: reader.buffer_position() as u64,
        message: e.to_string(),
    }
}

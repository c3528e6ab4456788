use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::Cursor;

use super::{EmitError, OutputFormat};

/// Thin wrapper over an indenting `quick_xml::Writer` that tags every
/// failure with the output format being produced.
pub(crate) struct XmlWriter {
    inner: Writer<Cursor<Vec<u8>>>,
    format: OutputFormat,
}

impl XmlWriter {
    pub(crate) fn new(format: OutputFormat) -> Self {
        Self {
            inner: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
            format,
        }
    }

    pub(crate) fn declaration(&mut self) -> Result<(), EmitError> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    pub(crate) fn start(&mut self, element: BytesStart<'_>) -> Result<(), EmitError> {
        self.write(Event::Start(element))
    }

    pub(crate) fn end(&mut self, name: &str) -> Result<(), EmitError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn empty(&mut self, element: BytesStart<'_>) -> Result<(), EmitError> {
        self.write(Event::Empty(element))
    }

    /// Writes `<name>text</name>`, escaping `text`.
    pub(crate) fn text_element(&mut self, name: &str, text: &str) -> Result<(), EmitError> {
        self.start(BytesStart::new(name))?;
        self.write(Event::Text(BytesText::new(&xml_chars(text))))?;
        self.end(name)
    }

    /// Same as [`text_element`](Self::text_element) with attributes on the
    /// opening tag.
    pub(crate) fn text_element_with(
        &mut self,
        element: BytesStart<'_>,
        text: &str,
    ) -> Result<(), EmitError> {
        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        self.start(element)?;
        self.write(Event::Text(BytesText::new(&xml_chars(text))))?;
        self.end(&name)
    }

    pub(crate) fn finish(self) -> Result<String, EmitError> {
        let format = self.format;
        let mut bytes = self.inner.into_inner().into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(|e| EmitError::Serialize {
            format,
            message: format!("generated document is not UTF-8: {}", e),
        })
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), EmitError> {
        self.inner
            .write_event(event)
            .map_err(|e| EmitError::Serialize {
                format: self.format,
                message: e.to_string(),
            })
    }
}

/// Replaces characters XML 1.0 does not allow (C0 controls other than tab,
/// newline and carriage return, U+FFFE, U+FFFF) with U+FFFD.
///
/// Escaping cannot help here: `&#1;` is just as illegal as the raw byte.
pub(crate) fn xml_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(
            text.chars()
                .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
                .collect(),
        )
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

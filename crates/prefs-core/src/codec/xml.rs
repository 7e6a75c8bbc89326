//! XML property-list codec.
//!
//! Output layout:
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
//! <plist version="1.0">
//!     <dict>
//!         <key>LastRun</key>
//!         <date>2024-01-02T03:04:05Z</date>
//!     </dict>
//! </plist>
//! ```
//! Empty strings, dictionaries and arrays are written self-closing
//! (`<string/>`, `<dict/>`, `<array/>`).
//!
//! The decoder is a small recursive-descent parser over `quick-xml` events.
//! Declarations, the DOCTYPE, comments, processing instructions and
//! whitespace between elements are skipped; text inside `<key>`, `<string>`
//! and `<date>` is kept verbatim, with entity references and CDATA resolved.

use std::borrow::Cow;
use std::fmt;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{FormatError, PLIST_DOCTYPE, XML_DECLARATION};
use crate::domain::document::{
    PrefDate, PrefDict, PrefValue, PreferenceDocument, DEFAULT_PLIST_VERSION,
};

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes `doc` as an XML property list indented by `indent` spaces per level.
///
/// # Errors
///
/// Returns [`FormatError::Encode`] if the XML writer fails.
///
/// # Examples
///
/// ```rust
/// use prefs_core::codec::xml;
/// use prefs_core::PreferenceDocument;
///
/// let mut doc = PreferenceDocument::new();
/// doc.insert("Name", "demo");
/// let bytes = xml::encode(&doc, 4).unwrap();
/// assert_eq!(xml::decode(&bytes).unwrap(), doc);
/// ```
pub fn encode(doc: &PreferenceDocument, indent: usize) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::with_capacity(256);
    out.extend_from_slice(XML_DECLARATION.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(PLIST_DOCTYPE.as_bytes());
    out.push(b'\n');

    let mut writer = Writer::new_with_indent(out, b' ', indent);

    let mut plist = BytesStart::new("plist");
    plist.push_attribute(("version", doc.version.as_str()));
    writer.write_event(Event::Start(plist)).map_err(encode_error)?;
    write_dict(&mut writer, &doc.dict)?;
    writer
        .write_event(Event::End(BytesEnd::new("plist")))
        .map_err(encode_error)?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

fn encode_error(err: impl fmt::Display) -> FormatError {
    FormatError::Encode(err.to_string())
}

fn write_dict(writer: &mut Writer<Vec<u8>>, dict: &PrefDict) -> Result<(), FormatError> {
    if dict.is_empty() {
        return writer
            .write_event(Event::Empty(BytesStart::new("dict")))
            .map_err(encode_error);
    }
    writer
        .write_event(Event::Start(BytesStart::new("dict")))
        .map_err(encode_error)?;
    for (key, value) in dict.iter() {
        write_text_element(writer, "key", key)?;
        write_value(writer, value)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("dict")))
        .map_err(encode_error)
}

fn write_value(writer: &mut Writer<Vec<u8>>, value: &PrefValue) -> Result<(), FormatError> {
    match value {
        PrefValue::String(s) => write_text_element(writer, "string", s),
        PrefValue::Date(d) => write_text_element(writer, "date", &d.to_string()),
        PrefValue::Dict(d) => write_dict(writer, d),
        PrefValue::Array(items) if items.is_empty() => writer
            .write_event(Event::Empty(BytesStart::new("array")))
            .map_err(encode_error),
        PrefValue::Array(items) => {
            writer
                .write_event(Event::Start(BytesStart::new("array")))
                .map_err(encode_error)?;
            for item in items {
                write_value(writer, item)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("array")))
                .map_err(encode_error)
        }
    }
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    text: &str,
) -> Result<(), FormatError> {
    if text.is_empty() {
        return writer
            .write_event(Event::Empty(BytesStart::new(tag)))
            .map_err(encode_error);
    }
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(encode_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(encode_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(encode_error)
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decodes an XML property list.
///
/// # Errors
///
/// Returns [`FormatError::Xml`] with the byte offset of the failure when the
/// input is not UTF-8, not well formed, or not a `<plist>` whose root is a
/// `<dict>` of supported values.
pub fn decode(bytes: &[u8]) -> Result<PreferenceDocument, FormatError> {
    let text = std::str::from_utf8(bytes).map_err(|e| FormatError::Xml {
        offset: e.valid_up_to() as u64,
        message: format!("input is not valid UTF-8: {e}"),
    })?;
    PlistParser::new(text).parse_document()
}

struct PlistParser<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> PlistParser<'a> {
    fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        // Whitespace inside <string> is content; structural whitespace is
        // skipped in `next_structural`.
        reader.config_mut().trim_text(false);
        Self { reader }
    }

    fn error(&self, message: impl Into<String>) -> FormatError {
        FormatError::Xml {
            offset: self.reader.buffer_position() as u64,
            message: message.into(),
        }
    }

    fn unexpected(&self, found: &Event<'_>, expected: &str) -> FormatError {
        self.error(format!("expected {expected}, found {}", describe(found)))
    }

    fn read(&mut self) -> Result<Event<'a>, FormatError> {
        match self.reader.read_event() {
            Ok(event) => Ok(event),
            Err(e) => Err(self.error(e.to_string())),
        }
    }

    /// Next event that carries document structure.
    fn next_structural(&mut self) -> Result<Event<'a>, FormatError> {
        loop {
            match self.read()? {
                Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {}
                Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {}
                event => return Ok(event),
            }
        }
    }

    fn parse_document(&mut self) -> Result<PreferenceDocument, FormatError> {
        let doc = match self.next_structural()? {
            Event::Start(start) if start.name().as_ref() == b"plist" => {
                let version = self.version_attr(&start)?;
                let dict = match self.next_structural()? {
                    Event::End(_) => PrefDict::new(),
                    Event::Start(e) if e.name().as_ref() == b"dict" => {
                        let dict = self.parse_dict()?;
                        self.expect_plist_end()?;
                        dict
                    }
                    Event::Empty(e) if e.name().as_ref() == b"dict" => {
                        self.expect_plist_end()?;
                        PrefDict::new()
                    }
                    Event::Eof => {
                        return Err(self.error("unexpected end of document inside <plist>"));
                    }
                    other => return Err(self.unexpected(&other, "<dict> as the plist root")),
                };
                PreferenceDocument { version, dict }
            }
            Event::Empty(start) if start.name().as_ref() == b"plist" => PreferenceDocument {
                version: self.version_attr(&start)?,
                dict: PrefDict::new(),
            },
            Event::Eof => return Err(self.error("document is empty")),
            other => return Err(self.unexpected(&other, "<plist>")),
        };

        match self.next_structural()? {
            Event::Eof => Ok(doc),
            other => Err(self.unexpected(&other, "end of document after </plist>")),
        }
    }

    fn expect_plist_end(&mut self) -> Result<(), FormatError> {
        match self.next_structural()? {
            Event::End(_) => Ok(()),
            Event::Eof => Err(self.error("unexpected end of document inside <plist>")),
            other => Err(self.unexpected(&other, "</plist>")),
        }
    }

    fn version_attr(&self, start: &BytesStart<'_>) -> Result<String, FormatError> {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.error(format!("bad attribute on <plist>: {e}")))?;
            if attr.key.as_ref() == b"version" {
                let raw = std::str::from_utf8(&attr.value)
                    .map_err(|e| self.error(format!("plist version is not UTF-8: {e}")))?;
                return self.unescape_text(raw).map(Cow::into_owned);
            }
        }
        Ok(DEFAULT_PLIST_VERSION.to_string())
    }

    /// Parses the entries of a `<dict>` whose start tag was just consumed.
    fn parse_dict(&mut self) -> Result<PrefDict, FormatError> {
        let mut dict = PrefDict::new();
        loop {
            let key = match self.next_structural()? {
                Event::End(_) => return Ok(dict),
                Event::Start(e) if e.name().as_ref() == b"key" => self.read_text(b"key")?,
                Event::Empty(e) if e.name().as_ref() == b"key" => String::new(),
                Event::Eof => return Err(self.error("unexpected end of document inside <dict>")),
                other => return Err(self.unexpected(&other, "<key> or </dict>")),
            };
            let value = match self.next_structural()? {
                Event::Eof => return Err(self.error("unexpected end of document inside <dict>")),
                Event::End(_) => {
                    return Err(self.error(format!("<key>{key}</key> has no value")));
                }
                event => self.parse_value(event)?,
            };
            dict.insert(key, value);
        }
    }

    /// Parses the items of an `<array>` whose start tag was just consumed.
    fn parse_array(&mut self) -> Result<Vec<PrefValue>, FormatError> {
        let mut items = Vec::new();
        loop {
            match self.next_structural()? {
                Event::End(_) => return Ok(items),
                Event::Eof => return Err(self.error("unexpected end of document inside <array>")),
                event => items.push(self.parse_value(event)?),
            }
        }
    }

    fn parse_value(&mut self, event: Event<'a>) -> Result<PrefValue, FormatError> {
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"string" => Ok(PrefValue::String(self.read_text(b"string")?)),
                b"date" => {
                    let text = self.read_text(b"date")?;
                    self.parse_date(&text).map(PrefValue::Date)
                }
                b"dict" => Ok(PrefValue::Dict(self.parse_dict()?)),
                b"array" => Ok(PrefValue::Array(self.parse_array()?)),
                other => Err(self.error(format!(
                    "unsupported value element <{}>",
                    String::from_utf8_lossy(other)
                ))),
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"string" => Ok(PrefValue::String(String::new())),
                b"dict" => Ok(PrefValue::Dict(PrefDict::new())),
                b"array" => Ok(PrefValue::Array(Vec::new())),
                b"date" => Err(self.error("<date/> has no value")),
                other => Err(self.error(format!(
                    "unsupported value element <{}/>",
                    String::from_utf8_lossy(other)
                ))),
            },
            other => Err(self.unexpected(&other, "a value element")),
        }
    }

    fn parse_date(&self, text: &str) -> Result<PrefDate, FormatError> {
        PrefDate::parse(text).map_err(|e| self.error(format!("invalid date {text:?}: {e}")))
    }

    /// Collects character data up to the closing tag of the current element.
    fn read_text(&mut self, tag: &[u8]) -> Result<String, FormatError> {
        let mut text = String::new();
        loop {
            match self.read()? {
                Event::Text(t) => {
                    let raw = self.utf8(&t)?;
                    text.push_str(&self.unescape_text(raw)?);
                }
                Event::CData(c) => text.push_str(self.utf8(&c)?),
                Event::GeneralRef(r) => {
                    let entity = format!("&{};", self.utf8(&r)?);
                    text.push_str(&self.unescape_text(&entity)?);
                }
                Event::Comment(_) => {}
                Event::End(e) if e.name().as_ref() == tag => return Ok(text),
                Event::Eof => {
                    return Err(self.error(format!(
                        "unexpected end of document inside <{}>",
                        String::from_utf8_lossy(tag)
                    )));
                }
                other => {
                    return Err(self.unexpected(
                        &other,
                        &format!("text inside <{}>", String::from_utf8_lossy(tag)),
                    ));
                }
            }
        }
    }

    fn utf8<'b>(&self, bytes: &'b [u8]) -> Result<&'b str, FormatError> {
        std::str::from_utf8(bytes).map_err(|e| self.error(format!("text is not UTF-8: {e}")))
    }

    fn unescape_text<'b>(&self, raw: &'b str) -> Result<Cow<'b, str>, FormatError> {
        unescape(raw).map_err(|e| self.error(format!("bad entity reference: {e}")))
    }
}

fn describe(event: &Event<'_>) -> String {
    match event {
        Event::Start(e) => format!("<{}>", String::from_utf8_lossy(e.name().as_ref())),
        Event::End(e) => format!("</{}>", String::from_utf8_lossy(e.name().as_ref())),
        Event::Empty(e) => format!("<{}/>", String::from_utf8_lossy(e.name().as_ref())),
        Event::Text(_) | Event::CData(_) | Event::GeneralRef(_) => "text".to_string(),
        Event::Eof => "end of document".to_string(),
        _ => "markup".to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

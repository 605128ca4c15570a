use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use thiserror::Error;

/// Errors raised while writing to the output stream.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The underlying writer rejected an event.
    #[error("Failed to write {what}: {message}")]
    Write { what: String, message: String },
}

impl SinkError {
    fn write(what: &str, err: impl std::fmt::Display) -> Self {
        SinkError::Write {
            what: what.to_string(),
            message: err.to_string(),
        }
    }
}

/// Push-style XML output capability passed down the encode call chain.
///
/// Element names are written verbatim, so prefixed names (`georss:point`)
/// are the caller's responsibility, as are the matching namespace
/// declarations on an enclosing element.
pub trait XmlSink {
    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), SinkError>;

    fn end(&mut self, name: &str) -> Result<(), SinkError>;

    /// Writes escaped character data.
    fn text(&mut self, text: &str) -> Result<(), SinkError>;

    /// Writes character data as CDATA sections, splitting around `]]>`.
    fn cdata(&mut self, text: &str) -> Result<(), SinkError>;

    /// Writes a self-closing element.
    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), SinkError>;

    /// `<name>text</name>`
    fn element(&mut self, name: &str, text: &str) -> Result<(), SinkError> {
        self.start(name, &[])?;
        self.text(text)?;
        self.end(name)
    }

    /// `<name><![CDATA[text]]></name>`
    fn cdata_element(&mut self, name: &str, text: &str) -> Result<(), SinkError> {
        self.start(name, &[])?;
        self.cdata(text)?;
        self.end(name)
    }
}

/// [`XmlSink`] backed by a streaming `quick_xml::Writer`.
///
/// Output is compact (no indentation) so CDATA content is never padded
/// with layout whitespace.
pub struct XmlWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new(inner),
        }
    }

    /// Writes the `<?xml version="1.0" encoding="UTF-8"?>` declaration.
    pub fn declaration(&mut self) -> Result<(), SinkError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| SinkError::write("XML declaration", e))
    }

    pub fn get_mut(&mut self) -> &mut W {
        self.writer.get_mut()
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> XmlSink for XmlWriter<W> {
    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), SinkError> {
        let mut start = BytesStart::new(name);
        for &attribute in attributes {
            start.push_attribute(attribute);
        }
        self.writer
            .write_event(Event::Start(start))
            .map_err(|e| SinkError::write(name, e))
    }

    fn end(&mut self, name: &str) -> Result<(), SinkError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(|e| SinkError::write(name, e))
    }

    fn text(&mut self, text: &str) -> Result<(), SinkError> {
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| SinkError::write("text", e))
    }

    fn cdata(&mut self, text: &str) -> Result<(), SinkError> {
        // A CDATA section cannot contain its own terminator, so "]]>" is
        // split across two sections: "...]]" and ">...".
        let mut rest = text;
        while let Some(pos) = rest.find("]]>") {
            self.writer
                .write_event(Event::CData(BytesCData::new(&rest[..pos + 2])))
                .map_err(|e| SinkError::write("CDATA", e))?;
            rest = &rest[pos + 2..];
        }
        self.writer
            .write_event(Event::CData(BytesCData::new(rest)))
            .map_err(|e| SinkError::write("CDATA", e))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), SinkError> {
        let mut start = BytesStart::new(name);
        for &attribute in attributes {
            start.push_attribute(attribute);
        }
        self.writer
            .write_event(Event::Empty(start))
            .map_err(|e| SinkError::write(name, e))
    }
}

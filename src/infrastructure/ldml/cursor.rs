//! Forward-only XML plumbing shared by the reader, writer and migrator
//!
//! [`XmlCursor`] walks a tokenized document one sibling node at a time and can
//! copy whole nodes into an [`XmlOut`]. Formatting whitespace is dropped on
//! load so the writer controls indentation; whitespace that is the entire
//! content of an element is kept.

use super::names::{compare_element_names, PALASO_NS};
use crate::error::{Result, WsError};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::Write;

pub fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/// Unescaped value of attribute `name`
pub fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// The prefix this element declares for namespace `uri`, if any
pub fn namespace_prefix(element: &BytesStart<'_>, uri: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            if attr.unescape_value()? == uri {
                return Ok(Some(prefix.to_string()));
            }
        }
    }
    Ok(None)
}

fn is_whitespace(text: &BytesText<'_>) -> bool {
    text.iter().all(|b| b.is_ascii_whitespace())
}

/// Characters XML 1.0 allows in text. CR is excluded because parsers
/// normalize it away.
fn is_xml_char(c: char) -> bool {
    matches!(c as u32, 0x9 | 0xA | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF)
}

#[derive(Debug, Clone)]
pub struct XmlCursor {
    events: Vec<Event<'static>>,
    pos: usize,
}

impl XmlCursor {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut raw = Vec::new();
        let mut depth = 0usize;
        loop {
            let event = reader.read_event()?;
            match &event {
                Event::Eof => break,
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        WsError::Structural("closing tag without an opening tag".to_string())
                    })?
                }
                _ => {}
            }
            raw.push(event.into_owned());
        }
        if depth != 0 {
            return Err(WsError::Structural(
                "document ended before all elements were closed".to_string(),
            ));
        }

        let mut events = Vec::with_capacity(raw.len());
        for (i, event) in raw.iter().enumerate() {
            if let Event::Text(text) = event {
                let sole_content = i > 0
                    && matches!(raw[i - 1], Event::Start(_))
                    && matches!(raw.get(i + 1), Some(Event::End(_)));
                if is_whitespace(text) && !sole_content {
                    continue;
                }
            }
            events.push(event.clone());
        }
        Ok(XmlCursor::from_events(events))
    }

    pub fn from_events(events: Vec<Event<'static>>) -> Self {
        XmlCursor { events, pos: 0 }
    }

    pub fn peek(&self) -> Option<&Event<'static>> {
        self.events.get(self.pos)
    }

    /// True at the closing tag of the current parent or at end of input
    pub fn at_end(&self) -> bool {
        matches!(self.peek(), None | Some(Event::End(_)))
    }

    pub fn element(&self) -> Option<&BytesStart<'static>> {
        match self.peek() {
            Some(Event::Start(e)) | Some(Event::Empty(e)) => Some(e),
            _ => None,
        }
    }

    pub fn element_name(&self) -> Option<String> {
        self.element().map(element_name)
    }

    pub fn is_at(&self, name: &str) -> bool {
        self.element()
            .map(|e| e.name().as_ref() == name.as_bytes())
            .unwrap_or(false)
    }

    pub fn attribute(&self, name: &str) -> Result<Option<String>> {
        match self.element() {
            Some(e) => attribute(e, name),
            None => Ok(None),
        }
    }

    /// Prefix bound to our metadata namespace on the current element
    pub fn palaso_prefix(&self) -> Result<Option<String>> {
        match self.element() {
            Some(e) => namespace_prefix(e, PALASO_NS),
            None => Ok(None),
        }
    }

    pub fn next_event(&mut self) -> Option<Event<'static>> {
        let event = self.events.get(self.pos).cloned();
        if event.is_some() {
            self.pos += 1;
        }
        event
    }

    fn node_len(&self) -> usize {
        match self.peek() {
            None => 0,
            Some(Event::Start(_)) => {
                let mut depth = 0usize;
                for (offset, event) in self.events[self.pos..].iter().enumerate() {
                    match event {
                        Event::Start(_) => depth += 1,
                        Event::End(_) => {
                            depth -= 1;
                            if depth == 0 {
                                return offset + 1;
                            }
                        }
                        _ => {}
                    }
                }
                self.events.len() - self.pos
            }
            Some(_) => 1,
        }
    }

    /// Remove the current node (with its subtree) and return its events
    pub fn take_node(&mut self) -> Vec<Event<'static>> {
        let len = self.node_len();
        let node = self.events[self.pos..self.pos + len].to_vec();
        self.pos += len;
        node
    }

    pub fn skip_node(&mut self) {
        self.pos += self.node_len();
    }

    pub fn copy_node<W: Write>(&mut self, out: &mut XmlOut<W>) -> Result<()> {
        for event in self.take_node() {
            out.write(event)?;
        }
        Ok(())
    }

    /// Copy siblings until one sorts at or after `anchor`
    pub fn copy_until<W: Write>(&mut self, out: &mut XmlOut<W>, anchor: &str) -> Result<()> {
        while !self.at_end() {
            if let Some(name) = self.element_name() {
                if compare_element_names(&name, anchor) != Ordering::Less {
                    break;
                }
            }
            self.copy_node(out)?;
        }
        Ok(())
    }

    /// Copy the remaining siblings and consume the parent's closing tag
    pub fn copy_to_end<W: Write>(&mut self, out: &mut XmlOut<W>) -> Result<()> {
        while !self.at_end() {
            self.copy_node(out)?;
        }
        self.next_event();
        Ok(())
    }

    pub fn skip_to_end(&mut self) {
        while !self.at_end() {
            self.skip_node();
        }
        self.next_event();
    }

    /// Move forward to the sibling named `name`, skipping nodes that sort
    /// before it. Stops without consuming at a sibling that sorts after it.
    pub fn find_element(&mut self, name: &str) -> bool {
        while !self.at_end() {
            match self.element_name() {
                Some(current) => match compare_element_names(&current, name) {
                    Ordering::Equal => return true,
                    Ordering::Greater => return false,
                    Ordering::Less => self.skip_node(),
                },
                None => self.skip_node(),
            }
        }
        false
    }

    /// Step into the current element. Returns false (after consuming it) for
    /// an empty element, which has no children to visit.
    pub fn enter(&mut self) -> bool {
        match self.peek() {
            Some(Event::Start(_)) => {
                self.pos += 1;
                true
            }
            Some(Event::Empty(_)) => {
                self.pos += 1;
                false
            }
            _ => false,
        }
    }

    /// Skip the prolog and return the root element's name
    pub fn move_to_root(&mut self) -> Option<String> {
        while let Some(event) = self.peek() {
            match event {
                Event::Start(_) | Event::Empty(_) => return self.element_name(),
                _ => self.pos += 1,
            }
        }
        None
    }

    /// Consume the current element and return its text, with `<cp hex="..."/>`
    /// children decoded, plus the names of any other child elements.
    pub fn read_mixed(&mut self) -> Result<(String, Vec<String>)> {
        let mut text = String::new();
        let mut others = Vec::new();
        if !self.enter() {
            return Ok((text, others));
        }
        while !self.at_end() {
            match self.peek() {
                Some(Event::Text(t)) => {
                    text.push_str(&t.unescape()?);
                    self.pos += 1;
                }
                Some(Event::CData(c)) => {
                    text.push_str(&String::from_utf8_lossy(c));
                    self.pos += 1;
                }
                Some(Event::Start(_)) | Some(Event::Empty(_)) => {
                    if self.is_at("cp") {
                        let hex = self.attribute("hex")?.unwrap_or_default();
                        let c = u32::from_str_radix(hex.trim(), 16)
                            .ok()
                            .and_then(char::from_u32)
                            .ok_or_else(|| {
                                WsError::Structural(format!("invalid <cp hex=\"{}\"/>", hex))
                            })?;
                        text.push(c);
                    } else if let Some(name) = self.element_name() {
                        others.push(name);
                    }
                    self.skip_node();
                }
                _ => self.skip_node(),
            }
        }
        self.next_event();
        Ok((text, others))
    }

    pub fn read_text(&mut self) -> Result<String> {
        Ok(self.read_mixed()?.0)
    }

    /// Consume a `special` element and collect `prefix:field value="..."`
    /// children as field → value
    pub fn special_fields(&mut self, prefix: &str) -> Result<HashMap<String, String>> {
        let mut fields = HashMap::new();
        if !self.enter() {
            return Ok(fields);
        }
        let qualifier = format!("{}:", prefix);
        while !self.at_end() {
            if let Some(name) = self.element_name() {
                if let Some(field) = name.strip_prefix(&qualifier) {
                    let value = self.attribute("value")?.unwrap_or_default();
                    fields.insert(field.to_string(), value);
                }
            }
            self.skip_node();
        }
        self.next_event();
        Ok(fields)
    }
}

/// Indenting XML writer that can hold back an element's start tag until
/// something is written inside it
pub struct XmlOut<W: Write> {
    writer: Writer<W>,
    pending: Vec<BytesStart<'static>>,
}

impl<W: Write> XmlOut<W> {
    pub fn new(inner: W) -> Self {
        XmlOut {
            writer: Writer::new_with_indent(inner, b'\t', 1),
            pending: Vec::new(),
        }
    }

    fn flush_pending(&mut self) -> Result<()> {
        for start in std::mem::take(&mut self.pending) {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }

    pub fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.flush_pending()?;
        self.writer.write_event(event)?;
        Ok(())
    }

    /// Start an element that is dropped if nothing is written inside it
    pub fn open_lazy(&mut self, start: BytesStart<'static>) {
        self.pending.push(start);
    }

    /// Close an element opened with [`XmlOut::open_lazy`]. Returns false when
    /// it stayed empty and was omitted.
    pub fn close_lazy(&mut self, name: &str) -> Result<bool> {
        if self.pending.pop().is_some() {
            return Ok(false);
        }
        self.end(name)?;
        Ok(true)
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.write(Event::Start(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    pub fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.write(Event::Empty(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    /// Write text, replacing characters XML cannot carry with `<cp hex="X"/>`
    pub fn ldml_text(&mut self, text: &str) -> Result<()> {
        let mut run = String::new();
        for c in text.chars() {
            if is_xml_char(c) {
                run.push(c);
                continue;
            }
            if !run.is_empty() {
                self.write(Event::Text(BytesText::new(&run)))?;
                run.clear();
            }
            let hex = format!("{:X}", c as u32);
            self.empty("cp", &[("hex", hex.as_str())])?;
        }
        // a trailing text event keeps the closing tag on the same line
        self.write(Event::Text(BytesText::new(&run)))
    }

    pub fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attrs)?;
        self.ldml_text(text)?;
        self.end(name)
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

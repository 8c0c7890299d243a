//! Minimal owned element tree over quick-xml events.
//!
//! Names are kept qualified (`p:sp`, `a:srgbClr`) exactly as PowerPoint
//! writes them; lookups match on those qualified names.

use super::PptxError;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use std::io::Write;

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Parse a whole document and return its root element.
    pub fn parse(xml: &[u8]) -> Result<XmlElement, PptxError> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => stack.push(element_from_start(&e)),
                Event::Empty(e) => {
                    let element = element_from_start(&e);
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(e) => {
                    let raw: &[u8] = &e;
                    push_text(&mut stack, &String::from_utf8_lossy(raw));
                }
                Event::CData(e) => {
                    let raw: &[u8] = &e;
                    push_text(&mut stack, &String::from_utf8_lossy(raw));
                }
                Event::GeneralRef(e) => {
                    let raw: &[u8] = &e;
                    let name = String::from_utf8_lossy(raw);
                    match resolve_entity(&name) {
                        Some(c) => push_text(&mut stack, c.encode_utf8(&mut [0u8; 4])),
                        None => push_text(&mut stack, &format!("&{};", name)),
                    }
                }
                Event::Eof => break,
                _ => (),
            }
            buf.clear();
        }

        let mut root = root.ok_or(PptxError::EmptyDocument)?;
        root.drop_blank_text();
        Ok(root)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute parsed as an integer, `0` when missing or malformed.
    pub fn attr_i64(&self, key: &str) -> i64 {
        self.attr(key).and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Local part of the element name (`srgbClr` for `a:srgbClr`).
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// All descendants in document order, not including `self`.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// Descendants named `name`, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&XmlElement> {
        self.descendants()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }

    /// First descendant named `name`.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.descendants().into_iter().find(|e| e.name == name)
    }

    /// First match of a `first/second/...` path where `first` may be any
    /// descendant and every further step is a direct child.
    pub fn find_path(&self, path: &str) -> Option<&XmlElement> {
        self.find_all_path(path).into_iter().next()
    }

    pub fn find_all_path(&self, path: &str) -> Vec<&XmlElement> {
        let mut steps = path.split('/');
        let Some(first) = steps.next() else {
            return Vec::new();
        };
        let mut current = self.find_all(first);
        for step in steps {
            current = current
                .into_iter()
                .flat_map(|e| e.child_elements().filter(move |c| c.name == step))
                .collect();
        }
        current
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Serialize this element (and its subtree) as an XML fragment.
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), PptxError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (k, v) in &self.attributes {
            start.push_attribute((k.as_str(), v.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_to(writer)?,
                XmlNode::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }

    fn drop_blank_text(&mut self) {
        let has_elements = self.child_elements().next().is_some();
        self.children.retain(|node| match node {
            XmlNode::Text(t) => !(has_elements && t.trim().is_empty()),
            XmlNode::Element(_) => true,
        });
        for node in &mut self.children {
            if let XmlNode::Element(e) = node {
                e.drop_blank_text();
            }
        }
    }
}

fn collect_descendants<'a>(element: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in element.child_elements() {
        out.push(child);
        collect_descendants(child, out);
    }
}

fn element_from_start(start: &BytesStart<'_>) -> XmlElement {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let attributes = start
        .attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = unescape(&String::from_utf8_lossy(&attr.value));
            (key, value)
        })
        .collect();
    XmlElement {
        name,
        attributes,
        children: Vec::new(),
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if let Some(XmlNode::Text(existing)) = parent.children.last_mut() {
        existing.push_str(text);
    } else {
        parent.children.push(XmlNode::Text(text.to_string()));
    }
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or(name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// Resolve predefined and numeric entity references inside an attribute value.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        match tail.find(';').and_then(|end| Some((end, resolve_entity(&tail[..end])?))) {
            Some((end, c)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

//! A minimal XML element tree with an indenting writer.
//!
//! The changelog generator lowers its changeset model into this tree; the
//! writer owns all layout concerns (indentation, escaping, self-closing
//! tags).

use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct XmlElement {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

#[derive(Debug, Clone)]
enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn child(mut self, element: XmlElement) -> Self {
        self.children.push(XmlNode::Element(element));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(XmlNode::Text(text.to_string()));
        self
    }

    pub fn push(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    /// Render as a standalone document with an XML declaration.
    pub fn to_document(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.write(&mut out, 0);
        out
    }

    fn write(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        let _ = write!(out, "{pad}<{}", self.name);
        for (key, value) in &self.attrs {
            let _ = write!(out, " {key}=\"{}\"", escape(value));
        }
        if self.children.is_empty() {
            out.push_str("/>\n");
            return;
        }
        // A single text child stays on one line; element children get their
        // own indented lines.
        if let [XmlNode::Text(text)] = self.children.as_slice() {
            let _ = writeln!(out, ">{}</{}>", escape(text), self.name);
            return;
        }
        out.push_str(">\n");
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write(out, depth + 1),
                XmlNode::Text(text) => {
                    let _ = writeln!(out, "{pad}  {}", escape(text));
                }
            }
        }
        let _ = writeln!(out, "{pad}</{}>", self.name);
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

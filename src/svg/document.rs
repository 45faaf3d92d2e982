use super::error::ParseError;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::escape::unescape_with;
use quick_xml::{Reader, Writer};
use std::collections::HashMap;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, PartialEq)]
pub enum SvgNode {
    Element(SvgElement),
    Text(String),
    CData(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SvgElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<SvgNode>,
}

/// Markup inlined into the mount: every top-level node of the fetched file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SvgDocument {
    pub nodes: Vec<SvgNode>,
}

impl SvgDocument {
    /// Parses raw markup into an owned tree. Comments, declarations,
    /// processing instructions and doctypes are dropped. Text is kept as
    /// written, whitespace included.
    pub fn parse(markup: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(markup);
        let mut entities = Entities::default();

        let malformed = |reader: &Reader<&[u8]>, message: String| ParseError::Malformed {
            position: reader.buffer_position(),
            message,
        };

        let mut roots = Vec::new();
        let mut open: Vec<SvgElement> = Vec::new();

        loop {
            let node = match reader.read_event() {
                Ok(Event::Start(start)) => {
                    let element = element_from_start(&start, &entities)
                        .map_err(|e| malformed(&reader, e))?;
                    open.push(element);
                    continue;
                }
                Ok(Event::Empty(start)) => SvgNode::Element(
                    element_from_start(&start, &entities).map_err(|e| malformed(&reader, e))?,
                ),
                Ok(Event::End(_)) => match open.pop() {
                    Some(element) => SvgNode::Element(element),
                    None => return Err(malformed(&reader, "unexpected closing tag".into())),
                },
                Ok(Event::Text(text)) => {
                    let raw = std::str::from_utf8(&text)
                        .map_err(|e| malformed(&reader, e.to_string()))?;
                    SvgNode::Text(entities.unescape(raw).map_err(|e| malformed(&reader, e))?)
                }
                Ok(Event::DocType(doctype)) => {
                    entities = Entities::from_doctype(&String::from_utf8_lossy(&doctype));
                    continue;
                }
                Ok(Event::CData(data)) => {
                    SvgNode::CData(String::from_utf8_lossy(&data.into_inner()).into_owned())
                }
                Ok(Event::Eof) => break,
                Ok(_) => continue,
                Err(e) => return Err(malformed(&reader, e.to_string())),
            };

            match open.last_mut() {
                Some(parent) => parent.children.push(node),
                None => roots.push(node),
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(malformed(
                &reader,
                format!("unclosed <{}> element", unclosed.name),
            ));
        }

        Ok(Self { nodes: roots })
    }

    /// First `<svg>` element in document order.
    pub fn root_svg(&self) -> Option<&SvgElement> {
        find_svg(&self.nodes)
    }

    pub fn root_svg_mut(&mut self) -> Option<&mut SvgElement> {
        find_svg_mut(&mut self.nodes)
    }
}

fn find_svg(nodes: &[SvgNode]) -> Option<&SvgElement> {
    nodes.iter().find_map(|node| match node {
        SvgNode::Element(el) if el.local_name() == "svg" => Some(el),
        SvgNode::Element(el) => find_svg(&el.children),
        _ => None,
    })
}

fn find_svg_mut(nodes: &mut [SvgNode]) -> Option<&mut SvgElement> {
    for node in nodes.iter_mut() {
        if let SvgNode::Element(el) = node {
            if el.local_name() == "svg" {
                return Some(el);
            }
            if let Some(found) = find_svg_mut(&mut el.children) {
                return Some(found);
            }
        }
    }
    None
}

fn element_from_start(
    start: &BytesStart<'_>,
    entities: &Entities,
) -> Result<SvgElement, String> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| e.to_string())?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| e.to_string())?
            .to_string();
        let raw = std::str::from_utf8(&attr.value).map_err(|e| e.to_string())?;
        let value = entities.unescape(raw)?;
        attributes.push((key, value));
    }

    Ok(SvgElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// General entities declared in the doctype's internal subset, as exported
/// by Illustrator (`<!ENTITY ns_svg "http://www.w3.org/2000/svg">`).
#[derive(Debug, Default)]
struct Entities {
    declared: HashMap<String, String>,
}

impl Entities {
    fn from_doctype(doctype: &str) -> Self {
        let mut declared = HashMap::new();
        for decl in doctype.split("<!ENTITY").skip(1) {
            let decl = decl.trim_start();
            // Parameter entities only matter inside the DTD itself.
            if decl.starts_with('%') {
                continue;
            }
            let Some((name, rest)) = decl.split_once(char::is_whitespace) else {
                continue;
            };
            let rest = rest.trim_start();
            let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
                continue;
            };
            if let Some((value, _)) = rest[1..].split_once(quote) {
                declared.insert(name.to_string(), value.to_string());
            }
        }
        Self { declared }
    }

    /// Resolves predefined, numeric and declared references. Unknown
    /// references stay in the text as written.
    fn unescape(&self, raw: &str) -> Result<String, String> {
        let unknown: HashMap<&str, String> = references(raw)
            .filter(|name| !name.starts_with('#'))
            .filter(|name| predefined(name).is_none() && !self.declared.contains_key(*name))
            .map(|name| (name, format!("&{name};")))
            .collect();

        unescape_with(raw, |name| {
            predefined(name)
                .or_else(|| self.declared.get(name).map(String::as_str))
                .or_else(|| unknown.get(name).map(String::as_str))
        })
        .map(|text| text.into_owned())
        .map_err(|e| e.to_string())
    }
}

fn predefined(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    }
}

/// Names between `&` and `;` in raw text.
fn references(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('&')
        .skip(1)
        .filter_map(|rest| rest.split_once(';').map(|(name, _)| name))
}

impl SvgElement {
    /// Name without any namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, key: &str) {
        self.attributes.retain(|(k, _)| k != key);
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class").unwrap_or("").split_whitespace()
    }

    /// Visits every element below this one in pre-order. `self` is not visited.
    pub fn visit_descendants_mut(&mut self, visit: &mut dyn FnMut(&mut SvgElement)) {
        for child in self.children.iter_mut() {
            if let SvgNode::Element(el) = child {
                visit(el);
                el.visit_descendants_mut(visit);
            }
        }
    }

    pub fn descendants(&self) -> Vec<&SvgElement> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// Drops every descendant element matching `reject`, at any depth.
    pub fn remove_descendants(&mut self, reject: &dyn Fn(&SvgElement) -> bool) {
        self.children.retain(|child| match child {
            SvgNode::Element(el) => !reject(el),
            _ => true,
        });
        for child in self.children.iter_mut() {
            if let SvgNode::Element(el) = child {
                el.remove_descendants(reject);
            }
        }
    }

    /// Markup suitable for a standalone `.svg` file: the root gains the SVG
    /// namespace declaration if it was inlined without one.
    pub fn to_standalone_markup(&self) -> Result<String, quick_xml::Error> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self, self.attribute("xmlns").is_none())?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }
}

fn collect_descendants<'a>(el: &'a SvgElement, out: &mut Vec<&'a SvgElement>) {
    for child in &el.children {
        if let SvgNode::Element(child) = child {
            out.push(child);
            collect_descendants(child, out);
        }
    }
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    el: &SvgElement,
    add_namespace: bool,
) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new(el.name.as_str());
    if add_namespace {
        start.push_attribute(("xmlns", SVG_NAMESPACE));
    }
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if el.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        match child {
            SvgNode::Element(child) => write_element(writer, child, false)?,
            SvgNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            SvgNode::CData(data) => {
                writer.write_event(Event::CData(BytesCData::new(data.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_svg_after_prolog_and_comments() {
        let doc = SvgDocument::parse(
            r#"<?xml version="1.0"?>
<!-- exported -->
<svg xmlns="http://www.w3.org/2000/svg" width="24"><path d="M0 0"/></svg>"#,
        )
        .unwrap();

        let svg = doc.root_svg().unwrap();
        assert_eq!(svg.attribute("width"), Some("24"));
        assert_eq!(svg.descendants().len(), 1);
    }

    #[test]
    fn finds_nested_svg_in_wrapper() {
        let doc = SvgDocument::parse(r#"<div><span/><svg id="icon"/></div>"#).unwrap();
        assert_eq!(doc.root_svg().unwrap().attribute("id"), Some("icon"));
    }

    #[test]
    fn no_svg_element() {
        let doc = SvgDocument::parse("<html><body>nope</body></html>").unwrap();
        assert!(doc.root_svg().is_none());
    }

    #[test]
    fn rejects_unbalanced_markup() {
        let err = SvgDocument::parse("<svg><g></svg>").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));

        let err = SvgDocument::parse("<svg><g>").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
    }

    #[test]
    fn set_attribute_keeps_order() {
        let mut el = SvgElement {
            name: "path".to_string(),
            ..Default::default()
        };
        el.set_attribute("d", "M0 0");
        el.set_attribute("fill", "red");
        el.set_attribute("d", "M1 1");
        assert_eq!(
            el.attributes,
            vec![
                ("d".to_string(), "M1 1".to_string()),
                ("fill".to_string(), "red".to_string())
            ]
        );
        el.remove_attribute("d");
        assert_eq!(el.attribute("d"), None);
    }

    #[test]
    fn prefixed_names() {
        let doc = SvgDocument::parse(
            r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg"><svg:rect/></svg:svg>"#,
        )
        .unwrap();
        let svg = doc.root_svg().unwrap();
        assert_eq!(svg.local_name(), "svg");
        assert_eq!(svg.name, "svg:svg");
    }

    #[test]
    fn markup_escapes_and_round_trips() {
        let doc = SvgDocument::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><title>a &amp; b</title><path fill="#FFF"/></svg>"##,
        )
        .unwrap();
        let markup = doc.root_svg().unwrap().to_standalone_markup().unwrap();
        assert_eq!(
            markup,
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><title>a &amp; b</title><path fill="#FFF"/></svg>"##
        );
        let reparsed = SvgDocument::parse(&markup).unwrap();
        assert_eq!(reparsed.root_svg(), doc.root_svg());
    }

    #[test]
    fn resolves_entities_declared_in_doctype() {
        let doc = SvgDocument::parse(
            r##"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd" [
	<!ENTITY ns_svg "http://www.w3.org/2000/svg">
	<!ENTITY ns_xlink 'http://www.w3.org/1999/xlink'>
]>
<svg version="1.1" xmlns="&ns_svg;" xmlns:xlink="&ns_xlink;" width="24" height="24">
	<path fill="#000" d="M0 0h24v24H0z"/>
</svg>"##,
        )
        .unwrap();

        let svg = doc.root_svg().unwrap();
        assert_eq!(svg.attribute("xmlns"), Some("http://www.w3.org/2000/svg"));
        assert_eq!(
            svg.attribute("xmlns:xlink"),
            Some("http://www.w3.org/1999/xlink")
        );
        assert_eq!(svg.descendants().len(), 1);
    }

    #[test]
    fn unknown_entities_stay_literal() {
        let doc = SvgDocument::parse(
            r#"<svg id="&brand;-icon"><title>&lt;a&gt; &copy;&#65;</title></svg>"#,
        )
        .unwrap();
        let svg = doc.root_svg().unwrap();
        assert_eq!(svg.attribute("id"), Some("&brand;-icon"));
        assert_eq!(
            svg.children,
            vec![SvgNode::Element(SvgElement {
                name: "title".to_string(),
                attributes: Vec::new(),
                children: vec![SvgNode::Text("<a> &copy;A".to_string())],
            })]
        );
    }

    #[test]
    fn text_keeps_inner_whitespace() {
        let doc = SvgDocument::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text>Hello <tspan>World</tspan></text></svg>"#,
        )
        .unwrap();
        let markup = doc.root_svg().unwrap().to_standalone_markup().unwrap();
        assert_eq!(
            markup,
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text>Hello <tspan>World</tspan></text></svg>"#
        );
    }

    #[test]
    fn standalone_markup_adds_namespace_once() {
        let doc = SvgDocument::parse(r#"<svg><g/></svg>"#).unwrap();
        let markup = doc.root_svg().unwrap().to_standalone_markup().unwrap();
        assert!(markup.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg">"#));

        let doc = SvgDocument::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();
        let markup = doc.root_svg().unwrap().to_standalone_markup().unwrap();
        assert_eq!(markup.matches("xmlns=").count(), 1);
    }
}

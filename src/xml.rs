//! XML escaping and an indenting re-serializer for fetched documents.

use roxmltree::{Document, Node, NodeType};
use std::fmt::Write as _;

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Escape text for use in element content.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\r', "&#13;")
}

/// Escape a double-quoted attribute value. Tab, CR and LF are written as character
/// references, otherwise a parser would normalize them to spaces.
pub fn xml_escape_attr(s: &str) -> String {
    xml_escape(s).replace('\n', "&#10;").replace('\t', "&#9;")
}

/// Parse `input` and serialize it again with one element per line, indented by `indent`.
///
/// Whitespace-only text between elements is dropped. An element that holds text
/// (alone or mixed with child elements) is written on one line exactly as parsed.
/// Processing instructions and comments are kept.
pub fn pretty_print(input: &str, indent: &str) -> Result<String, roxmltree::Error> {
    let doc = Document::parse(input)?;
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    for child in doc.root().children() {
        write_node(&mut out, child, indent, 0);
    }
    Ok(out)
}

fn write_node(out: &mut String, node: Node<'_, '_>, indent: &str, depth: usize) {
    match node.node_type() {
        NodeType::Element => write_element(out, node, indent, depth),
        NodeType::Comment | NodeType::PI => {
            push_indent(out, indent, depth);
            write_inline(out, node);
            out.push('\n');
        }
        // Text with content only occurs inside elements written inline.
        NodeType::Text | NodeType::Root => {}
    }
}

fn write_element(out: &mut String, node: Node<'_, '_>, indent: &str, depth: usize) {
    push_indent(out, indent, depth);
    if has_text(node) {
        write_inline(out, node);
        out.push('\n');
        return;
    }

    let name = write_start_tag(out, node);
    let children: Vec<Node<'_, '_>> = node.children().filter(|c| !c.is_text()).collect();
    if children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    for child in children {
        write_node(out, child, indent, depth + 1);
    }
    push_indent(out, indent, depth);
    let _ = writeln!(out, "</{}>", name);
}

/// Write `node` and its subtree without adding or removing any whitespace.
fn write_inline(out: &mut String, node: Node<'_, '_>) {
    match node.node_type() {
        NodeType::Element => {
            let name = write_start_tag(out, node);
            if node.has_children() {
                out.push('>');
                for child in node.children() {
                    write_inline(out, child);
                }
                let _ = write!(out, "</{}>", name);
            } else {
                out.push_str("/>");
            }
        }
        NodeType::Text => out.push_str(&xml_escape(node.text().unwrap_or_default())),
        NodeType::Comment => {
            let _ = write!(out, "<!--{}-->", node.text().unwrap_or_default());
        }
        NodeType::PI => {
            if let Some(pi) = node.pi() {
                match pi.value {
                    Some(value) => {
                        let _ = write!(out, "<?{} {}?>", pi.target, value);
                    }
                    None => {
                        let _ = write!(out, "<?{}?>", pi.target);
                    }
                }
            }
        }
        NodeType::Root => {}
    }
}

fn has_text(node: Node<'_, '_>) -> bool {
    node.children()
        .any(|c| c.is_text() && c.text().map_or(false, |t| !t.trim().is_empty()))
}

/// Write `<name` with namespace declarations and attributes, leaving the tag open.
/// Returns the qualified name for the end tag.
fn write_start_tag(out: &mut String, node: Node<'_, '_>) -> String {
    let name = qualified_name(node, node.tag_name().namespace(), node.tag_name().name());
    out.push('<');
    out.push_str(&name);
    write_namespace_declarations(out, node);
    for attr in node.attributes() {
        let attr_name = qualified_name(node, attr.namespace(), attr.name());
        let _ = write!(out, " {}=\"{}\"", attr_name, xml_escape_attr(attr.value()));
    }
    name
}

/// Declare namespaces that come into scope on this element.
fn write_namespace_declarations(out: &mut String, node: Node<'_, '_>) {
    let parent = node.parent_element();
    for ns in node.namespaces() {
        if ns.name() == Some("xml") {
            continue;
        }
        let inherited = parent.map_or(false, |p| {
            p.namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
        });
        if inherited {
            continue;
        }
        match ns.name() {
            Some(prefix) => {
                let _ = write!(out, " xmlns:{}=\"{}\"", prefix, xml_escape_attr(ns.uri()));
            }
            None => {
                let _ = write!(out, " xmlns=\"{}\"", xml_escape_attr(ns.uri()));
            }
        }
    }
}

fn qualified_name(node: Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
        _ => local.to_string(),
    }
}

fn push_indent(out: &mut String, indent: &str, depth: usize) {
    for _ in 0..depth {
        out.push_str(indent);
    }
}

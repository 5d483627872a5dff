use super::{NodeId, NodeKind, XmlTree};

pub(super) fn write_document(tree: &XmlTree) -> String {
    let mut out = String::new();
    for &child in tree.children(tree.document()) {
        write_node(tree, child, &mut out);
    }
    out
}

pub(super) fn write_node(tree: &XmlTree, node: NodeId, out: &mut String) {
    match tree.kind(node) {
        NodeKind::Document => {
            for &child in tree.children(node) {
                write_node(tree, child, out);
            }
        }
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            match &element.raw_attributes {
                Some(raw) => out.push_str(raw),
                None => {
                    for (key, value) in &element.attributes {
                        out.push(' ');
                        out.push_str(key);
                        out.push_str("=\"");
                        out.push_str(value);
                        out.push('"');
                    }
                }
            }
            let children = tree.children(node);
            if children.is_empty() && element.self_closing {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for &child in children {
                write_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
        NodeKind::Text(text) => out.push_str(&text.raw),
        NodeKind::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        NodeKind::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        NodeKind::ProcessingInstruction(content) | NodeKind::Declaration(content) => {
            out.push_str("<?");
            out.push_str(content);
            out.push_str("?>");
        }
        NodeKind::DocType(content) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(content.trim_start());
            out.push('>');
        }
    }
}

pub(super) fn escape_text(value: &str) -> String {
    quick_xml::escape::partial_escape(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmodified_document_is_reproduced_exactly() {
        let source = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!-- note -->\n<a  x='1'\n   y=\"2\">\n  <b>&lt;tag&gt; &amp; more</b>\n  <c />\n  <![CDATA[raw <data>]]>\n</a>\n";
        let tree = XmlTree::parse(source).unwrap();
        assert_eq!(tree.to_xml_string(), source);
    }

    #[test]
    fn test_escape_text_escapes_markup_only() {
        assert_eq!(escape_text("a<b & 'c'"), "a&lt;b &amp; 'c'");
    }
}

//! Equation transcoding (OMML to MathML).

use super::RawEquation;
use roxmltree::{Document as XmlDocument, Node};

const MATH_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";
const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// Turns an equation's native representation into portable math markup.
///
/// Implementations must be side-effect free. A failed transcoding yields
/// `None` and the equation is dropped from its paragraph.
pub trait EquationTranscoder: Send + Sync {
    /// Transcode one equation to a MathML string.
    fn transcode(&self, equation: &RawEquation) -> Option<String>;
}

/// Transcoder that never produces equations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranscoder;

impl EquationTranscoder for NoopTranscoder {
    fn transcode(&self, _equation: &RawEquation) -> Option<String> {
        None
    }
}

/// Transcoder for a practical subset of OMML.
///
/// Handles runs, fractions, scripts, radicals, delimiters and n-ary
/// operators. Any other element contributes its children.
#[derive(Debug, Clone, Copy, Default)]
pub struct OmmlTranscoder;

impl EquationTranscoder for OmmlTranscoder {
    fn transcode(&self, equation: &RawEquation) -> Option<String> {
        // The fragment is cut out of a larger part, so namespace declarations
        // have to be supplied.
        let wrapped = format!(
            r#"<m:wrapper xmlns:m="{}" xmlns:w="{}">{}</m:wrapper>"#,
            MATH_NS, WML_NS, equation.omml
        );
        let xml = match XmlDocument::parse(&wrapped) {
            Ok(xml) => xml,
            Err(e) => {
                log::warn!("Failed to parse equation: {}", e);
                return None;
            }
        };

        let math = xml
            .root_element()
            .descendants()
            .find(|n| is_math(n, "oMath"))?;

        let mut out = format!(r#"<math xmlns="{}">"#, MATHML_NS);
        children(math, &mut out);
        out.push_str("</math>");
        Some(out)
    }
}

fn is_math(node: &Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(MATH_NS)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_math(n, name))
}

fn val<'a>(node: Node<'a, '_>, props: &str, name: &str) -> Option<&'a str> {
    let prop = child(child(node, props)?, name)?;
    prop.attributes()
        .find(|a| a.name() == "val")
        .map(|a| a.value())
}

fn children(node: Node, out: &mut String) {
    for c in node.children().filter(|c| c.is_element()) {
        element(c, out);
    }
}

fn row(node: Option<Node>, out: &mut String) {
    out.push_str("<mrow>");
    if let Some(node) = node {
        children(node, out);
    }
    out.push_str("</mrow>");
}

fn element(node: Node, out: &mut String) {
    if node.tag_name().namespace() != Some(MATH_NS) {
        return;
    }
    let name = node.tag_name().name();
    if name.ends_with("Pr") {
        return;
    }

    match name {
        "r" => run(node, out),
        "f" => {
            out.push_str("<mfrac>");
            row(child(node, "num"), out);
            row(child(node, "den"), out);
            out.push_str("</mfrac>");
        }
        "sSup" => {
            out.push_str("<msup>");
            row(child(node, "e"), out);
            row(child(node, "sup"), out);
            out.push_str("</msup>");
        }
        "sSub" => {
            out.push_str("<msub>");
            row(child(node, "e"), out);
            row(child(node, "sub"), out);
            out.push_str("</msub>");
        }
        "sSubSup" => {
            out.push_str("<msubsup>");
            row(child(node, "e"), out);
            row(child(node, "sub"), out);
            row(child(node, "sup"), out);
            out.push_str("</msubsup>");
        }
        "rad" => {
            let degree = child(node, "deg").filter(|d| d.children().any(|c| c.is_element()));
            match degree {
                Some(deg) => {
                    out.push_str("<mroot>");
                    row(child(node, "e"), out);
                    row(Some(deg), out);
                    out.push_str("</mroot>");
                }
                None => {
                    out.push_str("<msqrt>");
                    row(child(node, "e"), out);
                    out.push_str("</msqrt>");
                }
            }
        }
        "d" => {
            let open = val(node, "dPr", "begChr").unwrap_or("(");
            let close = val(node, "dPr", "endChr").unwrap_or(")");
            let sep = val(node, "dPr", "sepChr").unwrap_or(",");
            out.push_str("<mrow>");
            push_op(open, out);
            for (i, e) in node.children().filter(|n| is_math(n, "e")).enumerate() {
                if i > 0 {
                    push_op(sep, out);
                }
                row(Some(e), out);
            }
            push_op(close, out);
            out.push_str("</mrow>");
        }
        "nary" => {
            let op = val(node, "naryPr", "chr").unwrap_or("\u{222B}");
            out.push_str("<mrow><munderover>");
            push_op(op, out);
            row(child(node, "sub"), out);
            row(child(node, "sup"), out);
            out.push_str("</munderover>");
            row(child(node, "e"), out);
            out.push_str("</mrow>");
        }
        _ => children(node, out),
    }
}

fn run(node: Node, out: &mut String) {
    let text: String = node
        .children()
        .filter(|n| is_math(n, "t"))
        .filter_map(|t| t.text())
        .collect();
    if text.is_empty() {
        return;
    }

    let tag = if text.chars().all(|c| c.is_ascii_digit() || c == '.') {
        "mn"
    } else if text.chars().all(char::is_alphabetic) {
        "mi"
    } else {
        "mo"
    };
    out.push_str(&format!("<{tag}>{}</{tag}>", escape_xml(&text)));
}

fn push_op(op: &str, out: &mut String) {
    out.push_str(&format!("<mo>{}</mo>", escape_xml(op)));
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

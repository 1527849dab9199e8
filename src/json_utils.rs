use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Type of a JSON node found by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Object,
    Array,
}

/// Coordinates of a JSON structure within a larger text, including nested children.
#[derive(Debug, Clone)]
pub struct ObjCoords {
    pub start: usize,
    pub end: usize, // inclusive index of the closing bracket/brace
    pub kind: NodeType,
    pub children: Vec<ObjCoords>,
}

#[derive(Debug)]
struct Frame {
    start: usize,
    kind: NodeType,
    children: Vec<ObjCoords>,
}

/// Find all balanced JSON object/array structures in the given text. Coordinates are byte indices.
#[instrument(target = "quiz_forge::json", skip(text), fields(text_len = text.len()))]
pub fn find_json_structures(text: &str) -> Vec<ObjCoords> {
    let mut results: Vec<ObjCoords> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match b {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let closing = match b {
            // Quotes in surrounding prose (`a 5" ruler`) are not JSON strings.
            b'"' => {
                in_string = !stack.is_empty();
                continue;
            }
            b'{' => {
                stack.push(Frame { start: i, kind: NodeType::Object, children: Vec::new() });
                continue;
            }
            b'[' => {
                stack.push(Frame { start: i, kind: NodeType::Array, children: Vec::new() });
                continue;
            }
            b'}' => NodeType::Object,
            b']' => NodeType::Array,
            _ => continue,
        };

        // Unbalanced closers drop the open frame.
        if let Some(frame) = stack.pop() {
            if frame.kind == closing {
                let node = ObjCoords {
                    start: frame.start,
                    end: i,
                    kind: closing,
                    children: frame.children,
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => results.push(node),
                }
            }
        }
    }

    debug!(target: "quiz_forge::json", count = results.len(), "found root structures");
    results
}

/// Deserialize the first JSON object in `text` that matches `T`.
///
/// Roots are tried in order of appearance; a root that does not match is
/// searched depth-first through its children before moving on. Arrays are
/// only searched, never deserialized themselves.
pub fn extract_first<T: DeserializeOwned>(text: &str) -> Option<T> {
    fn from_node<T: DeserializeOwned>(text: &str, node: &ObjCoords) -> Option<T> {
        if node.kind == NodeType::Object {
            let candidate = &text[node.start..=node.end];
            if let Ok(value) = serde_json::from_str::<T>(candidate) {
                return Some(value);
            }
        }
        node.children.iter().find_map(|child| from_node(text, child))
    }

    find_json_structures(text)
        .iter()
        .find_map(|node| from_node(text, node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_brackets_inside_strings() {
        let text = r#"note: {"a": "closing } and ] inside", "b": [1, 2]} done"#;
        let roots = find_json_structures(text);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].kind, NodeType::Object);
        assert_eq!(roots[0].children.len(), 1);
        assert_eq!(&text[roots[0].start..=roots[0].end], r#"{"a": "closing } and ] inside", "b": [1, 2]}"#);
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let text = r#"{"q": "say \"hi\" {"}"#;
        let roots = find_json_structures(text);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].end, text.len() - 1);
    }
}

//! Plain-text rendering of scene nodes for the terminal.

use pdt_core::SceneNode;
use serde_json::Value;
use std::fmt::Write;

/// One line per node, indented by depth:
///
/// ```text
/// root Project layerCount=2
///   root_0 Layer "shapes"
///     root_0_0 Shape "rect_1" [selected]
/// ```
pub fn tree(root: &SceneNode) -> String {
    let mut out = String::new();
    write_node(&mut out, root, 0, false);
    out
}

/// A single node with every property, one per line.
pub fn node(node: &SceneNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0, true);
    out
}

fn write_node(out: &mut String, node: &SceneNode, depth: usize, with_properties: bool) {
    let _ = write!(out, "{:indent$}{} {}", "", node.id, node.kind, indent = depth * 2);
    if !node.name.is_empty() {
        let _ = write!(out, " {:?}", node.name);
    }
    if node.kind == "Project" {
        if let Some(count) = node.property("layerCount") {
            let _ = write!(out, " layerCount={count}");
        }
    }
    if !node.visible {
        out.push_str(" [hidden]");
    }
    if node.selected {
        out.push_str(" [selected]");
    }
    out.push('\n');

    if with_properties {
        for (key, value) in &node.properties {
            let _ = writeln!(out, "  {key}: {}", scalar(value));
        }
        return;
    }
    for child in &node.children {
        write_node(out, child, depth + 1, false);
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! Live scene → transferable tree.
//!
//! `serialize` turns a resolved [`Target`] into a [`SceneNode`], recursing
//! through children and assigning each one the id `<parent>_<index>`. The
//! project is its own variant of `Target`, so the root's different attribute
//! set (view size and layer count instead of geometry and colors) and its
//! different child accessor (layers) are chosen statically.
//!
//! The output is a pure function of the live tree: serializing an unchanged
//! tree twice yields equal nodes with equal ids.

use crate::model::{Item, ItemKind, Project};
use crate::path::{ROOT_ID, Target};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// A node of the serialized scene tree, as shown in the inspector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Positional id (`root`, `root_0`, `root_0_3`, ...).
    pub id: String,
    pub name: String,
    /// Class name of the live item (`Project`, `Layer`, `Path`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub children: Vec<SceneNode>,
    pub properties: BTreeMap<String, Value>,
    pub visible: bool,
    pub selected: bool,
}

impl SceneNode {
    /// Depth-first search for a node by id.
    pub fn find(&self, id: &str) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// All nodes of the subtree, parents first.
    pub fn descendants(&self) -> Vec<&SceneNode> {
        let mut out = vec![self];
        let mut i = 0;
        while i < out.len() {
            let node = out[i];
            out.extend(node.children.iter());
            i += 1;
        }
        out
    }
}

/// Serialize `target` under the id `id_prefix` (`""` means the root id).
/// Returns `None` when there is nothing to serialize.
pub fn serialize(target: Option<Target<'_>>, id_prefix: &str) -> Option<SceneNode> {
    let target = target?;
    let id = if id_prefix.is_empty() {
        ROOT_ID
    } else {
        id_prefix
    };
    Some(match target {
        Target::Project(project) => serialize_project(project, id),
        Target::Item(item) => serialize_item(item, id),
    })
}

/// Serialize the whole project as the root node.
pub fn serialize_project(project: &Project, id: &str) -> SceneNode {
    let mut properties = BTreeMap::new();
    if let Some(view) = &project.view {
        properties.insert("viewSize".to_string(), size_value(view.view_size));
    }
    properties.insert("layerCount".to_string(), json!(project.layers.len()));

    SceneNode {
        id: id.to_string(),
        name: String::new(),
        kind: "Project".to_string(),
        children: serialize_children(&project.layers, id),
        properties,
        visible: true,
        selected: false,
    }
}

/// Serialize one item and its subtree.
pub fn serialize_item(item: &Item, id: &str) -> SceneNode {
    log::trace!("serialize {} as {id}", item.class_name());

    let mut properties = BTreeMap::new();
    if let Some(bounds) = item.bounds() {
        properties.insert("position".to_string(), point_value(bounds.center()));
        properties.insert("bounds".to_string(), rect_value(bounds));
    }
    properties.insert("opacity".to_string(), json!(item.opacity));

    if item.has_style() {
        let style = &item.style;
        if let Some(css) = style.fill_color.as_ref().and_then(|p| p.to_css()) {
            properties.insert("fillColor".to_string(), json!(css));
        }
        if let Some(css) = style.stroke_color.as_ref().and_then(|p| p.to_css()) {
            properties.insert("strokeColor".to_string(), json!(css));
        }
        properties.insert("strokeWidth".to_string(), json!(style.stroke_width));
    }

    match &item.kind {
        ItemKind::Path { closed, segments } => {
            properties.insert("closed".to_string(), json!(closed));
            properties.insert("segmentCount".to_string(), json!(segments.len()));
        }
        ItemKind::Shape { shape, .. } => {
            properties.insert("shape".to_string(), json!(shape.as_str()));
        }
        ItemKind::PointText {
            content, font_size, ..
        } => {
            properties.insert("content".to_string(), json!(content));
            properties.insert("fontSize".to_string(), json!(font_size));
        }
        ItemKind::Raster { source, .. } => {
            properties.insert("source".to_string(), json!(source));
        }
        ItemKind::Layer { .. } | ItemKind::Group { .. } | ItemKind::CompoundPath { .. } => {}
    }

    SceneNode {
        id: id.to_string(),
        name: item.name.clone(),
        kind: item.class_name().to_string(),
        children: serialize_children(item.children(), id),
        properties,
        visible: item.visible,
        selected: item.selected,
    }
}

fn serialize_children(children: &[Item], parent_id: &str) -> Vec<SceneNode> {
    children
        .iter()
        .enumerate()
        .map(|(index, child)| serialize_item(child, &format!("{parent_id}_{index}")))
        .collect()
}

fn point_value(p: Point) -> Value {
    json!({ "x": p.x, "y": p.y })
}

fn size_value(s: Size) -> Value {
    json!({ "width": s.width, "height": s.height })
}

fn rect_value(r: Rect) -> Value {
    json!({ "x": r.x0, "y": r.y0, "width": r.width(), "height": r.height() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, GradientStop, Paint};
    use crate::model::{CanvasElement, View};
    use pretty_assertions::assert_eq;

    fn project() -> Project {
        let mut project = Project::new(Some(View::new(CanvasElement::new("c", 640.0, 480.0))));
        project.add_layer(
            Item::layer(vec![
                Item::rectangle(Rect::new(10.0, 20.0, 30.0, 60.0))
                    .with_name("box")
                    .with_fill(Paint::Solid(Color::from_rgb8(0x42, 0x85, 0xf4)))
                    .with_stroke(Paint::Solid(Color::rgba(0.0, 0.0, 0.0, 1.0)), 2.0),
                Item::group(vec![Item::path(
                    vec![Point::new(0.0, 0.0), Point::new(4.0, 4.0)],
                    true,
                )]),
            ])
            .with_name("main"),
        );
        project
    }

    #[test]
    fn root_reports_view_and_layers() {
        let project = project();
        let root = serialize(Some(Target::Project(&project)), "").unwrap();
        assert_eq!(root.id, "root");
        assert_eq!(root.kind, "Project");
        assert_eq!(root.property("layerCount"), Some(&json!(1)));
        assert_eq!(
            root.property("viewSize"),
            Some(&json!({ "width": 640.0, "height": 480.0 }))
        );
        assert!(root.property("position").is_none());
        assert_eq!(root.children[0].name, "main");
    }

    #[test]
    fn child_ids_follow_positions() {
        let project = project();
        let root = serialize_project(&project, ROOT_ID);
        let ids: Vec<&str> = root.descendants().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["root", "root_0", "root_0_0", "root_0_1", "root_0_1_0"]
        );
    }

    #[test]
    fn item_properties_are_copied() {
        let project = project();
        let root = serialize_project(&project, ROOT_ID);
        let rect = root.find("root_0_0").unwrap();
        assert_eq!(rect.kind, "Shape");
        assert_eq!(rect.property("fillColor"), Some(&json!("#4285f4")));
        assert_eq!(rect.property("strokeColor"), Some(&json!("#000000")));
        assert_eq!(rect.property("strokeWidth"), Some(&json!(2.0)));
        assert_eq!(rect.property("position"), Some(&json!({ "x": 20.0, "y": 40.0 })));
        assert_eq!(
            rect.property("bounds"),
            Some(&json!({ "x": 10.0, "y": 20.0, "width": 20.0, "height": 40.0 }))
        );

        let group = root.find("root_0_1").unwrap();
        assert!(group.property("fillColor").is_none());
        let path = root.find("root_0_1_0").unwrap();
        assert_eq!(path.property("closed"), Some(&json!(true)));
        assert_eq!(path.property("segmentCount"), Some(&json!(2)));
    }

    #[test]
    fn gradients_are_dropped() {
        let item = Item::rectangle(Rect::new(0.0, 0.0, 1.0, 1.0)).with_fill(Paint::Gradient {
            radial: true,
            stops: vec![GradientStop {
                offset: 1.0,
                color: Color::rgba(1.0, 1.0, 1.0, 1.0),
            }],
        });
        let node = serialize_item(&item, "root_0_0");
        assert!(node.property("fillColor").is_none());
    }

    #[test]
    fn absent_target_serializes_to_none() {
        assert_eq!(serialize(None, "root_1"), None);
    }

    #[test]
    fn serialization_is_deterministic() {
        let project = project();
        let a = serialize_project(&project, ROOT_ID);
        let b = serialize_project(&project, ROOT_ID);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn wire_shape_uses_type_field() {
        let node = serialize_item(&Item::group(Vec::new()), "root_0");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], json!("Group"));
        assert_eq!(value["children"], json!([]));
        assert_eq!(value["visible"], json!(true));
    }
}

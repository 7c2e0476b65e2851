//! Integration tests: live scene → serialized tree → id resolution.
//!
//! Every id the serializer hands out must resolve back to the item it was
//! produced from, and serializing that item on its own must reproduce the
//! same subtree.

use pdt_core::path::walk;
use pdt_core::serialize::serialize_project;
use pdt_core::{
    CanvasElement, Color, Item, NodePath, Paint, Point, Project, ROOT_ID, Rect, Target, View,
    resolve, serialize,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn scene() -> Project {
    let red = Paint::Solid(Color::from_rgb8(0xea, 0x43, 0x35));
    let blue = Paint::Solid(Color::from_rgb8(0x42, 0x85, 0xf4));

    let mut project = Project::new(Some(View::new(CanvasElement::new("main", 800.0, 600.0))));
    project.add_layer(
        Item::layer(vec![
            Item::rectangle(Rect::new(0.0, 0.0, 50.0, 50.0)).with_fill(red.clone()),
            Item::group(vec![
                Item::circle(Point::new(100.0, 100.0), 10.0).with_fill(blue.clone()),
                Item::group(vec![Item::path(
                    vec![
                        Point::new(0.0, 0.0),
                        Point::new(10.0, 0.0),
                        Point::new(10.0, 10.0),
                    ],
                    true,
                )]),
            ]),
        ])
        .with_name("base"),
    );
    project.add_layer(Item::layer(vec![
        Item::text(Point::new(20.0, 300.0), "label", 12.0).with_fill(blue),
    ]));
    project.add_layer(Item::layer(Vec::new()).with_name("empty"));
    project
}

#[test]
fn serialized_ids_resolve_to_their_items() {
    let project = scene();
    let root = serialize(Some(Target::Project(&project)), "").unwrap();

    let mut checked = 0;
    for node in root.descendants() {
        let path = NodePath::parse(&node.id).unwrap();
        assert_eq!(path.to_string(), node.id);

        let target = resolve(&project, &path).unwrap();
        assert_eq!(target.class_name(), node.kind);
        assert_eq!(serialize(Some(target), &node.id).as_ref(), Some(node));
        checked += 1;
    }
    assert_eq!(checked, 10);
}

#[test]
fn walk_and_serializer_agree_on_ids() {
    let project = scene();
    let root = serialize_project(&project, ROOT_ID);

    let mut walked = Vec::new();
    walk(&project, &mut |path, _| walked.push(path.to_string()));
    let serialized: Vec<String> = root.descendants().iter().map(|n| n.id.clone()).collect();

    walked.sort();
    let mut sorted = serialized.clone();
    sorted.sort();
    assert_eq!(walked, sorted);
}

#[test]
fn out_of_range_and_malformed_ids_do_not_resolve() {
    let project = scene();
    for id in ["root_3", "root_0_2", "root_0_0_0", "root_2_0"] {
        let path = NodePath::parse(id).unwrap();
        assert!(resolve(&project, &path).is_none(), "{id}");
    }
    for id in ["", "root_", "main_0", "root_0_a", "root_0.5"] {
        assert!(NodePath::parse(id).is_err(), "{id}");
    }
}

#[test]
fn empty_containers_have_no_geometry() {
    let project = scene();
    let root = serialize_project(&project, ROOT_ID);
    let empty = root.find("root_2").unwrap();
    assert_eq!(empty.name, "empty");
    assert!(empty.property("bounds").is_none());
    assert!(empty.property("position").is_none());
    assert_eq!(empty.property("opacity"), Some(&json!(1.0)));

    let group = root.find("root_0_1").unwrap();
    assert_eq!(
        group.property("bounds"),
        Some(&json!({ "x": 0.0, "y": 0.0, "width": 110.0, "height": 110.0 }))
    );
}

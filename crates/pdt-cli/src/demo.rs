//! The sample page the `pdt` host inspects.

use pdt_core::{CanvasElement, Color, Item, Paint, Point, Project, Rect, Vec2, View};

pub const CANVAS_ID: &str = "paper-canvas";

const FILLS: [&str; 7] = [
    "#4285F4", "#EA4335", "#FBBC05", "#34A853", "#8F00FF", "#FF6D01", "#00A8E1",
];
const STROKES: [&str; 5] = ["#000000", "#333333", "#555555", "#777777", "#999999"];

fn solid(hex: &str) -> Paint {
    Paint::Solid(Color::from_hex(hex).unwrap_or(Color::rgba(0.0, 0.0, 0.0, 1.0)))
}

/// Regular polygon around `center`, first vertex at angle zero.
fn polygon(center: Point, radius: f64, sides: usize) -> Vec<Point> {
    (0..sides)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / sides as f64;
            center + Vec2::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}

/// A fixed two-layer scene: a few shapes, a group, and some text.
pub fn scene() -> Project {
    let mut project = Project::new(Some(View::new(CanvasElement::new(CANVAS_ID, 800.0, 600.0))));

    project.add_layer(
        Item::layer(vec![
            Item::rectangle(Rect::new(60.0, 60.0, 180.0, 140.0))
                .with_name("rect_1")
                .with_fill(solid(FILLS[0]))
                .with_stroke(solid(STROKES[0]), 2.0),
            Item::circle(Point::new(320.0, 120.0), 48.0)
                .with_name("circle_2")
                .with_fill(solid(FILLS[1]))
                .with_stroke(solid(STROKES[1]), 2.0),
            Item::path(polygon(Point::new(520.0, 140.0), 60.0, 5), true)
                .with_name("path_3")
                .with_fill(solid(FILLS[2]))
                .with_stroke(solid(STROKES[2]), 2.0),
            Item::group(vec![
                Item::circle(Point::new(200.0, 380.0), 70.0)
                    .with_fill(solid(FILLS[3]))
                    .with_stroke(solid(STROKES[3]), 2.0),
                Item::text(Point::new(170.0, 386.0), "Paper", 18.0).with_fill(solid(STROKES[0])),
            ])
            .with_name("badge"),
        ])
        .with_name("shapes"),
    );
    let annotations = project.add_layer(Item::layer(Vec::new()).with_name("annotations"));
    project.activate_layer(annotations);
    project.insert_item(
        Item::text(Point::new(420.0, 420.0), "drag shapes to move them", 14.0)
            .with_name("hint")
            .with_fill(solid(STROKES[4])),
    );
    project
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_parses() {
        for hex in FILLS.iter().chain(STROKES.iter()) {
            assert!(Color::from_hex(hex).is_some(), "{hex}");
        }
    }

    #[test]
    fn scene_is_stable() {
        assert_eq!(scene(), scene());
        let project = scene();
        assert_eq!(project.layers.len(), 2);
        assert_eq!(project.layers[0].children().len(), 4);
        assert_eq!(
            project.hit_test(Point::new(100.0, 100.0)).map(|p| p.to_string()),
            Some("root_0_0".to_string())
        );
    }
}

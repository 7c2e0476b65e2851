//! Live scene model inspected by the devtools.
//!
//! A scene is a `Project` holding an ordered list of layers; every layer is an
//! `Item` whose `kind` decides which attributes it carries and whether it has
//! children. The set of kinds is closed, so everything downstream (the
//! serializer, property writes, path resolution) matches on `ItemKind`
//! instead of probing for attributes at runtime.
//!
//! Geometry is `kurbo` in canvas pixels. Bounds of containers are derived
//! from their visible children; `position` is always the bounds centre.

use crate::color::Paint;
use crate::path::NodePath;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use std::sync::{Arc, Mutex};

/// A scene instance shared between the host page and the inspector's page
/// context. Only the page side ever holds one.
pub type SceneHandle = Arc<Mutex<Project>>;

// ─── Canvas & View ───────────────────────────────────────────────────────

/// The DOM canvas a view draws into.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasElement {
    /// DOM `id` attribute. Pages are free to leave it unset.
    pub id: Option<String>,
    pub width: f64,
    pub height: f64,
}

impl CanvasElement {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: Some(id.into()),
            width,
            height,
        }
    }

    pub fn anonymous(width: f64, height: f64) -> Self {
        Self {
            id: None,
            width,
            height,
        }
    }
}

/// The view attached to a project: a canvas plus a redraw counter.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub element: CanvasElement,
    pub view_size: Size,
    update_count: u64,
}

impl View {
    pub fn new(element: CanvasElement) -> Self {
        let view_size = Size::new(element.width, element.height);
        Self {
            element,
            view_size,
            update_count: 0,
        }
    }

    /// Request a redraw of the canvas.
    pub fn update(&mut self) {
        self.update_count += 1;
        log::trace!("view update #{}", self.update_count);
    }

    /// Number of redraws requested since the view was created.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

// ─── Items ───────────────────────────────────────────────────────────────

/// Primitive shape kinds (`Shape.Rectangle`, `Shape.Circle`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Ellipse,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
        }
    }
}

/// Fill and stroke attributes of drawable items.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStyle {
    pub fill_color: Option<Paint>,
    pub stroke_color: Option<Paint>,
    pub stroke_width: f64,
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self {
            fill_color: None,
            stroke_color: None,
            stroke_width: 1.0,
        }
    }
}

/// The item kinds of the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// Top-level container directly under the project.
    Layer { children: Vec<Item> },

    /// Plain container.
    Group { children: Vec<Item> },

    /// Several paths drawn as one shape; the style lives on the compound.
    CompoundPath { children: Vec<Item> },

    /// Polyline / polygon through `segments`.
    Path { segments: Vec<Point>, closed: bool },

    /// Primitive shape filling `rect`.
    Shape { shape: ShapeKind, rect: Rect },

    /// Text anchored at its baseline start `point`.
    PointText {
        point: Point,
        content: String,
        font_size: f64,
    },

    /// Bitmap image placed at `rect`.
    Raster { rect: Rect, source: String },
}

/// A single node in the live scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub visible: bool,
    pub selected: bool,
    pub opacity: f64,
    pub style: ItemStyle,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            name: String::new(),
            visible: true,
            selected: false,
            opacity: 1.0,
            style: ItemStyle::default(),
            kind,
        }
    }

    pub fn layer(children: Vec<Item>) -> Self {
        Self::new(ItemKind::Layer { children })
    }

    pub fn group(children: Vec<Item>) -> Self {
        Self::new(ItemKind::Group { children })
    }

    pub fn rectangle(rect: Rect) -> Self {
        Self::new(ItemKind::Shape {
            shape: ShapeKind::Rectangle,
            rect,
        })
    }

    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(ItemKind::Shape {
            shape: ShapeKind::Circle,
            rect: Rect::from_center_size(center, (radius * 2.0, radius * 2.0)),
        })
    }

    pub fn path(segments: Vec<Point>, closed: bool) -> Self {
        Self::new(ItemKind::Path { segments, closed })
    }

    pub fn text(point: Point, content: impl Into<String>, font_size: f64) -> Self {
        Self::new(ItemKind::PointText {
            point,
            content: content.into(),
            font_size,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_fill(mut self, paint: Paint) -> Self {
        self.style.fill_color = Some(paint);
        self
    }

    pub fn with_stroke(mut self, paint: Paint, width: f64) -> Self {
        self.style.stroke_color = Some(paint);
        self.style.stroke_width = width;
        self
    }

    /// Class name reported to the inspector.
    pub fn class_name(&self) -> &'static str {
        match self.kind {
            ItemKind::Layer { .. } => "Layer",
            ItemKind::Group { .. } => "Group",
            ItemKind::CompoundPath { .. } => "CompoundPath",
            ItemKind::Path { .. } => "Path",
            ItemKind::Shape { .. } => "Shape",
            ItemKind::PointText { .. } => "PointText",
            ItemKind::Raster { .. } => "Raster",
        }
    }

    /// Children in paint order (back to front). Leaves have none.
    pub fn children(&self) -> &[Item] {
        match &self.kind {
            ItemKind::Layer { children }
            | ItemKind::Group { children }
            | ItemKind::CompoundPath { children } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Item>> {
        match &mut self.kind {
            ItemKind::Layer { children }
            | ItemKind::Group { children }
            | ItemKind::CompoundPath { children } => Some(children),
            _ => None,
        }
    }

    /// Whether the item draws with its own fill/stroke.
    pub fn has_style(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::CompoundPath { .. }
                | ItemKind::Path { .. }
                | ItemKind::Shape { .. }
                | ItemKind::PointText { .. }
        )
    }

    /// Containers forward style writes to their descendants.
    pub fn forwards_style(&self) -> bool {
        matches!(self.kind, ItemKind::Layer { .. } | ItemKind::Group { .. })
    }

    /// Axis-aligned bounds, or `None` for empty paths and empty containers.
    pub fn bounds(&self) -> Option<Rect> {
        match &self.kind {
            ItemKind::Layer { children }
            | ItemKind::Group { children }
            | ItemKind::CompoundPath { children } => children
                .iter()
                .filter(|c| c.visible)
                .filter_map(Item::bounds)
                .reduce(|acc, b| acc.union(b)),
            ItemKind::Path { segments, .. } => {
                let (first, rest) = segments.split_first()?;
                Some(
                    rest.iter()
                        .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p)),
                )
            }
            ItemKind::Shape { rect, .. } | ItemKind::Raster { rect, .. } => Some(*rect),
            ItemKind::PointText {
                point,
                content,
                font_size,
            } => {
                // Glyph metrics are not modelled; estimate with an average advance.
                let width = content.chars().count() as f64 * font_size * 0.6;
                Some(Rect::new(
                    point.x,
                    point.y - font_size,
                    point.x + width,
                    point.y,
                ))
            }
        }
    }

    /// Centre of the bounds.
    pub fn position(&self) -> Option<Point> {
        self.bounds().map(|b| b.center())
    }

    /// Move the item and all of its descendants.
    pub fn translate(&mut self, delta: Vec2) {
        self.transform(Affine::translate(delta), 1.0);
    }

    /// Scale and move the item so its bounds become `target`.
    /// Returns `false` if the item has no bounds.
    pub fn fit_bounds(&mut self, target: Rect) -> bool {
        let Some(current) = self.bounds() else {
            return false;
        };
        let ratio = |to: f64, from: f64| if from.abs() < f64::EPSILON { 1.0 } else { to / from };
        let sx = ratio(target.width(), current.width());
        let sy = ratio(target.height(), current.height());
        let affine = Affine::translate(target.origin().to_vec2())
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate(-current.origin().to_vec2());
        self.transform(affine, sy.abs());
        true
    }

    fn transform(&mut self, affine: Affine, font_scale: f64) {
        match &mut self.kind {
            ItemKind::Layer { children }
            | ItemKind::Group { children }
            | ItemKind::CompoundPath { children } => {
                for child in children {
                    child.transform(affine, font_scale);
                }
            }
            ItemKind::Path { segments, .. } => {
                for p in segments {
                    *p = affine * *p;
                }
            }
            ItemKind::Shape { rect, .. } | ItemKind::Raster { rect, .. } => {
                *rect = affine.transform_rect_bbox(*rect);
            }
            ItemKind::PointText {
                point, font_size, ..
            } => {
                *point = affine * *point;
                *font_size *= font_scale;
            }
        }
    }

    /// Apply `f` to this item and every descendant, parents first.
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Item)) {
        f(self);
        if let Some(children) = self.children_mut() {
            for child in children {
                child.for_each_mut(f);
            }
        }
    }

    fn hit_test(&self, point: Point, path: NodePath) -> Option<NodePath> {
        if !self.visible {
            return None;
        }
        if self.forwards_style() {
            // Containers are hit through their children only, topmost first.
            return self
                .children()
                .iter()
                .enumerate()
                .rev()
                .find_map(|(i, child)| child.hit_test(point, path.child(i)));
        }
        self.bounds()
            .filter(|b| b.contains(point))
            .map(|_| path)
    }
}

// ─── Project ─────────────────────────────────────────────────────────────

/// The scene's top-level container: an ordered list of layers and an
/// optional view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Project {
    pub layers: Vec<Item>,
    pub view: Option<View>,
    active_layer: Option<usize>,
}

impl Project {
    #[must_use]
    pub fn new(view: Option<View>) -> Self {
        Self {
            layers: Vec::new(),
            view,
            active_layer: None,
        }
    }

    /// Append a layer. The first layer becomes the active one.
    pub fn add_layer(&mut self, layer: Item) -> usize {
        self.layers.push(layer);
        let index = self.layers.len() - 1;
        self.active_layer.get_or_insert(index);
        index
    }

    pub fn active_layer(&self) -> Option<&Item> {
        self.active_layer.and_then(|i| self.layers.get(i))
    }

    /// Make layer `index` active. Returns `false` if it does not exist.
    pub fn activate_layer(&mut self, index: usize) -> bool {
        if index < self.layers.len() {
            self.active_layer = Some(index);
            true
        } else {
            false
        }
    }

    /// Insert `item` at the top of the active layer, creating a layer if the
    /// project has none. Returns the new item's path, or `None` if the active
    /// layer cannot hold children.
    pub fn insert_item(&mut self, item: Item) -> Option<NodePath> {
        let layer_index = match self.active_layer {
            Some(i) => i,
            None => self.add_layer(Item::layer(Vec::new())),
        };
        let children = self.layers.get_mut(layer_index)?.children_mut()?;
        children.push(item);
        Some(NodePath::root().child(layer_index).child(children.len() - 1))
    }

    /// Clear the selection flag on every item.
    pub fn deselect_all(&mut self) {
        for layer in &mut self.layers {
            layer.for_each_mut(&mut |item| item.selected = false);
        }
    }

    /// Paths of all selected items, in tree order.
    pub fn selected_paths(&self) -> Vec<NodePath> {
        let mut out = Vec::new();
        for (i, layer) in self.layers.iter().enumerate() {
            collect_selected(layer, NodePath::root().child(i), &mut out);
        }
        out
    }

    /// Find the topmost visible drawable item at `point`.
    /// Returns `None` if nothing is hit (background).
    pub fn hit_test(&self, point: Point) -> Option<NodePath> {
        self.layers
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, layer)| layer.hit_test(point, NodePath::root().child(i)))
    }
}

fn collect_selected(item: &Item, path: NodePath, out: &mut Vec<NodePath>) {
    if item.selected {
        out.push(path.clone());
    }
    for (i, child) in item.children().iter().enumerate() {
        collect_selected(child, path.child(i), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn sample() -> Project {
        let mut project = Project::new(Some(View::new(CanvasElement::new("c", 800.0, 600.0))));
        project.add_layer(Item::layer(vec![
            Item::rectangle(Rect::new(0.0, 0.0, 100.0, 50.0)).with_name("back"),
            Item::group(vec![
                Item::circle(Point::new(50.0, 25.0), 10.0).with_name("front"),
                Item::path(vec![Point::new(200.0, 200.0), Point::new(300.0, 260.0)], false),
            ]),
        ]));
        project
    }

    #[test]
    fn container_bounds_union_visible_children() {
        let mut project = sample();
        let group = &project.layers[0].children()[1];
        assert_eq!(group.bounds(), Some(Rect::new(40.0, 15.0, 300.0, 260.0)));

        project.layers[0].children_mut().unwrap()[1]
            .children_mut()
            .unwrap()[1]
            .visible = false;
        let group = &project.layers[0].children()[1];
        assert_eq!(group.bounds(), Some(Rect::new(40.0, 15.0, 60.0, 35.0)));
    }

    #[test]
    fn empty_containers_have_no_bounds() {
        assert_eq!(Item::group(Vec::new()).bounds(), None);
        assert_eq!(Item::path(Vec::new(), true).position(), None);
    }

    #[test]
    fn translate_moves_descendants() {
        let mut group = Item::group(vec![Item::rectangle(Rect::new(0.0, 0.0, 10.0, 10.0))]);
        group.translate(Vec2::new(5.0, -5.0));
        assert_eq!(group.position(), Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn fit_bounds_scales_and_moves() {
        let mut item = Item::path(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)],
            false,
        );
        assert!(item.fit_bounds(Rect::new(100.0, 100.0, 120.0, 110.0)));
        assert_eq!(item.bounds(), Some(Rect::new(100.0, 100.0, 120.0, 110.0)));
    }

    #[test]
    fn hit_test_returns_topmost_leaf() {
        let project = sample();
        // The circle overlaps the rectangle and is painted later.
        assert_eq!(
            project.hit_test(Point::new(50.0, 25.0)).map(|p| p.to_string()),
            Some("root_0_1_0".to_string())
        );
        assert_eq!(
            project.hit_test(Point::new(5.0, 5.0)).map(|p| p.to_string()),
            Some("root_0_0".to_string())
        );
        assert_eq!(project.hit_test(Point::new(700.0, 10.0)), None);
    }

    #[test]
    fn deselect_all_clears_nested_selection() {
        let mut project = sample();
        project.layers[0].selected = true;
        project.layers[0].children_mut().unwrap()[1]
            .children_mut()
            .unwrap()[0]
            .selected = true;
        assert_eq!(project.selected_paths().len(), 2);
        project.deselect_all();
        assert!(project.selected_paths().is_empty());
    }

    #[test]
    fn insert_item_targets_active_layer() {
        let mut project = Project::new(None);
        let path = project
            .insert_item(
                Item::rectangle(Rect::new(0.0, 0.0, 1.0, 1.0))
                    .with_fill(Paint::Solid(Color::rgba(1.0, 0.0, 0.0, 1.0))),
            )
            .unwrap();
        assert_eq!(path.to_string(), "root_0_0");
        assert_eq!(project.active_layer().map(|l| l.children().len()), Some(1));
    }
}

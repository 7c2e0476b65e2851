//! Property writes from the inspector back onto live items.
//!
//! Every write parses and validates its value first and only then mutates
//! the item, so a rejected write leaves the item exactly as it was.

use crate::color::Paint;
use crate::error::WriteError;
use crate::model::{Item, ItemKind};
use crate::path::TargetMut;
use kurbo::{Point, Rect};
use serde_json::Value;

/// Which style slot a color write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorSlot {
    Fill,
    Stroke,
}

/// Apply `value` to `property` on the resolved node.
///
/// `position` merges `{x, y}` into the current position (a missing axis keeps
/// its value); `fillColor` / `strokeColor` accept anything
/// [`Paint::from_value`] does; the remaining names map onto the matching item
/// attributes.
pub fn apply_property(target: TargetMut<'_>, property: &str, value: &Value) -> Result<(), WriteError> {
    match target {
        TargetMut::Project(_) => Err(WriteError::UnknownProperty {
            property: property.to_string(),
            kind: "Project",
        }),
        TargetMut::Item(item) => apply_item_property(item, property, value),
    }
}

fn apply_item_property(item: &mut Item, property: &str, value: &Value) -> Result<(), WriteError> {
    match property {
        "position" => {
            let current = item.position().ok_or(WriteError::NoBounds {
                kind: item.class_name(),
            })?;
            let next = merge_point(current, value)?;
            item.translate(next - current);
        }
        "bounds" => {
            let rect = parse_rect(value)?;
            if !item.fit_bounds(rect) {
                return Err(WriteError::NoBounds {
                    kind: item.class_name(),
                });
            }
        }
        "fillColor" => set_color(item, ColorSlot::Fill, property, value)?,
        "strokeColor" => set_color(item, ColorSlot::Stroke, property, value)?,
        "strokeWidth" => {
            let width = number(property, value, "a non-negative number")?;
            if width < 0.0 {
                return Err(WriteError::invalid(property, "a non-negative number", value));
            }
            set_style(item, property, &mut |target| target.style.stroke_width = width)?;
        }
        "opacity" => {
            let opacity = number(property, value, "a number between 0 and 1")?;
            if !(0.0..=1.0).contains(&opacity) {
                return Err(WriteError::invalid(property, "a number between 0 and 1", value));
            }
            item.opacity = opacity;
        }
        "visible" => item.visible = boolean(property, value)?,
        "selected" => item.selected = boolean(property, value)?,
        "name" => {
            item.name = match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                _ => return Err(WriteError::invalid(property, "a string", value)),
            };
        }
        "closed" => {
            let flag = boolean(property, value)?;
            match &mut item.kind {
                ItemKind::Path { closed, .. } => *closed = flag,
                _ => return Err(unknown(property, item)),
            }
        }
        "content" => {
            let Value::String(text) = value else {
                return Err(WriteError::invalid(property, "a string", value));
            };
            match &mut item.kind {
                ItemKind::PointText { content, .. } => *content = text.clone(),
                _ => return Err(unknown(property, item)),
            }
        }
        "fontSize" => {
            let size = number(property, value, "a positive number")?;
            if size <= 0.0 {
                return Err(WriteError::invalid(property, "a positive number", value));
            }
            match &mut item.kind {
                ItemKind::PointText { font_size, .. } => *font_size = size,
                _ => return Err(unknown(property, item)),
            }
        }
        _ => return Err(unknown(property, item)),
    }
    Ok(())
}

fn unknown(property: &str, item: &Item) -> WriteError {
    WriteError::UnknownProperty {
        property: property.to_string(),
        kind: item.class_name(),
    }
}

fn set_color(
    item: &mut Item,
    slot: ColorSlot,
    property: &str,
    value: &Value,
) -> Result<(), WriteError> {
    let paint = Paint::from_value(value)?;
    set_style(item, property, &mut |target| match slot {
        ColorSlot::Fill => target.style.fill_color = paint.clone(),
        ColorSlot::Stroke => target.style.stroke_color = paint.clone(),
    })
}

/// Run `write` on the item if it is styled, or on every styled descendant
/// if it is a layer or group.
fn set_style(
    item: &mut Item,
    property: &str,
    write: &mut impl FnMut(&mut Item),
) -> Result<(), WriteError> {
    if item.has_style() {
        write(item);
        Ok(())
    } else if item.forwards_style() {
        item.for_each_mut(&mut |descendant| {
            if descendant.has_style() {
                write(descendant);
            }
        });
        Ok(())
    } else {
        Err(unknown(property, item))
    }
}

fn number(property: &str, value: &Value, expected: &'static str) -> Result<f64, WriteError> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| WriteError::invalid(property, expected, value))
}

fn boolean(property: &str, value: &Value) -> Result<bool, WriteError> {
    value
        .as_bool()
        .ok_or_else(|| WriteError::invalid(property, "a boolean", value))
}

/// `{x?, y?}` merged over `current`, or a full `[x, y]` pair.
fn merge_point(current: Point, value: &Value) -> Result<Point, WriteError> {
    const EXPECTED: &str = "an {x, y} object or [x, y] pair";
    let axis = |v: Option<&Value>, fallback: f64| -> Result<f64, WriteError> {
        match v {
            None => Ok(fallback),
            Some(v) => number("position", v, EXPECTED),
        }
    };
    match value {
        Value::Object(map) => Ok(Point::new(
            axis(map.get("x"), current.x)?,
            axis(map.get("y"), current.y)?,
        )),
        Value::Array(pair) if pair.len() == 2 => Ok(Point::new(
            number("position", &pair[0], EXPECTED)?,
            number("position", &pair[1], EXPECTED)?,
        )),
        _ => Err(WriteError::invalid("position", EXPECTED, value)),
    }
}

fn parse_rect(value: &Value) -> Result<Rect, WriteError> {
    const EXPECTED: &str = "an {x, y, width, height} object";
    let field = |key: &str| -> Result<f64, WriteError> {
        value
            .get(key)
            .map_or(Err(WriteError::invalid("bounds", EXPECTED, value)), |v| {
                number("bounds", v, EXPECTED)
            })
    };
    let (x, y, width, height) = (field("x")?, field("y")?, field("width")?, field("height")?);
    if width < 0.0 || height < 0.0 {
        return Err(WriteError::invalid("bounds", EXPECTED, value));
    }
    Ok(Rect::new(x, y, x + width, y + height))
}

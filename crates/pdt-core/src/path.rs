//! Positional node ids and their resolution against a live project.
//!
//! A node id is `root` followed by one `_<index>` segment per level. The
//! first index selects a layer of the project; every later index selects a
//! child of the current item. Serialization and resolution share this rule,
//! so an id produced by the serializer always resolves to the item that
//! produced it (as long as the tree has not been restructured in between).

use crate::error::PathError;
use crate::model::{Item, Project};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// The id of the project node.
pub const ROOT_ID: &str = "root";

/// Parsed node id: child indices below the project.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(SmallVec<[usize; 8]>);

impl NodePath {
    /// The project itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse an id such as `root_0_2`.
    pub fn parse(id: &str) -> Result<Self, PathError> {
        let mut parts = id.split('_');
        match parts.next() {
            Some("") | None => return Err(PathError::Empty),
            Some(ROOT_ID) => {}
            Some(_) => return Err(PathError::MissingRoot(id.to_string())),
        }
        let segments = parts
            .map(|segment| {
                canonical_index(segment).ok_or_else(|| PathError::BadSegment {
                    id: id.to_string(),
                    segment: segment.to_string(),
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self(segments))
    }

    /// Path of the `index`-th child of this node.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(index);
        Self(segments)
    }

    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

/// A child index written the way the serializer writes it: plain digits,
/// no sign, no leading zero.
fn canonical_index(segment: &str) -> Option<usize> {
    let digits = segment.bytes().all(|b| b.is_ascii_digit());
    if !digits || segment.is_empty() || (segment.len() > 1 && segment.starts_with('0')) {
        return None;
    }
    segment.parse().ok()
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT_ID)?;
        for index in &self.0 {
            write!(f, "_{index}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({self})")
    }
}

// ─── Resolution ──────────────────────────────────────────────────────────

/// A resolved node: either the project or one of its items.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Project(&'a Project),
    Item(&'a Item),
}

impl Target<'_> {
    pub fn class_name(&self) -> &'static str {
        match self {
            Target::Project(_) => "Project",
            Target::Item(item) => item.class_name(),
        }
    }
}

/// Mutable counterpart of [`Target`].
#[derive(Debug)]
pub enum TargetMut<'a> {
    Project(&'a mut Project),
    Item(&'a mut Item),
}

/// Walk `path` down from the project. Out-of-range indices yield `None`.
pub fn resolve<'a>(project: &'a Project, path: &NodePath) -> Option<Target<'a>> {
    let Some((&first, rest)) = path.segments().split_first() else {
        return Some(Target::Project(project));
    };
    let mut item = project.layers.get(first)?;
    for &index in rest {
        item = item.children().get(index)?;
    }
    Some(Target::Item(item))
}

pub fn resolve_mut<'a>(project: &'a mut Project, path: &NodePath) -> Option<TargetMut<'a>> {
    let Some((&first, rest)) = path.segments().split_first() else {
        return Some(TargetMut::Project(project));
    };
    let mut item = project.layers.get_mut(first)?;
    for &index in rest {
        item = item.children_mut()?.get_mut(index)?;
    }
    Some(TargetMut::Item(item))
}

/// Visit every node of the project with its path, parents first.
pub fn walk<'a>(project: &'a Project, f: &mut impl FnMut(&NodePath, Target<'a>)) {
    let root = NodePath::root();
    f(&root, Target::Project(project));
    for (i, layer) in project.layers.iter().enumerate() {
        walk_item(layer, root.child(i), f);
    }
}

fn walk_item<'a>(item: &'a Item, path: NodePath, f: &mut impl FnMut(&NodePath, Target<'a>)) {
    f(&path, Target::Item(item));
    for (i, child) in item.children().iter().enumerate() {
        walk_item(child, path.child(i), f);
    }
}

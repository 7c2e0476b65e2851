//! Executes inspector commands against the active scene.
//!
//! Commands that cannot be answered (no active scope, an id that does not
//! resolve, toggling the project) produce no response at all; the relay's
//! timeout turns that silence into an error for the panel. Property writes
//! are the only command with an explicit `{error}` reply.

use crate::registry::ScopeRegistry;
use pdt_core::path::{resolve, resolve_mut};
use pdt_core::{
    Command, CommandEnvelope, NodePath, Project, Response, ResponseEnvelope, Target, TargetMut,
    apply_property, serialize,
};
use std::sync::PoisonError;

/// Run `envelope` against the registry's active scope.
pub fn handle(envelope: CommandEnvelope, registry: &ScopeRegistry) -> Option<ResponseEnvelope> {
    let CommandEnvelope { id, command } = envelope;
    log::debug!("{} [{id}]", command.action());

    let Some(handle) = registry.active_scope() else {
        log::warn!("{} [{id}]: no active scope", command.action());
        return None;
    };
    let mut project = handle.lock().unwrap_or_else(PoisonError::into_inner);
    let response = execute(&mut project, command)?;
    Some(ResponseEnvelope { id, response })
}

/// Run one command against `project`.
pub fn execute(project: &mut Project, command: Command) -> Option<Response> {
    match command {
        Command::GetSceneTree => scene_tree(project),

        Command::SelectNode { node_id } => {
            find_item(project, &node_id)?;
            project.deselect_all();
            if let Some(TargetMut::Item(item)) = find_item_mut(project, &node_id) {
                item.selected = true;
            }
            serialize(find_item(project, &node_id), &node_id).map(Response::Node)
        }

        Command::ToggleNodeVisibility { node_id } => {
            match find_item_mut(project, &node_id)? {
                TargetMut::Item(item) => item.visible = !item.visible,
                TargetMut::Project(_) => {
                    log::warn!("the project has no visibility to toggle");
                    return None;
                }
            }
            scene_tree(project)
        }

        Command::UpdateNodeProperty {
            node_id,
            property,
            value,
        } => {
            let target = find_item_mut(project, &node_id)?;
            if let Err(err) = apply_property(target, &property, &value) {
                log::warn!("update of {node_id}.{property} rejected: {err}");
                return Some(Response::Error(err.to_string()));
            }
            if let Some(view) = project.view.as_mut() {
                view.update();
            }
            serialize(find_item(project, &node_id), &node_id).map(Response::Node)
        }
    }
}

/// Resolve a node id against `project`. Malformed or out-of-range ids
/// resolve to `None` and are logged.
pub fn find_item<'a>(project: &'a Project, node_id: &str) -> Option<Target<'a>> {
    let target = resolve(project, &parse(node_id)?);
    if target.is_none() {
        log::warn!("no node at {node_id}");
    }
    target
}

pub fn find_item_mut<'a>(project: &'a mut Project, node_id: &str) -> Option<TargetMut<'a>> {
    let target = resolve_mut(project, &parse(node_id)?);
    if target.is_none() {
        log::warn!("no node at {node_id}");
    }
    target
}

fn scene_tree(project: &Project) -> Option<Response> {
    serialize(Some(Target::Project(project)), "").map(Response::SceneTree)
}

fn parse(node_id: &str) -> Option<NodePath> {
    NodePath::parse(node_id)
        .inspect_err(|err| log::warn!("{err}"))
        .ok()
}

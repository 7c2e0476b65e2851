pub mod color;
pub mod error;
pub mod model;
pub mod path;
pub mod protocol;
pub mod rpc;
pub mod serialize;
pub mod write;

pub use color::{Color, Paint};
pub use error::{PathError, ProtocolError, WriteError};
pub use model::*;
pub use path::{NodePath, ROOT_ID, Target, TargetMut, resolve, resolve_mut};
pub use protocol::{
    Command, CommandEnvelope, CorrelationId, RelayReply, RelayRequest, Response, ResponseEnvelope,
};
pub use rpc::{PendingReply, PendingRequests, RpcError};
pub use serialize::{SceneNode, serialize};
pub use write::apply_property;

// Re-export kurbo geometry so downstream crates don't need a direct dependency
pub use kurbo::{Point, Rect, Size, Vec2};

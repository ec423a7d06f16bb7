//! Scene error types

use super::SceneId;

/// Errors returned by scene registry and hierarchy operations
///
/// Frame-loop entry points never return these; they log and degrade instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Scene created without a name
    #[error("Scene needs a non-empty name")]
    InvalidName,

    /// Handle refers to an object that was removed from the store
    #[error("Object handle is no longer valid")]
    StaleHandle,

    /// Object is already attached to this scene
    #[error("Object is already attached to {0}")]
    AlreadyAttached(SceneId),

    /// Object is not attached to this scene
    #[error("Object is not attached to {0}")]
    NotAttached(SceneId),

    /// Sky objects go through the sky slot
    #[error("Sky sphere cannot be attached as an ordinary object; use attach_sky")]
    SkyAsObject,

    /// Mesh hierarchy parent does not precede its child
    #[error("Invalid mesh parent {parent} for node {child}")]
    InvalidMeshParent {
        /// Requested parent index
        parent: usize,
        /// Node being added
        child: usize,
    },

    /// No mesh node at this index
    #[error("Invalid mesh index: {0}")]
    InvalidMeshIndex(usize),

    /// No mesh node with this name
    #[error("No mesh named '{0}'")]
    UnknownMeshName(String),

    /// Point light capacity reached
    #[error("Point light limit reached ({0})")]
    PointLightLimit(usize),
}

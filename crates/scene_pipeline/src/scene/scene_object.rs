//! Header shared by every object a scene can hold

use bitflags::bitflags;

use super::SceneId;

bitflags! {
    /// Per-object behaviour switches
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ObjectFlags: u32 {
        /// Skipped by visibility computation entirely
        const IGNORE = 1 << 0;
        /// Drawn in the back-to-front transparent stage
        const TRANSPARENT = 1 << 1;
        /// Kept in visible lists but not drawn
        const HIDE = 1 << 2;
    }
}

/// Kind of scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SceneObjectType {
    /// Not classified
    #[default]
    Unknown,
    /// Plain positioned object
    SpatialObject,
    /// Single mesh
    MeshObject,
    /// Hierarchical composite of meshes
    MeshGroup,
    /// Sky dome; only attachable through the sky slot
    SkySphere,
    /// Screen-space or debug geometry without a position
    Overlay,
}

/// Name, flags and scene membership
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    name: String,
    object_type: SceneObjectType,
    flags: ObjectFlags,
    scenes: Vec<SceneId>,
    game_type: i32,
    game_id: Option<u32>,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self::new(SceneObjectType::Unknown)
    }
}

impl SceneObject {
    /// Unnamed object of the given type
    pub fn new(object_type: SceneObjectType) -> Self {
        Self {
            name: String::new(),
            object_type,
            flags: ObjectFlags::empty(),
            scenes: Vec::new(),
            game_type: -1,
            game_id: None,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Kind of object
    pub fn object_type(&self) -> SceneObjectType {
        self.object_type
    }

    /// All flags
    pub fn flags(&self) -> ObjectFlags {
        self.flags
    }

    /// Replace all flags
    pub fn set_flags(&mut self, flags: ObjectFlags) {
        self.flags = flags;
    }

    /// Whether any of `flags` is set
    pub fn has_flag(&self, flags: ObjectFlags) -> bool {
        self.flags.intersects(flags)
    }

    /// Set or clear `flags`
    pub fn modify_flag(&mut self, flags: ObjectFlags, enable: bool) {
        self.flags.set(flags, enable);
    }

    /// Whether the object is drawn; clears or sets [`ObjectFlags::HIDE`]
    pub fn set_visible(&mut self, visible: bool) {
        self.modify_flag(ObjectFlags::HIDE, !visible);
    }

    /// Whether [`ObjectFlags::HIDE`] is clear
    pub fn is_visible(&self) -> bool {
        !self.flags.contains(ObjectFlags::HIDE)
    }

    /// Scenes this object is attached to
    pub fn scenes(&self) -> &[SceneId] {
        &self.scenes
    }

    /// Whether attached to `scene`, or to any scene with `None`
    pub fn is_attached(&self, scene: Option<SceneId>) -> bool {
        match scene {
            Some(id) => self.scenes.contains(&id),
            None => !self.scenes.is_empty(),
        }
    }

    pub(crate) fn on_attached(&mut self, scene: SceneId) {
        if !self.scenes.contains(&scene) {
            self.scenes.push(scene);
        }
    }

    pub(crate) fn on_detached(&mut self, scene: SceneId) {
        self.scenes.retain(|id| *id != scene);
    }

    /// Game-side classification, `-1` when unset
    pub fn game_type(&self) -> i32 {
        self.game_type
    }

    /// Set the game-side classification
    pub fn set_game_type(&mut self, game_type: i32) {
        self.game_type = game_type;
    }

    /// Game-side identifier
    pub fn game_id(&self) -> Option<u32> {
        self.game_id
    }

    /// Set the game-side identifier
    pub fn set_game_id(&mut self, game_id: Option<u32>) {
        self.game_id = game_id;
    }
}

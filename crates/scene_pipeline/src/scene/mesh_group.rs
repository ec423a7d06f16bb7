//! Hierarchical composite of meshes
//!
//! Nodes are stored parent first, so a single forward sweep resolves every
//! world transform: a dirty node marks its children dirty before the sweep
//! reaches them.
//!
//! ```text
//! child world = parent animated world * offset * local
//! root world  = group location * offset [* local once the root was ever animated]
//! ```
//!
//! Changing one node's local rotation only recomputes that node and its
//! descendants. Moving the group recomputes everything.

use std::any::Any;
use std::collections::BTreeMap;

use super::error::SceneError;
use super::object_store::SpatialNode;
use super::scene_object::{ObjectFlags, SceneObjectType};
use super::spatial_object::SpatialObject;
use crate::config::MeshGroupConfig;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::render::{RenderParam, RenderParamOut, RenderPass, Renderable};

struct MeshNode {
    mesh: Box<dyn SpatialNode>,
    offset: Transform,
    local: Transform,
    changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Hierarchy {
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Meshes bound together under one transform
pub struct MeshGroup {
    spatial: SpatialObject,
    nodes: Vec<MeshNode>,
    hierarchy: BTreeMap<usize, Hierarchy>,
    last_update_frame: Option<u64>,
    last_pre_render_frame: Option<u64>,
    root_animated: bool,
    config: MeshGroupConfig,
}

impl std::fmt::Debug for MeshGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshGroup")
            .field("spatial", &self.spatial)
            .field("meshes", &self.nodes.len())
            .field("hierarchy", &self.hierarchy)
            .field("root_animated", &self.root_animated)
            .finish_non_exhaustive()
    }
}

impl Default for MeshGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshGroup {
    /// Empty group with default distance culling
    pub fn new() -> Self {
        Self::with_config(MeshGroupConfig::default())
    }

    /// Empty group
    pub fn with_config(config: MeshGroupConfig) -> Self {
        Self {
            spatial: SpatialObject::new(SceneObjectType::MeshGroup),
            nodes: Vec::new(),
            hierarchy: BTreeMap::new(),
            last_update_frame: None,
            last_pre_render_frame: None,
            root_animated: false,
            config,
        }
    }

    /// Append a mesh placed by `offset` in its parent's space
    ///
    /// The parent must already be in the group. The group's bounds grow to
    /// enclose the mesh's bounds.
    pub fn add_mesh(
        &mut self,
        mesh: Box<dyn SpatialNode>,
        offset: Transform,
        parent: Option<usize>,
    ) -> Result<usize, SceneError> {
        let index = self.nodes.len();
        if let Some(parent) = parent {
            if parent >= index {
                log::error!("MeshGroup: parent {parent} must be added before node {index}");
                return Err(SceneError::InvalidMeshParent { parent, child: index });
            }
        }

        let bounds = mesh.spatial().bounding_volume().clone();
        if index == 0 {
            self.spatial.set_bounding_volume(bounds);
        } else {
            self.spatial.merge_bounding_volume(&bounds);
        }

        self.nodes.push(MeshNode {
            mesh,
            offset,
            local: Transform::identity(),
            changed: true,
        });
        self.hierarchy.insert(index, Hierarchy { parent, children: Vec::new() });
        if let Some(parent) = parent {
            self.hierarchy.entry(parent).or_default().children.push(index);
        }
        Ok(index)
    }

    /// Number of meshes
    pub fn num_meshes(&self) -> usize {
        self.nodes.len()
    }

    /// Parent of a mesh
    pub fn mesh_parent(&self, index: usize) -> Option<usize> {
        self.hierarchy.get(&index)?.parent
    }

    /// Direct children of a mesh
    pub fn mesh_children(&self, index: usize) -> &[usize] {
        self.hierarchy.get(&index).map_or(&[][..], |h| &h.children)
    }

    /// Name of a mesh
    pub fn mesh_name(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(|node| node.mesh.spatial().header().name())
    }

    /// Index of the first mesh called `name`
    pub fn mesh_index(&self, name: &str) -> Result<usize, SceneError> {
        self.nodes
            .iter()
            .position(|node| node.mesh.spatial().header().name() == name)
            .ok_or_else(|| SceneError::UnknownMeshName(name.to_owned()))
    }

    /// Mesh at `index`
    pub fn mesh_object(&self, index: usize) -> Option<&dyn SpatialNode> {
        self.nodes.get(index).map(|node| &*node.mesh)
    }

    /// Mesh at `index`, mutably
    pub fn mesh_object_mut(&mut self, index: usize) -> Option<&mut (dyn SpatialNode + 'static)> {
        self.nodes.get_mut(index).map(|node| &mut *node.mesh)
    }

    /// Translation of a mesh's offset
    pub fn mesh_offset(&self, index: usize) -> Option<Vec3> {
        self.nodes.get(index).map(|node| node.offset.position)
    }

    /// Local rotation of a mesh
    pub fn mesh_rotation(&self, index: usize) -> Option<Quat> {
        self.nodes.get(index).map(|node| node.local.rotation)
    }

    fn node_mut(&mut self, index: usize) -> Result<&mut MeshNode, SceneError> {
        self.nodes.get_mut(index).ok_or_else(|| {
            log::error!("MeshGroup: invalid mesh index {index}");
            SceneError::InvalidMeshIndex(index)
        })
    }

    /// Replace a mesh's local rotation
    ///
    /// Marks only that mesh dirty; its descendants follow on the next
    /// [`Self::update_transform`].
    pub fn set_mesh_rotation(&mut self, index: usize, rotation: Quat) -> Result<(), SceneError> {
        let node = self.node_mut(index)?;
        node.local.rotation = rotation;
        node.changed = true;
        if index == 0 {
            self.root_animated = true;
        }
        Ok(())
    }

    /// Compose a rotation onto a mesh's local rotation
    pub fn add_mesh_rotation(&mut self, index: usize, rotation: &Quat) -> Result<(), SceneError> {
        let node = self.node_mut(index)?;
        node.local.add_rotation(rotation);
        node.changed = true;
        if index == 0 {
            self.root_animated = true;
        }
        Ok(())
    }

    /// Resolve dirty world transforms for `param.frame`
    ///
    /// Runs once per frame unless `force` is set. Returns how many meshes
    /// were recomputed.
    pub fn update_transform(&mut self, param: &RenderParam<'_>, force: bool) -> usize {
        if !force && self.last_update_frame.is_some_and(|frame| frame >= param.frame) {
            return 0;
        }
        self.last_update_frame = Some(param.frame);

        let group_changed = self.spatial.transform_changed();
        let mut recomputed = 0;
        for index in 0..self.nodes.len() {
            let node = &self.nodes[index];
            let animated = node.mesh.spatial().animation().is_some_and(|animation| animation.changed());
            if !(node.changed || group_changed || animated) {
                continue;
            }

            let Some(hierarchy) = self.hierarchy.get(&index) else {
                log::error!("MeshGroup: mesh {index} is not in the hierarchy");
                continue;
            };
            for &child in &hierarchy.children {
                if let Some(child) = self.nodes.get_mut(child) {
                    child.changed = true;
                }
            }

            let parent_world = match hierarchy.parent {
                Some(parent) => self.nodes[parent].mesh.spatial().animated_location().clone(),
                None => self.spatial.location().clone(),
            };
            let node = &mut self.nodes[index];
            let world = if hierarchy.parent.is_some() || self.root_animated {
                &(&parent_world * &node.offset) * &node.local
            } else {
                &parent_world * &node.offset
            };
            node.mesh.spatial_mut().set_location(world);
            node.changed = false;
            recomputed += 1;
        }

        self.spatial.clear_transform_changed();
        if recomputed > 0 {
            log::trace!("MeshGroup: recomputed {recomputed} of {} meshes", self.nodes.len());
        }
        recomputed
    }

    /// Transform from group space into the space of mesh `index`
    ///
    /// Logs an error and returns identity for a mesh outside the hierarchy.
    pub fn to_local_transform(&self, index: usize) -> Transform {
        let Some(node) = self.nodes.get(index) else {
            log::error!("MeshGroup: mesh index {index} is not in the hierarchy");
            return Transform::identity();
        };
        let mut transform = node.offset.clone();
        let mut parent = match self.hierarchy.get(&index) {
            Some(hierarchy) => hierarchy.parent,
            None => {
                log::error!("MeshGroup: mesh index {index} is not in the hierarchy");
                return Transform::identity();
            }
        };
        while let Some(current) = parent {
            let (Some(node), Some(hierarchy)) = (self.nodes.get(current), self.hierarchy.get(&current)) else {
                log::error!("MeshGroup: mesh index {current} is not in the hierarchy");
                return Transform::identity();
            };
            transform = &node.offset * &transform;
            parent = hierarchy.parent;
        }
        transform.inverse()
    }

    /// [`Self::to_local_transform`] for the first mesh called `name`
    pub fn to_local_transform_by_name(&self, name: &str) -> Transform {
        match self.mesh_index(name) {
            Ok(index) => self.to_local_transform(index),
            Err(err) => {
                log::error!("MeshGroup: {err}");
                Transform::identity()
            }
        }
    }

    /// Start an action on every animated mesh
    pub fn play_action(&mut self, name: &str, immediate: bool, reverse: bool) {
        for node in &mut self.nodes {
            node.mesh.spatial_mut().play_action(name, immediate, reverse);
        }
    }

    /// Whether any mesh finished `name`
    pub fn is_action_done(&self, name: &str) -> bool {
        self.nodes.iter().any(|node| node.mesh.spatial().is_action_done(name))
    }

    /// Whether any mesh is playing an action
    pub fn is_playing_action(&self) -> bool {
        self.nodes.iter().any(|node| node.mesh.spatial().is_playing_action())
    }

    fn is_hidden(&self) -> bool {
        self.spatial.header().has_flag(ObjectFlags::HIDE)
    }
}

impl Renderable for MeshGroup {
    fn pre_render(&mut self, param: &RenderParam<'_>, out: &mut RenderParamOut) {
        if self.is_hidden() || self.last_pre_render_frame == Some(param.frame) {
            return;
        }
        self.last_pre_render_frame = Some(param.frame);
        self.update_transform(param, false);
        for node in &mut self.nodes {
            node.mesh.pre_render(param, out);
        }
    }

    fn render(&mut self, param: &RenderParam<'_>, out: &mut RenderParamOut) {
        if self.is_hidden() {
            out.skipped += 1;
            return;
        }
        if param.render_pass == RenderPass::Normal {
            let distance = param
                .camera
                .and_then(|camera| self.spatial.dist_to_cam(camera.id()))
                .unwrap_or(0.0);
            if self.config.should_cull(distance, self.spatial.radius()) {
                out.skipped += 1;
                return;
            }
        }
        for node in &mut self.nodes {
            node.mesh.render(param, out);
        }
    }

    fn post_render(&mut self, param: &RenderParam<'_>, out: &mut RenderParamOut) {
        if self.is_hidden() {
            return;
        }
        for node in &mut self.nodes {
            node.mesh.post_render(param, out);
        }
    }
}

impl SpatialNode for MeshGroup {
    fn spatial(&self) -> &SpatialObject {
        &self.spatial
    }

    fn spatial_mut(&mut self) -> &mut SpatialObject {
        &mut self.spatial
    }

    fn update(&mut self, delta_time: f32) {
        self.spatial.update_animation(delta_time);
        for node in &mut self.nodes {
            node.mesh.update(delta_time);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

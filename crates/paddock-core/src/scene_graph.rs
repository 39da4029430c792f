//! Engine-independent scene graph
//!
//! A `SceneGraph` is a plain tree of nodes with local transforms and
//! triangle surfaces. It is what the asset source caches and what the
//! normalizer deep-copies, so it owns all of its data and clones cheaply
//! enough to be duplicated once per navigation transition.

use glam::{Mat4, Quat, Vec3};

/// Local transform of a node: translation, rotation, scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl NodeTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Affine matrix applying scale, then rotation, then translation
    pub fn compute_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Grow the box so it contains `point`
    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Per-axis extents
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Reflectance and shadow parameters of one surface
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMaterial {
    /// Linear RGBA base color
    pub base_color: [f32; 4],
    /// `None` when the source asset did not specify it
    pub metallic: Option<f32>,
    /// `None` when the source asset did not specify it
    pub roughness: Option<f32>,
    /// Set when the renderer must rebuild its material for this surface
    pub needs_update: bool,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: None,
            roughness: None,
            needs_update: false,
            cast_shadows: false,
            receive_shadows: false,
        }
    }
}

/// Renderable triangle geometry attached to a node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Surface {
    pub name: Option<String>,
    pub positions: Vec<[f32; 3]>,
    /// Either empty or one normal per position
    pub normals: Vec<[f32; 3]>,
    /// Triangle list indices; `None` means positions are consumed in order
    pub indices: Option<Vec<u32>>,
    pub material: SurfaceMaterial,
}

/// One node of the scene graph
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneNode {
    pub name: Option<String>,
    pub transform: NodeTransform,
    pub surfaces: Vec<Surface>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surfaces.push(surface);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    fn accumulate_bounds(&self, parent: &Mat4, bounds: &mut Option<Aabb>) {
        let world = *parent * self.transform.compute_matrix();
        for surface in &self.surfaces {
            for position in &surface.positions {
                let point = world.transform_point3(Vec3::from_array(*position));
                match bounds {
                    Some(aabb) => aabb.extend(point),
                    None => *bounds = Some(Aabb::from_point(point)),
                }
            }
        }
        for child in &self.children {
            child.accumulate_bounds(&world, bounds);
        }
    }

    fn visit_surfaces_mut(&mut self, f: &mut impl FnMut(&mut Surface)) {
        for surface in &mut self.surfaces {
            f(surface);
        }
        for child in &mut self.children {
            child.visit_surfaces_mut(f);
        }
    }

    fn visit_surfaces(&self, f: &mut impl FnMut(&Surface)) {
        for surface in &self.surfaces {
            f(surface);
        }
        for child in &self.children {
            child.visit_surfaces(f);
        }
    }
}

/// A complete scene: a single root node and everything below it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneGraph {
    pub root: SceneNode,
}

impl SceneGraph {
    pub fn new(root: SceneNode) -> Self {
        Self { root }
    }

    /// World-space bounding box over every vertex, including the root transform.
    ///
    /// Returns `None` when the graph has no vertices at all.
    pub fn bounds(&self) -> Option<Aabb> {
        let mut bounds = None;
        self.root.accumulate_bounds(&Mat4::IDENTITY, &mut bounds);
        bounds
    }

    pub fn for_each_surface_mut(&mut self, mut f: impl FnMut(&mut Surface)) {
        self.root.visit_surfaces_mut(&mut f);
    }

    pub fn for_each_surface(&self, mut f: impl FnMut(&Surface)) {
        self.root.visit_surfaces(&mut f);
    }

    pub fn surface_count(&self) -> usize {
        let mut count = 0;
        self.for_each_surface(|_| count += 1);
        count
    }

    pub fn vertex_count(&self) -> usize {
        let mut count = 0;
        self.for_each_surface(|surface| count += surface.positions.len());
        count
    }
}

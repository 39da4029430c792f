//! Presentation stage: spawns and despawns entity hierarchies for the
//! instances the viewing session attaches

use std::collections::HashMap;

use bevy::asset::RenderAssetUsages;
use bevy::ecs::system::SystemParam;
use bevy::light::{NotShadowCaster, NotShadowReceiver};
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use paddock_core::{InstanceId, PresentationInstance, SceneNode, Stage, Surface, SurfaceMaterial};

use crate::convert;

/// Root entity of an attached presentation instance; carries its yaw
#[derive(Component, Debug)]
pub struct PresentationRoot {
    pub id: InstanceId,
}

/// Mesh entity spawned for one surface
#[derive(Component, Debug)]
pub struct PresentationSurface;

/// Root entities of every attached instance
#[derive(Resource, Debug, Default)]
pub struct StageRegistry {
    roots: HashMap<InstanceId, Entity>,
}

impl StageRegistry {
    pub fn root(&self, id: InstanceId) -> Option<Entity> {
        self.roots.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StageRegistry>();
    }
}

/// `Stage` backed by the Bevy world
#[derive(SystemParam)]
pub struct SceneStage<'w, 's> {
    commands: Commands<'w, 's>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    registry: ResMut<'w, StageRegistry>,
}

impl SceneStage<'_, '_> {
    fn spawn_node(&mut self, node: &SceneNode) -> Entity {
        let entity = self
            .commands
            .spawn((
                Name::new(node.name.clone().unwrap_or_else(|| "node".to_string())),
                convert::transform(&node.transform),
                Visibility::default(),
            ))
            .id();

        for surface in &node.surfaces {
            let child = self.spawn_surface(surface);
            self.commands.entity(entity).add_child(child);
        }
        for child_node in &node.children {
            let child = self.spawn_node(child_node);
            self.commands.entity(entity).add_child(child);
        }
        entity
    }

    fn spawn_surface(&mut self, surface: &Surface) -> Entity {
        let mesh = self.meshes.add(surface_mesh(surface));
        let material = self.materials.add(standard_material(&surface.material));

        let mut entity = self.commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::default(),
            PresentationSurface,
        ));
        if let Some(name) = &surface.name {
            entity.insert(Name::new(name.clone()));
        }
        if !surface.material.cast_shadows {
            entity.insert(NotShadowCaster);
        }
        if !surface.material.receive_shadows {
            entity.insert(NotShadowReceiver);
        }
        entity.id()
    }
}

impl Stage for SceneStage<'_, '_> {
    fn attach(&mut self, instance: &PresentationInstance) {
        let model = self.spawn_node(&instance.graph().root);
        let root = self
            .commands
            .spawn((
                Name::new(format!("presentation {}", instance.path())),
                Transform::from_rotation(convert::quat(instance.orientation())),
                Visibility::default(),
                PresentationRoot { id: instance.id() },
            ))
            .add_child(model)
            .id();

        if let Some(previous) = self.registry.roots.insert(instance.id(), root) {
            tracing::warn!(instance = %instance.id(), "Instance attached twice, replacing");
            self.commands.entity(previous).despawn();
        }
        tracing::info!(
            instance = %instance.id(),
            path = instance.path(),
            surfaces = instance.graph().surface_count(),
            "Spawned presentation"
        );
    }

    fn detach(&mut self, id: InstanceId) {
        match self.registry.roots.remove(&id) {
            Some(root) => {
                self.commands.entity(root).despawn();
                tracing::debug!(instance = %id, "Despawned presentation");
            }
            None => tracing::warn!(instance = %id, "Detach of unknown instance"),
        }
    }
}

/// Triangle mesh for one surface; flat normals are generated when absent
pub fn surface_mesh(surface: &Surface) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, surface.positions.clone());
    if let Some(indices) = &surface.indices {
        mesh.insert_indices(Indices::U32(indices.clone()));
    }

    if !surface.normals.is_empty() && surface.normals.len() == surface.positions.len() {
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, surface.normals.clone());
    } else {
        if mesh.indices().is_some() {
            mesh.duplicate_vertices();
        }
        mesh.compute_flat_normals();
    }
    mesh
}

pub fn standard_material(material: &SurfaceMaterial) -> StandardMaterial {
    let [r, g, b, a] = material.base_color;
    StandardMaterial {
        base_color: Color::linear_rgba(r, g, b, a),
        metallic: material.metallic.unwrap_or(0.0),
        perceptual_roughness: material.roughness.unwrap_or(0.5),
        alpha_mode: if a < 1.0 { AlphaMode::Blend } else { AlphaMode::Opaque },
        ..default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use paddock_core::glam;
    use paddock_core::normalizer::normalize_graph;
    use paddock_core::{NodeTransform, SceneGraph};

    fn triangle() -> Surface {
        Surface {
            name: Some("tri".to_string()),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            ..Default::default()
        }
    }

    fn instance() -> PresentationInstance {
        let root = SceneNode::named("car")
            .with_surface(triangle())
            .with_child(
                SceneNode::named("wing")
                    .with_transform(NodeTransform::from_translation(glam::Vec3::Z))
                    .with_surface(triangle()),
            );
        let model = normalize_graph(&SceneGraph::new(root)).unwrap();
        PresentationInstance::new("models/test.glb", model)
    }

    fn stage_app() -> App {
        let mut app = App::new();
        app.add_plugins(StagePlugin)
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>();
        app
    }

    #[test]
    fn test_surface_mesh_generates_normals() {
        let mesh = surface_mesh(&triangle());
        assert_eq!(mesh.count_vertices(), 3);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
    }

    #[test]
    fn test_backfilled_material_values_are_used() {
        let material = standard_material(&SurfaceMaterial {
            metallic: Some(0.3),
            roughness: Some(0.7),
            ..Default::default()
        });
        assert_eq!(material.metallic, 0.3);
        assert_eq!(material.perceptual_roughness, 0.7);
    }

    #[test]
    fn test_attach_then_detach() {
        let mut app = stage_app();
        let instance = instance();
        let id = instance.id();

        app.world_mut()
            .run_system_once(move |mut stage: SceneStage| stage.attach(&instance))
            .unwrap();

        let world = app.world_mut();
        assert_eq!(world.resource::<StageRegistry>().len(), 1);
        assert_eq!(world.query::<&PresentationRoot>().iter(world).count(), 1);
        assert_eq!(world.query::<&PresentationSurface>().iter(world).count(), 2);
        // Normalized surfaces cast and receive shadows
        assert_eq!(world.query::<&NotShadowCaster>().iter(world).count(), 0);

        app.world_mut()
            .run_system_once(move |mut stage: SceneStage| stage.detach(id))
            .unwrap();

        let world = app.world_mut();
        assert!(world.resource::<StageRegistry>().is_empty());
        assert_eq!(world.query::<&PresentationRoot>().iter(world).count(), 0);
        assert_eq!(world.query::<&PresentationSurface>().iter(world).count(), 0);
    }
}

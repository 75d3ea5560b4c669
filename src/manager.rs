use std::collections::HashMap;

use bevy::prelude::*;

use phys2d::{BodyHandle, PhysAABB, PhysVector2, PhysWorld, RigidBody, WorldSettings};

use crate::spawner::{spawn_contact_marker, spawn_shape, SpawnArgs, SpawnMetadata};

/// Markers kept per body for drawing contact points.
const CONTACT_MARKERS_PER_BODY: usize = 2;

#[derive(Default, Resource)]
pub struct WorldData {
    pub selected_body: Option<(Entity, BodyHandle)>,
}

impl WorldData {
    pub fn select(&mut self, entity: Entity, handle: BodyHandle) -> &mut (Entity, BodyHandle) {
        self.selected_body.insert((entity, handle))
    }
}

pub struct Extents {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Extents {
    /// `true` once the box has left through the bottom or either side.
    pub fn has_escaped(&self, aabb: &PhysAABB) -> bool {
        aabb.max.y < self.bottom || aabb.max.x < self.left || aabb.min.x > self.right
    }
}

/// Bridges the physics world and the bevy entities drawing it.
///
/// Spawns requested while handling input are queued and only enter the world
/// between two steps.
#[derive(Resource)]
pub struct PhysManager {
    pub world: PhysWorld,
    pub world_extents: Extents,
    entities: HashMap<BodyHandle, Entity>,
    pending_bodies: Vec<(SpawnArgs, RigidBody)>,
    contact_list_render_pool: Vec<Entity>,
}

impl Default for PhysManager {
    fn default() -> Self {
        Self::new(PhysVector2::new(0.0, -98.1 * 5.0), Extents { left: -600.0, right: 600.0, bottom: -350.0 })
    }
}

impl PhysManager {
    pub const ITERATIONS: usize = 16;

    pub fn new(gravity: PhysVector2, world_extents: Extents) -> Self {
        let settings = WorldSettings { gravity, linear_damping: 0.05, angular_damping: 0.05, ..WorldSettings::default() };
        Self {
            world: PhysWorld::with_settings(settings),
            world_extents,
            entities: HashMap::new(),
            pending_bodies: vec![],
            contact_list_render_pool: vec![],
        }
    }

    pub fn queue_body(&mut self, body: RigidBody, spawn_args: SpawnArgs) {
        self.pending_bodies.push((spawn_args, body));
    }

    pub fn entity(&self, handle: BodyHandle) -> Option<Entity> {
        self.entities.get(&handle).copied()
    }

    pub fn body_count(&self) -> usize {
        self.world.body_count()
    }

    pub fn add_body(&mut self, commands: &mut Commands, body: RigidBody, spawn_args: SpawnArgs) -> BodyHandle {
        let entity = spawn_shape(commands, body.shape(), body.position(), spawn_args);
        for _ in 0..CONTACT_MARKERS_PER_BODY {
            self.contact_list_render_pool.push(spawn_contact_marker(commands));
        }

        let handle = self.world.add_body(body);
        self.entities.insert(handle, entity);
        handle
    }

    pub fn remove_body(&mut self, commands: &mut Commands, handle: BodyHandle) {
        if self.world.remove_body(handle).is_none() {
            return;
        }

        if let Some(entity) = self.entities.remove(&handle) {
            commands.entity(entity).despawn();
        }
        for _ in 0..CONTACT_MARKERS_PER_BODY {
            if let Some(marker) = self.contact_list_render_pool.pop() {
                commands.entity(marker).despawn();
            }
        }
    }

    /// Topmost body under `point`, if any.
    pub fn body_at_point(&mut self, point: PhysVector2) -> Option<(Entity, BodyHandle)> {
        let handle = self
            .world
            .bodies_mut()
            .filter_map(|(handle, body)| body.contains_point(point).then_some(handle))
            .last()?;
        Some((self.entity(handle)?, handle))
    }

    pub fn step(&mut self, commands: &mut Commands, entity_q: &mut Query<(&mut Transform, &mut Visibility, &SpawnMetadata)>, time: f32) {
        for (spawn_args, body) in std::mem::take(&mut self.pending_bodies) {
            self.add_body(commands, body, spawn_args);
        }

        self.world.step(time, Self::ITERATIONS);

        self.remove_fallen_bodies(commands);
        self.sync_transforms(entity_q);
        self.render_contacts(entity_q);
    }

    fn remove_fallen_bodies(&mut self, commands: &mut Commands) {
        let extents = &self.world_extents;
        let fallen: Vec<BodyHandle> = self
            .world
            .bodies_mut()
            .filter_map(|(handle, body)| extents.has_escaped(&body.aabb()).then_some(handle))
            .collect();

        for handle in fallen {
            debug!("Removing {} outside the world", handle);
            self.remove_body(commands, handle);
        }
    }

    fn sync_transforms(&self, entity_q: &mut Query<(&mut Transform, &mut Visibility, &SpawnMetadata)>) {
        for (handle, body) in self.world.bodies() {
            let Some(entity) = self.entity(handle) else {
                continue;
            };

            if let Ok((mut transform, _, _)) = entity_q.get_mut(entity) {
                transform.translation.x = body.position().x;
                transform.translation.y = body.position().y;
                transform.rotation = Quat::from_rotation_z(body.rotation());
            }
        }
    }

    fn render_contacts(&self, entity_q: &mut Query<(&mut Transform, &mut Visibility, &SpawnMetadata)>) {
        // final sub-iteration only; earlier ones repeat the same contacts
        let mut contact_points = self.world.contacts().iter().flat_map(|contact| contact.contact_points());

        for render_entity in self.contact_list_render_pool.iter() {
            let Ok((mut transform, mut render_vis, _)) = entity_q.get_mut(*render_entity) else {
                continue;
            };

            match contact_points.next() {
                Some(point) => {
                    (transform.translation.x, transform.translation.y) = (point.x, point.y);
                    *render_vis = Visibility::Visible;
                }
                None => *render_vis = Visibility::Hidden,
            }
        }
    }
}

use core::fmt;

use log::{debug, trace, warn};

use crate::{
    error::{PhysError, Result},
    math::{
        aabb::PhysAABB,
        clamp,
        collision::{collide, find_contact_points, intersect_aabb, Intersection},
        manifold::PhysManifold,
        rigidbody::RigidBody,
        vector::PhysVector2,
    },
    solver::resolve_collision,
};

/// Stable identity of a body inside one world. Never reused after removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(u64);

impl BodyHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body#{}", self.0)
    }
}

/// Tunables of a world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldSettings {
    pub gravity: PhysVector2,
    /// Fraction of the remaining penetration removed by positional correction.
    pub correction_percent: f32,
    /// Penetration depth that is tolerated before correcting.
    pub penetration_slop: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: PhysVector2::new(0.0, -9.81),
            correction_percent: 1.0,
            penetration_slop: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }
}

/// Counters of the last call to [`PhysWorld::step`], summed over its sub-iterations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub iterations: usize,
    pub candidate_pairs: usize,
    pub narrow_phase_tests: usize,
    pub manifolds: usize,
}

/// Owns every body and advances them together.
///
/// Bodies keep insertion order; manifolds refer to bodies by their index in that order.
#[derive(Clone, Debug)]
pub struct PhysWorld {
    settings: WorldSettings,
    bodies: Vec<(BodyHandle, RigidBody)>,
    next_handle: u64,
    contacts: Vec<PhysManifold>,
    contact_points: Vec<PhysVector2>,
    stats: StepStats,
}

impl Default for PhysWorld {
    fn default() -> Self {
        Self::with_settings(WorldSettings::default())
    }
}

impl PhysWorld {
    pub const MIN_ITERATIONS: usize = 1;
    pub const MAX_ITERATIONS: usize = 16;

    pub fn new(gravity: PhysVector2) -> Self {
        Self::with_settings(WorldSettings { gravity, ..WorldSettings::default() })
    }

    pub fn with_settings(settings: WorldSettings) -> Self {
        Self {
            settings,
            bodies: vec![],
            next_handle: 0,
            contacts: vec![],
            contact_points: vec![],
            stats: StepStats::default(),
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut WorldSettings {
        &mut self.settings
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;

        debug!("Adding {} as {}", body, handle);
        self.bodies.push((handle, body));
        handle
    }

    pub fn add_bodies(&mut self, bodies: impl IntoIterator<Item = RigidBody>) -> Vec<BodyHandle> {
        bodies.into_iter().map(|body| self.add_body(body)).collect()
    }

    /// Removes a body, keeping the relative order of the others. Unknown handles are ignored.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let index = self.index_of(handle)?;
        let (_, body) = self.bodies.remove(index);
        debug!("Removed {} at index {}", handle, index);
        Some(body)
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.contacts.clear();
        self.contact_points.clear();
    }

    pub fn get_body(&self, index: usize) -> Result<&RigidBody> {
        let len = self.bodies.len();
        self.bodies
            .get(index)
            .map(|(_, body)| body)
            .ok_or(PhysError::IndexOutOfRange { index, len })
    }

    pub fn get_body_mut(&mut self, index: usize) -> Result<&mut RigidBody> {
        let len = self.bodies.len();
        self.bodies
            .get_mut(index)
            .map(|(_, body)| body)
            .ok_or(PhysError::IndexOutOfRange { index, len })
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.iter().find(|(h, _)| *h == handle).map(|(_, body)| body)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.iter_mut().find(|(h, _)| *h == handle).map(|(_, body)| body)
    }

    pub fn index_of(&self, handle: BodyHandle) -> Option<usize> {
        self.bodies.iter().position(|(h, _)| *h == handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter().map(|(handle, body)| (*handle, body))
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut RigidBody)> {
        self.bodies.iter_mut().map(|(handle, body)| (*handle, body))
    }

    /// Contact points of every manifold resolved during the last step, in resolution order.
    pub fn contact_points(&self) -> &[PhysVector2] {
        &self.contact_points
    }

    /// Manifolds of the final sub-iteration of the last step.
    pub fn contacts(&self) -> &[PhysManifold] {
        &self.contacts
    }

    pub fn last_step_stats(&self) -> StepStats {
        self.stats
    }

    /// Advances the world by `delta_time` seconds split into `iterations` sub-steps.
    pub fn step(&mut self, delta_time: f32, iterations: usize) {
        self.contact_points.clear();
        self.contacts.clear();
        self.stats = StepStats::default();

        if !delta_time.is_finite() || delta_time < 0.0 {
            warn!("Skipping step with invalid delta time {}", delta_time);
            return;
        }

        let num_iterations = clamp(iterations, Self::MIN_ITERATIONS, Self::MAX_ITERATIONS);
        if num_iterations != iterations {
            debug!("Clamped iterations from {} to {}", iterations, num_iterations);
        }
        self.stats.iterations = num_iterations;

        for _ in 0..num_iterations {
            self.step_bodies(delta_time, num_iterations);

            self.contacts.clear();

            //--- COLLISION DETECTION ---//
            let contact_pairs = self.broad_phase();
            self.narrow_phase(&contact_pairs);
            //--- COLLISION DETECTION ---//

            self.resolve_contacts();
        }

        trace!(
            "Step done: {} bodies, {} candidate pairs, {} manifolds, {} contact points",
            self.bodies.len(),
            self.stats.candidate_pairs,
            self.stats.manifolds,
            self.contact_points.len()
        );
    }

    fn step_bodies(&mut self, delta_time: f32, iterations: usize) {
        let WorldSettings { gravity, linear_damping, angular_damping, .. } = self.settings;
        let time = delta_time / iterations as f32;

        for (_, body) in self.bodies.iter_mut() {
            body.step(delta_time, iterations, gravity);
            body.damp(linear_damping, angular_damping, time);
        }
    }

    fn broad_phase(&mut self) -> Vec<(usize, usize)> {
        let aabbs: Vec<PhysAABB> = self.bodies.iter_mut().map(|(_, body)| body.aabb()).collect();

        let length = self.bodies.len();
        let mut contact_pairs: Vec<(usize, usize)> = vec![];
        for i in 0..length {
            for j in i + 1..length {
                if self.bodies[i].1.is_static() && self.bodies[j].1.is_static() {
                    continue;
                }

                if !intersect_aabb(&aabbs[i], &aabbs[j]) {
                    continue;
                }

                contact_pairs.push((i, j));
            }
        }

        self.stats.candidate_pairs += contact_pairs.len();
        contact_pairs
    }

    fn narrow_phase(&mut self, contact_pairs: &[(usize, usize)]) {
        let settings = self.settings;

        for &(a_index, b_index) in contact_pairs {
            let Some((first_body, second_body)) = get_two_body_mut(&mut self.bodies, a_index, b_index) else {
                continue;
            };

            self.stats.narrow_phase_tests += 1;
            let Some(intersection) = collide(&first_body.world_shape(), &second_body.world_shape()) else {
                continue;
            };

            separate_bodies(first_body, second_body, intersection, &settings);

            let contacts = find_contact_points(&first_body.world_shape(), &second_body.world_shape());
            self.contacts.push(PhysManifold::new(a_index, b_index, intersection.normal, intersection.depth, contacts));
            self.stats.manifolds += 1;
        }
    }

    fn resolve_contacts(&mut self) {
        for contact in self.contacts.iter_mut() {
            if let Some((first_body, second_body)) = get_two_body_mut(&mut self.bodies, contact.a_index, contact.b_index) {
                resolve_collision(first_body, second_body, contact);
            }

            self.contact_points.extend(contact.contact_points());
        }
    }
}

/// Positional correction. A static body absorbs none of it, two dynamic bodies split it evenly.
fn separate_bodies(first_body: &mut RigidBody, second_body: &mut RigidBody, intersection: Intersection, settings: &WorldSettings) {
    let amount = (intersection.depth - settings.penetration_slop).max(0.0) * settings.correction_percent;
    if amount <= 0.0 {
        return;
    }

    let correction = intersection.normal * amount;
    if first_body.is_static() {
        second_body.move_body(correction);
    } else if second_body.is_static() {
        first_body.move_body(-correction);
    } else {
        first_body.move_body(-correction / 2.0);
        second_body.move_body(correction / 2.0);
    }
}

fn get_two_body_mut(
    bodies: &mut [(BodyHandle, RigidBody)],
    a_index: usize,
    b_index: usize,
) -> Option<(&mut RigidBody, &mut RigidBody)> {
    if a_index.max(b_index) >= bodies.len() {
        return None;
    }

    if a_index < b_index {
        // `a` is in the left half
        let (left, right) = bodies.split_at_mut(b_index);
        Some((&mut left[a_index].1, &mut right[0].1))
    } else if a_index == b_index {
        None
    } else {
        let (left, right) = bodies.split_at_mut(a_index);
        Some((&mut right[0].1, &mut left[b_index].1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{
        material::PhysMaterial,
        rigidbody::{create_circle_body, create_rect_body},
    };
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn material() -> Arc<PhysMaterial> {
        Arc::new(PhysMaterial::new(1.0, 0.0, 0.0).unwrap())
    }

    fn square(x: f32, y: f32, is_static: bool) -> RigidBody {
        create_rect_body(PhysVector2::new(x, y), material(), 2.0, 2.0, is_static).unwrap()
    }

    fn weightless() -> PhysWorld {
        PhysWorld::new(PhysVector2::ZERO)
    }

    #[test]
    fn world_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PhysWorld>();
    }

    #[test]
    fn iterations_are_clamped() {
        let mut world = weightless();
        world.step(0.1, 0);
        assert_eq!(world.last_step_stats().iterations, PhysWorld::MIN_ITERATIONS);
        world.step(0.1, 100);
        assert_eq!(world.last_step_stats().iterations, PhysWorld::MAX_ITERATIONS);
        world.step(0.1, 4);
        assert_eq!(world.last_step_stats().iterations, 4);
    }

    #[test]
    fn invalid_delta_time_skips_step() {
        let mut world = PhysWorld::default();
        let handle = world.add_body(square(0.0, 0.0, false));

        world.step(f32::NAN, 1);
        world.step(-1.0, 1);
        world.step(f32::INFINITY, 1);

        let body = world.body(handle).unwrap();
        assert_eq!(body.position(), PhysVector2::ZERO);
        assert_eq!(body.linear_velocity, PhysVector2::ZERO);
        assert_eq!(world.last_step_stats(), StepStats::default());
    }

    #[test]
    fn gravity_is_split_across_sub_steps() {
        let mut world = PhysWorld::new(PhysVector2::new(0.0, -10.0));
        world.add_body(square(0.0, 0.0, false));
        world.step(1.0, 4);

        let body = world.get_body(0).unwrap();
        assert_relative_eq!(body.linear_velocity.y, -10.0, epsilon = 1e-5);
        // 0.25 * (2.5 + 5.0 + 7.5 + 10.0)
        assert_relative_eq!(body.position().y, -6.25, epsilon = 1e-4);
    }

    #[test]
    fn handles_survive_removal() {
        let mut world = weightless();
        let handles = world.add_bodies([square(0.0, 0.0, false), square(10.0, 0.0, false), square(20.0, 0.0, false)]);
        assert_eq!(world.body_count(), 3);

        let removed = world.remove_body(handles[1]).unwrap();
        assert_eq!(removed.position(), PhysVector2::new(10.0, 0.0));
        assert!(world.remove_body(handles[1]).is_none());

        assert_eq!(world.index_of(handles[2]), Some(1));
        assert_eq!(world.get_body(1).unwrap().position(), PhysVector2::new(20.0, 0.0));

        let next = world.add_body(square(30.0, 0.0, false));
        assert!(!handles.contains(&next));

        world.clear();
        assert_eq!(world.body_count(), 0);
        assert!(world.body(next).is_none());
    }

    #[test]
    fn get_body_reports_out_of_range() {
        let mut world = weightless();
        world.add_body(square(0.0, 0.0, false));

        assert_eq!(world.get_body(1).unwrap_err(), PhysError::IndexOutOfRange { index: 1, len: 1 });
        assert!(matches!(world.get_body_mut(5), Err(PhysError::IndexOutOfRange { index: 5, len: 1 })));
        assert!(world.get_body_mut(0).is_ok());
    }

    #[test]
    fn static_pairs_and_touching_boxes_are_not_candidates() {
        let mut world = weightless();
        world.add_body(square(0.0, 0.0, true));
        world.add_body(square(1.0, 0.0, true));
        world.add_body(square(10.0, 0.0, false));
        world.add_body(square(12.0, 0.0, false));

        world.step(0.0, 1);

        let stats = world.last_step_stats();
        assert_eq!(stats.candidate_pairs, 0);
        assert_eq!(stats.narrow_phase_tests, 0);
        assert!(world.contacts().is_empty());
    }

    #[test]
    fn dynamic_bodies_share_correction() {
        let mut world = weightless();
        world.add_body(square(0.0, 0.0, false));
        world.add_body(square(1.5, 0.0, false));

        world.step(0.0, 1);

        assert_relative_eq!(world.get_body(0).unwrap().position().x, -0.25, epsilon = 1e-5);
        assert_relative_eq!(world.get_body(1).unwrap().position().x, 1.75, epsilon = 1e-5);

        let contacts = world.contacts();
        assert_eq!(contacts.len(), 1);
        assert_eq!((contacts[0].a_index, contacts[0].b_index), (0, 1));
        assert_relative_eq!(contacts[0].normal.x, 1.0);
        assert_relative_eq!(contacts[0].depth, 0.5, epsilon = 1e-5);
        assert_eq!(world.contact_points().len(), usize::from(contacts[0].contact_count));
    }

    #[test]
    fn static_body_absorbs_no_correction() {
        let mut world = weightless();
        world.add_body(square(0.0, 0.0, true));
        world.add_body(square(1.5, 0.0, false));

        world.step(0.0, 1);

        assert_eq!(world.get_body(0).unwrap().position(), PhysVector2::ZERO);
        assert_relative_eq!(world.get_body(1).unwrap().position().x, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn partial_correction_respects_slop() {
        let mut world = PhysWorld::with_settings(WorldSettings {
            gravity: PhysVector2::ZERO,
            correction_percent: 0.5,
            penetration_slop: 0.1,
            ..WorldSettings::default()
        });
        world.add_body(square(0.0, 0.0, false));
        world.add_body(square(1.5, 0.0, false));

        world.step(0.0, 1);

        assert_relative_eq!(world.get_body(0).unwrap().position().x, -0.1, epsilon = 1e-5);
        assert_relative_eq!(world.get_body(1).unwrap().position().x, 1.6, epsilon = 1e-5);
    }

    #[test]
    fn contact_points_accumulate_over_sub_steps() {
        let mut world = weightless();
        world.add_body(create_circle_body(PhysVector2::ZERO, material(), 1.0, true).unwrap());
        world.add_body(create_circle_body(PhysVector2::new(1.5, 0.0), material(), 1.0, false).unwrap());

        world.step(0.0, 3);

        // resolved on the first sub-step, touching afterwards
        assert_eq!(world.last_step_stats().manifolds, 1);
        assert_eq!(world.contact_points().len(), 1);
        assert!(world.contacts().is_empty());
        assert_relative_eq!(world.contact_points()[0].x, 1.0, epsilon = 1e-5);
    }

    fn ball(x: f32, velocity: f32) -> RigidBody {
        let mut body = create_circle_body(PhysVector2::new(x, 0.0), material(), 1.0, false).unwrap();
        body.linear_velocity = PhysVector2::new(velocity, 0.0);
        body
    }

    #[test]
    fn manifolds_resolve_in_row_major_order() {
        let mut world = weightless();
        world.add_bodies([ball(0.0, 5.0), ball(1.5, 0.0), ball(3.0, 0.0), ball(-1.5, 4.0)]);

        world.step(0.0, 1);

        let pairs: Vec<(usize, usize)> = world.contacts().iter().map(|c| (c.a_index, c.b_index)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 3), (1, 2)]);
        assert_eq!(world.last_step_stats().candidate_pairs, 3);

        // corrections are applied pair by pair, each seeing the previous ones
        let positions: Vec<f32> = world.bodies().map(|(_, body)| body.position().x).collect();
        assert_eq!(positions, vec![0.125, 1.375, 3.375, -1.875]);

        // (0,1) shares 5 -> 2.5, (0,3) shares 2.5 and 4 -> 3.25, (1,2) shares 2.5 -> 1.25
        let velocities: Vec<f32> = world.bodies().map(|(_, body)| body.linear_velocity.x).collect();
        for (velocity, expected) in velocities.iter().zip([3.25, 1.25, 1.25, 3.25]) {
            assert_relative_eq!(*velocity, expected, epsilon = 1e-5);
        }
        assert_eq!(world.contact_points().len(), 3);
    }

    #[test]
    fn final_contacts_hold_one_sub_step() {
        let mut world = PhysWorld::new(PhysVector2::new(0.0, -10.0));
        world.add_body(create_rect_body(PhysVector2::ZERO, material(), 10.0, 2.0, true).unwrap());
        world.add_body(square(0.0, 2.0, false));

        world.step(1.0 / 60.0, 4);

        let final_points: Vec<PhysVector2> = world.contacts().iter().flat_map(|c| c.contact_points()).collect();
        assert_eq!(world.contacts().len(), 1);
        assert_eq!(final_points.len(), 2);
        assert_eq!(world.contact_points().len(), 8);
        assert_eq!(&world.contact_points()[6..], final_points.as_slice());
    }

    #[test]
    fn two_body_access_rejects_aliasing() {
        let mut bodies = vec![(BodyHandle(0), square(0.0, 0.0, false)), (BodyHandle(1), square(5.0, 0.0, false))];
        assert!(get_two_body_mut(&mut bodies, 0, 0).is_none());
        assert!(get_two_body_mut(&mut bodies, 0, 2).is_none());

        let (a, b) = get_two_body_mut(&mut bodies, 1, 0).unwrap();
        assert_eq!(a.position().x, 5.0);
        assert_eq!(b.position().x, 0.0);
    }
}

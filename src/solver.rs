//! Sequential impulse contact resolution with rotation and Coulomb friction.

use crate::math::{manifold::PhysManifold, rigidbody::RigidBody, vector::PhysVector2, vector_nearly_equal};

/// Resolves one manifold in place, writing the applied impulse magnitudes back into it.
///
/// All normal impulses are computed from the velocities at entry and then applied
/// together; the friction pass runs afterwards because its cone depends on them.
pub fn resolve_collision(body_a: &mut RigidBody, body_b: &mut RigidBody, manifold: &mut PhysManifold) {
    let count = usize::from(manifold.contact_count.min(2));
    if count == 0 {
        return;
    }

    let normal = manifold.normal;
    let contacts = manifold.contacts();

    let (material_a, material_b) = (body_a.material(), body_b.material());
    let restitution = material_a.restitution().min(material_b.restitution());
    let static_friction = (material_a.static_friction() + material_b.static_friction()) * 0.5;
    let dynamic_friction = (material_a.dynamic_friction() + material_b.dynamic_friction()) * 0.5;

    let mut arms = [(PhysVector2::ZERO, PhysVector2::ZERO); 2];
    for (arm, contact) in arms.iter_mut().zip(contacts).take(count) {
        *arm = (contact - body_a.position(), contact - body_b.position());
    }

    let mut normal_impulses = [0.0_f32; 2];
    for (i, &(ra, rb)) in arms.iter().enumerate().take(count) {
        let relative_velocity = relative_velocity(body_a, body_b, ra, rb);

        let contact_velocity = relative_velocity.dot(normal);
        if contact_velocity >= 0.0 {
            continue;
        }

        let denominator = effective_mass(body_a, body_b, ra, rb, normal);
        if denominator <= 0.0 {
            continue;
        }

        normal_impulses[i] = -(1.0 + restitution) * contact_velocity / denominator / count as f32;
    }

    for (i, &(ra, rb)) in arms.iter().enumerate().take(count) {
        apply_impulse_pair(body_a, body_b, ra, rb, normal * normal_impulses[i]);
    }

    let mut friction_impulses = [0.0_f32; 2];
    let mut tangents = [PhysVector2::ZERO; 2];
    for (i, &(ra, rb)) in arms.iter().enumerate().take(count) {
        let relative_velocity = relative_velocity(body_a, body_b, ra, rb);

        let tangent = relative_velocity - normal * relative_velocity.dot(normal);
        if vector_nearly_equal(tangent, PhysVector2::ZERO) {
            continue;
        }
        let tangent = tangent.normalize();

        let denominator = effective_mass(body_a, body_b, ra, rb, tangent);
        if denominator <= 0.0 {
            continue;
        }

        let tangent_impulse = -relative_velocity.dot(tangent) / denominator / count as f32;
        friction_impulses[i] = clamp_friction(tangent_impulse, normal_impulses[i], static_friction, dynamic_friction);
        tangents[i] = tangent;
    }

    for (i, &(ra, rb)) in arms.iter().enumerate().take(count) {
        apply_impulse_pair(body_a, body_b, ra, rb, tangents[i] * friction_impulses[i]);
    }

    manifold.normal_impulses = normal_impulses;
    manifold.friction_impulses = friction_impulses;
}

/// Coulomb cone: keep the tangential impulse while it stays within static friction,
/// otherwise replace it by kinetic friction acting against the slide.
pub fn clamp_friction(tangent_impulse: f32, normal_impulse: f32, static_friction: f32, dynamic_friction: f32) -> f32 {
    if tangent_impulse.abs() <= normal_impulse * static_friction {
        tangent_impulse
    } else {
        tangent_impulse.signum() * normal_impulse * dynamic_friction
    }
}

/// Velocity of the contact point on `b` relative to the one on `a`.
fn relative_velocity(body_a: &RigidBody, body_b: &RigidBody, ra: PhysVector2, rb: PhysVector2) -> PhysVector2 {
    let velocity_a = body_a.linear_velocity + ra.perp() * body_a.rotational_velocity;
    let velocity_b = body_b.linear_velocity + rb.perp() * body_b.rotational_velocity;
    velocity_b - velocity_a
}

fn effective_mass(body_a: &RigidBody, body_b: &RigidBody, ra: PhysVector2, rb: PhysVector2, direction: PhysVector2) -> f32 {
    let ra_perp_dot = ra.perp().dot(direction);
    let rb_perp_dot = rb.perp().dot(direction);

    body_a.inverse_mass()
        + body_b.inverse_mass()
        + ra_perp_dot * ra_perp_dot * body_a.inverse_inertia()
        + rb_perp_dot * rb_perp_dot * body_b.inverse_inertia()
}

/// Pushes `a` by `-impulse` and `b` by `+impulse` at the given lever arms.
fn apply_impulse_pair(body_a: &mut RigidBody, body_b: &mut RigidBody, ra: PhysVector2, rb: PhysVector2, impulse: PhysVector2) {
    body_a.linear_velocity -= impulse * body_a.inverse_mass();
    body_a.rotational_velocity -= ra.cross(impulse) * body_a.inverse_inertia();
    body_b.linear_velocity += impulse * body_b.inverse_mass();
    body_b.rotational_velocity += rb.cross(impulse) * body_b.inverse_inertia();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{
        manifold::ContactPoints,
        material::PhysMaterial,
        rigidbody::{create_circle_body, create_rect_body},
    };
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn material(restitution: f32, static_friction: f32, dynamic_friction: f32) -> Arc<PhysMaterial> {
        Arc::new(PhysMaterial::with_friction(1.0, restitution, static_friction, dynamic_friction).unwrap())
    }

    fn head_on(restitution: f32, speed_a: f32, speed_b: f32) -> (RigidBody, RigidBody, PhysManifold) {
        let matter = material(restitution, 0.0, 0.0);
        let mut a = create_circle_body(PhysVector2::ZERO, matter.clone(), 1.0, false).unwrap();
        let mut b = create_circle_body(PhysVector2::new(2.0, 0.0), matter, 1.0, false).unwrap();
        a.linear_velocity = PhysVector2::new(speed_a, 0.0);
        b.linear_velocity = PhysVector2::new(speed_b, 0.0);

        let contacts = ContactPoints::single(PhysVector2::new(1.0, 0.0));
        let mut manifold = PhysManifold::new(0, 1, PhysVector2::UNIT_X, 0.0, contacts);
        resolve_collision(&mut a, &mut b, &mut manifold);
        (a, b, manifold)
    }

    #[test]
    fn elastic_collision_exchanges_velocities() {
        let (a, b, _) = head_on(1.0, 3.0, -1.0);
        assert_relative_eq!(a.linear_velocity.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(b.linear_velocity.x, 3.0, epsilon = 1e-5);
        assert_eq!(a.rotational_velocity, 0.0);
    }

    #[test]
    fn inelastic_collision_shares_velocity() {
        let (a, b, _) = head_on(0.0, 2.0, 0.0);
        assert_relative_eq!(a.linear_velocity.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(b.linear_velocity.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn separating_contacts_receive_no_impulse() {
        let (a, b, manifold) = head_on(1.0, -1.0, 1.0);
        assert_eq!(a.linear_velocity.x, -1.0);
        assert_eq!(b.linear_velocity.x, 1.0);
        assert_eq!(manifold.normal_impulses, [0.0, 0.0]);
    }

    #[test]
    fn friction_clamp_keeps_static_impulse() {
        assert_eq!(clamp_friction(-0.5, 2.0, 0.5, 0.3), -0.5);
        assert_eq!(clamp_friction(1.0, 2.0, 0.5, 0.3), 1.0);
    }

    #[test]
    fn friction_clamp_switches_to_dynamic() {
        assert_relative_eq!(clamp_friction(-5.0, 2.0, 0.5, 0.3), -0.6);
        assert_relative_eq!(clamp_friction(5.0, 2.0, 0.5, 0.3), 0.6);
        assert_eq!(clamp_friction(-5.0, 0.0, 0.5, 0.3), 0.0);
    }

    fn sliding_box(velocity: PhysVector2) -> (RigidBody, RigidBody, PhysManifold) {
        let mut ground = create_rect_body(PhysVector2::ZERO, material(0.0, 0.6, 0.4), 10.0, 2.0, true).unwrap();
        let mut crate_body = create_rect_body(PhysVector2::new(0.0, 2.0), material(0.0, 0.5, 0.3), 2.0, 2.0, false).unwrap();
        crate_body.linear_velocity = velocity;

        let contacts = ContactPoints {
            contact_one: PhysVector2::new(-1.0, 1.0),
            contact_two: PhysVector2::new(1.0, 1.0),
            contact_count: 2,
        };
        let mut manifold = PhysManifold::new(0, 1, PhysVector2::UNIT_Y, 0.01, contacts);
        resolve_collision(&mut ground, &mut crate_body, &mut manifold);
        (ground, crate_body, manifold)
    }

    #[test]
    fn fast_slide_is_bounded_by_kinetic_friction() {
        let (ground, crate_body, manifold) = sliding_box(PhysVector2::new(10.0, -1.0));
        let (static_friction, dynamic_friction) = (0.55, 0.35);

        for i in 0..2 {
            let normal_impulse = manifold.normal_impulses[i];
            let friction_impulse = manifold.friction_impulses[i];
            assert!(normal_impulse > 0.0);
            assert!(friction_impulse.abs() <= static_friction * normal_impulse + 1e-6);
            assert_relative_eq!(friction_impulse, -dynamic_friction * normal_impulse, max_relative = 1e-4);
        }

        assert!(crate_body.linear_velocity.x < 10.0);
        assert!(crate_body.linear_velocity.x > 0.0);
        assert!(crate_body.linear_velocity.y > -1.0);
        assert_eq!(ground.linear_velocity, PhysVector2::ZERO);
        assert_eq!(ground.rotational_velocity, 0.0);
    }

    #[test]
    fn slow_slide_is_stopped_by_static_friction() {
        let (_, crate_body, manifold) = sliding_box(PhysVector2::new(0.05, -1.0));

        for i in 0..2 {
            assert!(manifold.friction_impulses[i].abs() <= 0.55 * manifold.normal_impulses[i]);
            assert_relative_eq!(manifold.friction_impulses[i], -0.04, epsilon = 1e-5);
        }

        // both contacts sit one unit below the center
        let contact_slip = crate_body.linear_velocity.x + crate_body.rotational_velocity;
        assert_relative_eq!(contact_slip, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn off_center_contact_induces_spin() {
        let matter = material(0.0, 0.0, 0.0);
        let mut ground = create_rect_body(PhysVector2::ZERO, matter.clone(), 10.0, 2.0, true).unwrap();
        let mut crate_body = create_rect_body(PhysVector2::new(0.0, 2.0), matter, 2.0, 2.0, false).unwrap();
        crate_body.linear_velocity = PhysVector2::new(0.0, -1.0);

        let contacts = ContactPoints::single(PhysVector2::new(1.0, 1.0));
        let mut manifold = PhysManifold::new(0, 1, PhysVector2::UNIT_Y, 0.01, contacts);
        resolve_collision(&mut ground, &mut crate_body, &mut manifold);

        assert!(crate_body.rotational_velocity > 0.0);
        assert!(crate_body.linear_velocity.y > -1.0);
        assert_eq!(ground.rotational_velocity, 0.0);
    }
}

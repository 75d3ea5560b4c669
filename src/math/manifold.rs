use super::vector::PhysVector2;

/// Up to two world-space contact points between a pair of bodies.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContactPoints {
    pub contact_one: PhysVector2,
    pub contact_two: PhysVector2,
    pub contact_count: u8,
}

impl ContactPoints {
    pub fn single(point: PhysVector2) -> Self {
        Self { contact_one: point, contact_two: PhysVector2::ZERO, contact_count: 1 }
    }

    pub fn points(&self) -> impl Iterator<Item = PhysVector2> {
        [self.contact_one, self.contact_two].into_iter().take(self.contact_count as usize)
    }
}

/// A detected collision between the bodies at `a_index` and `b_index` of the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysManifold {
    pub a_index: usize,
    pub b_index: usize,
    /// Unit normal pointing from body `a` toward body `b`.
    pub normal: PhysVector2,
    pub depth: f32,
    pub contact_one: PhysVector2,
    pub contact_two: PhysVector2,
    pub contact_count: u8,
    /// Normal impulse magnitude applied at each contact by the solver.
    pub normal_impulses: [f32; 2],
    /// Signed tangential impulse applied at each contact by the solver.
    pub friction_impulses: [f32; 2],
}

impl PhysManifold {
    pub fn new(a_index: usize, b_index: usize, normal: PhysVector2, depth: f32, contacts: ContactPoints) -> Self {
        Self {
            a_index,
            b_index,
            normal,
            depth,
            contact_one: contacts.contact_one,
            contact_two: contacts.contact_two,
            contact_count: contacts.contact_count,
            normal_impulses: [0.0; 2],
            friction_impulses: [0.0; 2],
        }
    }

    pub fn contacts(&self) -> [PhysVector2; 2] {
        [self.contact_one, self.contact_two]
    }

    pub fn contact_points(&self) -> impl Iterator<Item = PhysVector2> {
        self.contacts().into_iter().take(self.contact_count as usize)
    }
}

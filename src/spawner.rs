use bevy::prelude::*;
use bevy_prototype_lyon::{
    prelude::{Fill, GeometryBuilder, ShapeBundle, Stroke},
    shapes,
};
use once_cell::sync::Lazy;
use thiserror::Error;

use phys2d::{PhysError, PhysShape, PhysVector2, ShapeKind};

pub static DEFAULT_Z_VALUE: f32 = 1.0;
pub static DEFAULT_STROKE_WIDTH: f32 = 2.5;
pub static DEFAULT_FILL_COLOR: Lazy<Color> = Lazy::new(|| Color::rgba_u8(224, 108, 117, 255));
pub static DEFAULT_STROKE_COLOR: Lazy<Color> = Lazy::new(|| Color::rgba_u8(20, 24, 32, 255));
pub static SELECTED_STROKE_COLOR: Lazy<Color> = Lazy::new(|| Color::rgba_u8(136, 156, 194, 255));
pub static CONTACT_COLOR: Lazy<Color> = Lazy::new(|| Color::rgba_u8(229, 192, 123, 255));

#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("invalid body: {0}")]
    Body(#[from] PhysError),
}

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub enum SpawnType {
    Polygon { sides: usize },
    Circle { radius: f32 },
    ContactMarker,
    Line,
}

#[derive(Component)]
pub struct SpawnMetadata {
    pub shape_type: SpawnType,
}

#[derive(Clone, Copy)]
pub struct SpawnArgs {
    pub z_value: f32,
    pub fill_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f32,
    pub is_visible: bool,
}

impl Default for SpawnArgs {
    fn default() -> Self {
        Self {
            z_value: DEFAULT_Z_VALUE,
            fill_color: *DEFAULT_FILL_COLOR,
            stroke_color: *DEFAULT_STROKE_COLOR,
            stroke_width: DEFAULT_STROKE_WIDTH,
            is_visible: true,
        }
    }
}

impl SpawnArgs {
    pub fn filled(fill_color: Color) -> Self {
        Self { fill_color, ..Self::default() }
    }
}

pub fn to_vec2(vector: PhysVector2) -> Vec2 {
    Vec2::new(vector.x, vector.y)
}

pub fn to_phys(vector: Vec2) -> PhysVector2 {
    PhysVector2::new(vector.x, vector.y)
}

fn visibility(args: &SpawnArgs) -> Visibility {
    if args.is_visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    }
}

/// Draws a body shape. The entity's transform carries the pose, so the outline stays in local space.
pub fn spawn_shape(commands: &mut Commands, shape: &PhysShape, position: PhysVector2, args: SpawnArgs) -> Entity {
    match shape.kind() {
        ShapeKind::Circle { radius } => spawn_circle(commands, position, radius, args),
        ShapeKind::Polygon { vertices } => spawn_polygon(commands, position, vertices, args),
    }
}

pub fn spawn_circle(commands: &mut Commands, position: PhysVector2, radius: f32, args: SpawnArgs) -> Entity {
    let shape = shapes::Circle { radius, center: Vec2::ZERO };

    // the spoke makes the rotation visible
    let mut builder = GeometryBuilder::new().add(&shape);
    builder = builder.add(&shapes::Line(Vec2::ZERO, Vec2::new(radius, 0.0)));

    commands
        .spawn((
            ShapeBundle {
                path: builder.build(),
                transform: Transform::from_xyz(position.x, position.y, args.z_value),
                visibility: visibility(&args),
                ..default()
            },
            Fill::color(args.fill_color),
            Stroke::new(args.stroke_color, args.stroke_width),
            SpawnMetadata { shape_type: SpawnType::Circle { radius } },
        ))
        .id()
}

pub fn spawn_polygon(commands: &mut Commands, position: PhysVector2, vertices: &[PhysVector2], args: SpawnArgs) -> Entity {
    let shape = shapes::Polygon { points: vertices.iter().copied().map(to_vec2).collect(), closed: true };

    commands
        .spawn((
            ShapeBundle {
                path: GeometryBuilder::build_as(&shape),
                transform: Transform::from_xyz(position.x, position.y, args.z_value),
                visibility: visibility(&args),
                ..default()
            },
            Fill::color(args.fill_color),
            Stroke::new(args.stroke_color, args.stroke_width),
            SpawnMetadata { shape_type: SpawnType::Polygon { sides: vertices.len() } },
        ))
        .id()
}

pub fn spawn_contact_marker(commands: &mut Commands) -> Entity {
    let shape = shapes::Rectangle { extents: Vec2::new(8.0, 8.0), origin: shapes::RectangleOrigin::Center };

    commands
        .spawn((
            ShapeBundle {
                path: GeometryBuilder::build_as(&shape),
                transform: Transform::from_xyz(0.0, 0.0, 2.0),
                visibility: Visibility::Hidden,
                ..default()
            },
            Fill::color(*CONTACT_COLOR),
            Stroke::new(*DEFAULT_STROKE_COLOR, 1.5),
            SpawnMetadata { shape_type: SpawnType::ContactMarker },
        ))
        .id()
}

pub fn spawn_line(commands: &mut Commands, start: PhysVector2, end: PhysVector2, args: SpawnArgs) -> Entity {
    let shape = shapes::Line(Vec2::ZERO, to_vec2(end - start));

    commands
        .spawn((
            ShapeBundle {
                path: GeometryBuilder::build_as(&shape),
                transform: Transform::from_xyz(start.x, start.y, args.z_value),
                visibility: visibility(&args),
                ..default()
            },
            Fill::color(args.fill_color),
            Stroke::new(args.stroke_color, args.stroke_width),
            SpawnMetadata { shape_type: SpawnType::Line },
        ))
        .id()
}

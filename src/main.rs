use std::sync::Arc;

use bevy::{
    app::AppExit,
    diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin},
    prelude::*,
};
use bevy_prototype_lyon::prelude::*;
use rand::Rng;

mod manager;
mod spawner;

use manager::{PhysManager, WorldData};
use phys2d::{create_circle_body, create_rect_body, PhysMaterial, PhysVector2};
use spawner::{spawn_line, to_phys, to_vec2, SpawnArgs, SpawnError, SpawnMetadata, DEFAULT_STROKE_COLOR, SELECTED_STROKE_COLOR};

#[derive(Component)]
pub struct CursorImpulseShape;

#[derive(Resource)]
struct Materials {
    ground: Arc<PhysMaterial>,
    body: Arc<PhysMaterial>,
}

impl Materials {
    fn new() -> Result<Self, SpawnError> {
        Ok(Self {
            ground: Arc::new(PhysMaterial::with_friction(1.0, 0.5, 0.6, 0.4)?),
            body: Arc::new(PhysMaterial::with_friction(2.0, 0.6, 0.5, 0.3)?),
        })
    }
}

fn main() -> Result<(), SpawnError> {
    App::new()
        .insert_resource(Msaa::Sample4)
        .insert_resource(PhysManager::default())
        .insert_resource(WorldData::default())
        .insert_resource(Materials::new()?)
        .insert_resource(ClearColor(Color::rgba_u8(40, 44, 52, 255)))
        .add_plugins(DefaultPlugins)
        .add_plugins(ShapePlugin)
        .add_plugins(LogDiagnosticsPlugin::default())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_systems(Startup, setup)
        .add_systems(Update, (handle_keyboard, handle_mouse, handle_update).chain())
        .run();

    Ok(())
}

fn setup(mut commands: Commands, mut manager: ResMut<PhysManager>, materials: Res<Materials>) {
    commands.spawn(Camera2dBundle::default());

    let line_args = SpawnArgs { z_value: 3.0, fill_color: Color::CYAN, stroke_color: Color::GRAY, stroke_width: 3.0, is_visible: true };
    let line = spawn_line(&mut commands, PhysVector2::ZERO, PhysVector2::ZERO, line_args);
    commands.entity(line).insert(CursorImpulseShape);

    let ground_args = SpawnArgs { z_value: 1.0, fill_color: Color::GRAY, stroke_color: Color::DARK_GRAY, stroke_width: 3.0, is_visible: true };
    match create_rect_body(PhysVector2::new(0.0, -250.0), materials.ground.clone(), 900.0, 40.0, true) {
        Ok(ground) => {
            manager.add_body(&mut commands, ground, ground_args);
        }
        Err(err) => error!("Could not create the ground: {}", err),
    }
}

fn handle_update(
    time: Res<Time>,
    mut commands: Commands,
    mut manager: ResMut<PhysManager>,
    mut entity_q: Query<(&mut Transform, &mut Visibility, &SpawnMetadata)>,
) {
    manager.step(&mut commands, &mut entity_q, time.delta_seconds());

    let stats = manager.world.last_step_stats();
    trace!("Bodies: {}, manifolds: {}", manager.body_count(), stats.manifolds);
}

fn cursor_point(windows: &Query<&Window>) -> Option<PhysVector2> {
    let window = windows.get_single().ok()?;
    let mut point = to_phys(window.cursor_position()?);
    point.x -= window.width() / 2.0;
    point.y = (point.y - window.height() / 2.0) * -1.0;
    Some(point)
}

fn random_color() -> Color {
    let mut rng = rand::thread_rng();
    Color::rgb_u8(rng.gen_range(30..230), rng.gen_range(30..230), rng.gen_range(30..230))
}

fn handle_keyboard(
    input: Res<Input<KeyCode>>,
    windows: Query<&Window>,
    mut manager: ResMut<PhysManager>,
    materials: Res<Materials>,
    mut app_exit_events: EventWriter<AppExit>,
) {
    if input.pressed(KeyCode::Escape) {
        app_exit_events.send(AppExit);
        return;
    }

    let Some(point) = cursor_point(&windows) else {
        return;
    };

    let mut rng = rand::thread_rng();
    let body = if input.just_pressed(KeyCode::E) {
        let (width, height) = (rng.gen_range(30.0..60.0), rng.gen_range(30.0..60.0));
        create_rect_body(point, materials.body.clone(), width, height, false)
    } else if input.just_pressed(KeyCode::T) {
        let radius = rng.gen_range(15.0..30.0);
        create_circle_body(point, materials.body.clone(), radius, false)
    } else {
        return;
    };

    match body {
        Ok(body) => manager.queue_body(body, SpawnArgs::filled(random_color())),
        Err(err) => warn!("Could not spawn body: {}", err),
    }
}

fn handle_mouse(
    mut stroke_q: Query<(&Transform, &mut Stroke), Without<CursorImpulseShape>>,
    mut impulse_q: Query<&mut Path, With<CursorImpulseShape>>,
    windows: Query<&Window>,
    input: Res<Input<MouseButton>>,
    mut manager: ResMut<PhysManager>,
    mut world: ResMut<WorldData>,
) {
    let Some(point) = cursor_point(&windows) else {
        return;
    };

    if input.just_pressed(MouseButton::Left) || input.just_pressed(MouseButton::Right) {
        if let Some((entity, handle)) = manager.body_at_point(point) {
            world.select(entity, handle);
        }

        if input.just_pressed(MouseButton::Right) {
            if let Some((entity, _)) = world.selected_body {
                if let Ok((_, mut stroke)) = stroke_q.get_mut(entity) {
                    stroke.color = *SELECTED_STROKE_COLOR;
                }
            }
        }
    }

    if input.pressed(MouseButton::Left) {
        if let Some((_, handle)) = world.selected_body {
            if let Some(body) = manager.world.body_mut(handle) {
                if !body.is_static() {
                    let original_position = body.position();
                    body.move_to_body(point);
                    body.linear_velocity = (point - original_position).floor() * 5.0;
                }
            }
        }
    } else if input.pressed(MouseButton::Right) {
        if let Some((entity, _)) = world.selected_body {
            if let (Ok((transform, _)), Ok(mut path)) = (stroke_q.get(entity), impulse_q.get_single_mut()) {
                let end = Vec2::new(transform.translation.x, transform.translation.y);
                *path = ShapePath::build_as(&shapes::Line(to_vec2(point), end));
            }
        }
    }

    if input.just_released(MouseButton::Left) {
        world.selected_body = None;
    }

    if input.just_released(MouseButton::Right) {
        if let Some((entity, handle)) = world.selected_body.take() {
            if let Ok((_, mut stroke)) = stroke_q.get_mut(entity) {
                stroke.color = *DEFAULT_STROKE_COLOR;
            }

            if let Some(body) = manager.world.body_mut(handle) {
                let impulse = -(point - body.position()) * body.mass();
                body.apply_impulse(impulse);
            }

            if let Ok(mut path) = impulse_q.get_single_mut() {
                *path = ShapePath::build_as(&shapes::Line(Vec2::ZERO, Vec2::ZERO));
            }
        }
    }
}

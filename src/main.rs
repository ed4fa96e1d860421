use bevy::prelude::*;
use smooth_follow::prelude::*;

fn main() {
    let mut app = App::new();
    app.insert_resource(Msaa { samples: 4 })
        .add_plugins(DefaultPlugins)
        .add_plugin(SmoothFollowPlugin)
        .add_plugin(DemoPlugin);

    #[cfg(feature = "editor")]
    app.add_plugin(bevy_egui::EguiPlugin)
        .add_plugin(FollowInspectorPlugin);

    app.run();
}

pub struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn build(&self, app: &mut App) {
        app.add_startup_system(setup)
            .add_system(move_target.before(FollowSystem::Early))
            .add_system(teleport_target.before(FollowSystem::Reset));
    }
}

#[derive(Component)]
struct Target {
    radius: f32,
    /// Radians per second around the circuit
    angular_speed: f32,
}

fn move_target(time: Res<Time>, mut target_query: Query<(&mut Transform, &Target)>) {
    let elapsed = time.seconds_since_startup() as f32;
    for (mut transform, target) in target_query.iter_mut() {
        let angle = elapsed * target.angular_speed;
        transform.translation = Vec3::new(
            target.radius * angle.cos(),
            0.5 + 0.5 * (2.0 * angle).sin(),
            target.radius * angle.sin(),
        );
        transform.rotation = Quat::from_rotation_y(-angle);
    }
}

fn teleport_target(
    keyboard_input: Res<Input<KeyCode>>,
    mut target_query: Query<(&mut Transform, &mut Target)>,
    follower_query: Query<Entity, Or<(With<SmoothPositionFollow>, With<SmoothRotationFollow>)>>,
    mut reset_event_writer: EventWriter<ResetFollowEvent>,
) {
    if !keyboard_input.just_pressed(KeyCode::T) {
        return;
    }
    for (mut transform, mut target) in target_query.iter_mut() {
        // Jump to the opposite side of the circuit
        target.angular_speed = -target.angular_speed;
        transform.translation = -transform.translation;
    }
    for entity in follower_query.iter() {
        reset_event_writer.send(ResetFollowEvent { entity });
    }
    info!("Teleported target, followers reset");
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let green = Color::rgb_u8(0, 90, 20);
    let blue = Color::rgb_u8(0, 40, 90);
    let orange = Color::rgb_u8(200, 110, 20);

    let floor_material = materials.add(StandardMaterial {
        base_color: green,
        perceptual_roughness: 1.0,
        ..default()
    });
    let target_material = materials.add(blue.into());
    let follower_material = materials.add(orange.into());

    let floor_mesh = meshes.add(Mesh::from(shape::Plane { size: 32.0 }));
    let cube_mesh = meshes.add(Mesh::from(shape::Cube { size: 1.0 }));
    let small_cube_mesh = meshes.add(Mesh::from(shape::Cube { size: 0.4 }));

    commands.spawn_bundle(PbrBundle {
        mesh: floor_mesh,
        material: floor_material,
        transform: Transform::from_xyz(0.0, -0.5, 0.0),
        ..default()
    });

    let target = commands
        .spawn_bundle(PbrBundle {
            mesh: cube_mesh,
            material: target_material,
            transform: Transform::from_xyz(6.0, 0.5, 0.0),
            ..default()
        })
        .insert(Name::new("Target"))
        .insert(Target {
            radius: 6.0,
            angular_speed: 0.8,
        })
        .id();

    // Lerp follower, hovering above the target
    commands
        .spawn_bundle(PbrBundle {
            mesh: small_cube_mesh.clone(),
            material: follower_material.clone(),
            transform: Transform::from_xyz(0.0, 1.5, 0.0),
            ..default()
        })
        .insert(Name::new("Lerp Follower"))
        .insert(SmoothPositionFollow::new(target).with_lerp_speed(4.0))
        .insert(SmoothRotationFollow::new(target).with_smooth_speed(4.0));

    // Damped follower with extrapolation, trailing behind at floor level
    commands
        .spawn_bundle(PbrBundle {
            mesh: small_cube_mesh.clone(),
            material: follower_material.clone(),
            transform: Transform::from_xyz(0.0, -0.3, 0.0),
            ..default()
        })
        .insert(Name::new("Damped Follower"))
        .insert(
            SmoothPositionFollow::new(target)
                .with_smooth_type(SmoothType::SmoothDamp)
                .with_smooth_damp_time(0.3)
                .with_extrapolation(true)
                .with_update_phase(FollowPhase::LateUpdate),
        );

    // Child without an explicit target follows its parent
    commands
        .spawn_bundle(SpatialBundle::default())
        .insert(Name::new("Orbit Pivot"))
        .insert(SmoothRotationFollow::new(target).with_smooth_speed(2.0).with_extrapolation(true))
        .with_children(|child_builder| {
            child_builder
                .spawn_bundle(PbrBundle {
                    mesh: small_cube_mesh,
                    material: follower_material,
                    transform: Transform::from_xyz(0.0, 3.0, 0.0),
                    ..default()
                })
                .insert(Name::new("Parented Follower"))
                .insert(SmoothPositionFollow::default().with_lerp_speed(8.0));
        });

    // Lighting
    commands.insert_resource(AmbientLight::default());

    commands.spawn_bundle(DirectionalLightBundle {
        directional_light: DirectionalLight {
            color: Color::rgba_u8(230, 220, 200, 255),
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_xyz(0.0, 10.0, 0.0).with_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -45.0,
            -20.0,
            0.0,
        )),
        ..default()
    });

    // Camera
    commands.spawn_bundle(Camera3dBundle {
        transform: Transform::from_xyz(0.0, 14.0, 14.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
}

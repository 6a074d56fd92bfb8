//! Scene graph, regeneration side effects and the per-frame systems.

use std::sync::Arc;

use bevy::ecs::system::SystemParam;
use bevy::math::curve::EaseFunction;
use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;

use crate::animation::{stagger_delays, AnimationTiming, PositionTween, StaggerOrder};
use crate::bounds::{centering_offset, CameraPlacement};
use crate::constants::{CAMERA_FOV_DEGREES, ROTATION_SPEED};
use crate::controller::{RegenerationCommand, RegenerationController, RegenerationMode};
use crate::frame::{FrameRng, FrameState};
use crate::metrics::Metrics;
use crate::settings::FrameSettings;
use crate::structure::{batch_mesh, ElementBatch, FrameMaterial, StructureStyle};

/// Rotating host of the structure and base containers.
#[derive(Component)]
pub struct FramePivot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePart {
    /// Load-bearing elements; these take part in the fly-out/fly-in.
    Structure,
    /// Ground-floor slab.
    Base,
}

/// Container entity for one part, offset so the frame is centred on the pivot.
#[derive(Component, Debug, Clone, Copy)]
pub struct FrameRoot(pub FramePart);

/// One generated batch.
#[derive(Component, Debug, Clone, Copy)]
pub struct FrameElement {
    pub part: FramePart,
    /// Local `(min_y, max_y)` of the batch geometry.
    pub extent: (f32, f32),
}

/// Structural style used for drawing.
#[derive(Resource, Clone)]
pub struct ActiveStyle(pub Arc<dyn StructureStyle>);

#[derive(Resource)]
pub struct FrameMaterials {
    handles: [Handle<StandardMaterial>; 4],
}

impl FrameMaterials {
    pub fn get(&self, material: FrameMaterial) -> Handle<StandardMaterial> {
        let slot = FrameMaterial::ALL.iter().position(|m| *m == material).unwrap_or(0);
        self.handles[slot].clone()
    }
}

/// Request to regenerate the frame; dropped while an animation is running.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RegenerationRequested(pub RegenerationMode);

pub fn setup_frame_scene(mut commands: Commands, mut materials: ResMut<Assets<StandardMaterial>>) {
    let handles = FrameMaterial::ALL.map(|m| {
        materials.add(StandardMaterial {
            base_color: m.color(),
            perceptual_roughness: 1.0,
            ..default()
        })
    });
    commands.insert_resource(FrameMaterials { handles });

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        ..default()
    });

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        PanOrbitCamera {
            focus: Vec3::ZERO,
            yaw: Some(0.0),
            pitch: Some(0.4),
            radius: Some(40.0),
            // orbit only, never below the ground plane
            pitch_lower_limit: Some(0.0),
            pan_sensitivity: 0.0,
            zoom_sensitivity: 0.0,
            ..default()
        },
        Name::new("FrameCamera"),
    ));

    commands
        .spawn((FramePivot, Transform::default(), Visibility::default(), Name::new("FramePivot")))
        .with_children(|pivot| {
            pivot.spawn((FrameRoot(FramePart::Structure), Transform::default(), Visibility::default(), Name::new("Structure")));
            pivot.spawn((FrameRoot(FramePart::Base), Transform::default(), Visibility::default(), Name::new("Base")));
            for z in [10.0, -10.0] {
                pivot.spawn((
                    DirectionalLight { illuminance: 2500.0, ..default() },
                    Transform::from_translation(Vec3::new(0.0, 2.0, z).normalize()).looking_at(Vec3::ZERO, Vec3::Y),
                ));
            }
        });
}

pub fn request_initial_regeneration(mut requests: EventWriter<RegenerationRequested>) {
    requests.write(RegenerationRequested(RegenerationMode::WithoutAnimation));
}

/// Everything a regeneration writes to.
#[derive(SystemParam)]
pub struct FrameScene<'w, 's> {
    commands: Commands<'w, 's>,
    state: ResMut<'w, FrameState>,
    rng: ResMut<'w, FrameRng>,
    style: Res<'w, ActiveStyle>,
    materials: Res<'w, FrameMaterials>,
    meshes: ResMut<'w, Assets<Mesh>>,
    metrics: ResMut<'w, Metrics>,
    pivot: Query<'w, 's, &'static mut Transform, (With<FramePivot>, Without<FrameRoot>, Without<FrameElement>)>,
    roots: Query<'w, 's, (Entity, &'static mut Transform, &'static FrameRoot), (Without<FramePivot>, Without<FrameElement>)>,
    elements: Query<'w, 's, (Entity, &'static Transform, &'static FrameElement), (Without<FramePivot>, Without<FrameRoot>)>,
    cameras: Query<'w, 's, &'static mut PanOrbitCamera>,
}

impl FrameScene<'_, '_> {
    fn run(&mut self, command: RegenerationCommand, settings: &FrameSettings) {
        match command {
            RegenerationCommand::Regenerate => self.regenerate(settings, false),
            RegenerationCommand::BeginLeave => self.begin_leave(settings),
            RegenerationCommand::RegenerateAndEnter => self.regenerate(settings, true),
            RegenerationCommand::Complete => info!("regeneration {} complete", self.state.generation),
        }
    }

    /// Tweens every structure element up and out, top storeys first.
    fn begin_leave(&mut self, settings: &FrameSettings) {
        let timing = AnimationTiming::for_storeys(settings.height_size);
        let leaving: Vec<_> = self
            .elements
            .iter()
            .filter(|(_, _, e)| e.part == FramePart::Structure)
            .map(|(entity, transform, e)| (entity, transform.translation, e.extent))
            .collect();
        let extents: Vec<_> = leaving.iter().map(|l| l.2).collect();
        let delays = stagger_delays(&extents, StaggerOrder::TopFirst, &timing, &mut self.rng.0);

        for ((entity, from, _), delay) in leaving.into_iter().zip(delays) {
            let to = from + Vec3::Y * timing.distance;
            self.commands
                .entity(entity)
                .insert(PositionTween::new(from, to, delay, timing.movement, EaseFunction::ElasticInOut));
        }
        info!("regeneration leave phase started ({:.1}s)", timing.window());
    }

    /// Clears the scene, rebuilds the grids and draws the new frame.
    fn regenerate(&mut self, settings: &FrameSettings, animate_in: bool) {
        // Emptied at command flush, so elements spawned by an earlier pass in
        // the same frame go too.
        for (root, _, _) in self.roots.iter() {
            self.commands.entity(root).despawn_related::<Children>();
        }
        for mut transform in self.pivot.iter_mut() {
            transform.translation = Vec3::ZERO;
        }

        let generation = self.state.generation + 1;
        *self.state = match FrameState::generate(settings, generation, &mut self.rng.0) {
            Ok(state) => state,
            Err(e) => {
                error!("regeneration {generation} failed: {e}");
                FrameState { generation, ..default() }
            }
        };
        self.metrics.regenerations += 1;
        self.metrics.voxel_count = self.state.grids.filled_count() as u64;

        let batches = self.style.0.draw_structure(&self.state.grids, self.state.unit);
        let offset = centering_offset(&self.state.bounds);
        let mut structure_root = None;
        let mut base_root = None;
        for (entity, mut transform, root) in self.roots.iter_mut() {
            transform.translation = offset;
            match root.0 {
                FramePart::Structure => structure_root = Some(entity),
                FramePart::Base => base_root = Some(entity),
            }
        }
        let (Some(structure_root), Some(base_root)) = (structure_root, base_root) else {
            warn!("frame containers missing, nothing drawn");
            return;
        };

        let timing = AnimationTiming::for_storeys(self.state.grids.dims().y);
        let extents: Vec<_> = batches.structure.iter().map(ElementBatch::vertical_extent).collect();
        let delays = if animate_in {
            stagger_delays(&extents, StaggerOrder::BottomFirst, &timing, &mut self.rng.0)
        } else {
            Vec::new()
        };

        for (i, batch) in batches.structure.iter().enumerate() {
            match delays.get(i) {
                Some(&delay) => {
                    let from = Vec3::Y * timing.distance;
                    let entity = self.spawn_element(batch, FramePart::Structure, structure_root, from);
                    self.commands.entity(entity).insert(PositionTween::new(
                        from,
                        Vec3::ZERO,
                        delay,
                        timing.movement,
                        EaseFunction::QuadraticInOut,
                    ));
                }
                None => {
                    self.spawn_element(batch, FramePart::Structure, structure_root, Vec3::ZERO);
                }
            }
        }
        for batch in &batches.base {
            self.spawn_element(batch, FramePart::Base, base_root, Vec3::ZERO);
        }

        let placement = CameraPlacement::for_bounds(&self.state.bounds);
        let (radius, pitch) = placement.orbit();
        for mut camera in self.cameras.iter_mut() {
            camera.target_focus = Vec3::ZERO;
            camera.target_yaw = 0.0;
            camera.target_pitch = pitch;
            camera.target_radius = radius;
            camera.force_update = true;
        }

        info!(
            "{} regeneration {}: {} voxels, {} chunks, {} elements",
            self.style.0.name(),
            generation,
            self.state.grids.filled_count(),
            self.state.chunks.len(),
            batches.structure.len() + batches.base.len(),
        );
    }

    fn spawn_element(&mut self, batch: &ElementBatch, part: FramePart, parent: Entity, translation: Vec3) -> Entity {
        let mesh = self.meshes.add(batch_mesh(batch));
        self.commands
            .spawn((
                Mesh3d(mesh),
                MeshMaterial3d(self.materials.get(batch.material)),
                Transform::from_translation(translation),
                FrameElement { part, extent: batch.vertical_extent() },
                ChildOf(parent),
            ))
            .id()
    }
}

/// Feeds requests and elapsed time to the controller and carries out its commands.
pub fn drive_regeneration(
    mut requests: EventReader<RegenerationRequested>,
    time: Res<Time>,
    settings: Res<FrameSettings>,
    mut controller: ResMut<RegenerationController>,
    mut scene: FrameScene,
) {
    let mut commands: Vec<RegenerationCommand> = requests
        .read()
        .filter_map(|request| controller.trigger(request.0, &settings))
        .collect();
    commands.extend(controller.tick(time.delta_secs(), &settings));

    for command in commands {
        debug!("regeneration command {command:?}");
        scene.run(command, &settings);
    }
}

pub fn rotate_pivot(time: Res<Time>, settings: Res<FrameSettings>, mut pivot: Query<&mut Transform, With<FramePivot>>) {
    if settings.pause_rotation {
        return;
    }
    for mut transform in pivot.iter_mut() {
        transform.rotate_y(ROTATION_SPEED * time.delta_secs());
    }
}

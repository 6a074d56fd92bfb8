pub mod animation;
pub mod bounds;
pub mod constants;
pub mod controller;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod panel;
pub mod randomize;
pub mod scene;
pub mod settings;
pub mod structure;
pub mod voxel;

use std::sync::Arc;

use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCameraPlugin;

/// Frame generation, regeneration state machine and the rotating scene,
/// without windowing or input. Expects `Assets<Mesh>`,
/// `Assets<StandardMaterial>` and `Time` to exist.
pub struct FrameCorePlugin {
    pub config: FrameConfig,
    pub style: Arc<dyn StructureStyle>,
}

impl Plugin for FrameCorePlugin {
    fn build(&self, app: &mut App) {
        app
            .register_type::<FrameSettings>()
            .register_type::<RegenerationController>()
            .insert_resource(self.config.settings())
            .insert_resource(frame::FrameRng::new(self.config.seed))
            .insert_resource(scene::ActiveStyle(self.style.clone()))
            .init_resource::<FrameState>()
            .init_resource::<RegenerationController>()
            .init_resource::<Metrics>()
            .add_event::<RegenerationRequested>()
            .add_systems(Startup, (
                scene::setup_frame_scene,
                scene::request_initial_regeneration,
            ))
            .add_systems(Update, (
                scene::drive_regeneration,
                animation::advance_tweens.after(scene::drive_regeneration),
                scene::rotate_pivot,
                metrics::flush_metrics.after(scene::drive_regeneration),
            ));
    }
}

/// Full viewer: core plus orbit camera controls, metrics logging and the
/// control panel when enabled.
pub struct FramePlugin {
    pub config: FrameConfig,
    pub style: Arc<dyn StructureStyle>,
}

impl FramePlugin {
    pub fn new(config: FrameConfig, style: impl StructureStyle) -> Self {
        Self { config, style: Arc::new(style) }
    }
}

impl Plugin for FramePlugin {
    fn build(&self, app: &mut App) {
        info!("mounting {} on host {:?}", self.style.name(), self.config.host_id);
        app
            .insert_resource(ClearColor(Color::srgba(1.0, 1.0, 1.0, 0.0)))
            .init_resource::<metrics::MetricsReport>()
            .add_plugins((
                FrameCorePlugin { config: self.config.clone(), style: self.style.clone() },
                PanOrbitCameraPlugin,
            ))
            .add_systems(Update, metrics::periodic_metrics_report);
        if self.config.show_control_panel {
            app.add_plugins(panel::ControlPanelPlugin);
        }
    }
}

/// Opens a window mounted on the config's host and runs the frame viewer.
pub fn launch(config: FrameConfig, style: impl StructureStyle) {
    App::new()
        .add_plugins(
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: config.host_id.clone(),
                    canvas: config.canvas_selector(),
                    transparent: true,
                    ..default()
                }),
                ..default()
            }),
        )
        .add_plugins(FramePlugin::new(config, style))
        .run();
}

// Public API exports
pub use bounds::{compute_bounding_box, CameraPlacement, FrameBounds};
pub use controller::{RegenerationCommand, RegenerationController, RegenerationMode, RegenerationPhase};
pub use error::{FrameError, FrameResult};
pub use frame::FrameState;
pub use metrics::Metrics;
pub use randomize::{randomize_some_chunks, Chunk, FillMode};
pub use scene::RegenerationRequested;
pub use settings::{FrameConfig, FrameSettings, Tunable};
pub use structure::{RigidFrame, StructureBatches, StructureStyle, TimberFrame};
pub use voxel::{BoolGrid, FrameGrids};

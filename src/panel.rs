//! On-screen control panel: tunables, toggles and the regeneration trigger.

use bevy::prelude::*;

use crate::controller::{RegenerationController, RegenerationMode};
use crate::frame::FrameState;
use crate::metrics::Metrics;
use crate::randomize::FillMode;
use crate::scene::{FramePivot, RegenerationRequested};
use crate::settings::{FrameSettings, Tunable};

#[derive(Component)]
struct TunablesText;

#[derive(Component)]
struct StatusText;

/// Which tunable the arrow keys adjust.
#[derive(Resource, Debug, Default)]
pub struct ControlPanel {
    pub selected: usize,
}

impl ControlPanel {
    pub fn selected_tunable(&self) -> Tunable {
        Tunable::ALL[self.selected % Tunable::ALL.len()]
    }
}

pub struct ControlPanelPlugin;
impl Plugin for ControlPanelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlPanel>()
            .add_systems(Startup, setup_ui)
            .add_systems(Update, (handle_panel_input, update_ui, draw_bounds));
    }
}

/// Applies one key press to the panel; returns a regeneration request if the
/// key asks for one.
pub fn apply_panel_key(
    key: KeyCode,
    panel: &mut ControlPanel,
    settings: &mut FrameSettings,
) -> Option<RegenerationMode> {
    let count = Tunable::ALL.len();
    match key {
        KeyCode::KeyR => return Some(RegenerationMode::Configured),
        KeyCode::KeyN => return Some(RegenerationMode::WithoutAnimation),
        KeyCode::KeyP => settings.pause_rotation = !settings.pause_rotation,
        KeyCode::KeyL => settings.regeneration_loop = !settings.regeneration_loop,
        KeyCode::KeyA => settings.animate_regeneration = !settings.animate_regeneration,
        KeyCode::KeyB => settings.show_bounds = !settings.show_bounds,
        KeyCode::KeyF => {
            settings.fill_mode = match settings.fill_mode {
                FillMode::Chunks => FillMode::Uniform,
                FillMode::Uniform => FillMode::Chunks,
            }
        }
        KeyCode::ArrowDown => panel.selected = (panel.selected + 1) % count,
        KeyCode::ArrowUp => panel.selected = (panel.selected + count - 1) % count,
        KeyCode::ArrowRight => settings.adjust(panel.selected_tunable(), 1),
        KeyCode::ArrowLeft => settings.adjust(panel.selected_tunable(), -1),
        _ => {}
    }
    None
}

fn handle_panel_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut panel: ResMut<ControlPanel>,
    mut settings: ResMut<FrameSettings>,
    mut requests: EventWriter<RegenerationRequested>,
) {
    for key in keys.get_just_pressed() {
        if let Some(mode) = apply_panel_key(*key, &mut panel, &mut settings) {
            requests.write(RegenerationRequested(mode));
        }
    }
}

fn setup_ui(mut commands: Commands) {
    let font = TextFont { font_size: 12.0, ..default() };
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(12.0),
                bottom: Val::Px(12.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(8.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.1, 0.1, 0.12, 0.8)),
            BorderRadius::all(Val::Px(4.0)),
            Name::new("ControlPanel"),
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new("Frame  (up/down select, left/right adjust)"),
                TextFont { font_size: 14.0, ..default() },
                TextColor(Color::srgb(0.98, 0.84, 0.65)),
            ));
            panel.spawn((Text::default(), font.clone(), TextColor(Color::WHITE), TunablesText));
            panel.spawn((Text::default(), font, TextColor(Color::srgb(0.8, 0.8, 0.8)), StatusText));
        });
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// One line per tunable, `>` marking the selected one.
pub fn tunables_text(panel: &ControlPanel, settings: &FrameSettings) -> String {
    Tunable::ALL
        .iter()
        .enumerate()
        .map(|(i, tunable)| {
            let marker = if i == panel.selected % Tunable::ALL.len() { '>' } else { ' ' };
            format!("{marker} {}: {:.1}", tunable.label(), settings.value(*tunable))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn status_text(settings: &FrameSettings, controller: &RegenerationController, metrics: &Metrics) -> String {
    format!(
        "[P] rotation paused: {}  [L] loop: {}  [A] animate: {}\n\
        [F] fill: {:?}  [B] bounds: {}  [R] regenerate  [N] without animation\n\
        {:.0} fps | {} voxels | {} elements | #{} | {:?}",
        on_off(settings.pause_rotation),
        on_off(settings.regeneration_loop),
        on_off(settings.animate_regeneration),
        settings.fill_mode,
        on_off(settings.show_bounds),
        metrics.fps,
        metrics.voxel_count,
        metrics.element_count,
        metrics.regenerations,
        controller.phase(),
    )
}

fn update_ui(
    mut tunables: Query<&mut Text, (With<TunablesText>, Without<StatusText>)>,
    mut status: Query<&mut Text, (With<StatusText>, Without<TunablesText>)>,
    panel: Res<ControlPanel>,
    settings: Res<FrameSettings>,
    controller: Res<RegenerationController>,
    metrics: Res<Metrics>,
) {
    for mut text in tunables.iter_mut() {
        **text = tunables_text(&panel, &settings);
    }
    for mut text in status.iter_mut() {
        **text = status_text(&settings, &controller, &metrics);
    }
}

fn draw_bounds(
    mut gizmos: Gizmos,
    settings: Res<FrameSettings>,
    state: Res<FrameState>,
    pivot: Query<&GlobalTransform, With<FramePivot>>,
) {
    if !settings.show_bounds || state.bounds.is_empty() {
        return;
    }
    let Ok(pivot) = pivot.single() else { return };
    let transform = pivot.compute_transform() * Transform::from_scale(state.bounds.size());
    gizmos.cuboid(transform, Color::srgb(0.2, 0.7, 1.0));
}

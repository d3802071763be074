// powertrain_sim/src/simulation/plugins/dashboard.rs

//! Shows what each powertrain is doing: an on-screen instrument cluster in
//! windowed runs, a once-per-second telemetry line in the log otherwise.

use crate::prelude::*;
use crate::simulation::core::components::KeyboardControlled;

/// Seconds between telemetry log lines.
const TELEMETRY_PERIOD: f32 = 1.0;

pub struct DashboardPlugin {
    pub headless: bool,
}

impl Plugin for DashboardPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(TelemetryTimer(Timer::from_seconds(
            TELEMETRY_PERIOD,
            TimerMode::Repeating,
        )))
        .add_systems(
            FixedUpdate,
            log_telemetry.in_set(SimulationSet::Telemetry),
        );

        if !self.headless {
            app.add_systems(OnEnter(AppState::Running), spawn_dashboard)
                .add_systems(
                    Update,
                    update_dashboard.run_if(in_state(AppState::Running)),
                );
        }
    }
}

#[derive(Resource)]
struct TelemetryTimer(Timer);

/// Marker for the instrument cluster text.
#[derive(Component)]
struct DashboardText;

/// One line summarising a vehicle's powertrain.
pub fn format_telemetry(name: &str, sim: &VehicleSim, output: &TickOutput) -> String {
    let state = sim.state();
    let ignition = if state.engine_running { "on" } else { "off" };
    let handbrake = if state.handbrake_engaged { " [P]" } else { "" };
    let radiator = match &output.radiator {
        Some(signal) if signal.active => format!(" radiator {:.0}%", signal.intensity * 100.0),
        _ => String::new(),
    };
    format!(
        "{name}: ignition {ignition}{handbrake} gear {gear} rpm {rpm:.0} speed {speed:.1} mph \
         temp {temp:.1} F fuel {fuel:.1}% odo {odo:.3} mi lamps {lamps:?}{radiator}",
        gear = state.current_gear,
        rpm = state.engine_rpm,
        speed = state.current_speed,
        temp = state.engine_temperature,
        fuel = output.gauges.fuel * 100.0,
        odo = state.odometer,
        lamps = state.lighting.headlamps,
    )
}

fn log_telemetry(
    time: Res<Time>,
    mut timer: ResMut<TelemetryTimer>,
    query: Query<(&Name, &VehicleSim, &TickOutput)>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    for (name, sim, output) in &query {
        info!("[TELEMETRY] {}", format_telemetry(name.as_str(), sim, output));
    }
}

fn spawn_dashboard(mut commands: Commands) {
    commands.spawn((
        DashboardText,
        Text::new(""),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            left: Val::Px(12.0),
            padding: UiRect::all(Val::Px(8.0)),
            ..default()
        },
    ));
}

/// Needle positions as bars, for the keyboard-driven vehicle (or the first one).
fn update_dashboard(
    vehicles: Query<(&Name, &VehicleSim, &TickOutput, Has<KeyboardControlled>)>,
    mut text_query: Query<(&mut Text, &mut TextColor, &mut BackgroundColor), With<DashboardText>>,
) {
    let Some((name, sim, output, _)) = vehicles
        .iter()
        .max_by_key(|(_, _, _, keyboard)| *keyboard)
    else {
        return;
    };
    let Ok((mut text, mut color, mut background)) = text_query.single_mut() else {
        return;
    };

    let gauges = &output.gauges;
    let state = sim.state();
    text.0 = format!(
        "{}\nRPM   {} {:>5.0}\nMPH   {} {:>5.1}\nFUEL  {}\nTEMP  {} {:>5.1} F\nGEAR  {}   ODO {:.2} mi{}",
        name,
        bar(gauges.tachometer),
        state.engine_rpm,
        bar(gauges.speedometer),
        state.current_speed,
        bar(gauges.fuel),
        bar(gauges.thermometer),
        state.engine_temperature,
        state.current_gear,
        state.odometer,
        if state.handbrake_engaged { "   [P]" } else { "" },
    );

    // The radiator's overheat effect drives the cluster tint.
    let heat = output
        .radiator
        .filter(|signal| signal.active)
        .map_or(0.0, |signal| signal.intensity as f32);
    color.0 = Color::srgb(1.0, 1.0 - heat, 1.0 - heat);

    // Backlight follows the headlamps.
    let alpha = if gauges.backlight { 0.85 } else { 0.6 };
    let tone = if gauges.backlight { 0.05 } else { 0.0 };
    background.0 = Color::srgba(tone, tone, tone + 0.1 * f32::from(gauges.backlight), alpha);
}

/// A ten-cell bar for a reading in `[0, 1]`.
fn bar(reading: f64) -> String {
    let filled = (reading.clamp(0.0, 1.0) * 10.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_rounds_and_clamps() {
        assert_eq!(bar(0.0), "[----------]");
        assert_eq!(bar(0.44), "[####------]");
        assert_eq!(bar(2.0), "[##########]");
    }

    #[test]
    fn telemetry_line_reports_a_parked_vehicle() {
        let sim = VehicleSim::assemble(&VehicleSpec::default(), &VehiclePose::default()).unwrap();
        let line = format_telemetry("pickup", &sim, sim.last_output());
        assert!(line.starts_with("pickup: ignition off [P] gear N"));
        assert!(line.contains("fuel 100.0%"));
        assert!(!line.contains("radiator"));
    }
}

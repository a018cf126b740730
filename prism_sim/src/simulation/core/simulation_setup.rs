// prism_sim/src/simulation/core/simulation_setup.rs

use crate::prelude::*;
use crate::simulation::core::clock::SimulationClock;
use crate::simulation::core::events::BevyPointCloudMessage;
use crate::simulation::core::prng::SimulationRng;

pub struct SimulationSetupPlugin;

/// Number of ticks after which the app exits, if bounded.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimit(pub Option<u64>);

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        // This plugin's job is to read the config and add resources and startup systems.
        let existing = app.world().get_resource::<ScenarioConfig>().cloned();
        let config = match existing {
            Some(config) => config,
            None => {
                warn!("No ScenarioConfig inserted before the simulation plugin, using defaults.");
                let config = ScenarioConfig::default();
                app.insert_resource(config.clone());
                config
            }
        };

        // --- 1. Add the Deterministic PRNG Resource ---
        app.insert_resource(SimulationRng::new(config.simulation.seed));

        // --- 2. Simulated time ---
        app.insert_resource(SimulationClock::new(config.simulation.rate_hz))
            .insert_resource(RunLimit(config.simulation.max_ticks()))
            .add_event::<BevyPointCloudMessage>()
            .init_state::<AppState>();

        // --- CONFIGURE THE SPAWNING PIPELINE ---
        // This chain of SystemSets guarantees the correct spawning order.
        app.configure_sets(
            OnEnter(AppState::SceneBuilding),
            (
                SceneBuildSet::World,
                SceneBuildSet::Snapshot,
                SceneBuildSet::Sensors,
                SceneBuildSet::Finalize,
            )
                .chain(),
        );

        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            transition_to_running.in_set(SceneBuildSet::Finalize),
        );

        // Configure the runtime schedule graph.
        app.configure_sets(Update, SimulationSet::ScheduleScans)
            .configure_sets(
                PostUpdate,
                (SimulationSet::CompleteScans, SimulationSet::Consumers).chain(),
            )
            .configure_sets(Last, SimulationSet::Clock);

        app.add_systems(
            Last,
            (stop_at_run_limit, advance_clock)
                .chain()
                .in_set(SimulationSet::Clock)
                .run_if(in_state(AppState::Running)),
        );
    }
}

fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("[SETUP] Scene built. Transitioning to Running state.");
    next_state.set(AppState::Running);
}

fn advance_clock(mut clock: ResMut<SimulationClock>) {
    clock.advance();
}

fn stop_at_run_limit(
    clock: Res<SimulationClock>,
    limit: Res<RunLimit>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(max_ticks) = limit.0 else {
        return;
    };
    if clock.tick() + 1 >= max_ticks {
        info!(
            "[SETUP] Ran {} ticks ({:.2} s simulated). Exiting.",
            max_ticks,
            max_ticks as f64 / clock.rate_hz() as f64
        );
        exit.write(AppExit::Success);
    }
}

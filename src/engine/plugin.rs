use bevy::prelude::*;
use std::sync::{Arc, Mutex, RwLock};

use crate::engine::clock::Simulation;
use crate::engine::config::BattleConfig;
use crate::engine::snapshot::Snapshot;
use crate::fighter::Team;

/// Drives a [`Simulation`] from bevy's `Update` schedule
pub struct BattlePlugin {
    pub config: BattleConfig,
}

impl BattlePlugin {
    pub fn new(config: BattleConfig) -> Self {
        Self { config }
    }
}

impl Plugin for BattlePlugin {
    fn build(&self, app: &mut App) {
        let outbox = FinishedOutbox::default();
        let sink = Arc::clone(&outbox.0);

        let simulation = match Simulation::with_layout(self.config.clone()) {
            Ok(sim) => sim,
            Err(err) => {
                tracing::error!(error = %err, "invalid battle config, falling back to defaults");
                match Simulation::with_layout(BattleConfig::default()) {
                    Ok(sim) => sim,
                    Err(_) => return,
                }
            }
        };
        let simulation = simulation.on_complete(move |winner| {
            if let Ok(mut pending) = sink.lock() {
                pending.push(winner);
            }
        });

        app.insert_resource(BattleResource(Arc::new(RwLock::new(simulation))))
            .insert_resource(BattleFrame::default())
            .insert_resource(outbox)
            .add_event::<BattleFinished>()
            .add_systems(Update, (battle_tick_system, battle_finished_system).chain());
    }
}

#[derive(Resource, Clone)]
pub struct BattleResource(pub Arc<RwLock<Simulation>>);

/// Latest snapshot produced by the tick system
#[derive(Resource, Default)]
pub struct BattleFrame(pub Option<Snapshot>);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleFinished {
    pub winner: Team,
}

/// Winners reported by the completion callback, drained into events
#[derive(Resource, Default)]
struct FinishedOutbox(Arc<Mutex<Vec<Team>>>);

fn battle_tick_system(
    time: Res<Time>,
    battle: Res<BattleResource>,
    mut frame: ResMut<BattleFrame>,
) {
    if let Ok(mut sim) = battle.0.write() {
        let now_ms = time.elapsed_secs_f64() * 1000.0;
        frame.0 = sim.tick(now_ms);
    }
}

fn battle_finished_system(outbox: Res<FinishedOutbox>, mut events: EventWriter<BattleFinished>) {
    if let Ok(mut pending) = outbox.0.lock() {
        for winner in pending.drain(..) {
            events.send(BattleFinished { winner });
        }
    }
}

//! In-process simulation used by the `wl` binary
//!
//! Registers a batch of participants, lets the background recalibrator tick,
//! and records what each participant observed after every tick.

use std::time::Duration;

use eyre::{Result, eyre};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::coordinator::{Coordinator, Participant, ParticipantId, QueueConfig, TickReport};
use crate::events::QueueEvent;
use crate::status::Status;

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub participants: usize,
    pub ticks: u32,
    /// Every Nth participant requests removal after the first tick (0 = nobody)
    pub leave_every: usize,
}

/// What one participant had seen by the end of a round
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    pub index: usize,
    pub id: ParticipantId,
    /// Latest status received so far
    pub status: Option<Status>,
    pub removed: bool,
}

/// Snapshot taken after one tick
#[derive(Debug, Clone, Serialize)]
pub struct Round {
    pub report: TickReport,
    pub participants: Vec<Observation>,
}

/// Run a simulation against a freshly started coordinator
pub async fn run(config: QueueConfig, options: &SimulationOptions) -> Result<Vec<Round>> {
    debug!(?options, "simulation::run: called");
    let tick_wait = config.recalibrator.tick_interval() * 10 + Duration::from_secs(1);

    let coordinator = Coordinator::start(config);
    let mut events = coordinator.subscribe();

    let mut participants: Vec<Participant> = Vec::with_capacity(options.participants);
    for _ in 0..options.participants {
        participants.push(coordinator.register().await);
    }
    let mut latest: Vec<Option<Status>> = vec![None; participants.len()];

    let mut rounds = Vec::with_capacity(options.ticks as usize);
    for round in 0..options.ticks {
        let report = tokio::time::timeout(tick_wait, next_tick(&mut events))
            .await
            .map_err(|_| eyre!("Timed out waiting for tick {}", round + 1))??;

        for (slot, participant) in latest.iter_mut().zip(participants.iter_mut()) {
            if let Some(status) = participant.try_recv() {
                *slot = Some(status);
            }
        }

        if round == 0 && options.leave_every > 0 {
            for participant in participants.iter().skip(options.leave_every - 1).step_by(options.leave_every) {
                participant.request_removal();
            }
        }

        rounds.push(Round {
            report,
            participants: participants
                .iter()
                .zip(latest.iter())
                .enumerate()
                .map(|(index, (participant, status))| Observation {
                    index,
                    id: participant.id(),
                    status: *status,
                    removed: participant.is_removal_requested(),
                })
                .collect(),
        });
    }

    coordinator.shutdown().await?;
    Ok(rounds)
}

/// Wait for the next recalibration event
async fn next_tick(events: &mut broadcast::Receiver<QueueEvent>) -> Result<TickReport> {
    loop {
        match events.recv().await {
            Ok(QueueEvent::Recalibrated { report }) => return Ok(report),
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "simulation::next_tick: lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return Err(eyre!("Event bus closed")),
        }
    }
}

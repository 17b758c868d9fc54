use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::protocol::{Inbound, Outbound, decode_inbound};
use super::{NodePosition, Simulation};

/// Roughly 60 ticks per second.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_micros(16_667);

#[derive(Clone, Copy, Debug)]
pub struct WorkerOptions {
    pub tick_interval: Duration,
    /// Seed for initial placement; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            seed: None,
        }
    }
}

/// Handle to a simulation running on its own thread.
///
/// All communication goes through [`Inbound`] and [`Outbound`] messages.
/// Dropping the handle stops the thread and waits for it to exit.
pub struct SimulationWorker {
    tx: Option<Sender<Inbound>>,
    rx: Receiver<Outbound>,
    handle: Option<JoinHandle<()>>,
}

impl SimulationWorker {
    pub fn spawn(options: WorkerOptions) -> Result<Self> {
        let (inbound_tx, inbound_rx) = mpsc::channel();
        let (outbound_tx, outbound_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("graph-simulation".to_owned())
            .spawn(move || run(inbound_rx, outbound_tx, options))
            .context("failed to spawn simulation thread")?;

        Ok(Self {
            tx: Some(inbound_tx),
            rx: outbound_rx,
            handle: Some(handle),
        })
    }

    /// Queues a message. Returns `false` once the worker has exited.
    pub fn post(&self, message: Inbound) -> bool {
        self.tx
            .as_ref()
            .is_some_and(|tx| tx.send(message).is_ok())
    }

    /// Decodes and queues a raw JSON message. Undecodable messages are
    /// logged and dropped.
    pub fn post_json(&self, raw: &str) -> bool {
        match decode_inbound(raw) {
            Ok(message) => self.post(message),
            Err(error) => {
                warn!(%error, "ignoring inbound message");
                false
            }
        }
    }

    pub fn try_recv(&self) -> Option<Outbound> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Outbound> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drains every queued update and keeps only the newest.
    pub fn latest_positions(&self) -> Option<Vec<NodePosition>> {
        let mut latest = None;
        while let Ok(Outbound::Positions { positions }) = self.rx.try_recv() {
            latest = Some(positions);
        }
        latest
    }

    pub fn is_alive(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the worker and waits for its thread to exit.
    pub fn terminate(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("simulation thread panicked");
        }
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(inbound: Receiver<Inbound>, outbound: Sender<Outbound>, options: WorkerOptions) {
    let mut simulation = Simulation::from_seed(options.seed);
    let mut running = false;
    let mut next_tick = Instant::now();

    debug!("simulation worker started");

    loop {
        let message = if running {
            let wait = next_tick.saturating_duration_since(Instant::now());
            match inbound.recv_timeout(wait) {
                Ok(message) => Some(message),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match inbound.recv() {
                Ok(message) => Some(message),
                Err(_) => break,
            }
        };

        if let Some(message) = message {
            let was_running = running;
            apply(&mut simulation, &mut running, message);
            if running && !was_running {
                next_tick = Instant::now();
            }
            // Drain anything else already queued before ticking.
            loop {
                match inbound.try_recv() {
                    Ok(message) => apply(&mut simulation, &mut running, message),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        debug!("simulation worker stopped");
                        return;
                    }
                }
            }
        }

        if !running || Instant::now() < next_tick {
            continue;
        }

        next_tick += options.tick_interval;
        let now = Instant::now();
        if next_tick < now {
            next_tick = now + options.tick_interval;
        }

        if simulation.node_count() == 0 {
            continue;
        }

        simulation.step();
        let update = Outbound::Positions {
            positions: simulation.positions(),
        };
        // Every tick is delivered; slow readers coalesce with `latest_positions`.
        if outbound.send(update).is_err() {
            break;
        }
    }

    debug!("simulation worker stopped");
}

fn apply(simulation: &mut Simulation, running: &mut bool, message: Inbound) {
    match message {
        Inbound::Init {
            nodes,
            edges,
            params,
        } => {
            simulation.init(&nodes, &edges, params);
            *running = true;
            info!(
                nodes = simulation.node_count(),
                edges = simulation.edge_count(),
                "simulation initialised"
            );
        }
        Inbound::Start => *running = true,
        Inbound::Stop => *running = false,
        Inbound::UpdateParams { params } => simulation.update_params(&params),
        Inbound::UpdateNodes { nodes } => {
            let updated = simulation.update_nodes(&nodes);
            debug!(requested = nodes.len(), updated, "updated node classifications");
        }
    }
}

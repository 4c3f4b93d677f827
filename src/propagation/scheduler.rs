//! Main-thread side of the propagation worker
//!
//! `Uninitialized -> Loading -> Ready`, never backwards. At most one
//! `Update` is outstanding; requests made while one is in flight are dropped.

use bevy::log::{error, info};
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};

use crate::propagation::buffer::PositionBuffer;
use crate::propagation::worker::{
    WorkerChannels, WorkerCommand, WorkerReply, start_propagation_worker,
};
use crate::tle::OrbitalElementRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Debug, PartialEq)]
pub enum SchedulerEvent {
    Ready { count: usize, failed: usize },
    Positions(PositionBuffer),
}

#[derive(Resource)]
pub struct PropagationScheduler {
    state: SchedulerState,
    in_flight: bool,
    disconnected: bool,
    cmd_tx: Option<Sender<WorkerCommand>>,
    reply_rx: Option<Mutex<Receiver<WorkerReply>>>,
}

impl Default for PropagationScheduler {
    fn default() -> Self {
        Self {
            state: SchedulerState::Uninitialized,
            in_flight: false,
            disconnected: false,
            cmd_tx: None,
            reply_rx: None,
        }
    }
}

impl PropagationScheduler {
    #[cfg(test)]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    #[cfg(test)]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Hand the catalog to the worker, spawning it on first use.
    pub fn load(&mut self, records: Vec<OrbitalElementRecord>) {
        if self.cmd_tx.is_none() {
            let WorkerChannels { cmd_tx, reply_rx } = start_propagation_worker();
            self.cmd_tx = Some(cmd_tx);
            self.reply_rx = Some(Mutex::new(reply_rx));
        }
        if self.send(WorkerCommand::Init { elements: records }) && self.state != SchedulerState::Ready
        {
            self.state = SchedulerState::Loading;
        }
    }

    /// Ask for a pass at `t`. Returns `false` when not ready or a pass is
    /// already outstanding; nothing is sent in that case.
    pub fn request_update(&mut self, t: DateTime<Utc>) -> bool {
        if self.state != SchedulerState::Ready || self.in_flight || self.disconnected {
            return false;
        }
        let sent = self.send(WorkerCommand::Update {
            timestamp_millis: t.timestamp_millis(),
        });
        self.in_flight = sent;
        sent
    }

    /// Drain every reply that has arrived, without blocking.
    pub fn poll(&mut self) -> Vec<SchedulerEvent> {
        let mut replies = Vec::new();
        let mut closed = false;
        if let Some(rx) = &self.reply_rx
            && let Ok(rx) = rx.lock()
        {
            loop {
                match rx.try_recv() {
                    Ok(reply) => replies.push(reply),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        closed = true;
                        break;
                    }
                }
            }
        }

        let mut events = Vec::with_capacity(replies.len());
        for reply in replies {
            match reply {
                WorkerReply::Ready { count, failed } => {
                    if self.state == SchedulerState::Loading {
                        self.state = SchedulerState::Ready;
                        events.push(SchedulerEvent::Ready { count, failed });
                    }
                }
                WorkerReply::Positions { buffer } => {
                    self.in_flight = false;
                    events.push(SchedulerEvent::Positions(PositionBuffer::from_flat(&buffer)));
                }
            }
        }

        if closed {
            self.mark_disconnected();
        }
        events
    }

    fn send(&mut self, cmd: WorkerCommand) -> bool {
        if self.disconnected {
            return false;
        }
        let ok = self
            .cmd_tx
            .as_ref()
            .is_some_and(|tx| tx.send(cmd).is_ok());
        if !ok {
            self.mark_disconnected();
        }
        ok
    }

    fn mark_disconnected(&mut self) {
        if !self.disconnected {
            error!("[PROPAGATION] worker channel closed; positions will no longer update");
            self.disconnected = true;
            self.in_flight = false;
        }
    }
}

/// Once the catalog is in, hand it to the worker.
pub fn start_propagation_on_catalog(
    catalog: Res<crate::catalog::Catalog>,
    mut scheduler: ResMut<PropagationScheduler>,
) {
    if catalog.is_changed() && !catalog.is_empty() {
        info!("[PROPAGATION] initializing {} records", catalog.len());
        scheduler.load(catalog.records().to_vec());
    }
}

/// Request a pass for the current simulation time every frame; the
/// drop-if-busy rule paces it to the worker's speed.
pub fn request_propagation(
    sim_time: Res<crate::orbital::SimulationTime>,
    mut scheduler: ResMut<PropagationScheduler>,
) {
    scheduler.request_update(sim_time.current_utc);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::types::fixtures;
    use chrono::TimeZone;
    use std::time::{Duration, Instant};

    fn poll_until<F: FnMut(&SchedulerEvent) -> bool>(
        scheduler: &mut PropagationScheduler,
        mut pred: F,
    ) -> Option<SchedulerEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            for ev in scheduler.poll() {
                if pred(&ev) {
                    return Some(ev);
                }
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        None
    }

    fn ready_scheduler() -> PropagationScheduler {
        let mut scheduler = PropagationScheduler::default();
        scheduler.load(vec![
            fixtures::iss(),
            fixtures::with_mean_motion(2, "MEO", 2.0),
        ]);
        assert_eq!(scheduler.state(), SchedulerState::Loading);
        let ev = poll_until(&mut scheduler, |e| matches!(e, SchedulerEvent::Ready { .. }));
        assert_eq!(ev, Some(SchedulerEvent::Ready { count: 2, failed: 0 }));
        assert_eq!(scheduler.state(), SchedulerState::Ready);
        scheduler
    }

    #[test]
    fn test_update_rejected_before_ready() {
        let mut scheduler = PropagationScheduler::default();
        let t = Utc.with_ymd_and_hms(2024, 8, 13, 14, 0, 0).unwrap();
        assert!(!scheduler.request_update(t));
        assert_eq!(scheduler.state(), SchedulerState::Uninitialized);
        assert!(scheduler.poll().is_empty());
    }

    #[test]
    fn test_update_yields_positions() {
        let mut scheduler = ready_scheduler();
        let t = Utc.with_ymd_and_hms(2024, 8, 13, 14, 0, 0).unwrap();
        assert!(scheduler.request_update(t));

        let ev = poll_until(&mut scheduler, |e| matches!(e, SchedulerEvent::Positions(_)));
        match ev {
            Some(SchedulerEvent::Positions(buf)) => {
                assert_eq!(buf.len(), 2);
                assert_eq!(buf.valid_count(), 2);
            }
            other => panic!("expected positions, got {:?}", other),
        }
        assert!(!scheduler.is_in_flight());
    }

    #[test]
    fn test_request_while_in_flight_is_dropped() {
        let mut scheduler = ready_scheduler();
        let t = Utc.with_ymd_and_hms(2024, 8, 13, 14, 0, 0).unwrap();
        assert!(scheduler.request_update(t));
        assert!(scheduler.is_in_flight());
        assert!(!scheduler.request_update(t + chrono::Duration::seconds(1)));
        assert!(scheduler.is_in_flight());

        let mut passes = 0;
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline && passes == 0 {
            passes += scheduler
                .poll()
                .iter()
                .filter(|e| matches!(e, SchedulerEvent::Positions(_)))
                .count();
            std::thread::sleep(Duration::from_millis(5));
        }
        // Give a hypothetical second pass time to show up.
        std::thread::sleep(Duration::from_millis(100));
        passes += scheduler
            .poll()
            .iter()
            .filter(|e| matches!(e, SchedulerEvent::Positions(_)))
            .count();
        assert_eq!(passes, 1);
    }

    #[test]
    fn test_ready_reported_once() {
        let mut scheduler = ready_scheduler();
        std::thread::sleep(Duration::from_millis(50));
        assert!(
            !scheduler
                .poll()
                .iter()
                .any(|e| matches!(e, SchedulerEvent::Ready { .. }))
        );
    }
}

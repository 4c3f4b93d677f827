//! Background propagation worker
//!
//! Owns every decoded SGP4 handle. The main thread talks to it only through
//! the command/reply channels; each position buffer is moved back whole.

use bevy::log::{info, warn};
use chrono::{DateTime, Utc};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::core::coordinates::gmst_rad;
use crate::orbital::propagate_ecef_km;
use crate::tle::{OrbitalElementRecord, PropagationHandle, decode_handle};

/// Main thread → worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Init { elements: Vec<OrbitalElementRecord> },
    Update { timestamp_millis: i64 },
}

/// Worker → main thread.
#[derive(Debug)]
pub enum WorkerReply {
    Ready { count: usize, failed: usize },
    Positions { buffer: Vec<f32> },
}

pub struct WorkerChannels {
    pub cmd_tx: Sender<WorkerCommand>,
    pub reply_rx: Receiver<WorkerReply>,
}

/// Start the propagation worker thread.
pub fn start_propagation_worker() -> WorkerChannels {
    let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();
    let (reply_tx, reply_rx) = mpsc::channel::<WorkerReply>();

    thread::Builder::new()
        .name("propagation-worker".into())
        .spawn(move || run_worker(cmd_rx, reply_tx))
        .map_err(|e| warn!("[PROPAGATION] failed to spawn worker: {}", e))
        .ok();

    WorkerChannels { cmd_tx, reply_rx }
}

fn run_worker(cmd_rx: Receiver<WorkerCommand>, reply_tx: Sender<WorkerReply>) {
    let mut handles: Vec<PropagationHandle> = Vec::new();

    while let Ok(cmd) = cmd_rx.recv() {
        let reply = match cmd {
            WorkerCommand::Init { elements } => {
                handles = elements.iter().map(decode_handle).collect();
                let failed = handles.iter().filter(|h| !h.is_valid()).count();
                info!(
                    "[PROPAGATION] loaded total={} active={} failed={}",
                    handles.len(),
                    handles.len() - failed,
                    failed
                );
                WorkerReply::Ready {
                    count: handles.len(),
                    failed,
                }
            }
            WorkerCommand::Update { timestamp_millis } => {
                let buffer = match DateTime::<Utc>::from_timestamp_millis(timestamp_millis) {
                    Some(t) => propagate_all(&handles, t),
                    None => {
                        warn!("[PROPAGATION] timestamp {} out of range", timestamp_millis);
                        vec![0.0; handles.len() * 3]
                    }
                };
                WorkerReply::Positions { buffer }
            }
        };
        if reply_tx.send(reply).is_err() {
            break;
        }
    }
}

/// One full pass: flat `f32[3N]` Earth-fixed km, zeros where there is no position.
pub fn propagate_all(handles: &[PropagationHandle], t: DateTime<Utc>) -> Vec<f32> {
    let gmst = gmst_rad(t);
    let mut buffer = vec![0.0f32; handles.len() * 3];
    let mut valid = 0usize;

    for (i, handle) in handles.iter().enumerate() {
        if let Some(p) = propagate_ecef_km(handle, t, gmst) {
            buffer[i * 3] = p.x;
            buffer[i * 3 + 1] = p.y;
            buffer[i * 3 + 2] = p.z;
            valid += 1;
        }
    }

    if valid == 0 && !handles.is_empty() {
        warn!("[PROPAGATION] no valid satellites updated");
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::types::fixtures;
    use chrono::TimeZone;

    #[test]
    fn test_propagate_all_writes_sentinel_for_failed_handles() {
        let handles = vec![
            decode_handle(&fixtures::iss()),
            PropagationHandle::Failed,
            decode_handle(&fixtures::with_mean_motion(2, "MEO", 2.0)),
        ];
        let t = Utc.with_ymd_and_hms(2024, 8, 13, 14, 0, 0).unwrap();
        let buffer = propagate_all(&handles, t);

        assert_eq!(buffer.len(), 9);
        assert!(buffer[0..3].iter().any(|v| *v != 0.0));
        assert_eq!(&buffer[3..6], &[0.0, 0.0, 0.0]);
        assert!(buffer[6..9].iter().any(|v| *v != 0.0));
    }

    #[test]
    fn test_worker_init_then_update() {
        let channels = start_propagation_worker();
        channels
            .cmd_tx
            .send(WorkerCommand::Init {
                elements: vec![fixtures::iss()],
            })
            .unwrap();
        match channels.reply_rx.recv().unwrap() {
            WorkerReply::Ready { count, failed } => {
                assert_eq!(count, 1);
                assert_eq!(failed, 0);
            }
            other => panic!("expected Ready, got {:?}", other),
        }

        channels
            .cmd_tx
            .send(WorkerCommand::Update {
                timestamp_millis: 1_723_557_600_000,
            })
            .unwrap();
        match channels.reply_rx.recv().unwrap() {
            WorkerReply::Positions { buffer } => assert_eq!(buffer.len(), 3),
            other => panic!("expected Positions, got {:?}", other),
        }
    }

    #[test]
    fn test_unrepresentable_timestamp_still_replies() {
        let channels = start_propagation_worker();
        channels
            .cmd_tx
            .send(WorkerCommand::Init {
                elements: vec![fixtures::iss(), fixtures::with_mean_motion(2, "MEO", 2.0)],
            })
            .unwrap();
        assert!(matches!(
            channels.reply_rx.recv().unwrap(),
            WorkerReply::Ready { count: 2, .. }
        ));

        channels
            .cmd_tx
            .send(WorkerCommand::Update {
                timestamp_millis: i64::MAX,
            })
            .unwrap();
        match channels
            .reply_rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .unwrap()
        {
            WorkerReply::Positions { buffer } => {
                assert_eq!(buffer.len(), 6);
                assert!(buffer.iter().all(|v| *v == 0.0));
            }
            other => panic!("expected Positions, got {:?}", other),
        }
    }
}

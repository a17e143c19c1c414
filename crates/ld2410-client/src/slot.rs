//! Single-slot mailboxes shared between the background reader and callers.
//!
//! Both structures have exactly one writer (the reader thread) and many
//! readers. They intentionally hold only the most recent value: a stale
//! reply is discarded by its waiter, a slow report consumer only ever
//! observes the latest report.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use ld2410_protocol::{Reply, Report};

use crate::error::{ClientError, Result};

/// What a request waiter can observe in the reply slot.
#[derive(Debug, Clone)]
pub(crate) enum ReplyEvent {
    /// A decoded reply envelope pushed by the dispatch path.
    Reply(Reply),
    /// The background reader terminated; no reply will ever arrive.
    Disconnected,
}

/// Pending-reply mailbox: holds at most one in-flight reply.
///
/// The mutual exclusion of requests is enforced by the request gate, not
/// here; this slot only signals availability. The disconnect sentinel is
/// sticky: once pushed it is never overwritten, so every later waiter
/// resolves immediately.
#[derive(Debug, Default)]
pub(crate) struct ReplySlot {
    slot: Mutex<Option<ReplyEvent>>,
    cond: Condvar,
}

impl ReplySlot {
    pub fn push(&self, reply: Reply) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*slot, Some(ReplyEvent::Disconnected)) {
            return;
        }
        *slot = Some(ReplyEvent::Reply(reply));
        self.cond.notify_all();
    }

    pub fn disconnect(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(ReplyEvent::Disconnected);
        self.cond.notify_all();
    }

    /// Wait until an event is available or the deadline passes.
    ///
    /// Returns `None` on deadline expiry. A reply is consumed by the
    /// waiter; the disconnect sentinel is observed but left in place.
    pub fn wait(&self, deadline: Option<Instant>) -> Option<ReplyEvent> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match &*slot {
                Some(ReplyEvent::Disconnected) => return Some(ReplyEvent::Disconnected),
                Some(ReplyEvent::Reply(_)) => return slot.take(),
                None => {}
            }
            slot = match deadline {
                None => self.cond.wait(slot).unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    self.cond
                        .wait_timeout(slot, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}

#[derive(Debug, Default)]
struct ReportState {
    latest: Option<Report>,
    seq: u64,
    disconnected: bool,
}

/// Most-recent-value broadcast channel for detection reports.
///
/// `record` overwrites the single slot and wakes every waiter; there is
/// no history. The sequence number lets a waiter distinguish "a new
/// report arrived after I started waiting" from the value that was
/// already there.
#[derive(Debug, Default)]
pub(crate) struct ReportChannel {
    state: Mutex<ReportState>,
    cond: Condvar,
}

impl ReportChannel {
    pub fn record(&self, report: Report) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.latest = Some(report);
        state.seq += 1;
        self.cond.notify_all();
    }

    pub fn disconnect(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.disconnected = true;
        self.cond.notify_all();
    }

    /// The most recent report, if any arrived yet. Never blocks.
    pub fn latest(&self) -> Option<Report> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
    }

    /// Wait for the next report recorded after this call began.
    ///
    /// Every concurrent waiter wakes on the same update and receives its
    /// own copy. Reports already in the slot do not satisfy the wait.
    pub fn wait_next(&self, timeout: Option<Duration>) -> Result<Report> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let start_seq = state.seq;
        loop {
            if state.disconnected {
                return Err(ClientError::Disconnected);
            }
            if state.seq > start_seq {
                // record() always stores before bumping seq.
                if let Some(report) = state.latest {
                    return Ok(report);
                }
            }
            state = match deadline {
                None => self.cond.wait(state).unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(ClientError::Timeout(timeout.unwrap_or_default()));
                    }
                    self.cond
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use bytes::Bytes;
    use ld2410_protocol::{BasicReport, CommandCode, ReplyStatus, TargetStatus};

    use super::*;

    fn reply(code: CommandCode) -> Reply {
        Reply {
            code,
            status: ReplyStatus::SUCCESS,
            data: Bytes::new(),
        }
    }

    fn report(distance: u16) -> Report {
        Report {
            basic: BasicReport {
                target_status: TargetStatus(TargetStatus::MOTION),
                motion_distance: distance,
                motion_energy: 50,
                standstill_distance: 0,
                standstill_energy: 0,
                detection_distance: distance,
            },
            engineering: None,
        }
    }

    #[test]
    fn push_then_wait_delivers() {
        let slot = ReplySlot::default();
        slot.push(reply(CommandCode::FirmwareVersion));
        match slot.wait(None) {
            Some(ReplyEvent::Reply(r)) => assert_eq!(r.code, CommandCode::FirmwareVersion),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn wait_consumes_the_reply() {
        let slot = ReplySlot::default();
        slot.push(reply(CommandCode::FactoryReset));
        assert!(slot.wait(None).is_some());
        assert!(slot.wait(Some(Instant::now() + Duration::from_millis(10))).is_none());
    }

    #[test]
    fn newer_reply_overwrites_older() {
        let slot = ReplySlot::default();
        slot.push(reply(CommandCode::FactoryReset));
        slot.push(reply(CommandCode::ModuleRestart));
        match slot.wait(None) {
            Some(ReplyEvent::Reply(r)) => assert_eq!(r.code, CommandCode::ModuleRestart),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn disconnect_is_sticky() {
        let slot = ReplySlot::default();
        slot.disconnect();
        slot.push(reply(CommandCode::FactoryReset));
        assert!(matches!(slot.wait(None), Some(ReplyEvent::Disconnected)));
        // A second waiter still observes it.
        assert!(matches!(slot.wait(None), Some(ReplyEvent::Disconnected)));
    }

    #[test]
    fn wait_deadline_expires() {
        let slot = ReplySlot::default();
        let deadline = Instant::now() + Duration::from_millis(30);
        assert!(slot.wait(Some(deadline)).is_none());
    }

    #[test]
    fn wait_wakes_on_push_from_other_thread() {
        let slot = Arc::new(ReplySlot::default());
        let pusher = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                slot.push(reply(CommandCode::ConfigEnable));
            })
        };
        let event = slot.wait(None);
        assert!(matches!(event, Some(ReplyEvent::Reply(_))));
        pusher.join().unwrap();
    }

    #[test]
    fn latest_report_is_a_copy() {
        let channel = ReportChannel::default();
        assert!(channel.latest().is_none());
        channel.record(report(100));
        channel.record(report(200));
        assert_eq!(channel.latest().unwrap().basic.motion_distance, 200);
    }

    #[test]
    fn wait_next_ignores_preexisting_report() {
        let channel = ReportChannel::default();
        channel.record(report(100));
        let err = channel.wait_next(Some(Duration::from_millis(30))).unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
    }

    #[test]
    fn all_waiters_wake_on_one_record() {
        let channel = Arc::new(ReportChannel::default());
        let mut waiters = Vec::new();
        for _ in 0..4 {
            let channel = Arc::clone(&channel);
            waiters.push(thread::spawn(move || channel.wait_next(None).unwrap()));
        }
        // Give the waiters time to block before recording.
        thread::sleep(Duration::from_millis(50));
        channel.record(report(150));
        for waiter in waiters {
            let got = waiter.join().unwrap();
            assert_eq!(got.basic.motion_distance, 150);
        }
    }

    #[test]
    fn disconnect_wakes_report_waiter() {
        let channel = Arc::new(ReportChannel::default());
        let waiter = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || channel.wait_next(None))
        };
        thread::sleep(Duration::from_millis(20));
        channel.disconnect();
        assert!(matches!(
            waiter.join().unwrap(),
            Err(ClientError::Disconnected)
        ));
    }
}

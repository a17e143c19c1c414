//! Connection handle: owns the transport halves and the background
//! frame pump.
//!
//! The reader thread is the sole writer of the reassembly buffer, the
//! reply slot and the report channel. Everything else only reads from or
//! signals into those structures.

use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use ld2410_frame::{Frame, FrameKind, FrameStream, FrameWriter};
use ld2410_protocol::{Reply, Report};
use tracing::{debug, warn};

use crate::slot::{ReplySlot, ReportChannel};

const READ_CHUNK_SIZE: usize = 2 * 1024;

/// State shared between the reader thread and caller-side operations.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    /// Cleared by the reader thread when it exits for any reason.
    pub connected: AtomicBool,
    /// Tells the reader thread to wind down at its next read timeout.
    pub stop: AtomicBool,
    pub replies: ReplySlot,
    pub reports: ReportChannel,
}

/// A live connection: write half plus the background reader.
///
/// Not reusable after [`shutdown`](Connection::shutdown); reconnecting
/// means building a fresh `Connection`.
pub(crate) struct Connection {
    pub writer: Mutex<FrameWriter<Box<dyn Write + Send>>>,
    pub shared: Arc<Shared>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl Connection {
    /// Spawn the frame pump over the given transport halves.
    ///
    /// The read half must carry a finite read timeout; timed-out reads
    /// are how the pump notices the stop flag.
    pub fn spawn(
        reader: Box<dyn Read + Send>,
        writer: Box<dyn Write + Send>,
    ) -> std::io::Result<Arc<Self>> {
        let shared = Arc::new(Shared::default());
        shared.connected.store(true, Ordering::SeqCst);

        let pump_shared = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("ld2410-reader".to_string())
            .spawn(move || reader_loop(reader, pump_shared))?;

        Ok(Arc::new(Self {
            writer: Mutex::new(FrameWriter::new(writer)),
            shared,
            reader: Mutex::new(Some(handle)),
        }))
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Stop the reader thread and wait for it to exit.
    ///
    /// Safe to call more than once. Any in-flight waiter is resolved with
    /// the disconnect sentinel before the join, so shutdown never waits
    /// behind a stuck request.
    pub fn shutdown(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.connected.store(false, Ordering::SeqCst);
        self.shared.replies.disconnect();
        self.shared.reports.disconnect();
        let handle = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn reader_loop(mut stream: Box<dyn Read + Send>, shared: Arc<Shared>) {
    let mut frames = FrameStream::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        if shared.stop.load(Ordering::SeqCst) {
            break;
        }
        let read = match stream.read(&mut chunk) {
            Ok(0) => {
                debug!("transport EOF");
                break;
            }
            Ok(n) => n,
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                continue;
            }
            Err(err) => {
                warn!(%err, "transport read failed");
                break;
            }
        };

        frames.push(&chunk[..read]);
        for frame in frames.frames() {
            dispatch(&shared, frame);
        }
    }

    shared.connected.store(false, Ordering::SeqCst);
    // An in-flight request may be blocked on the reply slot; resolve it
    // instead of leaving it waiting forever.
    shared.replies.disconnect();
    shared.reports.disconnect();
}

/// Route one decoded frame. Interpretation faults are logged and the
/// frame dropped; they are never fatal to the pump.
fn dispatch(shared: &Shared, frame: Frame) {
    match frame.kind {
        FrameKind::Command => match Reply::decode(&frame.body) {
            Ok(reply) => shared.replies.push(reply),
            Err(err) => warn!(%err, body = ?frame.body, "dropping undecodable reply frame"),
        },
        FrameKind::Report => match Report::decode(&frame.body) {
            Ok(report) => shared.reports.record(report),
            Err(err) => warn!(%err, body = ?frame.body, "dropping undecodable report frame"),
        },
    }
}

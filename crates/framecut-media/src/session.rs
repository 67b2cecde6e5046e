//! Per-source decoder sessions.
//!
//! One session per video/audio media item owns the only decode pipeline
//! for that source. Requests are serialized through a worker thread;
//! latest-wins supersession and same-time coalescing keep scrubbing from
//! piling up seeks.

use framecut_core::budget::{DECODE_TIMEOUT, SEEK_EPSILON};
use framecut_core::{FramecutError, Result, SharedFrameBuffer};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::decode::DecodeBackend;

#[derive(Debug, Clone)]
enum ReplyError {
    Superseded,
    Decode(String),
}

type FrameReply = std::result::Result<SharedFrameBuffer, ReplyError>;

struct SeekRequest {
    time: f64,
    generation: u64,
}

struct InFlight {
    time: f64,
    generation: u64,
    waiters: Vec<oneshot::Sender<FrameReply>>,
}

#[derive(Default)]
struct SessionState {
    /// Most recently decoded position and frame.
    last: Option<(f64, SharedFrameBuffer)>,
    /// The single outstanding decode, if any.
    in_flight: Option<InFlight>,
    next_generation: u64,
}

/// A seekable decode session for one media item.
///
/// Created lazily on first reference, destroyed when the media item is
/// unloaded. At most one decode is in flight at a time; a request at a
/// different time supersedes the pending one, identical requests
/// coalesce onto the in-flight result.
pub struct DecoderSession {
    media_id: Uuid,
    /// Clamp bound as f64 bits; updated when metadata backfill lands.
    duration_bits: AtomicU64,
    tx: crossbeam_channel::Sender<SeekRequest>,
    state: Arc<Mutex<SessionState>>,
}

impl DecoderSession {
    /// Spawn the worker thread for one source.
    pub fn spawn(
        media_id: Uuid,
        path: PathBuf,
        duration: f64,
        backend: Arc<dyn DecodeBackend>,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<SeekRequest>();
        let state = Arc::new(Mutex::new(SessionState::default()));

        let worker_state = state.clone();
        std::thread::Builder::new()
            .name(format!("framecut-decode-{media_id}"))
            .spawn(move || {
                while let Ok(mut request) = rx.recv() {
                    // Drain to the newest queued request; superseded
                    // entries already had their waiters failed.
                    while let Ok(newer) = rx.try_recv() {
                        request = newer;
                    }

                    let decoded = backend.decode_at(&path, request.time);

                    let mut state = worker_state.lock();
                    let current = state.in_flight.as_ref().map(|f| f.generation);
                    if current != Some(request.generation) {
                        // A newer request took over while we were
                        // decoding; discard this result.
                        debug!(media = %media_id, time = request.time, "discarding stale decode");
                        continue;
                    }
                    let in_flight = state.in_flight.take().expect("generation matched");
                    let reply: FrameReply = match decoded {
                        Ok(frame) => {
                            let shared: SharedFrameBuffer = Arc::new(frame);
                            state.last = Some((request.time, shared.clone()));
                            Ok(shared)
                        }
                        Err(e) => {
                            warn!(media = %media_id, time = request.time, error = %e, "decode failed");
                            Err(ReplyError::Decode(e.to_string()))
                        }
                    };
                    for waiter in in_flight.waiters {
                        let _ = waiter.send(reply.clone());
                    }
                }
            })
            .expect("failed to spawn decode worker");

        Self {
            media_id,
            duration_bits: AtomicU64::new(duration.to_bits()),
            tx,
            state,
        }
    }

    /// Media item this session decodes.
    pub fn media_id(&self) -> Uuid {
        self.media_id
    }

    /// Update the clamp bound after the natural duration is probed.
    pub fn set_duration(&self, duration: f64) {
        self.duration_bits.store(duration.to_bits(), Ordering::Relaxed);
    }

    /// Decode the frame nearest `local_time` (clamped to the source
    /// duration), suspending until the seek completes.
    pub async fn frame_at(&self, local_time: f64) -> Result<SharedFrameBuffer> {
        let duration = f64::from_bits(self.duration_bits.load(Ordering::Relaxed));
        let time = local_time.clamp(0.0, duration.max(0.0));

        let rx = {
            let mut state = self.state.lock();

            // Seek tolerance: the held frame is close enough.
            if let Some((last_time, ref frame)) = state.last {
                if (last_time - time).abs() <= SEEK_EPSILON {
                    return Ok(frame.clone());
                }
            }

            let (reply_tx, reply_rx) = oneshot::channel();
            match state.in_flight {
                // Coalesce with the outstanding request at the same time.
                Some(ref mut in_flight) if (in_flight.time - time).abs() <= SEEK_EPSILON => {
                    in_flight.waiters.push(reply_tx);
                }
                _ => {
                    // A different target supersedes the pending seek.
                    if let Some(stale) = state.in_flight.take() {
                        debug!(
                            media = %self.media_id,
                            old = stale.time,
                            new = time,
                            "superseding pending seek"
                        );
                        for waiter in stale.waiters {
                            let _ = waiter.send(Err(ReplyError::Superseded));
                        }
                    }
                    state.next_generation += 1;
                    let generation = state.next_generation;
                    state.in_flight = Some(InFlight {
                        time,
                        generation,
                        waiters: vec![reply_tx],
                    });
                    self.tx
                        .send(SeekRequest { time, generation })
                        .map_err(|_| FramecutError::Decode("decoder worker terminated".into()))?;
                }
            }
            reply_rx
        };

        match tokio::time::timeout(DECODE_TIMEOUT, rx).await {
            Err(_) => Err(FramecutError::DecodeTimeout),
            Ok(Err(_)) => Err(FramecutError::Decode("decoder worker dropped reply".into())),
            Ok(Ok(Err(ReplyError::Superseded))) => Err(FramecutError::DecodeSuperseded),
            Ok(Ok(Err(ReplyError::Decode(reason)))) => Err(FramecutError::Decode(reason)),
            Ok(Ok(Ok(frame))) => Ok(frame),
        }
    }
}

//! Background thread that runs [`ServiceRequest`]s.
//!
//! The worker owns an `Arc<dyn SequenceService>` and processes requests
//! one at a time in submission order. Replies come back on a separate
//! channel, each tagged with the [`RequestId`] returned by
//! [`ServiceWorker::submit`]. Dropping the worker closes the request
//! channel and joins the thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use motif_core::RequestId;

use crate::error::{ReplyError, SubmitError};
use crate::request::{ServiceReply, ServiceRequest};
use crate::service::SequenceService;

struct Envelope {
    id: RequestId,
    request: ServiceRequest,
}

/// Handle to the service worker thread.
pub struct ServiceWorker {
    request_tx: Option<Sender<Envelope>>,
    reply_rx: Receiver<ServiceReply>,
    thread: Option<JoinHandle<()>>,
    next_id: u64,
}

impl ServiceWorker {
    /// Spawn the worker thread.
    ///
    /// `queue_capacity` bounds both the request and the reply channel and
    /// is raised to at least 1.
    pub fn spawn(service: Arc<dyn SequenceService>, queue_capacity: usize) -> std::io::Result<Self> {
        let capacity = queue_capacity.max(1);
        let (request_tx, request_rx) = crossbeam_channel::bounded(capacity);
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(capacity);
        let thread = thread::Builder::new()
            .name("motif-service".into())
            .spawn(move || worker_loop(service, request_rx, reply_tx))?;
        Ok(Self {
            request_tx: Some(request_tx),
            reply_rx,
            thread: Some(thread),
            next_id: 0,
        })
    }

    /// Queue `request` without blocking and return its id.
    pub fn submit(&mut self, request: ServiceRequest) -> Result<RequestId, SubmitError> {
        let tx = self.request_tx.as_ref().ok_or(SubmitError::Shutdown)?;
        let id = RequestId(self.next_id);
        tracing::debug!(%id, kind = request.kind(), "submitting service request");
        match tx.try_send(Envelope { id, request }) {
            Ok(()) => {
                self.next_id += 1;
                Ok(id)
            }
            Err(TrySendError::Full(_)) => Err(SubmitError::ChannelFull),
            Err(TrySendError::Disconnected(_)) => Err(SubmitError::Shutdown),
        }
    }

    /// A reply if one is ready.
    pub fn try_recv(&self) -> Result<Option<ServiceReply>, ReplyError> {
        match self.reply_rx.try_recv() {
            Ok(reply) => Ok(Some(reply)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ReplyError::Shutdown),
        }
    }

    /// Block until the next reply arrives, or until `timeout` elapses
    /// when one is given.
    pub fn recv(&self, timeout: Option<Duration>) -> Result<ServiceReply, ReplyError> {
        match timeout {
            None => self.reply_rx.recv().map_err(|_| ReplyError::Shutdown),
            Some(t) => self.reply_rx.recv_timeout(t).map_err(|e| match e {
                RecvTimeoutError::Timeout => ReplyError::Timeout,
                RecvTimeoutError::Disconnected => ReplyError::Shutdown,
            }),
        }
    }

    /// Whether the worker still accepts requests.
    pub fn is_running(&self) -> bool {
        self.request_tx.is_some()
    }

    /// Number of requests submitted so far.
    pub fn submitted(&self) -> u64 {
        self.next_id
    }

    /// Stop accepting requests and join the thread once it has drained
    /// its queue. Returns whether the thread exited cleanly.
    pub fn shutdown(&mut self) -> bool {
        self.request_tx = None;
        // Discard replies until the worker drops its sender, so it never
        // blocks on a full reply channel while being joined.
        if self.thread.is_some() {
            let dropped = self.reply_rx.iter().count();
            if dropped > 0 {
                tracing::debug!(dropped, "discarded replies on shutdown");
            }
        }
        match self.thread.take() {
            Some(handle) => {
                let joined = handle.join().is_ok();
                if !joined {
                    tracing::warn!("service worker panicked");
                }
                joined
            }
            None => true,
        }
    }
}

impl Drop for ServiceWorker {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for ServiceWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceWorker")
            .field("running", &self.is_running())
            .field("submitted", &self.next_id)
            .finish()
    }
}

fn worker_loop(
    service: Arc<dyn SequenceService>,
    request_rx: Receiver<Envelope>,
    reply_tx: Sender<ServiceReply>,
) {
    while let Ok(Envelope { id, request }) = request_rx.recv() {
        let start = Instant::now();
        let result = request.run(&*service);
        let elapsed = start.elapsed();
        match &result {
            Ok(seqs) => {
                tracing::debug!(%id, kind = request.kind(), returned = seqs.len(), ?elapsed, "service request done")
            }
            Err(err) => tracing::warn!(%id, kind = request.kind(), "service request failed: {err}"),
        }
        if reply_tx.send(ServiceReply { id, result, elapsed }).is_err() {
            break;
        }
    }
    // Channel closed; worker exits cleanly.
}

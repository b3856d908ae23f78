//! The generative collaborator behind the Motif grid.
//!
//! [`SequenceService`] is the interface to whatever model produces new
//! sequences (similar variants, linear and bilinear interpolation,
//! unconditional samples). The grid engine never calls it on its own
//! thread for generation; instead it hands [`ServiceRequest`]s to a
//! [`ServiceWorker`], which runs them on a dedicated background thread
//! and answers with [`ServiceReply`]s tagged by
//! [`RequestId`](motif_core::RequestId).
//!
//! ```text
//! Session thread                         motif-service thread
//!     |                                          |
//!     |--submit(request)------------------------>| request_rx.recv()
//!     |   [request_tx: bounded(capacity)]        | request.run(&*service)
//!     |<--ServiceReply { id, result }------------| reply_tx.send()
//!     |   [reply_rx: bounded(capacity)]          |
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod request;
pub mod service;
pub mod worker;

pub use error::{ReplyError, ServiceError, SubmitError};
pub use request::{ServiceReply, ServiceRequest};
pub use service::{quantize_or_original, SequenceService};
pub use worker::ServiceWorker;

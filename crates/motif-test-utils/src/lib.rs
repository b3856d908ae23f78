//! Test utilities and a mock sequence service for Motif development.
//!
//! [`MockSequenceService`] implements [`SequenceService`] deterministically:
//! every output encodes where it came from, every call is recorded, and
//! each method can be told to fail, to return too few sequences, or to
//! block until released through a [`MockGate`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashSet;
use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender};
use motif_core::{Note, Sequence};
use motif_service::{SequenceService, ServiceError};

/// Base pitch of interpolation frames: frame `i` carries pitch `60 + i`.
pub const FRAME_BASE_PITCH: u8 = 60;

/// Base pitch of bilinear output: index `k` carries pitch `24 + k % 96`.
pub const GRID_BASE_PITCH: u8 = 24;

/// Base pitch of samples: sample `i` starts with pitch `48 + i`.
pub const SAMPLE_BASE_PITCH: u8 = 48;

/// Which service method a failure or record refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MockMethod {
    Quantize,
    Similar,
    Interpolate,
    Bilinear,
    Sample,
}

/// One recorded call with the inputs that matter to tests.
#[derive(Clone, Debug, PartialEq)]
pub enum MockCall {
    Quantize {
        steps_per_quarter: u32,
    },
    Similar {
        sequence: Sequence,
        count: usize,
        temperature: f64,
    },
    Interpolate {
        endpoints: [Sequence; 2],
        count: usize,
    },
    Bilinear {
        corners: [Sequence; 4],
        dims: [u32; 2],
        temperature: f64,
    },
    Sample {
        count: usize,
        temperature: f64,
        steps_per_quarter: u32,
        qpm: f64,
    },
}

impl MockCall {
    pub fn method(&self) -> MockMethod {
        match self {
            Self::Quantize { .. } => MockMethod::Quantize,
            Self::Similar { .. } => MockMethod::Similar,
            Self::Interpolate { .. } => MockMethod::Interpolate,
            Self::Bilinear { .. } => MockMethod::Bilinear,
            Self::Sample { .. } => MockMethod::Sample,
        }
    }
}

/// Releases calls held by a gated [`MockSequenceService`].
///
/// Each [`release`](MockGate::release) lets one generative call through.
/// Dropping the gate releases every current and future call.
pub struct MockGate {
    tx: Sender<()>,
}

impl MockGate {
    pub fn release(&self) {
        let _ = self.tx.send(());
    }
}

/// Deterministic [`SequenceService`] for tests.
///
/// Outputs:
/// - `similar`: variant `i` is the input transposed up by `i + 1`.
/// - `interpolate`: frame `i` is [`fixtures::frame`]`(60 + i)`.
/// - `bilinear_interpolate`: index `k` is [`fixtures::frame`]`(24 + k % 96)`.
/// - `sample`: sample `i` is [`fixtures::melody`]`([48 + i, 50 + i, 52 + i])`.
/// - `quantize`: the reference quantizer.
#[derive(Default)]
pub struct MockSequenceService {
    calls: Mutex<Vec<MockCall>>,
    failing: Mutex<HashSet<MockMethod>>,
    shortfall: Mutex<Option<usize>>,
    gate: Option<Receiver<()>>,
}

impl MockSequenceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose generative calls block until released by the gate.
    pub fn gated() -> (Self, MockGate) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mock = Self {
            gate: Some(rx),
            ..Self::default()
        };
        (mock, MockGate { tx })
    }

    /// Make `method` return an error from now on.
    pub fn fail(&self, method: MockMethod) {
        self.failing.lock().unwrap().insert(method);
    }

    /// Make `method` succeed again.
    pub fn recover(&self, method: MockMethod) {
        self.failing.lock().unwrap().remove(&method);
    }

    /// Return `missing` fewer sequences than requested from every
    /// generative call.
    pub fn short_by(&self, missing: usize) {
        *self.shortfall.lock().unwrap() = Some(missing);
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls to `method` so far.
    pub fn calls_to(&self, method: MockMethod) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method() == method)
            .collect()
    }

    fn begin(&self, call: MockCall) -> Result<(), ServiceError> {
        let method = call.method();
        self.calls.lock().unwrap().push(call);
        if method != MockMethod::Quantize {
            if let Some(rx) = &self.gate {
                let _ = rx.recv();
            }
        }
        if self.failing.lock().unwrap().contains(&method) {
            return Err(ServiceError::Generation {
                reason: format!("mock {method:?} failure"),
            });
        }
        Ok(())
    }

    fn deliver(&self, count: usize) -> usize {
        let short = self.shortfall.lock().unwrap().unwrap_or(0);
        count.saturating_sub(short)
    }
}

impl SequenceService for MockSequenceService {
    fn quantize(&self, sequence: &Sequence, steps_per_quarter: u32) -> Result<Sequence, ServiceError> {
        self.begin(MockCall::Quantize { steps_per_quarter })?;
        Ok(sequence.quantized(steps_per_quarter)?)
    }

    fn similar(
        &self,
        sequence: &Sequence,
        count: usize,
        temperature: f64,
    ) -> Result<Vec<Sequence>, ServiceError> {
        self.begin(MockCall::Similar {
            sequence: sequence.clone(),
            count,
            temperature,
        })?;
        Ok((0..self.deliver(count))
            .map(|i| transpose(sequence, i as u8 + 1))
            .collect())
    }

    fn interpolate(&self, endpoints: &[Sequence; 2], count: usize) -> Result<Vec<Sequence>, ServiceError> {
        self.begin(MockCall::Interpolate {
            endpoints: endpoints.clone(),
            count,
        })?;
        Ok((0..self.deliver(count))
            .map(|i| fixtures::frame(FRAME_BASE_PITCH.saturating_add(i as u8)))
            .collect())
    }

    fn bilinear_interpolate(
        &self,
        corners: &[Sequence; 4],
        dims: [u32; 2],
        temperature: f64,
    ) -> Result<Vec<Sequence>, ServiceError> {
        self.begin(MockCall::Bilinear {
            corners: corners.clone(),
            dims,
            temperature,
        })?;
        let total = dims[0] as usize * dims[1] as usize;
        Ok((0..self.deliver(total))
            .map(|k| fixtures::frame(GRID_BASE_PITCH + (k % 96) as u8))
            .collect())
    }

    fn sample(
        &self,
        count: usize,
        temperature: f64,
        steps_per_quarter: u32,
        qpm: f64,
    ) -> Result<Vec<Sequence>, ServiceError> {
        self.begin(MockCall::Sample {
            count,
            temperature,
            steps_per_quarter,
            qpm,
        })?;
        Ok((0..self.deliver(count))
            .map(|i| {
                let p = SAMPLE_BASE_PITCH + i as u8;
                fixtures::melody(&[p, p + 2, p + 4])
            })
            .collect())
    }
}

fn transpose(sequence: &Sequence, by: u8) -> Sequence {
    Sequence {
        notes: sequence
            .notes
            .iter()
            .map(|n| Note {
                pitch: n.pitch.saturating_add(by).min(127),
                ..n.clone()
            })
            .collect(),
        ..sequence.clone()
    }
}

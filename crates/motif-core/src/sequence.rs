//! The [`Sequence`] payload carried by grid cells.
//!
//! A sequence is an immutable value from the grid's point of view. The
//! only transformations the engine applies itself are quantization (via
//! the sequence service, with [`Sequence::quantized`] as the reference
//! behaviour) and [`Sequence::normalized`], both of which return new
//! values.

use serde::{Deserialize, Serialize};

use crate::error::SequenceError;

/// Quantization resolution used throughout the grid: sixteenth notes.
pub const STEPS_PER_QUARTER: u32 = 4;

/// Length every normalized sequence is forced to: four bars of 4/4.
pub const TOTAL_STEPS: u32 = 64;

/// Tempo assumed when a sequence does not carry one.
pub const DEFAULT_QPM: f64 = 120.0;

fn default_qpm() -> f64 {
    DEFAULT_QPM
}

/// A single note event.
///
/// Unquantized notes carry only seconds (`start_time`, `end_time`);
/// quantization fills in the step fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// MIDI pitch.
    pub pitch: u8,
    /// MIDI velocity, if the producer supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<u8>,
    /// Onset in seconds.
    #[serde(default)]
    pub start_time: f64,
    /// Release in seconds.
    #[serde(default)]
    pub end_time: f64,
    /// Onset in quantization steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantized_start_step: Option<u32>,
    /// Release in quantization steps (exclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantized_end_step: Option<u32>,
}

impl Note {
    /// A note that is already quantized to `[start, end)` steps.
    pub fn quantized(pitch: u8, start: u32, end: u32) -> Self {
        Self {
            pitch,
            velocity: None,
            start_time: 0.0,
            end_time: 0.0,
            quantized_start_step: Some(start),
            quantized_end_step: Some(end),
        }
    }

    /// An unquantized note spanning `[start_time, end_time)` seconds.
    pub fn timed(pitch: u8, start_time: f64, end_time: f64) -> Self {
        Self {
            pitch,
            velocity: None,
            start_time,
            end_time,
            quantized_start_step: None,
            quantized_end_step: None,
        }
    }

    /// Whether the note lies entirely inside `[0, total_steps)`.
    ///
    /// Notes without step information never fit.
    pub fn fits_within(&self, total_steps: u32) -> bool {
        match (self.quantized_start_step, self.quantized_end_step) {
            (Some(start), Some(end)) => start < total_steps && end <= total_steps,
            _ => false,
        }
    }
}

/// Quantization metadata. Its presence marks a sequence as quantized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantizationInfo {
    /// Steps per quarter note.
    pub steps_per_quarter: u32,
}

/// A monophonic or polyphonic musical sequence.
///
/// # Examples
///
/// ```
/// use motif_core::{Note, Sequence};
///
/// let seq = Sequence::new(vec![Note::timed(60, 0.0, 0.5), Note::timed(64, 0.5, 1.0)]);
/// assert!(!seq.is_quantized());
///
/// let q = seq.quantized(4).unwrap();
/// assert!(q.is_quantized());
/// assert_eq!(q.notes[1].quantized_start_step, Some(4));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sequence {
    /// Notes in producer order.
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Present once the sequence has been quantized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization_info: Option<QuantizationInfo>,
    /// Length in steps, for quantized sequences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_quantized_steps: Option<u32>,
    /// Length in seconds, for unquantized sequences.
    #[serde(default)]
    pub total_time: f64,
    /// Tempo in quarter notes per minute.
    #[serde(default = "default_qpm")]
    pub tempo_qpm: f64,
}

impl Default for Sequence {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            quantization_info: None,
            total_quantized_steps: None,
            total_time: 0.0,
            tempo_qpm: DEFAULT_QPM,
        }
    }
}

impl Sequence {
    /// An unquantized sequence; `total_time` is the latest note release.
    pub fn new(notes: Vec<Note>) -> Self {
        let total_time = notes.iter().map(|n| n.end_time).fold(0.0, f64::max);
        Self {
            notes,
            total_time,
            ..Self::default()
        }
    }

    /// A sequence whose notes are already expressed in steps.
    pub fn quantized_from(notes: Vec<Note>, steps_per_quarter: u32, total_steps: u32) -> Self {
        Self {
            notes,
            quantization_info: Some(QuantizationInfo { steps_per_quarter }),
            total_quantized_steps: Some(total_steps),
            ..Self::default()
        }
    }

    /// Whether quantization metadata is present.
    pub fn is_quantized(&self) -> bool {
        self.quantization_info.is_some()
    }

    /// Whether the sequence has at least one note.
    pub fn has_notes(&self) -> bool {
        !self.notes.is_empty()
    }

    /// Reference quantizer: snap note times to `steps_per_quarter` steps.
    ///
    /// Already-quantized sequences are returned unchanged. Onsets and
    /// releases are rounded to the nearest step; a note that would
    /// collapse to zero length is extended to one step.
    pub fn quantized(&self, steps_per_quarter: u32) -> Result<Sequence, SequenceError> {
        if self.is_quantized() {
            return Ok(self.clone());
        }
        if steps_per_quarter == 0 {
            return Err(SequenceError::ZeroStepsPerQuarter);
        }
        if !self.tempo_qpm.is_finite() || self.tempo_qpm <= 0.0 {
            return Err(SequenceError::InvalidTempo {
                qpm: self.tempo_qpm,
            });
        }
        let steps_per_second = f64::from(steps_per_quarter) * self.tempo_qpm / 60.0;
        let to_step = |seconds: f64| (seconds * steps_per_second).round() as u32;
        let max_seconds = f64::from(u32::MAX) / steps_per_second;

        let mut notes = Vec::with_capacity(self.notes.len());
        for (index, note) in self.notes.iter().enumerate() {
            let valid = note.start_time.is_finite()
                && note.end_time.is_finite()
                && note.start_time >= 0.0
                && note.end_time >= note.start_time
                && note.end_time < max_seconds;
            if !valid {
                return Err(SequenceError::InvalidNoteTiming {
                    index,
                    start_time: note.start_time,
                    end_time: note.end_time,
                });
            }
            let start = to_step(note.start_time);
            let end = to_step(note.end_time).max(start.saturating_add(1));
            notes.push(Note {
                quantized_start_step: Some(start),
                quantized_end_step: Some(end),
                ..note.clone()
            });
        }

        let last_end = notes
            .iter()
            .filter_map(|n| n.quantized_end_step)
            .max()
            .unwrap_or(0);
        Ok(Sequence {
            notes,
            quantization_info: Some(QuantizationInfo { steps_per_quarter }),
            total_quantized_steps: Some(to_step(self.total_time).max(last_end)),
            total_time: self.total_time,
            tempo_qpm: self.tempo_qpm,
        })
    }

    /// Force the length to `total_steps` and drop notes that do not fit.
    ///
    /// A note is kept when its start step is `< total_steps` and its end
    /// step is `<= total_steps`.
    pub fn normalized(&self, total_steps: u32) -> Sequence {
        Sequence {
            notes: self
                .notes
                .iter()
                .filter(|n| n.fits_within(total_steps))
                .cloned()
                .collect(),
            total_quantized_steps: Some(total_steps),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn quantize_rounds_to_sixteenths_at_default_tempo() {
        // 120 qpm, 4 steps/quarter → 8 steps per second.
        let seq = Sequence::new(vec![Note::timed(60, 0.0, 0.25), Note::timed(62, 0.26, 1.0)]);
        let q = seq.quantized(STEPS_PER_QUARTER).unwrap();
        assert_eq!(q.notes[0].quantized_start_step, Some(0));
        assert_eq!(q.notes[0].quantized_end_step, Some(2));
        assert_eq!(q.notes[1].quantized_start_step, Some(2));
        assert_eq!(q.notes[1].quantized_end_step, Some(8));
        assert_eq!(q.total_quantized_steps, Some(8));
        assert_eq!(
            q.quantization_info,
            Some(QuantizationInfo {
                steps_per_quarter: 4
            })
        );
    }

    #[test]
    fn quantize_extends_zero_length_notes() {
        let seq = Sequence::new(vec![Note::timed(60, 0.5, 0.51)]);
        let q = seq.quantized(4).unwrap();
        assert_eq!(q.notes[0].quantized_start_step, Some(4));
        assert_eq!(q.notes[0].quantized_end_step, Some(5));
    }

    #[test]
    fn quantize_is_noop_on_quantized_input() {
        let seq = Sequence::quantized_from(vec![Note::quantized(60, 3, 5)], 4, 32);
        assert_eq!(seq.quantized(4).unwrap(), seq);
    }

    #[test]
    fn quantize_rejects_inverted_notes() {
        let seq = Sequence::new(vec![Note::timed(60, 1.0, 0.5)]);
        assert!(matches!(
            seq.quantized(4),
            Err(SequenceError::InvalidNoteTiming { index: 0, .. })
        ));
    }

    #[test]
    fn quantize_rejects_times_past_the_step_range() {
        let seq = Sequence::new(vec![Note::timed(60, 0.0, 0.5), Note::timed(62, 1e12, 1e12)]);
        assert_eq!(
            seq.quantized(4),
            Err(SequenceError::InvalidNoteTiming {
                index: 1,
                start_time: 1e12,
                end_time: 1e12,
            })
        );
        // The largest representable onset still quantizes.
        let edge = f64::from(u32::MAX - 1) / 8.0;
        let seq = Sequence::new(vec![Note::timed(60, edge, edge)]);
        let q = seq.quantized(4).unwrap();
        assert_eq!(q.notes[0].quantized_start_step, Some(u32::MAX - 1));
        assert_eq!(q.notes[0].quantized_end_step, Some(u32::MAX));
    }

    #[test]
    fn quantize_rejects_zero_resolution_and_bad_tempo() {
        let seq = Sequence::new(vec![Note::timed(60, 0.0, 0.5)]);
        assert_eq!(seq.quantized(0), Err(SequenceError::ZeroStepsPerQuarter));
        let slow = Sequence {
            tempo_qpm: 0.0,
            ..seq
        };
        assert!(matches!(
            slow.quantized(4),
            Err(SequenceError::InvalidTempo { .. })
        ));
    }

    #[test]
    fn normalize_filters_notes_outside_window() {
        let seq = Sequence::quantized_from(
            vec![
                Note::quantized(60, 0, 4),
                Note::quantized(61, 60, 64),
                Note::quantized(62, 63, 65),
                Note::quantized(63, 64, 66),
                Note::timed(64, 0.0, 1.0),
            ],
            4,
            80,
        );
        let n = seq.normalized(TOTAL_STEPS);
        assert_eq!(n.total_quantized_steps, Some(64));
        let pitches: Vec<u8> = n.notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 61]);
        // Source value is untouched.
        assert_eq!(seq.notes.len(), 5);
    }

    #[test]
    fn json_uses_camel_case_fields() {
        let seq = Sequence::quantized_from(vec![Note::quantized(60, 0, 2)], 4, 64);
        let json = serde_json::to_value(&seq).unwrap();
        assert_eq!(json["totalQuantizedSteps"], 64);
        assert_eq!(json["notes"][0]["quantizedStartStep"], 0);
        assert_eq!(json["quantizationInfo"]["stepsPerQuarter"], 4);
        let back: Sequence = serde_json::from_value(json).unwrap();
        assert_eq!(back, seq);
    }

    #[test]
    fn json_defaults_missing_tempo() {
        let seq: Sequence = serde_json::from_str(r#"{"notes":[{"pitch":60,"startTime":0.0,"endTime":0.5}]}"#).unwrap();
        assert_eq!(seq.tempo_qpm, DEFAULT_QPM);
        assert!(!seq.is_quantized());
    }

    proptest! {
        #[test]
        fn normalized_notes_always_fit(
            spans in proptest::collection::vec((0u32..100, 0u32..20), 0..16),
        ) {
            let notes = spans
                .iter()
                .map(|&(start, len)| Note::quantized(60, start, start + len))
                .collect();
            let seq = Sequence::quantized_from(notes, 4, 100);
            let n = seq.normalized(TOTAL_STEPS);
            prop_assert!(n.notes.iter().all(|note| note.fits_within(TOTAL_STEPS)));
            prop_assert!(n.notes.len() <= seq.notes.len());
        }
    }
}

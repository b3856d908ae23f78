//! Reusable sequence fixtures.
//!
//! - [`melody`]: quantized eighth notes, one per pitch.
//! - [`unquantized_melody`]: the same in seconds at 120 qpm.
//! - [`overlong_melody`]: quantized, with notes past step 64.
//! - [`frame`]: a one-note marker sequence, as produced by the mock.

use motif_core::{Note, Sequence, STEPS_PER_QUARTER, TOTAL_STEPS};

/// Quantized eighth notes (2 steps each), one per pitch, back to back.
pub fn melody(pitches: &[u8]) -> Sequence {
    let notes = pitches
        .iter()
        .enumerate()
        .map(|(i, &p)| Note::quantized(p, i as u32 * 2, i as u32 * 2 + 2))
        .collect();
    Sequence::quantized_from(notes, STEPS_PER_QUARTER, TOTAL_STEPS)
}

/// Unquantized eighth notes at 120 qpm (0.25 s each).
pub fn unquantized_melody(pitches: &[u8]) -> Sequence {
    let notes = pitches
        .iter()
        .enumerate()
        .map(|(i, &p)| Note::timed(p, i as f64 * 0.25, i as f64 * 0.25 + 0.25))
        .collect();
    Sequence::new(notes)
}

/// Quantized, 80 steps long; only the first note fits in 64 steps.
///
/// Notes: pitch 60 at `[0, 4)`, 62 at `[62, 66)`, 64 at `[70, 72)`.
pub fn overlong_melody() -> Sequence {
    Sequence::quantized_from(
        vec![
            Note::quantized(60, 0, 4),
            Note::quantized(62, 62, 66),
            Note::quantized(64, 70, 72),
        ],
        STEPS_PER_QUARTER,
        80,
    )
}

/// A quantized single-note sequence whose pitch identifies it.
pub fn frame(pitch: u8) -> Sequence {
    Sequence::quantized_from(vec![Note::quantized(pitch, 0, 4)], STEPS_PER_QUARTER, TOTAL_STEPS)
}

/// Pitch of the first note, if any.
pub fn first_pitch(sequence: &Sequence) -> Option<u8> {
    sequence.notes.first().map(|n| n.pitch)
}

//! Content fingerprints for grid snapshots.
//!
//! Uses FNV-1a for fast, deterministic hashing. Fingerprints are not
//! cryptographically secure; they only tell whether two cell lists hold
//! the same content in the same order.

use motif_core::Sequence;
use motif_grid::Cell;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Sentinel folded in for absent optional values.
const ABSENT: u64 = u64::MAX;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

fn fnv1a_opt(hash: u64, v: Option<u32>) -> u64 {
    fnv1a_u64(hash, v.map_or(ABSENT, u64::from))
}

fn fnv1a_sequence(mut hash: u64, seq: &Sequence) -> u64 {
    hash = fnv1a_u64(hash, seq.notes.len() as u64);
    for note in &seq.notes {
        hash = fnv1a_byte(hash, note.pitch);
        hash = fnv1a_u64(hash, note.velocity.map_or(ABSENT, u64::from));
        hash = fnv1a_u64(hash, note.start_time.to_bits());
        hash = fnv1a_u64(hash, note.end_time.to_bits());
        hash = fnv1a_opt(hash, note.quantized_start_step);
        hash = fnv1a_opt(hash, note.quantized_end_step);
    }
    hash = fnv1a_opt(hash, seq.quantization_info.map(|q| q.steps_per_quarter));
    hash = fnv1a_opt(hash, seq.total_quantized_steps);
    hash = fnv1a_u64(hash, seq.total_time.to_bits());
    fnv1a_u64(hash, seq.tempo_qpm.to_bits())
}

/// Fingerprint an ordered list of cells.
///
/// Position, loading flag and the full sequence payload of each cell are
/// folded in, in order. Returns `FNV_OFFSET` mixed with the length for an
/// empty list.
pub fn snapshot_fingerprint(cells: &[Cell]) -> u64 {
    let mut hash = fnv1a_u64(FNV_OFFSET, cells.len() as u64);
    for cell in cells {
        hash = fnv1a_u64(hash, cell.pos.x as u32 as u64);
        hash = fnv1a_u64(hash, cell.pos.y as u32 as u64);
        hash = fnv1a_byte(hash, cell.is_loading as u8);
        hash = match &cell.sequence {
            Some(seq) => fnv1a_sequence(fnv1a_byte(hash, 1), seq),
            None => fnv1a_byte(hash, 0),
        };
    }
    hash
}

//! Padding plan: where to splice zero bytes so every LOAD segment's file
//! offset becomes a multiple of the target alignment.
//!
//! Padding is computed against each segment's *effective* offset (original
//! offset plus everything already inserted before it), because every gap
//! displaces all bytes after it. Aligning against the original offsets
//! instead would under- or over-pad later segments.

use crate::tables::ProgramHeaderRecord;

/// Target file-offset alignment for loadable segments: 16 KiB pages.
pub const TARGET_ALIGNMENT: u64 = 16 * 1024;

/// Round `value` up to the next multiple of `alignment` (a power of two).
fn align_up(value: u64, alignment: u64) -> u64 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

/// One planned insertion: `padding` zero bytes spliced in immediately before
/// *original* file offset `offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Breakpoint {
    pub offset: u64,
    pub padding: u64,
    /// Prefix sum: total padding through and including this breakpoint.
    pub cumulative: u64,
}

/// The ordered set of insertions for one file, keyed by original offset.
///
/// Breakpoints are strictly increasing; segments sharing an original offset
/// accumulate into a single breakpoint.
#[derive(Clone, Debug, Default)]
pub struct PaddingPlan {
    breakpoints: Vec<Breakpoint>,
}

impl PaddingPlan {
    /// Plan the padding for the LOAD subset of `records`.
    ///
    /// Segments are visited in ascending original-offset order, ties kept in
    /// table order. Only non-zero paddings produce breakpoints, so an already
    /// aligned file yields an empty plan.
    pub fn for_segments(records: &[ProgramHeaderRecord]) -> Self {
        let mut loads: Vec<&ProgramHeaderRecord> =
            records.iter().filter(|r| r.is_load()).collect();
        loads.sort_by_key(|r| r.p_offset); // stable sort keeps table order on ties

        let mut breakpoints: Vec<Breakpoint> = Vec::new();
        let mut cumulative = 0u64;
        for seg in loads {
            let effective = seg.p_offset + cumulative;
            let padding = align_up(effective, TARGET_ALIGNMENT) - effective;
            if padding == 0 {
                continue;
            }
            cumulative += padding;
            match breakpoints.last_mut() {
                Some(last) if last.offset == seg.p_offset => {
                    last.padding += padding;
                    last.cumulative = cumulative;
                }
                _ => breakpoints.push(Breakpoint {
                    offset: seg.p_offset,
                    padding,
                    cumulative,
                }),
            }
        }
        Self { breakpoints }
    }

    /// Total padding from all breakpoints at or below `offset`.
    pub fn padding_before(&self, offset: u64) -> u64 {
        let idx = self.breakpoints.partition_point(|bp| bp.offset <= offset);
        if idx == 0 {
            0
        } else {
            self.breakpoints[idx - 1].cumulative
        }
    }

    /// Remap an original file offset into the padded buffer.
    ///
    /// Saturates instead of wrapping: a corrupt input can carry a nonsense
    /// offset near `u64::MAX` in an entry that is otherwise passed through.
    pub fn remap(&self, offset: u64) -> u64 {
        offset.saturating_add(self.padding_before(offset))
    }

    /// Sum of all planned insertions.
    pub fn total_padding(&self) -> u64 {
        self.breakpoints.last().map_or(0, |bp| bp.cumulative)
    }

    /// Number of planned insertions.
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Breakpoints in ascending original-offset order.
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    #[cfg(test)]
    pub(crate) fn from_breakpoints(breakpoints: Vec<Breakpoint>) -> Self {
        Self { breakpoints }
    }
}

use crate::error::ElfAlignError;
use crate::plan::PaddingPlan;

/// Rebuild `data` with the plan's zero gaps spliced in.
///
/// Bytes are copied in original-offset order, a zero-filled gap is inserted
/// immediately before each breakpoint, and the unconsumed tail is appended.
/// The output length is always `data.len() + plan.total_padding()`. Semantic
/// bytes are never modified; only zeros are inserted.
pub fn apply_plan(data: &[u8], plan: &PaddingPlan) -> Result<Vec<u8>, ElfAlignError> {
    let total = plan.total_padding() as usize;
    if total == 0 {
        return Ok(data.to_vec());
    }

    let mut out = vec![0u8; data.len() + total];
    let mut src = 0usize;
    let mut dst = 0usize;
    for bp in plan.breakpoints() {
        let offset = bp.offset as usize;
        // Unreachable with a plan built from sorted segments; kept as an
        // invariant check so a bad plan cannot silently corrupt the file.
        if offset < src {
            return Err(ElfAlignError::OverlappingPlan { offset: bp.offset });
        }
        let len = offset - src;
        out[dst..dst + len].copy_from_slice(&data[src..offset]);
        src = offset;
        dst += len + bp.padding as usize; // the gap itself stays zero
    }
    out[dst..].copy_from_slice(&data[src..]);
    Ok(out)
}

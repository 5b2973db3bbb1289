//! Bitfield packing
//!
//! Assigns each bitfield its bit offset within its storage unit and marks the
//! last bitfield of every group. A group is a run of consecutive bitfields of
//! equal byte size whose widths fit in one storage unit.

use crate::error::LowerResult;
use crate::ir::Type;

/// Compute bitfield offsets and group terminals in place.
///
/// Fields that are not bitfields are skipped and leave the running offset
/// alone; a group is closed by the field that precedes a non-bitfield.
pub fn mark_bitfields(fields: &mut [Type]) -> LowerResult<()> {
    let mut bf_offset = 0u64;
    for i in 0..fields.len() {
        let len = fields[i].bitfield_length();
        if len == 0 {
            continue;
        }
        let size = fields[i].size();
        let offset = bf_offset;
        bf_offset += len;
        let last = match fields.get(i + 1) {
            None => true,
            Some(next) => {
                next.bitfield_length() == 0
                    || next.size() != size
                    || bf_offset + next.bitfield_length() > size * 8
            }
        };
        if last {
            bf_offset = 0;
        }
        fields[i].set_bitfield_offset(offset, last)?;
    }
    Ok(())
}

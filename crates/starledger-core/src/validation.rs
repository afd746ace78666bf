//! Block validation: hash integrity and chain linkage.

use crate::block::Block;
use crate::error::ValidationError;

/// Check that a block's stored hash matches its fields.
///
/// `height` is the block's position in the chain, which is what gets
/// reported even if the block's own height field was altered.
pub fn validate_block(block: &Block, height: u64) -> Result<(), ValidationError> {
    let computed = block.compute_hash();
    if computed != *block.hash() {
        return Err(ValidationError::HashMismatch {
            height,
            stored: *block.hash(),
            computed,
        });
    }
    Ok(())
}

/// Check that `next`, at position `height`, links to `prev`.
pub fn validate_link(prev: &Block, next: &Block, height: u64) -> Result<(), ValidationError> {
    if next.previous_hash() != prev.hash() {
        return Err(ValidationError::BrokenLink {
            height,
            expected: *prev.hash(),
            got: *next.previous_hash(),
        });
    }
    Ok(())
}

//! Z-order rules for the focus set.
//!
//! Both rules return a new block list and leave the input untouched, so the
//! caller can keep the input as its undo snapshot.

use crate::model::Block;

/// Highest `z_index` among unfocused blocks, floored at zero.
fn unfocused_max_z(blocks: &[Block]) -> i64 {
    blocks
        .iter()
        .filter(|b| !b.focus)
        .fold(0, |max, b| max.max(b.z_index))
}

/// Raise every focused block one above the highest unfocused block.
pub fn place_top(blocks: &[Block]) -> Vec<Block> {
    let max_z = unfocused_max_z(blocks) + 1;
    blocks
        .iter()
        .map(|b| {
            let mut b = b.clone();
            if b.focus {
                b.z_index = max_z;
            }
            b
        })
        .collect()
}

/// Lower every focused block beneath the unfocused ones.
///
/// The bottom slot is derived from the unfocused *maximum*, minus one. When
/// that lands below zero, the unfocused blocks are lifted so the focus set
/// can sit at zero and no committed `z_index` is negative.
pub fn place_bottom(blocks: &[Block]) -> Vec<Block> {
    let mut min_z = unfocused_max_z(blocks) - 1;
    let mut lift = 0;
    if min_z < 0 {
        lift = -min_z;
        min_z = 0;
    }
    blocks
        .iter()
        .map(|b| {
            let mut b = b.clone();
            if b.focus {
                b.z_index = min_z;
            } else {
                b.z_index += lift;
            }
            b
        })
        .collect()
}

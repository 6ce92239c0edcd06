//! Drag alignment: snap lines and live drag deltas.
//!
//! When a drag starts, every unfocused block contributes five candidate
//! positions per axis for the anchor block (the one under the pointer):
//! edge-to-edge, edge-to-opposite-edge, and center-to-center. While the
//! pointer moves, the anchor's unconstrained position is compared against
//! the candidates and pulled onto the first one within the tolerance.
//!
//! | Case              | Y target          | Y guide   |
//! |-------------------|-------------------|-----------|
//! | top → top         | `t`               | `t`       |
//! | top → bottom      | `t + h`           | `t + h`   |
//! | center → center   | `t + h/2 - H/2`   | `t + h/2` |
//! | bottom → top      | `t - H`           | `t`       |
//! | bottom → bottom   | `t + h - H`       | `t + h`   |
//!
//! The X axis is the same table with `left`/`width`.

use crate::model::Block;
use serde::Serialize;

/// Default snapping distance in canvas pixels.
pub const SNAP_TOLERANCE: f64 = 5.0;

/// A position the anchor can snap to, and where to draw the guide for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapCandidate {
    /// Anchor `top` (Y axis) or `left` (X axis) that produces the alignment.
    pub target: f64,
    /// Canvas coordinate of the guide line shown while snapped.
    pub guide: f64,
}

impl SnapCandidate {
    const fn new(target: f64, guide: f64) -> Self {
        Self { target, guide }
    }
}

/// Candidate lists for both axes, in scan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentLines {
    /// Horizontal lines: candidates for the anchor's `top`.
    pub y: Vec<SnapCandidate>,
    /// Vertical lines: candidates for the anchor's `left`.
    pub x: Vec<SnapCandidate>,
}

impl AlignmentLines {
    /// Collect candidates for an anchor of the given size against `others`.
    pub fn collect<'a>(
        anchor_width: f64,
        anchor_height: f64,
        others: impl IntoIterator<Item = &'a Block>,
    ) -> Self {
        let mut lines = Self::default();
        for b in others {
            lines.y.extend(axis_candidates(b.top, b.height, anchor_height));
            lines.x.extend(axis_candidates(b.left, b.width, anchor_width));
        }
        lines
    }
}

fn axis_candidates(start: f64, size: f64, anchor_size: f64) -> [SnapCandidate; 5] {
    let end = start + size;
    let center = start + size / 2.0;
    [
        SnapCandidate::new(start, start),
        SnapCandidate::new(end, end),
        SnapCandidate::new(center - anchor_size / 2.0, center),
        SnapCandidate::new(start - anchor_size, start),
        SnapCandidate::new(end - anchor_size, end),
    ]
}

/// First candidate strictly closer than `tolerance` to `position`.
pub fn snap_axis(
    candidates: &[SnapCandidate],
    position: f64,
    tolerance: f64,
) -> Option<SnapCandidate> {
    candidates
        .iter()
        .find(|c| (c.target - position).abs() < tolerance)
        .copied()
}

/// Guide line coordinates to display; `None` hides that axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GuideLines {
    /// Vertical guide at this canvas `x`.
    pub x: Option<f64>,
    /// Horizontal guide at this canvas `y`.
    pub y: Option<f64>,
}

/// Result of one pointer move: the delta applied to every focused block
/// relative to its drag-start position, and the active guides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DragFrame {
    pub dx: f64,
    pub dy: f64,
    pub guides: GuideLines,
}

/// State captured when a drag starts.
#[derive(Debug, Clone)]
pub struct DragSession {
    start_x: f64,
    start_y: f64,
    start_left: f64,
    start_top: f64,
    /// `(index, left, top)` of every focused block at drag start.
    start_positions: Vec<(usize, f64, f64)>,
    lines: AlignmentLines,
    tolerance: f64,
}

impl DragSession {
    /// Begin a drag of the focus set, anchored on `blocks[anchor]`, with the
    /// pointer at `(x, y)`. Returns `None` if `anchor` is out of range.
    pub fn begin(blocks: &[Block], anchor: usize, x: f64, y: f64, tolerance: f64) -> Option<Self> {
        let anchor_block = blocks.get(anchor)?;
        let lines = AlignmentLines::collect(
            anchor_block.width,
            anchor_block.height,
            blocks.iter().filter(|b| !b.focus),
        );
        let start_positions = blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.focus)
            .map(|(i, b)| (i, b.left, b.top))
            .collect();

        Some(Self {
            start_x: x,
            start_y: y,
            start_left: anchor_block.left,
            start_top: anchor_block.top,
            start_positions,
            lines,
            tolerance,
        })
    }

    pub fn lines(&self) -> &AlignmentLines {
        &self.lines
    }

    /// Compute the frame for a pointer at `(x, y)`.
    ///
    /// With `axis_lock`, the axis that moved less since drag start is pinned
    /// before snapping runs.
    pub fn update(&self, x: f64, y: f64, axis_lock: bool) -> DragFrame {
        let (mut move_x, mut move_y) = (x, y);
        if axis_lock {
            if (move_x - self.start_x).abs() > (move_y - self.start_y).abs() {
                move_y = self.start_y;
            } else {
                move_x = self.start_x;
            }
        }

        let mut dx = move_x - self.start_x;
        let mut dy = move_y - self.start_y;
        let mut guides = GuideLines::default();

        if let Some(c) = snap_axis(&self.lines.y, self.start_top + dy, self.tolerance) {
            log::trace!("snap y: target={} guide={}", c.target, c.guide);
            dy = c.target - self.start_top;
            guides.y = Some(c.guide);
        }
        if let Some(c) = snap_axis(&self.lines.x, self.start_left + dx, self.tolerance) {
            log::trace!("snap x: target={} guide={}", c.target, c.guide);
            dx = c.target - self.start_left;
            guides.x = Some(c.guide);
        }

        DragFrame { dx, dy, guides }
    }

    /// A new block list with every focused block moved by the frame's delta
    /// from its drag-start position. Blocks that vanished since drag start
    /// are skipped.
    pub fn apply(&self, blocks: &[Block], frame: &DragFrame) -> Vec<Block> {
        let mut next = blocks.to_vec();
        for &(i, left, top) in &self.start_positions {
            if let Some(b) = next.get_mut(i) {
                b.left = left + frame.dx;
                b.top = top + frame.dy;
            }
        }
        next
    }
}

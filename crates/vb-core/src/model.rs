//! Block geometry model for VB documents.
//!
//! A document is a fixed-size container holding a flat list of blocks.
//! Each block is one placed component instance: position, size, stacking
//! order, selection flag, and opaque component configuration.
//!
//! The block list is only ever replaced as a whole (`Document::set_blocks`).
//! Commands keep owned copies of the list for undo, so a later edit of the
//! live list can never reach back into history.

use crate::error::ModelError;
use crate::id::ComponentKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ─── Block ───────────────────────────────────────────────────────────────

/// One placed component instance on the canvas.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Block {
    /// Component type rendered by the view.
    pub component_key: ComponentKey,
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    /// Stacking order. Not necessarily contiguous, never negative once committed.
    pub z_index: i64,
    /// Selection flag.
    pub focus: bool,
    /// Recenter on first layout; consumed by `Block::settle`.
    pub adjust_position: bool,
    /// Whether the user has resized this block.
    pub has_resize: bool,
    /// Design-time properties of the component.
    pub props: serde_json::Map<String, serde_json::Value>,
    /// Field bindings of the component.
    pub model: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_name: Option<String>,
}

impl Block {
    /// A freshly dropped block, positioned by the pointer and waiting for
    /// its first layout pass to recenter it.
    pub fn new(component_key: ComponentKey, top: f64, left: f64) -> Self {
        Self {
            component_key,
            top,
            left,
            adjust_position: true,
            ..Self::default()
        }
    }

    /// Record the measured size. On the first layout after a drop the block
    /// is recentered on the drop point and `adjust_position` is cleared.
    pub fn settle(&mut self, width: f64, height: f64) {
        if self.adjust_position {
            self.top -= height / 2.0;
            self.left -= width / 2.0;
            self.adjust_position = false;
        }
        self.width = width;
        self.height = height;
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

// ─── Focus ───────────────────────────────────────────────────────────────

/// A block list split into the focus set and everything else.
/// Both halves keep list order.
#[derive(Debug, Default)]
pub struct FocusSplit<'a> {
    pub focus: Vec<&'a Block>,
    pub unfocus: Vec<&'a Block>,
}

impl<'a> FocusSplit<'a> {
    pub fn of(blocks: &'a [Block]) -> Self {
        let (focus, unfocus) = blocks.iter().partition(|b| b.focus);
        Self { focus, unfocus }
    }

    /// Owned copies of the unfocused blocks.
    pub fn unfocused_owned(&self) -> Vec<Block> {
        self.unfocus.iter().map(|b| (*b).clone()).collect()
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// Canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub width: f64,
    pub height: f64,
}

impl Default for Container {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// The data model: a container and the blocks placed in it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub container: Container,
    #[serde(default)]
    blocks: Vec<Block>,
}

impl Document {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            blocks: Vec::new(),
        }
    }

    pub fn with_blocks(container: Container, blocks: Vec<Block>) -> Self {
        Self { container, blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Replace the whole block list.
    pub fn set_blocks(&mut self, blocks: Vec<Block>) {
        log::trace!("blocks replaced: {} -> {}", self.blocks.len(), blocks.len());
        self.blocks = blocks;
    }

    pub fn focus_split(&self) -> FocusSplit<'_> {
        FocusSplit::of(&self.blocks)
    }

    /// Parse a full model (`{"container": {...}, "blocks": [...]}`).
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ─── JSON boundary ───────────────────────────────────────────────────────

/// Parse a bare block list (`[{...}, ...]`), as exchanged by import/export.
pub fn blocks_from_json(json: &str) -> Result<Vec<Block>, ModelError> {
    Ok(serde_json::from_str(json)?)
}

pub fn blocks_to_json(blocks: &[Block]) -> Result<String, ModelError> {
    Ok(serde_json::to_string(blocks)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_camel_case_fields() {
        let json = r#"[{
            "componentKey": "input",
            "top": 10, "left": 20, "width": 100, "height": 30,
            "zIndex": 3, "focus": true, "adjustPosition": false,
            "hasResize": true, "props": {"label": "Name"},
            "model": {"default": "user.name"}, "slotName": "name"
        }]"#;
        let blocks = blocks_from_json(json).unwrap();
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!(b.component_key.as_str(), "input");
        assert_eq!((b.top, b.left, b.width, b.height), (10.0, 20.0, 100.0, 30.0));
        assert_eq!(b.z_index, 3);
        assert!(b.focus && b.has_resize && !b.adjust_position);
        assert_eq!(b.props["label"], "Name");
        assert_eq!(b.model["default"], "user.name");
        assert_eq!(b.slot_name.as_deref(), Some("name"));
    }

    #[test]
    fn missing_fields_default() {
        let blocks = blocks_from_json(r#"[{"componentKey": "button"}]"#).unwrap();
        assert_eq!(blocks[0].z_index, 0);
        assert!(!blocks[0].focus);
        assert!(blocks[0].props.is_empty());
    }

    #[test]
    fn non_array_is_rejected() {
        assert!(blocks_from_json(r#"{"componentKey": "button"}"#).is_err());
        assert!(blocks_from_json("not json").is_err());
    }

    #[test]
    fn json_roundtrip_preserves_blocks() {
        let mut a = Block::new(ComponentKey::intern("text"), 5.0, 6.0);
        a.props.insert("color".into(), serde_json::json!("#ff0000"));
        let doc = Document::with_blocks(Container::default(), vec![a]);
        let back = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn document_without_blocks_parses() {
        let doc = Document::from_json(r#"{"container": {"width": 320, "height": 480}}"#).unwrap();
        assert!(doc.blocks().is_empty());
        assert_eq!(doc.container.width, 320.0);
    }

    #[test]
    fn settle_recenters_once() {
        let mut b = Block::new(ComponentKey::intern("button"), 100.0, 200.0);
        b.settle(40.0, 20.0);
        assert_eq!((b.top, b.left), (90.0, 180.0));
        assert!(!b.adjust_position);

        b.settle(60.0, 20.0);
        assert_eq!((b.top, b.left), (90.0, 180.0), "second layout must not move it");
        assert_eq!(b.width, 60.0);
    }

    #[test]
    fn focus_split_keeps_order() {
        let mut blocks: Vec<Block> = (0..4)
            .map(|i| Block::new(ComponentKey::intern("text"), i as f64, 0.0))
            .collect();
        blocks[1].focus = true;
        blocks[3].focus = true;
        let split = FocusSplit::of(&blocks);
        let tops = |v: &[&Block]| v.iter().map(|b| b.top).collect::<Vec<_>>();
        assert_eq!(tops(&split.focus), vec![1.0, 3.0]);
        assert_eq!(tops(&split.unfocus), vec![0.0, 2.0]);
    }
}

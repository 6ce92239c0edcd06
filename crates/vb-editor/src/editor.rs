//! Editor: the composition root the view talks to.
//!
//! Owns the canvas (document + drag channel), the command registry with the
//! full catalog registered and initialized, and the drag gesture in
//! progress. Pointer and keyboard events from the view enter here.
//!
//! A drag gesture is:
//!
//! 1. `pointer_down` on a block: update the focus set, capture a `DragSession`.
//! 2. First `pointer_move`: emit `DragPhase::Start` with the untouched list.
//! 3. Every `pointer_move`: snap, move the focus set, report guides.
//! 4. `pointer_up`: emit `DragPhase::End`; the drag command records one entry.

use crate::catalog;
use crate::commands::{Command, CommandRegistry};
use crate::config::EditorConfig;
use crate::error::CommandResult;
use crate::events::{DragChannel, DragPhase};
use crate::input::Modifiers;
use crate::shortcuts::KeyCombo;
use serde_json::Value;
use vb_core::{Block, ComponentKey, Document, DragFrame, DragSession, GuideLines, blocks_to_json};

/// The context every command runs against.
pub struct Canvas {
    pub document: Document,
    pub drag: DragChannel,
}

impl Canvas {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            drag: DragChannel::new(),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        self.document.blocks()
    }

    /// Replace the whole block list.
    pub fn update_blocks(&mut self, blocks: Vec<Block>) {
        self.document.set_blocks(blocks);
    }

    fn emit_drag(&mut self, phase: DragPhase) {
        let Canvas { document, drag } = self;
        drag.emit(phase, document.blocks());
    }
}

struct Gesture {
    session: DragSession,
    moved: bool,
}

pub struct Editor {
    canvas: Canvas,
    commands: CommandRegistry<Canvas>,
    config: EditorConfig,
    gesture: Option<Gesture>,
    guides: GuideLines,
}

impl Editor {
    pub fn new(document: Document, config: EditorConfig) -> CommandResult<Self> {
        Self::with_commands(document, config, Vec::new())
    }

    /// An editor with extra application commands registered after the
    /// catalog and before init.
    pub fn with_commands(
        document: Document,
        config: EditorConfig,
        extra: Vec<Box<dyn Command<Canvas>>>,
    ) -> CommandResult<Self> {
        let mut commands = CommandRegistry::with_history_limit(config.history_limit);
        catalog::register_all(&mut commands)?;
        for command in extra {
            commands.register(command)?;
        }
        let mut canvas = Canvas::new(document);
        commands.init(&mut canvas);

        Ok(Self {
            canvas,
            commands,
            config,
            gesture: None,
            guides: GuideLines::default(),
        })
    }

    pub fn from_json(model: &str, config: EditorConfig) -> CommandResult<Self> {
        Self::new(Document::from_json(model)?, config)
    }

    pub fn document(&self) -> &Document {
        &self.canvas.document
    }

    pub fn blocks(&self) -> &[Block] {
        self.canvas.blocks()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Guide lines of the last pointer move; cleared when the drag ends.
    pub fn guides(&self) -> GuideLines {
        self.guides
    }

    pub fn commands(&self) -> &CommandRegistry<Canvas> {
        &self.commands
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.as_ref().is_some_and(|g| g.moved)
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Run a command by name. An active drag gesture is ended first, so its
    /// entry lands in history before the command's.
    pub fn dispatch(&mut self, name: &str, args: &[Value]) -> CommandResult<()> {
        if self.gesture.is_some() {
            log::debug!("{name} ends the active drag");
            self.end_gesture()?;
        }
        self.commands.dispatch(name, args, &mut self.canvas)
    }

    pub fn undo(&mut self) -> CommandResult<()> {
        self.dispatch("undo", &[])
    }

    pub fn redo(&mut self) -> CommandResult<()> {
        self.dispatch("redo", &[])
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    /// Dispatch the commands bound to a key event. Returns whether any
    /// matched, so the view knows to suppress the browser default.
    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> CommandResult<bool> {
        let combo = KeyCombo::from_event(key, modifiers);
        // Bare modifier presses (shift for the axis lock) keep the drag alive.
        if self.gesture.is_some() && self.commands.is_bound(&combo) {
            log::debug!("{combo} ends the active drag");
            self.end_gesture()?;
        }
        let matched = self.commands.dispatch_key(&combo, &mut self.canvas)?;
        if !matched {
            log::trace!("no command bound to {combo}");
        }
        Ok(matched)
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Pointer pressed at `(x, y)` over block `hit`, or over empty canvas.
    ///
    /// Shift toggles the hit block's focus; a plain press on an unfocused
    /// block makes it the only focused one. A press on empty canvas clears
    /// the focus set unless shift is held. If the hit block ends up focused,
    /// a drag session starts anchored on it.
    pub fn pointer_down(&mut self, hit: Option<usize>, x: f64, y: f64, modifiers: Modifiers) {
        self.gesture = None;
        self.guides = GuideLines::default();

        let Some(index) = hit.filter(|&i| i < self.blocks().len()) else {
            if !modifiers.shift && self.blocks().iter().any(|b| b.focus) {
                self.set_focus(|_, _| false);
            }
            return;
        };

        if modifiers.shift {
            self.set_focus(|i, b| if i == index { !b.focus } else { b.focus });
        } else if !self.blocks()[index].focus {
            self.set_focus(|i, _| i == index);
        }

        if self.blocks()[index].focus {
            self.gesture = DragSession::begin(self.blocks(), index, x, y, self.config.snap_tolerance)
                .map(|session| Gesture {
                    session,
                    moved: false,
                });
        }
    }

    /// Pointer moved. While a drag is active, moves the focus set (snapped)
    /// and returns the frame; otherwise returns `None`.
    pub fn pointer_move(&mut self, x: f64, y: f64, modifiers: Modifiers) -> Option<DragFrame> {
        let gesture = self.gesture.as_mut()?;
        if !gesture.moved {
            gesture.moved = true;
            self.canvas.emit_drag(DragPhase::Start);
        }

        let frame = gesture.session.update(x, y, modifiers.shift);
        let moved = gesture.session.apply(self.canvas.blocks(), &frame);
        self.canvas.update_blocks(moved);
        self.guides = frame.guides;
        Some(frame)
    }

    /// Pointer released. Ends the drag gesture, if one moved, and records it.
    /// Returns whether a history entry was recorded.
    pub fn pointer_up(&mut self) -> CommandResult<bool> {
        self.end_gesture()
    }

    fn end_gesture(&mut self) -> CommandResult<bool> {
        self.guides = GuideLines::default();
        let Some(gesture) = self.gesture.take() else {
            return Ok(false);
        };
        if !gesture.moved {
            return Ok(false);
        }
        self.canvas.emit_drag(DragPhase::End);
        let recorded = self.commands.run_pending(&mut self.canvas)?;
        Ok(recorded > 0)
    }

    // ─── Layout callbacks ────────────────────────────────────────────────

    /// Place a new component at the drop point. It is recentered on its
    /// first `settle_block`. Returns the new block's index.
    pub fn drop_component(&mut self, component_key: &str, x: f64, y: f64) -> usize {
        let mut blocks = self.blocks().to_vec();
        blocks.push(Block::new(ComponentKey::intern(component_key), y, x));
        let index = blocks.len() - 1;
        log::debug!("dropped {component_key} at ({x}, {y}) as block {index}");
        self.canvas.update_blocks(blocks);
        index
    }

    /// Report the measured size of a block. Returns `false` if `index` is
    /// out of range.
    pub fn settle_block(&mut self, index: usize, width: f64, height: f64) -> bool {
        let mut blocks = self.blocks().to_vec();
        let Some(block) = blocks.get_mut(index) else {
            return false;
        };
        block.settle(width, height);
        self.canvas.update_blocks(blocks);
        true
    }

    /// The block list as JSON text, for export.
    pub fn export_json(&self) -> CommandResult<String> {
        Ok(blocks_to_json(self.blocks())?)
    }

    pub fn model_json(&self) -> CommandResult<String> {
        Ok(self.canvas.document.to_json()?)
    }

    fn set_focus(&mut self, focus: impl Fn(usize, &Block) -> bool) {
        let blocks = self
            .blocks()
            .iter()
            .enumerate()
            .map(|(i, b)| Block {
                focus: focus(i, b),
                ..b.clone()
            })
            .collect();
        self.canvas.update_blocks(blocks);
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.commands.shutdown(&mut self.canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vb_core::Container;

    fn editor(blocks: &[(f64, f64, bool)]) -> Editor {
        let blocks = blocks
            .iter()
            .map(|&(top, left, focus)| Block {
                component_key: ComponentKey::intern("button"),
                top,
                left,
                width: 50.0,
                height: 50.0,
                focus,
                ..Block::default()
            })
            .collect();
        Editor::new(Document::with_blocks(Container::default(), blocks), EditorConfig::default())
            .unwrap()
    }

    fn focus(editor: &Editor) -> Vec<bool> {
        editor.blocks().iter().map(|b| b.focus).collect()
    }

    #[test]
    fn press_selects_only_hit_block() {
        let mut e = editor(&[(0.0, 0.0, true), (0.0, 100.0, false)]);
        e.pointer_down(Some(1), 110.0, 10.0, Modifiers::NONE);
        assert_eq!(focus(&e), vec![false, true]);
    }

    #[test]
    fn shift_press_toggles() {
        let mut e = editor(&[(0.0, 0.0, true), (0.0, 100.0, false)]);
        e.pointer_down(Some(1), 110.0, 10.0, Modifiers::SHIFT);
        assert_eq!(focus(&e), vec![true, true]);
        e.pointer_down(Some(0), 10.0, 10.0, Modifiers::SHIFT);
        assert_eq!(focus(&e), vec![false, true]);
        assert!(e.pointer_move(20.0, 20.0, Modifiers::NONE).is_none());
    }

    #[test]
    fn press_on_empty_canvas_clears_focus() {
        let mut e = editor(&[(0.0, 0.0, true)]);
        e.pointer_down(None, 500.0, 500.0, Modifiers::SHIFT);
        assert_eq!(focus(&e), vec![true]);
        e.pointer_down(None, 500.0, 500.0, Modifiers::NONE);
        assert_eq!(focus(&e), vec![false]);
    }

    #[test]
    fn click_without_move_records_nothing() {
        let mut e = editor(&[(0.0, 0.0, false)]);
        e.pointer_down(Some(0), 10.0, 10.0, Modifiers::NONE);
        assert!(!e.pointer_up().unwrap());
        assert!(!e.can_undo());
    }

    #[test]
    fn drop_then_settle_recenters() {
        let mut e = editor(&[]);
        let index = e.drop_component("input", 300.0, 200.0);
        assert!(e.blocks()[index].adjust_position);
        assert!(e.settle_block(index, 100.0, 40.0));
        let b = &e.blocks()[index];
        assert_eq!((b.left, b.top), (250.0, 180.0));
        assert!(!e.settle_block(9, 1.0, 1.0));
        assert!(!e.can_undo());
    }

    #[test]
    fn keyboard_delete_and_undo() {
        let mut e = editor(&[(0.0, 0.0, true), (0.0, 100.0, false)]);
        assert!(e.key_down("Delete", Modifiers::NONE).unwrap());
        assert_eq!(e.blocks().len(), 1);
        assert!(e.key_down("z", Modifiers::CTRL).unwrap());
        assert_eq!(e.blocks().len(), 2);
        assert!(!e.key_down("q", Modifiers::NONE).unwrap());
    }
}

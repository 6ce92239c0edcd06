//! The built-in page-builder commands.
//!
//! Every recorded command keeps owned before/after copies of the block list
//! and swaps them in on undo/redo. Undo is a structural restore, never an
//! inverse computation.
//!
//! | Command            | Args                   | Recorded | Keys                           |
//! |--------------------|------------------------|----------|--------------------------------|
//! | `delete`           | none                   | yes      | `backspace`, `delete`, `ctrl+d`|
//! | `clear`            | none                   | yes      | none                           |
//! | `drag`             | none (self-dispatched) | yes      | none                           |
//! | `update-block`     | `index`, block         | yes      | none                           |
//! | `update-container` | `{width, height}`      | yes      | none                           |
//! | `place-top`        | none                   | yes      | `ctrl+up`                      |
//! | `place-bottom`     | none                   | yes      | `ctrl+down`                    |
//! | `import`           | block list JSON text   | yes      | none                           |
//! | `select-all`       | none                   | no       | `ctrl+a`                       |

use crate::commands::{Command, CommandExecution, CommandRegistry, Dispatcher, Teardown};
use crate::editor::Canvas;
use crate::error::{CommandError, CommandResult};
use crate::events::DragPhase;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use vb_core::{Block, Container, ModelError, blocks_from_json, place_bottom, place_top};

pub const DELETE: &str = "delete";
pub const CLEAR: &str = "clear";
pub const DRAG: &str = "drag";
pub const UPDATE_BLOCK: &str = "update-block";
pub const UPDATE_CONTAINER: &str = "update-container";
pub const PLACE_TOP: &str = "place-top";
pub const PLACE_BOTTOM: &str = "place-bottom";
pub const IMPORT: &str = "import";
pub const SELECT_ALL: &str = "select-all";

/// Register the whole catalog.
pub fn register_all(registry: &mut CommandRegistry<Canvas>) -> CommandResult<()> {
    registry.register(DeleteCommand)?;
    registry.register(DragCommand::default())?;
    registry.register(ClearCommand)?;
    registry.register(PlaceTopCommand)?;
    registry.register(PlaceBottomCommand)?;
    registry.register(UpdateBlockCommand)?;
    registry.register(UpdateContainerCommand)?;
    registry.register(ImportCommand)?;
    registry.register(SelectAllCommand)?;
    Ok(())
}

/// Swap between two owned block lists.
fn swap_blocks(before: Vec<Block>, after: Vec<Block>) -> CommandExecution<Canvas> {
    CommandExecution::new(move |canvas: &mut Canvas| canvas.update_blocks(after.clone()))
        .with_undo(move |canvas: &mut Canvas| canvas.update_blocks(before.clone()))
}

fn arg<'a>(command: &str, args: &'a [Value], index: usize) -> CommandResult<&'a Value> {
    args.get(index)
        .ok_or_else(|| CommandError::invalid_args(command, format!("missing argument {index}")))
}

// ─── delete / clear ──────────────────────────────────────────────────────

/// Remove the focus set.
pub struct DeleteCommand;

impl Command<Canvas> for DeleteCommand {
    fn name(&self) -> &str {
        DELETE
    }

    fn keyboard(&self) -> &[&str] {
        &["backspace", "delete", "ctrl+d"]
    }

    fn execute(&mut self, canvas: &mut Canvas, _args: &[Value]) -> CommandResult<CommandExecution<Canvas>> {
        let before = canvas.blocks().to_vec();
        let after = canvas.document.focus_split().unfocused_owned();
        Ok(swap_blocks(before, after))
    }
}

/// Remove every block.
pub struct ClearCommand;

impl Command<Canvas> for ClearCommand {
    fn name(&self) -> &str {
        CLEAR
    }

    fn execute(&mut self, canvas: &mut Canvas, _args: &[Value]) -> CommandResult<CommandExecution<Canvas>> {
        Ok(swap_blocks(canvas.blocks().to_vec(), Vec::new()))
    }
}

// ─── drag ────────────────────────────────────────────────────────────────

/// Records one history entry per drag gesture.
///
/// Listens to the canvas drag channel: `Start` snapshots the block list,
/// `End` queues a dispatch of this command, whose execution pairs the
/// snapshot with the list as it stands after the gesture.
#[derive(Default)]
pub struct DragCommand {
    before: Rc<RefCell<Option<Vec<Block>>>>,
}

impl Command<Canvas> for DragCommand {
    fn name(&self) -> &str {
        DRAG
    }

    fn init(&mut self, canvas: &mut Canvas, dispatcher: &Dispatcher) -> Option<Teardown<Canvas>> {
        let before = Rc::clone(&self.before);
        let start = canvas.drag.on(DragPhase::Start, move |blocks| {
            *before.borrow_mut() = Some(blocks.to_vec());
        });
        let dispatcher = dispatcher.clone();
        let end = canvas
            .drag
            .on(DragPhase::End, move |_| dispatcher.request(DRAG, Vec::new()));

        Some(Box::new(move |canvas: &mut Canvas| {
            canvas.drag.off(start);
            canvas.drag.off(end);
        }))
    }

    fn execute(&mut self, canvas: &mut Canvas, _args: &[Value]) -> CommandResult<CommandExecution<Canvas>> {
        let Some(before) = self.before.borrow_mut().take() else {
            log::warn!("drag dispatched without a recorded start");
            return Err(CommandError::invalid_args(DRAG, "no drag gesture in progress"));
        };
        Ok(swap_blocks(before, canvas.blocks().to_vec()))
    }
}

// ─── z-order ─────────────────────────────────────────────────────────────

/// Raise the focus set above every other block.
pub struct PlaceTopCommand;

impl Command<Canvas> for PlaceTopCommand {
    fn name(&self) -> &str {
        PLACE_TOP
    }

    fn keyboard(&self) -> &[&str] {
        &["ctrl+up"]
    }

    fn execute(&mut self, canvas: &mut Canvas, _args: &[Value]) -> CommandResult<CommandExecution<Canvas>> {
        let before = canvas.blocks().to_vec();
        let after = place_top(&before);
        Ok(swap_blocks(before, after))
    }
}

/// Lower the focus set beneath every other block.
pub struct PlaceBottomCommand;

impl Command<Canvas> for PlaceBottomCommand {
    fn name(&self) -> &str {
        PLACE_BOTTOM
    }

    fn keyboard(&self) -> &[&str] {
        &["ctrl+down"]
    }

    fn execute(&mut self, canvas: &mut Canvas, _args: &[Value]) -> CommandResult<CommandExecution<Canvas>> {
        let before = canvas.blocks().to_vec();
        let after = place_bottom(&before);
        Ok(swap_blocks(before, after))
    }
}

// ─── field edits ─────────────────────────────────────────────────────────

/// Replace one block: `[index, block]`.
pub struct UpdateBlockCommand;

impl Command<Canvas> for UpdateBlockCommand {
    fn name(&self) -> &str {
        UPDATE_BLOCK
    }

    fn execute(&mut self, canvas: &mut Canvas, args: &[Value]) -> CommandResult<CommandExecution<Canvas>> {
        let index = arg(UPDATE_BLOCK, args, 0)?
            .as_u64()
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| CommandError::invalid_args(UPDATE_BLOCK, "index must be a non-negative integer"))?;
        let block: Block =
            serde_json::from_value(arg(UPDATE_BLOCK, args, 1)?.clone()).map_err(ModelError::from)?;

        let before = canvas.blocks().to_vec();
        if index >= before.len() {
            return Err(CommandError::invalid_args(
                UPDATE_BLOCK,
                format!("index {index} out of range for {} blocks", before.len()),
            ));
        }
        let mut after = before.clone();
        after[index] = block;
        Ok(swap_blocks(before, after))
    }
}

/// Resize the canvas: `[{width, height}]`.
pub struct UpdateContainerCommand;

impl Command<Canvas> for UpdateContainerCommand {
    fn name(&self) -> &str {
        UPDATE_CONTAINER
    }

    fn execute(&mut self, canvas: &mut Canvas, args: &[Value]) -> CommandResult<CommandExecution<Canvas>> {
        let after: Container = serde_json::from_value(arg(UPDATE_CONTAINER, args, 0)?.clone())
            .map_err(ModelError::from)?;
        let before = canvas.document.container;
        Ok(
            CommandExecution::new(move |canvas: &mut Canvas| canvas.document.container = after)
                .with_undo(move |canvas: &mut Canvas| canvas.document.container = before),
        )
    }
}

/// Replace the block list with one parsed from JSON text: `["[...]"]`.
pub struct ImportCommand;

impl Command<Canvas> for ImportCommand {
    fn name(&self) -> &str {
        IMPORT
    }

    fn execute(&mut self, canvas: &mut Canvas, args: &[Value]) -> CommandResult<CommandExecution<Canvas>> {
        let text = arg(IMPORT, args, 0)?
            .as_str()
            .ok_or_else(|| CommandError::invalid_args(IMPORT, "expected JSON text"))?;
        let after = blocks_from_json(text)?;
        Ok(swap_blocks(canvas.blocks().to_vec(), after))
    }
}

// ─── selection ───────────────────────────────────────────────────────────

/// Focus every block. Selection is not an edit, so it is not recorded.
pub struct SelectAllCommand;

impl Command<Canvas> for SelectAllCommand {
    fn name(&self) -> &str {
        SELECT_ALL
    }

    fn keyboard(&self) -> &[&str] {
        &["ctrl+a"]
    }

    fn follow_queue(&self) -> bool {
        false
    }

    fn execute(&mut self, _canvas: &mut Canvas, _args: &[Value]) -> CommandResult<CommandExecution<Canvas>> {
        Ok(CommandExecution::new(|canvas: &mut Canvas| {
            let blocks = canvas
                .blocks()
                .iter()
                .cloned()
                .map(|mut b| {
                    b.focus = true;
                    b
                })
                .collect();
            canvas.update_blocks(blocks);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use vb_core::{ComponentKey, Document};

    fn block(top: f64, z_index: i64, focus: bool) -> Block {
        Block {
            component_key: ComponentKey::intern("text"),
            top,
            width: 10.0,
            height: 10.0,
            z_index,
            focus,
            ..Block::default()
        }
    }

    fn setup(blocks: Vec<Block>) -> (CommandRegistry<Canvas>, Canvas) {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry).unwrap();
        let mut canvas = Canvas::new(Document::with_blocks(Container::default(), blocks));
        registry.init(&mut canvas);
        (registry, canvas)
    }

    fn tops(canvas: &Canvas) -> Vec<f64> {
        canvas.blocks().iter().map(|b| b.top).collect()
    }

    #[test]
    fn delete_removes_focus_set_and_undoes() {
        let (mut r, mut canvas) = setup(vec![block(0.0, 0, false), block(1.0, 0, true), block(2.0, 0, false)]);
        r.dispatch(DELETE, &[], &mut canvas).unwrap();
        assert_eq!(tops(&canvas), vec![0.0, 2.0]);
        r.dispatch("undo", &[], &mut canvas).unwrap();
        assert_eq!(tops(&canvas), vec![0.0, 1.0, 2.0]);
        assert!(canvas.blocks()[1].focus);
    }

    #[test]
    fn clear_and_restore() {
        let (mut r, mut canvas) = setup(vec![block(0.0, 0, false), block(1.0, 0, true)]);
        let original = canvas.blocks().to_vec();
        r.dispatch(CLEAR, &[], &mut canvas).unwrap();
        assert!(canvas.blocks().is_empty());
        r.dispatch("undo", &[], &mut canvas).unwrap();
        assert_eq!(canvas.blocks(), original.as_slice());
        r.dispatch("redo", &[], &mut canvas).unwrap();
        assert!(canvas.blocks().is_empty());
    }

    #[test]
    fn place_bottom_is_undoable() {
        let (mut r, mut canvas) = setup(vec![block(0.0, 0, false), block(1.0, 3, true)]);
        r.dispatch(PLACE_BOTTOM, &[], &mut canvas).unwrap();
        let z: Vec<i64> = canvas.blocks().iter().map(|b| b.z_index).collect();
        assert_eq!(z, vec![1, 0]);
        r.dispatch("undo", &[], &mut canvas).unwrap();
        let z: Vec<i64> = canvas.blocks().iter().map(|b| b.z_index).collect();
        assert_eq!(z, vec![0, 3]);
    }

    #[test]
    fn place_top_twice_is_stable() {
        let (mut r, mut canvas) = setup(vec![block(0.0, 4, false), block(1.0, 0, true)]);
        r.dispatch(PLACE_TOP, &[], &mut canvas).unwrap();
        let first = canvas.blocks()[1].z_index;
        r.dispatch(PLACE_TOP, &[], &mut canvas).unwrap();
        assert_eq!(canvas.blocks()[1].z_index, first);
        assert_eq!(first, 5);
    }

    #[test]
    fn drag_records_one_entry_per_gesture() {
        let (mut r, mut canvas) = setup(vec![block(0.0, 0, true)]);
        let start = canvas.blocks().to_vec();
        canvas.drag.emit(DragPhase::Start, &start);
        for step in 1..=10 {
            let mut moved = canvas.blocks().to_vec();
            moved[0].top = f64::from(step);
            canvas.update_blocks(moved);
        }
        let end = canvas.blocks().to_vec();
        canvas.drag.emit(DragPhase::End, &end);
        assert_eq!(r.run_pending(&mut canvas).unwrap(), 1);

        assert_eq!(r.history().names().collect::<Vec<_>>(), vec![DRAG]);
        assert_eq!(tops(&canvas), vec![10.0]);
        r.dispatch("undo", &[], &mut canvas).unwrap();
        assert_eq!(tops(&canvas), vec![0.0]);
        r.dispatch("redo", &[], &mut canvas).unwrap();
        assert_eq!(tops(&canvas), vec![10.0]);
    }

    #[test]
    fn drag_without_start_is_rejected() {
        let (mut r, mut canvas) = setup(vec![block(0.0, 0, true)]);
        r.dispatch(PLACE_TOP, &[], &mut canvas).unwrap();
        r.dispatch("undo", &[], &mut canvas).unwrap();

        assert!(matches!(
            r.dispatch(DRAG, &[], &mut canvas),
            Err(CommandError::InvalidArgs { .. })
        ));
        assert_eq!(r.history().names().collect::<Vec<_>>(), vec![PLACE_TOP]);
        assert!(r.can_redo(), "redo future survives");
    }

    #[test]
    fn drag_teardown_unsubscribes() {
        let (mut r, mut canvas) = setup(vec![]);
        assert_eq!(canvas.drag.listener_count(DragPhase::Start), 1);
        assert_eq!(canvas.drag.listener_count(DragPhase::End), 1);
        r.shutdown(&mut canvas);
        assert_eq!(canvas.drag.listener_count(DragPhase::Start), 0);
        assert_eq!(canvas.drag.listener_count(DragPhase::End), 0);
    }

    #[test]
    fn update_block_replaces_one() {
        let (mut r, mut canvas) = setup(vec![block(0.0, 0, false), block(1.0, 0, false)]);
        let args = [json!(1), json!({"componentKey": "button", "top": 42, "props": {"text": "OK"}})];
        r.dispatch(UPDATE_BLOCK, &args, &mut canvas).unwrap();
        assert_eq!(canvas.blocks()[1].component_key.as_str(), "button");
        assert_eq!(canvas.blocks()[1].props["text"], "OK");
        r.dispatch("undo", &[], &mut canvas).unwrap();
        assert_eq!(tops(&canvas), vec![0.0, 1.0]);
    }

    #[test]
    fn update_block_rejects_bad_args() {
        let (mut r, mut canvas) = setup(vec![block(0.0, 0, false)]);
        let out_of_range = [json!(3), json!({})];
        assert!(matches!(
            r.dispatch(UPDATE_BLOCK, &out_of_range, &mut canvas),
            Err(CommandError::InvalidArgs { .. })
        ));
        let not_a_block = [json!(0), json!([1, 2])];
        assert!(matches!(
            r.dispatch(UPDATE_BLOCK, &not_a_block, &mut canvas),
            Err(CommandError::Model(_))
        ));
        assert!(r.history().is_empty());
    }

    #[test]
    fn update_container_is_undoable() {
        let (mut r, mut canvas) = setup(vec![]);
        r.dispatch(UPDATE_CONTAINER, &[json!({"width": 1024, "height": 768})], &mut canvas)
            .unwrap();
        assert_eq!(canvas.document.container.width, 1024.0);
        r.dispatch("undo", &[], &mut canvas).unwrap();
        assert_eq!(canvas.document.container, Container::default());
    }

    #[test]
    fn import_replaces_blocks() {
        let (mut r, mut canvas) = setup(vec![block(0.0, 0, false)]);
        let text = r#"[{"componentKey": "input", "top": 7}, {"componentKey": "input", "top": 8}]"#;
        r.dispatch(IMPORT, &[json!(text)], &mut canvas).unwrap();
        assert_eq!(tops(&canvas), vec![7.0, 8.0]);

        assert!(matches!(
            r.dispatch(IMPORT, &[json!("{oops")], &mut canvas),
            Err(CommandError::Model(_))
        ));
        assert_eq!(r.history().len(), 1);

        r.dispatch("undo", &[], &mut canvas).unwrap();
        assert_eq!(tops(&canvas), vec![0.0]);
    }

    #[test]
    fn select_all_is_not_recorded() {
        let (mut r, mut canvas) = setup(vec![block(0.0, 0, false), block(1.0, 0, false)]);
        r.dispatch(SELECT_ALL, &[], &mut canvas).unwrap();
        assert!(canvas.blocks().iter().all(|b| b.focus));
        assert!(r.history().is_empty());
    }
}

//! WASM bridge for the page builder: exposes the Rust editor to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The view owns rendering and
//! hit testing; everything it learns from the pointer and keyboard is
//! forwarded to a `VbCanvas`, and block lists come back as JSON.

use serde_json::Value;
use vb_editor::{Editor, EditorConfig, Modifiers};
use wasm_bindgen::prelude::*;

/// The WASM-facing editor handle.
#[wasm_bindgen]
pub struct VbCanvas {
    editor: Editor,
}

#[wasm_bindgen]
impl VbCanvas {
    /// Create an editor over a page model (`{container, blocks}` JSON).
    /// `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(model_json: &str, config_json: &str) -> Result<VbCanvas, JsValue> {
        console_error_panic_hook_setup();
        let config = EditorConfig::from_json(config_json).map_err(to_js)?;
        let editor = Editor::from_json(model_json, config).map_err(to_js)?;
        Ok(Self { editor })
    }

    /// The whole page model as JSON.
    pub fn model_json(&self) -> Result<String, JsValue> {
        self.editor.model_json().map_err(to_js)
    }

    /// Just the block list as JSON, for export.
    pub fn blocks_json(&self) -> Result<String, JsValue> {
        self.editor.export_json().map_err(to_js)
    }

    /// Run a command by name. `args_json` is a JSON array of arguments, or
    /// empty for none.
    pub fn dispatch(&mut self, name: &str, args_json: &str) -> Result<(), JsValue> {
        let args = parse_args(args_json).map_err(to_js)?;
        log::trace!("dispatch {name} with {} args", args.len());
        self.editor.dispatch(name, &args).map_err(to_js)
    }

    pub fn undo(&mut self) -> Result<(), JsValue> {
        self.editor.undo().map_err(to_js)
    }

    pub fn redo(&mut self) -> Result<(), JsValue> {
        self.editor.redo().map_err(to_js)
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Names of every registered command, in registration order.
    pub fn command_names(&self) -> js_sys::Array {
        self.editor
            .commands()
            .command_names()
            .map(JsValue::from_str)
            .collect()
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Pointer pressed. `hit` is the index of the block under the pointer,
    /// or negative for empty canvas.
    #[allow(clippy::too_many_arguments)]
    pub fn pointer_down(
        &mut self,
        hit: i32,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.editor.pointer_down(hit_index(hit), x, y, modifiers);
    }

    /// Pointer moved. Returns the frame JSON (`{dx, dy, guides: {x, y}}`)
    /// while dragging, `"null"` otherwise.
    pub fn pointer_move(&mut self, x: f64, y: f64, shift: bool) -> String {
        let modifiers = Modifiers {
            shift,
            ..Modifiers::NONE
        };
        match self.editor.pointer_move(x, y, modifiers) {
            Some(frame) => serde_json::to_string(&frame).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }

    /// Pointer released. Returns whether a history entry was recorded.
    pub fn pointer_up(&mut self) -> Result<bool, JsValue> {
        self.editor.pointer_up().map_err(to_js)
    }

    /// Current guide lines as JSON (`{x, y}`, `null` for hidden axes).
    pub fn guides_json(&self) -> String {
        serde_json::to_string(&self.editor.guides()).unwrap_or_else(|_| "{}".to_string())
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Key pressed. Returns `true` if a command handled it, so the view
    /// should `preventDefault()`.
    pub fn key_down(
        &mut self,
        key: &str,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> Result<bool, JsValue> {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.editor.key_down(key, modifiers).map_err(to_js)
    }

    // ─── Layout callbacks ────────────────────────────────────────────────

    /// A component was dropped from the palette. Returns the new index.
    pub fn drop_component(&mut self, component_key: &str, x: f64, y: f64) -> usize {
        self.editor.drop_component(component_key, x, y)
    }

    /// The view measured a block after mounting it.
    pub fn settle_block(&mut self, index: usize, width: f64, height: f64) -> bool {
        self.editor.settle_block(index, width, height)
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    let msg = err.to_string();
    log::debug!("VbCanvas call failed: {msg}");
    JsValue::from_str(&msg)
}

fn hit_index(hit: i32) -> Option<usize> {
    usize::try_from(hit).ok()
}

fn parse_args(args_json: &str) -> Result<Vec<Value>, String> {
    if args_json.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str(args_json) {
        Ok(Value::Array(args)) => Ok(args),
        Ok(other) => Err(format!("command arguments must be a JSON array, got {other}")),
        Err(e) => Err(format!("invalid command arguments: {e}")),
    }
}

/// Set up console error panic hook for better debugging.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("VB WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no canvas needed) ───────────────────────────

/// Validate a page model. Returns JSON: `{"ok":true,"blocks":N}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_model(model_json: &str) -> String {
    let result = match vb_core::Document::from_json(model_json) {
        Ok(doc) => serde_json::json!({ "ok": true, "blocks": doc.blocks().len() }),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }),
    };
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"{
        "container": {"width": 800, "height": 600},
        "blocks": [
            {"componentKey": "button", "top": 100, "left": 0,   "width": 50, "height": 50, "focus": true},
            {"componentKey": "input",  "top": 100, "left": 200, "width": 50, "height": 50}
        ]
    }"#;

    #[test]
    fn negative_hit_means_empty_canvas() {
        assert_eq!(hit_index(-1), None);
        assert_eq!(hit_index(0), Some(0));
        assert_eq!(hit_index(7), Some(7));
    }

    #[test]
    fn args_parse_as_array() {
        assert_eq!(parse_args("").unwrap(), Vec::<Value>::new());
        assert_eq!(parse_args("[1, \"x\"]").unwrap(), vec![serde_json::json!(1), serde_json::json!("x")]);
        assert!(parse_args("{\"a\": 1}").is_err());
        assert!(parse_args("[1,").is_err());
    }

    #[test]
    fn validate_reports_block_count_or_error() {
        let ok: Value = serde_json::from_str(&validate_model(PAGE)).unwrap();
        assert_eq!(ok, serde_json::json!({"ok": true, "blocks": 2}));

        let bad: Value = serde_json::from_str(&validate_model("{\"blocks\": 3}")).unwrap();
        assert_eq!(bad["ok"], false);
        assert!(bad["error"].is_string());
    }

    #[test]
    fn drag_round_trip_through_bridge() {
        let mut canvas = VbCanvas::new(PAGE, "").unwrap();
        canvas.pointer_down(0, 25.0, 125.0, false, false, false, false);
        let frame: Value = serde_json::from_str(&canvas.pointer_move(25.0, 127.0, false)).unwrap();
        assert_eq!(frame["guides"]["y"], 100.0);
        assert!(canvas.pointer_up().unwrap());
        assert!(canvas.can_undo());

        canvas.undo().unwrap();
        assert!(canvas.can_redo());
        assert_eq!(canvas.pointer_move(0.0, 0.0, false), "null");
    }
}

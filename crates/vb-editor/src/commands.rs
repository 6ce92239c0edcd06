//! Command registry and undo/redo history.
//!
//! Every user action is a named `Command`. Dispatching a command calls its
//! `execute`, which returns a `CommandExecution`: a `redo` action that
//! applies the result and an optional `undo` action that reverses it. The
//! `redo` action also performs the first application.
//!
//! Recorded executions form a linear history with a cursor. Dispatching a
//! new recorded command after an undo discards the redo-able future.
//! Commands with `follow_queue() == false` (including the built-in `undo`
//! and `redo`) take effect without being recorded.
//!
//! Commands may need to dispatch themselves in response to an event (the
//! drag command does so on drag end). They get a `Dispatcher` in `init` and
//! queue requests on it; the owner drains the queue with `run_pending`.

use crate::error::{CommandError, CommandResult};
use crate::shortcuts::KeyCombo;
use serde_json::Value;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// A replayable effect on the context.
pub type Action<C> = Box<dyn Fn(&mut C)>;

/// Cleanup returned by `Command::init`, run once at shutdown.
pub type Teardown<C> = Box<dyn FnOnce(&mut C)>;

/// The outcome of executing a command.
pub struct CommandExecution<C> {
    /// Reverses the effect. A missing undo makes the entry a no-op on undo.
    pub undo: Option<Action<C>>,
    /// Applies the effect.
    pub redo: Action<C>,
}

impl<C> CommandExecution<C> {
    /// An execution without an undo.
    pub fn new(redo: impl Fn(&mut C) + 'static) -> Self {
        Self {
            undo: None,
            redo: Box::new(redo),
        }
    }

    pub fn with_undo(mut self, undo: impl Fn(&mut C) + 'static) -> Self {
        self.undo = Some(Box::new(undo));
        self
    }
}

/// A named, optionally keyboard-bound action.
pub trait Command<C> {
    /// Unique name used for dispatch.
    fn name(&self) -> &str;

    /// Keyboard bindings such as `"ctrl+d"` or `"delete"`.
    fn keyboard(&self) -> &[&str] {
        &[]
    }

    /// Whether executions are recorded in history.
    fn follow_queue(&self) -> bool {
        true
    }

    /// Called once when the registry starts. May subscribe to events and
    /// return the teardown that undoes the subscription.
    fn init(&mut self, _ctx: &mut C, _dispatcher: &Dispatcher) -> Option<Teardown<C>> {
        None
    }

    fn execute(&mut self, ctx: &mut C, args: &[Value]) -> CommandResult<CommandExecution<C>>;
}

impl<C, T: Command<C> + ?Sized> Command<C> for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn keyboard(&self) -> &[&str] {
        (**self).keyboard()
    }

    fn follow_queue(&self) -> bool {
        (**self).follow_queue()
    }

    fn init(&mut self, ctx: &mut C, dispatcher: &Dispatcher) -> Option<Teardown<C>> {
        (**self).init(ctx, dispatcher)
    }

    fn execute(&mut self, ctx: &mut C, args: &[Value]) -> CommandResult<CommandExecution<C>> {
        (**self).execute(ctx, args)
    }
}

// ─── History ─────────────────────────────────────────────────────────────

struct HistoryEntry<C> {
    name: String,
    execution: CommandExecution<C>,
}

/// Linear undo/redo history with a cursor.
///
/// `applied` counts the entries at or before the cursor, so the cursor
/// index is `applied - 1` and an empty cursor is `applied == 0`.
pub struct History<C> {
    entries: Vec<HistoryEntry<C>>,
    applied: usize,
    /// Maximum number of entries; the oldest is dropped beyond it.
    limit: Option<usize>,
}

impl<C> History<C> {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            applied: 0,
            limit: limit.map(|l| l.max(1)),
        }
    }

    /// Index of the most recently applied entry.
    pub fn current(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// Names of recorded entries, oldest first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Record an execution whose `redo` has already run. Discards any
    /// redo-able future.
    pub fn push(&mut self, name: &str, execution: CommandExecution<C>) {
        self.entries.truncate(self.applied);
        self.entries.push(HistoryEntry {
            name: name.to_string(),
            execution,
        });
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.remove(0);
            }
        }
        self.applied = self.entries.len();
    }

    /// Step the cursor back, running the entry's undo if it has one.
    /// Returns the name of the entry stepped over.
    pub fn undo(&mut self, ctx: &mut C) -> Option<&str> {
        let index = self.current()?;
        let entry = &self.entries[index];
        match &entry.execution.undo {
            Some(undo) => undo(ctx),
            None => log::debug!("undo: {} has no undo, skipping", entry.name),
        }
        self.applied = index;
        Some(&entry.name)
    }

    /// Re-apply the entry after the cursor and advance.
    pub fn redo(&mut self, ctx: &mut C) -> Option<&str> {
        let entry = self.entries.get(self.applied)?;
        (entry.execution.redo)(ctx);
        self.applied += 1;
        Some(&entry.name)
    }
}

// ─── Deferred dispatch ───────────────────────────────────────────────────

struct PendingDispatch {
    name: String,
    args: Vec<Value>,
}

/// Cloneable handle for queueing dispatches from inside event listeners.
#[derive(Clone, Default)]
pub struct Dispatcher {
    queue: Rc<RefCell<VecDeque<PendingDispatch>>>,
}

impl Dispatcher {
    pub fn request(&self, name: &str, args: Vec<Value>) {
        self.queue.borrow_mut().push_back(PendingDispatch {
            name: name.to_string(),
            args,
        });
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    fn pop(&self) -> Option<PendingDispatch> {
        self.queue.borrow_mut().pop_front()
    }
}

// ─── Registry ────────────────────────────────────────────────────────────

enum Handler<C> {
    Undo,
    Redo,
    Custom(Box<dyn Command<C>>),
}

struct Registered<C> {
    name: String,
    keyboard: SmallVec<[KeyCombo; 2]>,
    follow_queue: bool,
    handler: Handler<C>,
}

/// Owns the commands, the history, and the init/teardown lifecycle.
pub struct CommandRegistry<C> {
    commands: Vec<Registered<C>>,
    index: HashMap<String, usize>,
    history: History<C>,
    teardowns: Vec<Option<Teardown<C>>>,
    dispatcher: Dispatcher,
    initialized: bool,
}

impl<C: 'static> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> CommandRegistry<C> {
    /// A registry with only the built-in `undo` and `redo` commands.
    pub fn new() -> Self {
        Self::with_history_limit(None)
    }

    pub fn with_history_limit(limit: Option<usize>) -> Self {
        let mut registry = Self {
            commands: Vec::new(),
            index: HashMap::new(),
            history: History::new(limit),
            teardowns: Vec::new(),
            dispatcher: Dispatcher::default(),
            initialized: false,
        };
        registry.insert(
            "undo",
            [KeyCombo::key("z").with_ctrl()].into_iter().collect(),
            false,
            Handler::Undo,
        );
        registry.insert(
            "redo",
            [
                KeyCombo::key("y").with_ctrl(),
                KeyCombo::key("z").with_ctrl().with_shift(),
            ]
            .into_iter()
            .collect(),
            false,
            Handler::Redo,
        );
        registry
    }

    fn insert(
        &mut self,
        name: &str,
        keyboard: SmallVec<[KeyCombo; 2]>,
        follow_queue: bool,
        handler: Handler<C>,
    ) {
        self.index.insert(name.to_string(), self.commands.len());
        self.commands.push(Registered {
            name: name.to_string(),
            keyboard,
            follow_queue,
            handler,
        });
    }

    /// Register a command. Names are unique: registering a name twice is an
    /// error rather than a silent replacement.
    pub fn register(&mut self, command: impl Command<C> + 'static) -> CommandResult<()> {
        let name = command.name().to_string();
        if self.index.contains_key(&name) {
            return Err(CommandError::Duplicate(name));
        }
        let keyboard = command
            .keyboard()
            .iter()
            .map(|binding| {
                binding
                    .parse::<KeyCombo>()
                    .map_err(|_| CommandError::InvalidBinding {
                        command: name.clone(),
                        binding: binding.to_string(),
                    })
            })
            .collect::<CommandResult<SmallVec<[KeyCombo; 2]>>>()?;
        if self.initialized {
            log::warn!("command {name} registered after init; its init hook will not run");
        }
        log::debug!("register command {name}");
        let follow_queue = command.follow_queue();
        self.insert(&name, keyboard, follow_queue, Handler::Custom(Box::new(command)));
        Ok(())
    }

    /// Run every command's `init` once, collecting teardowns.
    pub fn init(&mut self, ctx: &mut C) {
        if self.initialized {
            log::warn!("command registry already initialized");
            return;
        }
        self.initialized = true;
        for entry in &mut self.commands {
            if let Handler::Custom(command) = &mut entry.handler {
                self.teardowns.push(command.init(ctx, &self.dispatcher));
            }
        }
    }

    /// Run every collected teardown once, in registration order.
    pub fn shutdown(&mut self, ctx: &mut C) {
        for teardown in self.teardowns.drain(..).flatten() {
            teardown(ctx);
        }
    }

    /// Execute a command by name.
    pub fn dispatch(&mut self, name: &str, args: &[Value], ctx: &mut C) -> CommandResult<()> {
        let &idx = self
            .index
            .get(name)
            .ok_or_else(|| CommandError::Unknown(name.to_string()))?;
        let entry = &mut self.commands[idx];
        match &mut entry.handler {
            Handler::Undo => {
                if let Some(undone) = self.history.undo(ctx) {
                    log::debug!("undo {undone}");
                }
            }
            Handler::Redo => {
                if let Some(redone) = self.history.redo(ctx) {
                    log::debug!("redo {redone}");
                }
            }
            Handler::Custom(command) => {
                let execution = command.execute(ctx, args)?;
                (execution.redo)(ctx);
                if entry.follow_queue {
                    self.history.push(&entry.name, execution);
                    log::debug!("dispatch {name} (history {})", self.history.len());
                } else {
                    log::debug!("dispatch {name} (not recorded)");
                }
            }
        }
        Ok(())
    }

    /// Whether any command is bound to `combo`.
    pub fn is_bound(&self, combo: &KeyCombo) -> bool {
        self.commands.iter().any(|c| c.keyboard.contains(combo))
    }

    /// Dispatch every command bound to `combo`, in registration order.
    /// Returns whether any command matched.
    pub fn dispatch_key(&mut self, combo: &KeyCombo, ctx: &mut C) -> CommandResult<bool> {
        let names: SmallVec<[String; 2]> = self
            .commands
            .iter()
            .filter(|c| c.keyboard.contains(combo))
            .map(|c| c.name.clone())
            .collect();
        for name in &names {
            self.dispatch(name, &[], ctx)?;
        }
        Ok(!names.is_empty())
    }

    /// Dispatch everything queued through the `Dispatcher`. Returns how many
    /// dispatches ran.
    pub fn run_pending(&mut self, ctx: &mut C) -> CommandResult<usize> {
        let mut ran = 0;
        while let Some(pending) = self.dispatcher.pop() {
            self.dispatch(&pending.name, &pending.args, ctx)?;
            ran += 1;
        }
        Ok(ran)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn history(&self) -> &History<C> {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Command names in registration order.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    /// Keyboard bindings of a command, in canonical form.
    pub fn bindings(&self, name: &str) -> Vec<String> {
        self.index
            .get(name)
            .map(|&i| self.commands[i].keyboard.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }
}

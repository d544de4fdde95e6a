//! Keyboard shortcuts for the builder.

use crate::element::ElementId;
use crate::store::BuilderStore;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

impl From<winit::keyboard::ModifiersState> for Modifiers {
    fn from(state: winit::keyboard::ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
            meta: state.super_key(),
        }
    }
}

/// A platform-neutral key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// A printable key, stored lowercase.
    Character(String),
    Delete,
    Other,
}

impl Key {
    pub fn character(c: &str) -> Self {
        Key::Character(c.to_lowercase())
    }

    pub fn from_winit(key: &winit::keyboard::Key) -> Self {
        use winit::keyboard::{Key as WinitKey, NamedKey};

        match key {
            WinitKey::Character(c) => Key::character(c.as_str()),
            WinitKey::Named(NamedKey::Delete) => Key::Delete,
            _ => Key::Other,
        }
    }
}

/// A key press with the modifiers held at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Build a key press from winit's logical key and modifier state.
    pub fn from_winit(key: &winit::keyboard::Key, modifiers: winit::keyboard::ModifiersState) -> Self {
        Self::new(Key::from_winit(key), modifiers.into())
    }
}

/// Editor command bound to a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuilderAction {
    Undo,
    Redo,
    DeleteSelected,
    DuplicateSelected,
    Save,
}

/// Resolve a key press to an editor command.
pub fn action_for(press: &KeyPress) -> Option<BuilderAction> {
    let modifiers = press.modifiers;
    match &press.key {
        Key::Delete => Some(BuilderAction::DeleteSelected),
        Key::Character(c) if modifiers.command() => match c.as_str() {
            "z" if modifiers.shift => Some(BuilderAction::Redo),
            "z" => Some(BuilderAction::Undo),
            "y" => Some(BuilderAction::Redo),
            "d" => Some(BuilderAction::DuplicateSelected),
            "s" => Some(BuilderAction::Save),
            _ => None,
        },
        _ => None,
    }
}

/// What a dispatched shortcut did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutOutcome {
    /// The document changed.
    Applied,
    /// A duplicate was created with this id.
    Duplicated(ElementId),
    /// Nothing to do (empty history, no selection).
    Nothing,
    /// The caller should run a save (see `AutoSaveManager::save`).
    SaveRequested,
}

/// Run `action` against the store.
///
/// Saving needs storage, so it is handed back to the caller.
pub fn dispatch(store: &mut BuilderStore, action: BuilderAction) -> ShortcutOutcome {
    let applied = |done: bool| if done { ShortcutOutcome::Applied } else { ShortcutOutcome::Nothing };

    match action {
        BuilderAction::Undo => applied(store.undo()),
        BuilderAction::Redo => applied(store.redo()),
        BuilderAction::DeleteSelected => {
            let Some(id) = store.selected_id().map(str::to_string) else {
                return ShortcutOutcome::Nothing;
            };
            applied(store.delete_element(&id).is_ok())
        }
        BuilderAction::DuplicateSelected => {
            let Some(id) = store.selected_id().map(str::to_string) else {
                return ShortcutOutcome::Nothing;
            };
            match store.duplicate_element(&id) {
                Ok(new_id) => ShortcutOutcome::Duplicated(new_id),
                Err(_) => ShortcutOutcome::Nothing,
            }
        }
        BuilderAction::Save => ShortcutOutcome::SaveRequested,
    }
}

/// Resolve and run a key press in one step. Returns None for unbound keys.
pub fn handle_key(store: &mut BuilderStore, press: &KeyPress) -> Option<ShortcutOutcome> {
    action_for(press).map(|action| dispatch(store, action))
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub command: bool,
    pub shift: bool,
    pub action: BuilderAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        command: bool,
        shift: bool,
        action: BuilderAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            command,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.command {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// The key press that triggers this shortcut.
    pub fn key_press(&self) -> KeyPress {
        let key = match self.key {
            "Delete" => Key::Delete,
            key => Key::character(key),
        };
        KeyPress::new(
            key,
            Modifiers {
                ctrl: self.command,
                shift: self.shift,
                ..Modifiers::default()
            },
        )
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, BuilderAction::Undo, "Undo"),
            Shortcut::new("Z", true, true, BuilderAction::Redo, "Redo"),
            Shortcut::new("Y", true, false, BuilderAction::Redo, "Redo"),
            Shortcut::new("Delete", false, false, BuilderAction::DeleteSelected, "Delete selected element"),
            Shortcut::new("D", true, false, BuilderAction::DuplicateSelected, "Duplicate selected element"),
            Shortcut::new("S", true, false, BuilderAction::Save, "Save site"),
        ]
    }

    /// One line per shortcut, for help output.
    pub fn help_lines() -> Vec<String> {
        Self::all()
            .iter()
            .map(|shortcut| format!("{:20} {}", shortcut.format(), shortcut.description))
            .collect()
    }
}

//! Keyboard and input event types.
//!
//! Key chords can be written in keymap notation (`"Mod-Shift-z"`, `"Shift-Tab"`, `"ArrowLeft"`)
//! and parsed with [`str::parse`]. `Mod` means Ctrl or Meta.

use std::str::FromStr;
use thiserror::Error;

/// Modifier key bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    bits: u8,
}

impl Modifiers {
    /// Control.
    pub const CTRL: u8 = 0b0000_0001;
    /// Alt / Option.
    pub const ALT: u8 = 0b0000_0010;
    /// Shift.
    pub const SHIFT: u8 = 0b0000_0100;
    /// Meta / Command.
    pub const META: u8 = 0b0000_1000;

    /// No modifiers.
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Modifier set from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self { bits }
    }

    /// Shift only.
    pub const fn shift() -> Self {
        Self { bits: Self::SHIFT }
    }

    /// Ctrl only.
    pub const fn ctrl() -> Self {
        Self { bits: Self::CTRL }
    }

    /// Returns `true` if no modifier is held.
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Ctrl held.
    pub const fn has_ctrl(self) -> bool {
        (self.bits & Self::CTRL) != 0
    }

    /// Alt held.
    pub const fn has_alt(self) -> bool {
        (self.bits & Self::ALT) != 0
    }

    /// Shift held.
    pub const fn has_shift(self) -> bool {
        (self.bits & Self::SHIFT) != 0
    }

    /// Meta held.
    pub const fn has_meta(self) -> bool {
        (self.bits & Self::META) != 0
    }

    /// The platform command modifier (Ctrl or Meta) is held.
    pub const fn has_mod(self) -> bool {
        self.has_ctrl() || self.has_meta()
    }

    /// Add modifier bits.
    pub fn insert(&mut self, bits: u8) {
        self.bits |= bits;
    }

    /// Same set plus `bits`.
    pub const fn with(self, bits: u8) -> Self {
        Self {
            bits: self.bits | bits,
        }
    }
}

/// A physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character.
    Char(char),
    /// Enter / Return.
    Enter,
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Tab.
    Tab,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Home.
    Home,
    /// End.
    End,
    /// Escape.
    Escape,
}

/// A keydown event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Pressed key.
    pub key: Key,
    /// Held modifiers.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Key with modifiers.
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Key without modifiers.
    pub const fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::empty())
    }

    /// Key with Shift.
    pub const fn shifted(key: Key) -> Self {
        Self::new(key, Modifiers::shift())
    }

    /// Returns `true` if this is exactly `Mod-<ch>` with no Shift or Alt.
    pub fn is_mod_char(&self, ch: char) -> bool {
        self.modifiers.has_mod()
            && !self.modifiers.has_shift()
            && !self.modifiers.has_alt()
            && self.key == Key::Char(ch)
    }
}

/// Key chord parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    /// Empty chord.
    #[error("empty key chord")]
    Empty,
    /// Unknown modifier name.
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    /// Unknown key name.
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

impl FromStr for KeyEvent {
    type Err = KeyParseError;

    fn from_str(chord: &str) -> Result<Self, Self::Err> {
        // `-` itself is a valid key, so split off the last part by hand.
        if chord == "-" {
            return Ok(Self::plain(Key::Char('-')));
        }
        let (prefix, name) = match chord.strip_suffix("--") {
            Some(rest) => (rest, "-"),
            None => match chord.rsplit_once('-') {
                Some((prefix, name)) => (prefix, name),
                None => ("", chord),
            },
        };
        if name.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let mut modifiers = Modifiers::empty();
        for part in prefix.split('-').filter(|p| !p.is_empty()) {
            let bits = match part {
                "Mod" | "Ctrl" | "Control" => Modifiers::CTRL,
                "Cmd" | "Meta" => Modifiers::META,
                "Alt" | "Option" => Modifiers::ALT,
                "Shift" => Modifiers::SHIFT,
                other => return Err(KeyParseError::UnknownModifier(other.to_string())),
            };
            modifiers.insert(bits);
        }

        let key = match name {
            "Enter" => Key::Enter,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Tab" => Key::Tab,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "Home" => Key::Home,
            "End" => Key::End,
            "Escape" => Key::Escape,
            "Space" => Key::Char(' '),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Key::Char(ch),
                    _ => return Err(KeyParseError::UnknownKey(other.to_string())),
                }
            }
        };

        Ok(Self::new(key, modifiers))
    }
}

/// `beforeinput` input types the engine distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    /// Delete the unit before the caret.
    DeleteContentBackward,
    /// Delete the unit after the caret.
    DeleteContentForward,
    /// Insert text.
    InsertText,
    /// Insert a paragraph break.
    InsertParagraph,
    /// Anything else, by name.
    Other(String),
}

impl InputType {
    /// Map a DOM `inputType` name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "deleteContentBackward" => InputType::DeleteContentBackward,
            "deleteContentForward" => InputType::DeleteContentForward,
            "insertText" => InputType::InsertText,
            "insertParagraph" => InputType::InsertParagraph,
            other => InputType::Other(other.to_string()),
        }
    }
}

/// A `beforeinput` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    /// Input type.
    pub input_type: InputType,
    /// Inserted text, if any.
    pub data: Option<String>,
}

impl InputEvent {
    /// Event without data.
    pub fn new(input_type: InputType) -> Self {
        Self {
            input_type,
            data: None,
        }
    }

    /// Text insertion event.
    pub fn insert_text(text: impl Into<String>) -> Self {
        Self {
            input_type: InputType::InsertText,
            data: Some(text.into()),
        }
    }
}

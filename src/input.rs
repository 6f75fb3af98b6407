//! Input snapshots and keybinds.
//!
//! Raw device polling lives outside the simulation. Each frame the host hands
//! over a fresh [`InputSnapshot`]; [`InputState`] keeps it next to the
//! previous one so edge queries ("pressed this frame") need no event stream.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Up,
    Down,
    Left,
    Right,
    Space,
    Digit1,
    Digit2,
    Digit3,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PadButton {
    South,
    East,
    West,
    North,
    LeftShoulder,
    RightShoulder,
    RightTrigger,
    Start,
}

/// Anything a keybind can be mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    Key(Key),
    Mouse(MouseButton),
    Pad(PadButton),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyboardSnapshot {
    pub down: HashSet<Key>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MouseSnapshot {
    /// Cursor in screen units
    pub position: Vec2,
    pub down: HashSet<MouseButton>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadSnapshot {
    pub connected: bool,
    pub left_stick: Vec2,
    pub right_stick: Vec2,
    pub down: HashSet<PadButton>,
}

/// State of every device at one instant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub keyboard: KeyboardSnapshot,
    pub mouse: MouseSnapshot,
    pub gamepad: GamepadSnapshot,
}

impl InputSnapshot {
    pub fn is_down(&self, binding: Binding) -> bool {
        match binding {
            Binding::Key(key) => self.keyboard.down.contains(&key),
            Binding::Mouse(button) => self.mouse.down.contains(&button),
            Binding::Pad(button) => self.gamepad.connected && self.gamepad.down.contains(&button),
        }
    }

    pub fn press(&mut self, binding: Binding) {
        match binding {
            Binding::Key(key) => {
                self.keyboard.down.insert(key);
            }
            Binding::Mouse(button) => {
                self.mouse.down.insert(button);
            }
            Binding::Pad(button) => {
                self.gamepad.connected = true;
                self.gamepad.down.insert(button);
            }
        }
    }
}

/// Named actions mapped to any number of bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keybinds {
    binds: HashMap<String, Vec<Binding>>,
}

impl Default for Keybinds {
    fn default() -> Self {
        let binds = [
            ("move_up", vec![Binding::Key(Key::W), Binding::Key(Key::Up)]),
            ("move_down", vec![Binding::Key(Key::S), Binding::Key(Key::Down)]),
            ("move_left", vec![Binding::Key(Key::A), Binding::Key(Key::Left)]),
            ("move_right", vec![Binding::Key(Key::D), Binding::Key(Key::Right)]),
            (
                "fire",
                vec![
                    Binding::Mouse(MouseButton::Left),
                    Binding::Key(Key::Space),
                    Binding::Pad(PadButton::RightTrigger),
                ],
            ),
            ("slot_1", vec![Binding::Key(Key::Digit1)]),
            ("slot_2", vec![Binding::Key(Key::Digit2)]),
            ("slot_3", vec![Binding::Key(Key::Digit3)]),
            ("cycle_weapon", vec![Binding::Key(Key::Q), Binding::Pad(PadButton::RightShoulder)]),
            ("pause", vec![Binding::Key(Key::Escape), Binding::Pad(PadButton::Start)]),
        ];
        Self {
            binds: binds
                .into_iter()
                .map(|(name, bindings)| (name.to_string(), bindings))
                .collect(),
        }
    }
}

impl Keybinds {
    pub fn bindings(&self, name: &str) -> &[Binding] {
        self.binds.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Current and previous snapshots plus the keybind table
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub current: InputSnapshot,
    pub previous: InputSnapshot,
    pub keybinds: Keybinds,
}

impl InputState {
    pub fn new(keybinds: Keybinds) -> Self {
        Self {
            current: InputSnapshot::default(),
            previous: InputSnapshot::default(),
            keybinds,
        }
    }

    /// Shift the current snapshot to previous and take the new one.
    pub fn advance(&mut self, next: InputSnapshot) {
        self.previous = std::mem::replace(&mut self.current, next);
    }

    pub fn keybind_down(&self, name: &str) -> bool {
        self.keybinds
            .bindings(name)
            .iter()
            .any(|binding| self.current.is_down(*binding))
    }

    /// True on the frame a binding goes down: up in the previous snapshot and
    /// down in the current one.
    pub fn keybind_pressed(&self, name: &str) -> bool {
        self.keybinds
            .bindings(name)
            .iter()
            .any(|binding| !self.previous.is_down(*binding) && self.current.is_down(*binding))
    }

    /// Movement intent, stick first then keys. Length at most 1.
    pub fn move_axis(&self) -> Vec2 {
        let stick = self.current.gamepad.left_stick;
        if self.current.gamepad.connected && stick.length_squared() > 0.0 {
            return stick.clamp_length_max(1.0);
        }
        let mut axis = Vec2::ZERO;
        if self.keybind_down("move_up") {
            axis.y -= 1.0;
        }
        if self.keybind_down("move_down") {
            axis.y += 1.0;
        }
        if self.keybind_down("move_left") {
            axis.x -= 1.0;
        }
        if self.keybind_down("move_right") {
            axis.x += 1.0;
        }
        axis.normalize_or_zero()
    }

    /// Aim direction: right stick when deflected, otherwise from the player's
    /// screen position toward the cursor.
    pub fn aim(&self, player_screen: Vec2) -> Vec2 {
        let stick = self.current.gamepad.right_stick;
        if self.current.gamepad.connected && stick.length_squared() > 0.0 {
            return stick.normalize_or_zero();
        }
        (self.current.mouse.position - player_screen).normalize_or_zero()
    }
}

//! Translates window events into viewer actions.
//!
//! [`Input`] tracks the little state the viewer needs between events (cursor
//! position and whether a drag is in progress) and maps each keyboard, mouse
//! button, cursor and wheel event to at most one [`InputAction`]. It never
//! touches the cameras itself; the application applies the actions.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::{Key, NamedKey};

use crate::config::KeyConfig;

/// Pixels per wheel "line" for pixel-precise scroll devices.
const PIXELS_PER_LINE: f32 = 120.0;

/// Discrete keyboard commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewerCommand {
    TurnLeft,
    TurnRight,
    MoveForward,
    MoveBackward,
    MoveUp,
    MoveDown,
    SwitchCamera,
}

impl ViewerCommand {
    pub const ALL: [ViewerCommand; 7] = [
        ViewerCommand::TurnLeft,
        ViewerCommand::TurnRight,
        ViewerCommand::MoveForward,
        ViewerCommand::MoveBackward,
        ViewerCommand::MoveUp,
        ViewerCommand::MoveDown,
        ViewerCommand::SwitchCamera,
    ];

    pub fn description(self) -> &'static str {
        match self {
            ViewerCommand::TurnLeft => "Turn left",
            ViewerCommand::TurnRight => "Turn right",
            ViewerCommand::MoveForward => "Move forward",
            ViewerCommand::MoveBackward => "Move backward",
            ViewerCommand::MoveUp => "Move up",
            ViewerCommand::MoveDown => "Move down",
            ViewerCommand::SwitchCamera => "Switch between the ground and overhead cameras",
        }
    }
}

/// Single-character key bindings for the [`ViewerCommand`]s.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyBindings {
    bindings: [(char, ViewerCommand); 7],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_config(&KeyConfig::default())
    }
}

impl KeyBindings {
    pub fn from_config(keys: &KeyConfig) -> Self {
        let bind = |key: char, command| (key.to_ascii_lowercase(), command);
        Self {
            bindings: [
                bind(keys.turn_left, ViewerCommand::TurnLeft),
                bind(keys.turn_right, ViewerCommand::TurnRight),
                bind(keys.move_forward, ViewerCommand::MoveForward),
                bind(keys.move_backward, ViewerCommand::MoveBackward),
                bind(keys.move_up, ViewerCommand::MoveUp),
                bind(keys.move_down, ViewerCommand::MoveDown),
                bind(keys.switch_camera, ViewerCommand::SwitchCamera),
            ],
        }
    }

    /// The command bound to a logical key, ignoring letter case.
    pub fn command_for(&self, key: &Key) -> Option<ViewerCommand> {
        let Key::Character(text) = key else {
            return None;
        };
        let mut chars = text.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return None;
        };
        let c = c.to_ascii_lowercase();
        self.bindings
            .iter()
            .find(|(key, _)| *key == c)
            .map(|&(_, command)| command)
    }

    /// The key bound to `command`.
    pub fn key_for(&self, command: ViewerCommand) -> Option<char> {
        self.bindings
            .iter()
            .find(|(_, bound)| *bound == command)
            .map(|&(key, _)| key)
    }

    /// One line per binding, for the startup help.
    pub fn help_lines(&self) -> Vec<String> {
        ViewerCommand::ALL
            .iter()
            .filter_map(|&command| {
                self.key_for(command).map(|key| {
                    format!("  {}:  {}", key.to_ascii_uppercase(), command.description())
                })
            })
            .collect()
    }
}

/// What the application should do in response to an event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputAction {
    /// Apply a keyboard command to the camera rig.
    Command(ViewerCommand),
    /// Leave the event loop.
    Exit,
    /// The left button went down at this cursor position.
    BeginDrag(Vec2),
    /// The cursor moved to this position while dragging.
    Drag(Vec2),
    /// The left button was released.
    EndDrag,
    /// Change the orbit radius by this offset.
    Zoom(f32),
}

/// Event-to-action translation state.
#[derive(Clone, Debug)]
pub struct Input {
    bindings: KeyBindings,
    zoom_step: f32,
    cursor: Vec2,
    dragging: bool,
}

impl Input {
    pub fn new(bindings: KeyBindings, zoom_step: f32) -> Self {
        Self {
            bindings,
            zoom_step,
            cursor: Vec2::ZERO,
            dragging: false,
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Last known cursor position in window coordinates.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// A keyboard event. Key repeats act like fresh presses.
    pub fn key(&mut self, key: &Key, state: ElementState) -> Option<InputAction> {
        if state != ElementState::Pressed {
            return None;
        }
        if *key == Key::Named(NamedKey::Escape) {
            return Some(InputAction::Exit);
        }
        self.bindings.command_for(key).map(InputAction::Command)
    }

    pub fn cursor_moved(&mut self, position: Vec2) -> Option<InputAction> {
        self.cursor = position;
        self.dragging.then_some(InputAction::Drag(position))
    }

    /// A mouse button event. Only the left button is used.
    pub fn mouse_button(&mut self, state: ElementState, button: MouseButton) -> Option<InputAction> {
        if button != MouseButton::Left {
            return None;
        }
        match state {
            ElementState::Pressed => {
                self.dragging = true;
                Some(InputAction::BeginDrag(self.cursor))
            }
            ElementState::Released => {
                let was_dragging = std::mem::replace(&mut self.dragging, false);
                was_dragging.then_some(InputAction::EndDrag)
            }
        }
    }

    /// A wheel event: scrolling up zooms in, scrolling down zooms out.
    pub fn scroll(&mut self, delta: MouseScrollDelta) -> Option<InputAction> {
        let lines = scroll_lines(delta);
        (lines != 0.0).then(|| InputAction::Zoom(-lines * self.zoom_step))
    }

    /// Forgets any drag in progress, e.g. when the window loses focus.
    pub fn cancel_drag(&mut self) -> Option<InputAction> {
        let was_dragging = std::mem::replace(&mut self.dragging, false);
        was_dragging.then_some(InputAction::EndDrag)
    }
}

/// Vertical scroll amount in lines; positive is away from the user.
pub fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    fn input() -> Input {
        Input::new(KeyBindings::default(), 0.1)
    }

    fn char_key(c: &str) -> Key {
        Key::Character(c.into())
    }

    #[test]
    fn default_bindings() {
        let bindings = KeyBindings::default();
        let expected = [
            ("a", ViewerCommand::TurnLeft),
            ("d", ViewerCommand::TurnRight),
            ("w", ViewerCommand::MoveForward),
            ("x", ViewerCommand::MoveBackward),
            ("c", ViewerCommand::MoveUp),
            ("z", ViewerCommand::MoveDown),
            ("s", ViewerCommand::SwitchCamera),
        ];
        for (key, command) in expected {
            assert_eq!(bindings.command_for(&char_key(key)), Some(command));
        }
        assert_eq!(bindings.command_for(&char_key("q")), None);
    }

    #[test]
    fn bindings_ignore_case() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.command_for(&char_key("W")), Some(ViewerCommand::MoveForward));
    }

    #[test]
    fn multi_character_text_is_not_a_binding() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.command_for(&char_key("wa")), None);
        assert_eq!(bindings.command_for(&Key::Named(NamedKey::Enter)), None);
    }

    #[test]
    fn custom_bindings_replace_defaults() {
        let keys = KeyConfig {
            move_forward: 'i',
            ..KeyConfig::default()
        };
        let bindings = KeyBindings::from_config(&keys);
        assert_eq!(bindings.command_for(&char_key("i")), Some(ViewerCommand::MoveForward));
        assert_eq!(bindings.command_for(&char_key("w")), None);
        assert_eq!(bindings.key_for(ViewerCommand::MoveForward), Some('i'));
    }

    #[test]
    fn help_lists_every_command() {
        let lines = KeyBindings::default().help_lines();
        assert_eq!(lines.len(), ViewerCommand::ALL.len());
        assert_eq!(lines[0], "  A:  Turn left");
    }

    #[test]
    fn escape_exits_and_releases_are_ignored() {
        let mut input = input();
        assert_eq!(
            input.key(&Key::Named(NamedKey::Escape), ElementState::Pressed),
            Some(InputAction::Exit)
        );
        assert_eq!(input.key(&char_key("a"), ElementState::Released), None);
        assert_eq!(
            input.key(&char_key("a"), ElementState::Pressed),
            Some(InputAction::Command(ViewerCommand::TurnLeft))
        );
    }

    #[test]
    fn left_drag_sequence() {
        let mut input = input();
        assert_eq!(input.cursor_moved(Vec2::new(10.0, 20.0)), None);
        assert_eq!(
            input.mouse_button(ElementState::Pressed, MouseButton::Left),
            Some(InputAction::BeginDrag(Vec2::new(10.0, 20.0)))
        );
        assert_eq!(
            input.cursor_moved(Vec2::new(30.0, 25.0)),
            Some(InputAction::Drag(Vec2::new(30.0, 25.0)))
        );
        assert_eq!(
            input.mouse_button(ElementState::Released, MouseButton::Left),
            Some(InputAction::EndDrag)
        );
        assert_eq!(input.cursor_moved(Vec2::new(40.0, 25.0)), None);
        assert_eq!(input.mouse_button(ElementState::Released, MouseButton::Left), None);
    }

    #[test]
    fn other_buttons_do_not_drag() {
        let mut input = input();
        assert_eq!(input.mouse_button(ElementState::Pressed, MouseButton::Right), None);
        assert!(!input.is_dragging());
    }

    #[test]
    fn wheel_up_zooms_in() {
        let mut input = input();
        match input.scroll(MouseScrollDelta::LineDelta(0.0, 1.0)) {
            Some(InputAction::Zoom(offset)) => assert!((offset + 0.1).abs() < 1e-6),
            other => panic!("unexpected {other:?}"),
        }
        match input.scroll(MouseScrollDelta::LineDelta(0.0, -2.0)) {
            Some(InputAction::Zoom(offset)) => assert!((offset - 0.2).abs() < 1e-6),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(input.scroll(MouseScrollDelta::LineDelta(3.0, 0.0)), None);
    }

    #[test]
    fn pixel_scroll_is_converted_to_lines() {
        let delta = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 240.0));
        assert_eq!(scroll_lines(delta), 2.0);
    }

    #[test]
    fn cancel_drag_ends_only_an_active_drag() {
        let mut input = input();
        assert_eq!(input.cancel_drag(), None);
        input.mouse_button(ElementState::Pressed, MouseButton::Left);
        assert_eq!(input.cancel_drag(), Some(InputAction::EndDrag));
        assert!(!input.is_dragging());
    }
}

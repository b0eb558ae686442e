use std::collections::HashMap;

pub const DEFAULT_MOUSE_SENSITIVITY: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Forward,
    Backward,
    Run,
    Map,
}

/// Controller state for one frame. Owned by the app and handed to the player,
/// which consumes the rotation deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub backward: bool,
    pub run: bool,
    pub map: bool,
    pub rotate_x: f64,
    pub rotate_y: f64,
}

impl InputState {
    pub fn apply(&mut self, action: Action, pressed: bool) {
        let flag = match action {
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
            Action::Forward => &mut self.forward,
            Action::Backward => &mut self.backward,
            Action::Run => &mut self.run,
            Action::Map => &mut self.map,
        };
        *flag = pressed;
    }

    /// Records a mouse delta, each axis clamped to `sensitivity`.
    pub fn apply_mouse(&mut self, dx: f64, dy: f64, sensitivity: f64) {
        self.rotate_x = dx.clamp(-sensitivity, sensitivity);
        self.rotate_y = dy.clamp(-sensitivity, sensitivity);
    }

    pub fn is_walking(&self) -> bool {
        self.left || self.right || self.forward || self.backward
    }
}

/// Key name to action table. Names are lower-case (`"w"`, `"shift"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    keys: HashMap<String, Action>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: &str, action: Action) {
        self.keys.insert(key.to_lowercase(), action);
    }

    pub fn action(&self, key: &str) -> Option<Action> {
        self.keys.get(&key.to_lowercase()).copied()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind("a", Action::Left);
        bindings.bind("d", Action::Right);
        bindings.bind("w", Action::Forward);
        bindings.bind("s", Action::Backward);
        bindings.bind("x", Action::Map);
        bindings.bind("shift", Action::Run);
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_are_case_insensitive() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.action("W"), Some(Action::Forward));
        assert_eq!(bindings.action("Shift"), Some(Action::Run));
        assert_eq!(bindings.action("q"), None);
    }

    #[test]
    fn mouse_delta_is_clamped_per_axis() {
        let mut input = InputState::default();
        input.apply_mouse(-120.0, 12.0, DEFAULT_MOUSE_SENSITIVITY);
        assert_eq!(input.rotate_x, -50.0);
        assert_eq!(input.rotate_y, 12.0);
    }

    #[test]
    fn release_clears_flag() {
        let mut input = InputState::default();
        input.apply(Action::Forward, true);
        assert!(input.is_walking());
        input.apply(Action::Forward, false);
        assert!(!input.is_walking());
    }
}

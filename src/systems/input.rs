use std::collections::{HashMap, HashSet};

use bevy_ecs::{
    event::EventWriter,
    resource::Resource,
    system::ResMut,
};
use bitflags::bitflags;
use smallvec::SmallVec;
use strum_macros::{Display, EnumIter};

use crate::constants::field;
use crate::events::{GameCommand, GameEvent};

/// Horizontal pull added while the pointer is held near either edge.
const POINTER_PULL: f32 = 0.35;
/// Pointer positions left of this fraction of the field width pull left.
const POINTER_LEFT_ZONE: f32 = 0.45;
/// Pointer positions right of this fraction of the field width pull right.
const POINTER_RIGHT_ZONE: f32 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Key {
    Left,
    Right,
    Up,
    A,
    D,
    W,
    Space,
    Enter,
    R,
    P,
    N,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Direction {
    Left,
    Right,
}

/// Host input, already translated into field coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    KeyDown(Key),
    KeyUp(Key),
    PointerDown { x: f32 },
    PointerMove { x: f32 },
    PointerUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Move(Direction),
    Command(GameCommand),
}

bitflags! {
    /// Movement directions currently held on the keyboard.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HeldDirections: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
    }
}

/// Held input sampled by the player controller each step.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct InputState {
    pub held: HeldDirections,
    /// X of the held pointer, if any.
    pub pointer: Option<f32>,
}

impl InputState {
    /// Net horizontal intent in `[-1, 1]`. Opposite keys cancel out.
    pub fn axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.held.contains(HeldDirections::LEFT) {
            axis -= 1.0;
        }
        if self.held.contains(HeldDirections::RIGHT) {
            axis += 1.0;
        }
        if let Some(x) = self.pointer {
            if x < field::WIDTH * POINTER_LEFT_ZONE {
                axis -= POINTER_PULL;
            }
            if x > field::WIDTH * POINTER_RIGHT_ZONE {
                axis += POINTER_PULL;
            }
        }
        f32::clamp(axis, -1.0, 1.0)
    }
}

/// Actions pushed by the host between steps.
#[derive(Resource, Debug, Default, Clone)]
pub struct InputQueue(pub Vec<InputAction>);

#[derive(Debug, Clone, Resource)]
pub struct Bindings {
    key_bindings: HashMap<Key, Binding>,
    pressed: HashSet<Key>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut key_bindings = HashMap::new();

        // Player movement
        key_bindings.insert(Key::Left, Binding::Move(Direction::Left));
        key_bindings.insert(Key::A, Binding::Move(Direction::Left));
        key_bindings.insert(Key::Right, Binding::Move(Direction::Right));
        key_bindings.insert(Key::D, Binding::Move(Direction::Right));

        // Game actions
        key_bindings.insert(Key::Space, Binding::Command(GameCommand::Jump));
        key_bindings.insert(Key::Up, Binding::Command(GameCommand::Jump));
        key_bindings.insert(Key::W, Binding::Command(GameCommand::Jump));
        key_bindings.insert(Key::Enter, Binding::Command(GameCommand::Start));
        key_bindings.insert(Key::R, Binding::Command(GameCommand::Retry));
        key_bindings.insert(Key::P, Binding::Command(GameCommand::TogglePause));
        key_bindings.insert(Key::N, Binding::Command(GameCommand::SingleStep));
        key_bindings.insert(Key::Escape, Binding::Command(GameCommand::Exit));

        Self {
            key_bindings,
            pressed: HashSet::new(),
        }
    }
}

impl Bindings {
    pub fn binding(&self, key: Key) -> Option<Binding> {
        self.key_bindings.get(&key).copied()
    }

    /// Directions held by any currently pressed movement key.
    fn held_directions(&self) -> HeldDirections {
        self.pressed
            .iter()
            .filter_map(|key| match self.key_bindings.get(key) {
                Some(Binding::Move(Direction::Left)) => Some(HeldDirections::LEFT),
                Some(Binding::Move(Direction::Right)) => Some(HeldDirections::RIGHT),
                _ => None,
            })
            .fold(HeldDirections::empty(), |held, direction| held | direction)
    }
}

/// Applies a batch of host actions, updating held state and returning the commands they trigger.
///
/// Commands fire only on a press edge; repeated key-downs while a key is held are ignored.
pub fn process_input_actions(
    bindings: &mut Bindings,
    state: &mut InputState,
    actions: &[InputAction],
) -> SmallVec<[GameEvent; 4]> {
    let mut events = SmallVec::new();

    for action in actions {
        match *action {
            InputAction::KeyDown(key) => {
                if !bindings.pressed.insert(key) {
                    continue;
                }
                if let Some(Binding::Command(command)) = bindings.binding(key) {
                    events.push(GameEvent::Command(command));
                }
            }
            InputAction::KeyUp(key) => {
                bindings.pressed.remove(&key);
            }
            InputAction::PointerDown { x } => {
                if state.pointer.is_none() {
                    events.push(GameEvent::Command(GameCommand::Jump));
                }
                state.pointer = Some(x);
            }
            InputAction::PointerMove { x } => {
                if state.pointer.is_some() {
                    state.pointer = Some(x);
                }
            }
            InputAction::PointerUp => {
                state.pointer = None;
            }
        }
    }

    state.held = bindings.held_directions();
    events
}

pub fn input_system(
    mut queue: ResMut<InputQueue>,
    mut bindings: ResMut<Bindings>,
    mut state: ResMut<InputState>,
    mut writer: EventWriter<GameEvent>,
) {
    if queue.0.is_empty() {
        return;
    }
    let actions = std::mem::take(&mut queue.0);
    for event in process_input_actions(&mut bindings, &mut state, &actions) {
        writer.write(event);
    }
}

use super::{
    call_stack::CallStack,
    data_register::DataRegister,
    key::{Key, KeyState},
    memory::{Memory, OutOfBoundsError},
};
use crate::{instruction::Opcode, screen::Screen};

/// Whether the processor is suspended on a [`WaitForKeyPress`] instruction.
///
/// [`WaitForKeyPress`]: crate::instruction::Instruction::WaitForKeyPress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWaitingState {
    NotWaiting,
    Waiting { target_register: DataRegister },
}

impl Default for KeyWaitingState {
    fn default() -> Self {
        Self::NotWaiting
    }
}

/// The complete mutable state of the virtual machine.
///
/// Only the [`Processor`](super::Processor) mutates it,
/// a host observes it through the read accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub(crate) data_registers: [u8; DataRegister::COUNT],
    pub(crate) address_register: u16,
    pub(crate) memory: Memory,
    pub(crate) program_counter: u16,
    pub(crate) call_stack: CallStack,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) screen: Screen,
    pub(crate) draw_requested: bool,
    pub(crate) key_states: [KeyState; Key::COUNT],
    pub(crate) key_waiting: KeyWaitingState,
}

impl Default for State {
    fn default() -> Self {
        Self {
            data_registers: [0; DataRegister::COUNT],
            address_register: 0,
            memory: Memory::default(),
            program_counter: Memory::PROGRAM_START,
            call_stack: CallStack::default(),
            delay_timer: 0,
            sound_timer: 0,
            screen: Screen::default(),
            draw_requested: false,
            key_states: [KeyState::default(); Key::COUNT],
            key_waiting: KeyWaitingState::default(),
        }
    }
}

impl State {
    /// Get the value of a data register.
    pub const fn register(&self, register: DataRegister) -> u8 {
        self.data_registers[register.index()]
    }

    /// Set the value of a data register.
    pub(crate) fn set_register(&mut self, register: DataRegister, val: u8) {
        self.data_registers[register.index()] = val;
    }

    /// The value of the special address register `I`.
    pub const fn address_register(&self) -> u16 {
        self.address_register
    }

    pub const fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    pub const fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub const fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Whether the screen changed during the last step.
    pub const fn draw_requested(&self) -> bool {
        self.draw_requested
    }

    pub const fn key_waiting(&self) -> KeyWaitingState {
        self.key_waiting
    }

    /// Get the state of a key.
    pub const fn key_state(&self, key: Key) -> KeyState {
        self.key_states[key as u8 as usize]
    }

    /// Set the state of a key.
    pub(crate) fn set_key_state(&mut self, key: Key, state: KeyState) {
        self.key_states[key as u8 as usize] = state;
    }

    /// The highest valued key that is currently pressed.
    pub fn last_pressed_key(&self) -> Option<Key> {
        Key::ALL
            .iter()
            .rev()
            .copied()
            .find(|&key| self.key_state(key) == KeyState::Pressed)
    }

    /// Read the opcode at the program counter.
    pub(crate) fn fetch(&self) -> Result<Opcode, OutOfBoundsError> {
        self.memory
            .read_word(self.program_counter)
            .map(Opcode::from)
    }

    /// Decrement both timers by one, stopping at zero.
    pub(crate) fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tick_timers_saturates() {
        let mut state = State {
            delay_timer: 2,
            sound_timer: 0,
            ..State::default()
        };

        state.tick_timers();
        assert_eq!((state.delay_timer(), state.sound_timer()), (1, 0));
        state.tick_timers();
        state.tick_timers();
        assert_eq!((state.delay_timer(), state.sound_timer()), (0, 0));
    }

    #[test]
    fn last_pressed_key_is_highest() {
        let mut state = State::default();
        assert_eq!(state.last_pressed_key(), None);

        state.set_key_state(Key::K3, KeyState::Pressed);
        state.set_key_state(Key::KB, KeyState::Pressed);
        state.set_key_state(Key::K7, KeyState::Pressed);

        assert_eq!(state.last_pressed_key(), Some(Key::KB));
    }

    #[test]
    fn fetch_out_of_bounds() {
        let state = State {
            program_counter: (Memory::LEN - 1) as u16,
            ..State::default()
        };

        assert_eq!(
            state.fetch(),
            Err(OutOfBoundsError {
                address: (Memory::LEN - 1) as u16,
                len: 2
            })
        );
    }
}

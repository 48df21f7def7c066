use rand::{Rng, RngCore};
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::{
    font::{self, GLYPHS, GLYPHS_ADDRESS},
    instruction::Instruction,
    rom::{LoadError, Rom},
    screen::{PartialOffscreenDrawing, Screen},
};

mod call_stack;
mod data_register;
mod key;
mod memory;
mod state;

pub use call_stack::{CallStack, CallStackCapacityExceededError};
pub use data_register::DataRegister;
pub use key::{Key, KeyState};
pub use memory::{Memory, OutOfBoundsError};
pub use state::{KeyWaitingState, State};

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ProcessorError {
    #[error("an out of bounds memory access at {address:#05X} was requested at {program_counter:X}")]
    OutOfBoundsMemoryAccess { program_counter: u16, address: u16 },
    #[error("the call request at {program_counter:X} exceeds the maximum call stack size")]
    MaxCallStackSizeExceeded { program_counter: u16 },
    #[error("return was requested at {program_counter:X} with an empty call stack")]
    ReturnWithEmptyCallStack { program_counter: u16 },
    #[error("the hex char sprite address was requested for a non-hex-char (greater than 0xF) id {requested_sprite_id:X} at {program_counter:X}")]
    NotAHexChar {
        program_counter: u16,
        requested_sprite_id: u8,
    },
    #[error("a key with an invalid (greater than 0xF) key id {requested_key_id:X} was referenced at {program_counter:X}")]
    NotAValidKey {
        program_counter: u16,
        requested_key_id: u8,
    },
}

/// What a call to [`Processor::step`] accomplished.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StepOutcome {
    /// The instruction was executed, the program counter moved on and the timers ticked.
    Executed { instruction: Instruction },
    /// A [`Instruction::WaitForKeyPress`] is pending and no key is pressed.
    /// Nothing changed, the step has to be repeated once key states were updated.
    WaitingForKeyPress,
}

/// How the program counter changes after an instruction.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum ProgramCounterUpdate {
    /// Go on with the following instruction.
    Next,
    /// Skip the following instruction.
    Skip,
    /// Continue at an absolute address.
    Jump(u16),
    /// Stay on the current instruction without completing the step.
    Block,
}

/// Size of an instruction in bytes.
const INSTRUCTION_LEN: u16 = std::mem::size_of::<u16>() as u16;

/// Return decimal digits of a u8 value.
/// The hundreds digit is the first element in the array,
/// followed by the tens and single digits.
///
/// 3 digits are always enough, since the maximum value of a u8 is 255.
fn decimal_digits_of_u8(num: u8) -> [u8; 3] {
    [num / 100, num / 10 % 10, num % 10]
}

/// The CHIP-8 processor, executing one instruction per [`step`](Self::step).
///
/// Random bytes for [`Instruction::AssignRandomMasked`] are drawn from `rng`.
#[derive(Debug)]
pub struct Processor<R> {
    state: State,
    rng: R,
    partial_offscreen_drawing: PartialOffscreenDrawing,
}

impl<R: RngCore> Processor<R> {
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn screen(&self) -> &Screen {
        self.state.screen()
    }

    /// Whether the screen changed during the last step and should be presented again.
    pub fn draw_requested(&self) -> bool {
        self.state.draw_requested()
    }

    /// Whether a tone should be playing, i.e. the sound timer is running.
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer() > 0
    }

    /// Set the state of a key.
    pub fn set_key_state(&mut self, key: Key, state: KeyState) {
        self.state.set_key_state(key, state);
    }

    /// Replace the state of all keys, indexed by key value.
    pub fn set_key_states(&mut self, pressed: [bool; Key::COUNT]) {
        for (key, pressed) in Key::ALL.iter().copied().zip(pressed) {
            self.state.set_key_state(key, pressed.into());
        }
    }

    /// Execute the instruction at the program counter.
    ///
    /// Unless the step ends in [`StepOutcome::WaitingForKeyPress`],
    /// the program counter is moved on and the delay and sound timers are decremented.
    /// On error, the failing instruction has not altered the state.
    #[instrument(level = "trace", skip(self), fields(program_counter = self.state.program_counter))]
    pub fn step(&mut self) -> Result<StepOutcome, ProcessorError> {
        self.state.draw_requested = false;

        if let KeyWaitingState::Waiting { target_register } = self.state.key_waiting {
            if self.state.last_pressed_key().is_none() {
                return Ok(StepOutcome::WaitingForKeyPress);
            }
            debug!(?target_register, "key pressed, resuming");
            self.state.key_waiting = KeyWaitingState::NotWaiting;
        }

        let opcode = self
            .state
            .fetch()
            .map_err(|error| self.out_of_bounds(error))?;
        let instruction = Instruction::from(opcode);
        trace!(%opcode, ?instruction, "executing");

        let program_counter = match self.execute(instruction)? {
            ProgramCounterUpdate::Next => self.state.program_counter.wrapping_add(INSTRUCTION_LEN),
            ProgramCounterUpdate::Skip => self
                .state
                .program_counter
                .wrapping_add(2 * INSTRUCTION_LEN),
            ProgramCounterUpdate::Jump(address) => address,
            ProgramCounterUpdate::Block => return Ok(StepOutcome::WaitingForKeyPress),
        };
        self.state.program_counter = program_counter;
        self.state.tick_timers();

        Ok(StepOutcome::Executed { instruction })
    }

    fn out_of_bounds(&self, error: OutOfBoundsError) -> ProcessorError {
        ProcessorError::OutOfBoundsMemoryAccess {
            program_counter: self.state.program_counter,
            address: error.address,
        }
    }

    fn skip_if(condition: bool) -> ProgramCounterUpdate {
        if condition {
            ProgramCounterUpdate::Skip
        } else {
            ProgramCounterUpdate::Next
        }
    }

    /// Look up the key for the value in `key_register`.
    fn key_in(&self, key_register: DataRegister) -> Result<Key, ProcessorError> {
        let key_id = self.state.register(key_register);
        Key::try_from(key_id).map_err(|_| ProcessorError::NotAValidKey {
            program_counter: self.state.program_counter,
            requested_key_id: key_id,
        })
    }

    /// Assign the result of an ALU operation to `target_register` and the flag to VF.
    ///
    /// The flag is written first, so a `target_register` of VF ends up holding the result.
    fn assign_with_flag(&mut self, target_register: DataRegister, (result, flag): (u8, bool)) {
        self.state.set_register(DataRegister::VF, flag as u8);
        self.state.set_register(target_register, result);
    }

    /// Advance `I` past a register block transfer of `end_register`.
    fn advance_past_register_block(&mut self, end_register: DataRegister) {
        self.state.address_register = self
            .state
            .address_register
            .wrapping_add(end_register as u8 as u16 + 1);
    }

    fn execute(&mut self, instruction: Instruction) -> Result<ProgramCounterUpdate, ProcessorError> {
        let update = match instruction {
            Instruction::ClearDisplay => {
                self.state.screen.clear();
                self.state.draw_requested = true;
                ProgramCounterUpdate::Next
            }
            Instruction::Return => {
                let call_site =
                    self.state
                        .call_stack
                        .pop()
                        .ok_or(ProcessorError::ReturnWithEmptyCallStack {
                            program_counter: self.state.program_counter,
                        })?;
                ProgramCounterUpdate::Jump(call_site.wrapping_add(INSTRUCTION_LEN))
            }
            Instruction::Jump { target_address } => {
                ProgramCounterUpdate::Jump(target_address.into())
            }
            Instruction::CallSubroutine { target_address } => {
                let program_counter = self.state.program_counter;
                self.state
                    .call_stack
                    .push(program_counter)
                    .map_err(|_| ProcessorError::MaxCallStackSizeExceeded { program_counter })?;
                ProgramCounterUpdate::Jump(target_address.into())
            }
            Instruction::SkipIfEqConst { register, constant } => {
                Self::skip_if(self.state.register(register) == constant)
            }
            Instruction::SkipIfNeqConst { register, constant } => {
                Self::skip_if(self.state.register(register) != constant)
            }
            Instruction::SkipIfEq {
                register1,
                register2,
            } => Self::skip_if(self.state.register(register1) == self.state.register(register2)),
            Instruction::SkipIfNeq {
                register1,
                register2,
            } => Self::skip_if(self.state.register(register1) != self.state.register(register2)),
            Instruction::AssignConst {
                target_register,
                constant,
            } => {
                self.state.set_register(target_register, constant);
                ProgramCounterUpdate::Next
            }
            Instruction::AddAssignConst {
                target_register,
                constant,
            } => {
                let result = self.state.register(target_register).wrapping_add(constant);
                self.state.set_register(target_register, result);
                ProgramCounterUpdate::Next
            }
            Instruction::Assign {
                target_register,
                source_register,
            } => {
                let val = self.state.register(source_register);
                self.state.set_register(target_register, val);
                ProgramCounterUpdate::Next
            }
            Instruction::OrAssign {
                target_register,
                source_register,
            } => {
                let val = self.state.register(target_register) | self.state.register(source_register);
                self.state.set_register(target_register, val);
                ProgramCounterUpdate::Next
            }
            Instruction::AndAssign {
                target_register,
                source_register,
            } => {
                let val = self.state.register(target_register) & self.state.register(source_register);
                self.state.set_register(target_register, val);
                ProgramCounterUpdate::Next
            }
            Instruction::XorAssign {
                target_register,
                source_register,
            } => {
                let val = self.state.register(target_register) ^ self.state.register(source_register);
                self.state.set_register(target_register, val);
                ProgramCounterUpdate::Next
            }
            Instruction::AddAssign {
                target_register,
                source_register,
            } => {
                let sum = self
                    .state
                    .register(target_register)
                    .overflowing_add(self.state.register(source_register));
                self.assign_with_flag(target_register, sum);
                ProgramCounterUpdate::Next
            }
            Instruction::SubAssign {
                target_register,
                source_register,
            } => {
                let minuend = self.state.register(target_register);
                let subtrahend = self.state.register(source_register);
                self.assign_with_flag(
                    target_register,
                    (minuend.wrapping_sub(subtrahend), minuend > subtrahend),
                );
                ProgramCounterUpdate::Next
            }
            Instruction::RevSubAssign {
                target_register,
                source_register,
            } => {
                let minuend = self.state.register(source_register);
                let subtrahend = self.state.register(target_register);
                self.assign_with_flag(
                    target_register,
                    (minuend.wrapping_sub(subtrahend), minuend > subtrahend),
                );
                ProgramCounterUpdate::Next
            }
            Instruction::ShrAssign {
                target_register, ..
            } => {
                let val = self.state.register(target_register);
                self.assign_with_flag(target_register, (val >> 1, val & 0b1 == 1));
                ProgramCounterUpdate::Next
            }
            Instruction::ShlAssign {
                target_register, ..
            } => {
                let val = self.state.register(target_register);
                self.assign_with_flag(target_register, (val << 1, val >> 7 == 1));
                ProgramCounterUpdate::Next
            }
            Instruction::AssignAddrToI { address } => {
                self.state.address_register = address.into();
                ProgramCounterUpdate::Next
            }
            Instruction::JumpOffset { address } => ProgramCounterUpdate::Jump(
                u16::from(address).wrapping_add(self.state.register(DataRegister::V0) as u16),
            ),
            Instruction::AssignRandomMasked {
                target_register,
                mask,
            } => {
                let random_byte = self.rng.gen::<u8>();
                self.state.set_register(target_register, random_byte & mask);
                ProgramCounterUpdate::Next
            }
            Instruction::DrawSprite {
                position_x_register,
                position_y_register,
                sprite_len,
            } => {
                let x = self.state.register(position_x_register);
                let y = self.state.register(position_y_register);
                let sprite = self
                    .state
                    .memory
                    .read(self.state.address_register, u8::from(sprite_len) as usize)
                    .map_err(|error| self.out_of_bounds(error))?;
                let set_pixel_unset =
                    self.state
                        .screen
                        .draw_sprite(x, y, sprite, self.partial_offscreen_drawing);
                self.state
                    .set_register(DataRegister::VF, set_pixel_unset as u8);
                self.state.draw_requested = true;
                ProgramCounterUpdate::Next
            }
            Instruction::SkipIfKeyPressed { key_register } => {
                let key = self.key_in(key_register)?;
                Self::skip_if(self.state.key_state(key) == KeyState::Pressed)
            }
            Instruction::SkipIfKeyNotPressed { key_register } => {
                let key = self.key_in(key_register)?;
                Self::skip_if(self.state.key_state(key) == KeyState::NotPressed)
            }
            Instruction::AssignDelayTimerVal { target_register } => {
                let delay_timer = self.state.delay_timer;
                self.state.set_register(target_register, delay_timer);
                ProgramCounterUpdate::Next
            }
            Instruction::WaitForKeyPress { target_register } => {
                match self.state.last_pressed_key() {
                    Some(key) => {
                        self.state.set_register(target_register, key.into());
                        ProgramCounterUpdate::Next
                    }
                    None => {
                        debug!(?target_register, "waiting for key press");
                        self.state.key_waiting = KeyWaitingState::Waiting { target_register };
                        ProgramCounterUpdate::Block
                    }
                }
            }
            Instruction::SetDelayTimer { source_register } => {
                self.state.delay_timer = self.state.register(source_register);
                ProgramCounterUpdate::Next
            }
            Instruction::SetSoundTimer { source_register } => {
                self.state.sound_timer = self.state.register(source_register);
                ProgramCounterUpdate::Next
            }
            Instruction::AddAssignI { source_register } => {
                self.state.address_register = self
                    .state
                    .address_register
                    .wrapping_add(self.state.register(source_register) as u16);
                ProgramCounterUpdate::Next
            }
            Instruction::AssignHexCharSpriteAddrToI { hex_char_register } => {
                let hex_char = self.state.register(hex_char_register);
                self.state.address_register =
                    font::glyph_address(hex_char).ok_or(ProcessorError::NotAHexChar {
                        program_counter: self.state.program_counter,
                        requested_sprite_id: hex_char,
                    })?;
                ProgramCounterUpdate::Next
            }
            Instruction::StoreBCD { source_register } => {
                let digits = decimal_digits_of_u8(self.state.register(source_register));
                let address = self.state.address_register;
                self.state
                    .memory
                    .write(address, &digits)
                    .map_err(|error| self.out_of_bounds(error))?;
                ProgramCounterUpdate::Next
            }
            Instruction::StoreRegisterValues { end_register } => {
                let count = end_register.index();
                let address = self.state.address_register;
                let values = self.state.data_registers;
                self.state
                    .memory
                    .write(address, &values[..count])
                    .map_err(|error| self.out_of_bounds(error))?;
                self.advance_past_register_block(end_register);
                ProgramCounterUpdate::Next
            }
            Instruction::LoadRegisterValues { end_register } => {
                let count = end_register.index();
                let values = self
                    .state
                    .memory
                    .read(self.state.address_register, count)
                    .map_err(|error| self.out_of_bounds(error))?;
                self.state.data_registers[..count].copy_from_slice(values);
                self.advance_past_register_block(end_register);
                ProgramCounterUpdate::Next
            }
            Instruction::Unrecognized { opcode } => {
                debug!(%opcode, "skipping unrecognized opcode");
                ProgramCounterUpdate::Next
            }
        };

        Ok(update)
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ProcessorBuilder {
    /// The partially initialized processor state
    state: State,
    partial_offscreen_drawing: PartialOffscreenDrawing,
}

impl ProcessorBuilder {
    pub fn new() -> Self {
        let mut state = State::default();
        let glyphs_start = GLYPHS_ADDRESS as usize;
        state.memory.bytes_mut()[glyphs_start..glyphs_start + GLYPHS.len()]
            .copy_from_slice(&GLYPHS);
        Self {
            state,
            partial_offscreen_drawing: PartialOffscreenDrawing::default(),
        }
    }

    /// Copies the ROM into the processor's memory,
    /// starting at [`Memory::PROGRAM_START`] where execution begins.
    pub fn rom(mut self, rom: &Rom) -> Self {
        let start = Memory::PROGRAM_START as usize;
        self.state.memory.bytes_mut()[start..start + rom.len()].copy_from_slice(rom.bytes());
        self
    }

    /// Copies the program into the processor's memory,
    /// starting at [`Memory::PROGRAM_START`] where execution begins.
    ///
    /// Fails if the program does not fit into the memory after the start address.
    pub fn program(self, program: &[u8]) -> Result<Self, LoadError> {
        let rom = Rom::from_bytes(program)?;
        Ok(self.rom(&rom))
    }

    /// Set the partial offscreen drawing behavior for sprites.
    /// See also [`PartialOffscreenDrawing`].
    pub fn partial_offscreen_drawing(
        mut self,
        partial_offscreen_drawing: PartialOffscreenDrawing,
    ) -> Self {
        self.partial_offscreen_drawing = partial_offscreen_drawing;
        self
    }

    /// Finish the processor, drawing random bytes from `rng`.
    pub fn build<R: RngCore>(self, rng: R) -> Processor<R> {
        Processor {
            state: self.state,
            rng,
            partial_offscreen_drawing: self.partial_offscreen_drawing,
        }
    }
}

impl Default for ProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// The glyph table and the program region must not overlap.
static_assertions::const_assert!(
    GLYPHS_ADDRESS as usize + font::GLYPHS_LEN <= Memory::PROGRAM_START as usize
);

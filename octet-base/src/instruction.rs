use std::fmt;

use static_assertions::const_assert;

use crate::{
    nibble_ints::{U12, U4, U8Nibble},
    processor::DataRegister,
};

/// A raw 16-bit instruction word, as fetched big-endian from memory.
///
/// Gives access to the operand fields shared by the instruction encodings,
/// named after the usual `_XYN`, `_XNN` and `_NNN` notation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(u16);

impl Opcode {
    pub const fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    pub const fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// All four nibbles, most significant first.
    pub const fn nibbles(self) -> (u8, u8, u8, u8) {
        let [hi, lo] = self.to_bytes();
        (
            U4::from_u8(hi, U8Nibble::Hi).into_u8(),
            U4::from_u8(hi, U8Nibble::Lo).into_u8(),
            U4::from_u8(lo, U8Nibble::Hi).into_u8(),
            U4::from_u8(lo, U8Nibble::Lo).into_u8(),
        )
    }

    /// The `NNN` field, the lowest twelve bits.
    pub const fn address(self) -> U12 {
        U12::from_u16_masked(self.0)
    }

    /// The `NN` field, the low byte.
    pub const fn byte(self) -> u8 {
        self.to_bytes()[1]
    }

    /// The `N` field, the lowest nibble.
    pub const fn nibble(self) -> U4 {
        U4::from_u8(self.byte(), U8Nibble::Lo)
    }

    /// The `X` field, the second highest nibble.
    pub fn x(self) -> DataRegister {
        U4::from_u8(self.to_bytes()[0], U8Nibble::Lo).into()
    }

    /// The `Y` field, the second lowest nibble.
    pub fn y(self) -> DataRegister {
        U4::from_u8(self.byte(), U8Nibble::Hi).into()
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Self(word)
    }
}

impl From<Opcode> for u16 {
    fn from(opcode: Opcode) -> Self {
        opcode.0
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opcode({:#06X})", self.0)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// Bind the operand field named by a nibble pattern identifier
/// to a variable with that identifier.
/// If given a constant instead of an identifier, do nothing.
macro_rules! maybe_extract_operand_into_var {
    ($opcode:ident, $target:ident, x) => {
        let $target: U4 = $opcode.x().into();
    };
    ($opcode:ident, $target:ident, y) => {
        let $target: U4 = $opcode.y().into();
    };
    ($opcode:ident, $target:ident, n) => {
        let $target: U4 = $opcode.nibble();
    };
    ($opcode:ident, $constant:literal, $_field:ident) => {};
    ($opcode:ident, byte_constant: $target:ident) => {
        let $target: u8 = $opcode.byte();
    };
    ($opcode:ident, address: $target:ident) => {
        let $target: U12 = $opcode.address();
    };
}

/// Expands to a pattern that matches a nibble constant in a match expression.
macro_rules! nibble_pattern_part_match_pattern {
    ($var:ident) => {
        _
    };
    ($constant:literal) => {
        $constant
    };
}

/// Expands to a pattern that matches all nibble constants in a given nibble pattern.
macro_rules! instruction_match_arm_pattern {
    (($n0:literal, $n1:tt, $n2:tt, $n3:tt)) => {
        (
            $n0,
            nibble_pattern_part_match_pattern!($n1),
            nibble_pattern_part_match_pattern!($n2),
            nibble_pattern_part_match_pattern!($n3),
        )
    };
    (($n0:literal, $n1:tt, $byte_constant:ident)) => {
        ($n0, nibble_pattern_part_match_pattern!($n1), _, _)
    };
    (($n0:literal, $address:ident)) => {
        ($n0, _, _, _)
    };
}

/// If given a literal, `const_assert!`s that the literal is at most `0b1111`.
/// Does nothing if given an identifier.
macro_rules! nibble_literal_assertion {
    ($var:ident) => {};
    ($constant:literal) => {
        const_assert!($constant <= 0b1111);
    };
}

/// For all given literals, `const_assert!`s that the literals are at most `0b1111`.
/// Identifiers are ignored.
macro_rules! nibble_literals_assertions {
    (($n0:literal, $n1:tt, $n2:tt, $n3:tt)) => {
        nibble_literal_assertion!($n0);
        nibble_literal_assertion!($n1);
        nibble_literal_assertion!($n2);
        nibble_literal_assertion!($n3);
    };
    (($n0:literal, $n1:tt, $_byte_constant:ident)) => {
        nibble_literal_assertion!($n0);
        nibble_literal_assertion!($n1);
    };
    (($n0:literal, $_address:ident)) => {
        nibble_literal_assertion!($n0);
    };
}

macro_rules! instruction_from_opcode_match_arm_code {
    ($opcode:ident, ($n0:literal, $n1:tt, $n2:tt, $n3:tt), $code:expr) => {{
        maybe_extract_operand_into_var!($opcode, $n1, x);
        maybe_extract_operand_into_var!($opcode, $n2, y);
        maybe_extract_operand_into_var!($opcode, $n3, n);
        $code
    }};
    ($opcode:ident, ($n0:literal, $n1:tt, $byte_constant:ident), $code:expr) => {{
        maybe_extract_operand_into_var!($opcode, $n1, x);
        maybe_extract_operand_into_var!($opcode, byte_constant: $byte_constant);
        $code
    }};
    ($opcode:ident, ($n0:literal, $address:ident), $code:expr) => {{
        maybe_extract_operand_into_var!($opcode, address: $address);
        $code
    }};
}

/// Converts a nibble pattern part, literal or operand variable, to its `u8` value.
macro_rules! u4_var_or_literal_to_u8 {
    ($nibble:literal) => {
        $nibble as u8
    };
    ($nibble:ident) => {
        u8::from(U4::from($nibble))
    };
}

macro_rules! opcode_from_instruction_match_arm_code {
    (($n0:literal, $n1:tt, $n2:tt, $n3:tt)) => {{
        Opcode::from_bytes([
            (u4_var_or_literal_to_u8!($n0) << 4) | u4_var_or_literal_to_u8!($n1),
            (u4_var_or_literal_to_u8!($n2) << 4) | u4_var_or_literal_to_u8!($n3),
        ])
    }};
    (($n0:literal, $n1:tt, $byte_constant:ident)) => {{
        Opcode::from_bytes([
            (u4_var_or_literal_to_u8!($n0) << 4) | u4_var_or_literal_to_u8!($n1),
            $byte_constant,
        ])
    }};
    (($n0:literal, $address:ident)) => {{
        Opcode::from(((u4_var_or_literal_to_u8!($n0) as u16) << 12) | u16::from($address))
    }};
}

macro_rules! define_instruction {
    (
        $(#[$enum_attribute:meta])*
        pub enum $enum_name:ident {
            $(
                $(#[$variant_attribute:meta])*
                $instruction_name:ident $( {
                    $(
                        $(#[$param_attribute:meta])*
                        $param:ident : $param_type:ty
                    ),*
                    $(,)?
                } )?
                =
                $nibble_pattern:tt
            ),*
            $(,)?
        }
    ) => {
        $(#[$enum_attribute])*
        pub enum $enum_name {
            $(
                $(#[$variant_attribute])*
                $instruction_name $({
                    $(
                        $(#[$param_attribute])*
                        $param: $param_type
                    ),*
                })?,
            )*
            /// Any opcode that matches none of the patterns above.
            ///
            /// Executing it is a no-op apart from advancing the program counter
            /// to the next instruction.
            Unrecognized { opcode: Opcode },
        }

        $(
            nibble_literals_assertions!($nibble_pattern);
        )*

        impl From<Opcode> for $enum_name {
            /// Decode an opcode. Total, every opcode decodes to some instruction.
            fn from(opcode: Opcode) -> Self {
                match opcode.nibbles() {
                    $(
                        instruction_match_arm_pattern!($nibble_pattern) => {
                            instruction_from_opcode_match_arm_code!(opcode, $nibble_pattern, {
                                Self::$instruction_name $({ $($param: <$param_type>::from($param)),* })?
                            })
                        },
                    )*
                    (_, _, _, _) => Self::Unrecognized { opcode },
                }
            }
        }

        impl From<$enum_name> for Opcode {
            fn from(instruction: $enum_name) -> Self {
                match instruction {
                    $(
                        $enum_name::$instruction_name $({ $($param),* })? => {
                            opcode_from_instruction_match_arm_code!($nibble_pattern)
                        },
                    )*
                    $enum_name::Unrecognized { opcode } => opcode,
                }
            }
        }
    };
}

define_instruction! {
    /// A CHIP-8 instruction
    ///
    /// References used are
    /// <https://github.com/mattmikolay/chip-8/wiki/CHIP%E2%80%908-Instruction-Set> (CC-BY-SA 4.0, Matthew Mikolay)
    /// and <https://en.wikipedia.org/wiki/CHIP-8#Opcode_table> (CC-BY-SA 3.0, Wikipedia Authors).
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub enum Instruction {
        /// Clear the display.
        ClearDisplay = (0x0, 0x0, 0xE, 0x0),
        /// Return from a subroutine.
        Return = (0x0, 0x0, 0xE, 0xE),
        /// Jump to the `target_address`.
        Jump { target_address: U12 } = (0x1, target_address),
        /// Call the subroutine at the `target_address`.
        CallSubroutine { target_address: U12 } = (0x2, target_address),
        /// Skip the next instruction if the value in `register`
        /// is equal to `constant`.
        SkipIfEqConst { register: DataRegister, constant: u8 } = (0x3, register, constant),
        /// Skip the next instruction if the value in `register`
        /// is not equal to `constant`.
        SkipIfNeqConst { register: DataRegister, constant: u8 } = (0x4, register, constant),
        /// Skip the next instruction if the value in `register1`
        /// is equal to the value in `register2`.
        SkipIfEq {
            register1: DataRegister,
            register2: DataRegister,
        } = (0x5, register1, register2, 0x0),
        /// Assign `constant` to `target_register`.
        AssignConst {
            target_register: DataRegister,
            constant: u8,
        } = (0x6, target_register, constant),
        /// Add `constant` to the value in `target_register`
        /// and assign the result to `target_register`.
        ///
        /// [`DataRegister::VF`] is not altered.
        AddAssignConst {
            target_register: DataRegister,
            constant: u8,
        } = (0x7, target_register, constant),
        /// Assign the value in `source_register` to `target_register`.
        Assign {
            target_register: DataRegister,
            source_register: DataRegister,
        } = (0x8, target_register, source_register, 0x0),
        /// Bitwise-OR the value in `source_register`
        /// and the value in `target_register`,
        /// and assign the result to `target_register`.
        OrAssign {
            target_register: DataRegister,
            source_register: DataRegister,
        } = (0x8, target_register, source_register, 0x1),
        /// Bitwise-AND the value in `source_register`
        /// and the value in `target_register`,
        /// and assign the result to `target_register`.
        AndAssign {
            target_register: DataRegister,
            source_register: DataRegister,
        } = (0x8, target_register, source_register, 0x2),
        /// Bitwise-XOR the value in `source_register`
        /// and the value in `target_register`,
        /// and assign the result to `target_register`.
        XorAssign {
            target_register: DataRegister,
            source_register: DataRegister,
        } = (0x8, target_register, source_register, 0x3),
        /// Add the value in `source_register` to the value in `target_register`
        /// and assign the result to `target_register`.
        ///
        /// If a carry occurs [`DataRegister::VF`] is set to `1`,
        /// if not it is set to `0`.
        AddAssign {
            target_register: DataRegister,
            source_register: DataRegister,
        } = (0x8, target_register, source_register, 0x4),
        /// Subtract the value in `source_register`
        /// from the value in `target_register`
        /// and assign the result to `target_register`.
        ///
        /// [`DataRegister::VF`] is set to `1` if the value in `target_register`
        /// is greater than the value in `source_register`, to `0` otherwise.
        SubAssign {
            target_register: DataRegister,
            source_register: DataRegister,
        } = (0x8, target_register, source_register, 0x5),
        /// Shift the value in `target_register` one bit to the right.
        ///
        /// [`DataRegister::VF`] is set to the least significant bit of
        /// `target_register` prior to the shift, i.e. the bit that is shifted out.
        /// `source_register` is ignored.
        ShrAssign {
            target_register: DataRegister,
            source_register: DataRegister,
        } = (0x8, target_register, source_register, 0x6),
        /// Subtract the value in `target_register`
        /// from the value in `source_register`
        /// and assign the result to `target_register`.
        ///
        /// [`DataRegister::VF`] is set to `1` if the value in `source_register`
        /// is greater than the value in `target_register`, to `0` otherwise.
        RevSubAssign {
            target_register: DataRegister,
            source_register: DataRegister,
        } = (0x8, target_register, source_register, 0x7),
        /// Shift the value in `target_register` one bit to the left.
        ///
        /// [`DataRegister::VF`] is set to the most significant bit of
        /// `target_register` prior to the shift, i.e. the bit that is shifted out.
        /// `source_register` is ignored.
        ShlAssign {
            target_register: DataRegister,
            source_register: DataRegister,
        } = (0x8, target_register, source_register, 0xE),
        /// Skip the next instruction if the value in `register1`
        /// is not equal to the value in `register2`.
        SkipIfNeq {
            register1: DataRegister,
            register2: DataRegister,
        } = (0x9, register1, register2, 0x0),
        /// Assign `address` to the special address register `I`.
        AssignAddrToI { address: U12 } = (0xA, address),
        /// Jump to the sum of `address` and the value in [`DataRegister::V0`].
        JumpOffset { address: U12 } = (0xB, address),
        /// Assign a random byte, bitwise-ANDed with `mask`, to `target_register`.
        AssignRandomMasked {
            target_register: DataRegister,
            mask: u8,
        } = (0xC, target_register, mask),
        /// Draw a sprite at the position given by the values
        /// in `position_x_register` and `position_y_register`.
        /// For this `sprite_len` bytes of sprite data are read from the address
        /// stored in the special address register `I`.
        ///
        /// If the position for the sprite to be drawn is offscreen,
        /// the position will have the modulo of the screen size in each dimension applied to it.
        /// [`DataRegister::VF`] is set to `1` if a set pixel is unset, to `0` otherwise.
        DrawSprite {
            position_x_register: DataRegister,
            position_y_register: DataRegister,
            sprite_len: U4,
        } = (0xD, position_x_register, position_y_register, sprite_len),
        /// Skip the next instruction if the key corresponding
        /// to the value set in `key_register` is pressed.
        SkipIfKeyPressed { key_register: DataRegister } = (0xE, key_register, 0x9, 0xE),
        /// Skip the next instruction if the key corresponding
        /// to the value set in `key_register` is not pressed.
        SkipIfKeyNotPressed { key_register: DataRegister } = (0xE, key_register, 0xA, 0x1),
        /// Assign the current value of the delay timer to `target_register`.
        AssignDelayTimerVal { target_register: DataRegister } = (0xF, target_register, 0x0, 0x7),
        /// Wait until a key is pressed and store the value
        /// corresponding the key in `target_register`.
        ///
        /// If several keys are pressed, the one with the highest value is stored.
        WaitForKeyPress { target_register: DataRegister } = (0xF, target_register, 0x0, 0xA),
        /// Set the value of the delay timer to the value in `source_register`.
        SetDelayTimer { source_register: DataRegister } = (0xF, source_register, 0x1, 0x5),
        /// Set the value of the sound timer to the value in `source_register`.
        SetSoundTimer { source_register: DataRegister } = (0xF, source_register, 0x1, 0x8),
        /// Add the value in `source_register` to the value
        /// in the special address register `I` and store the result in `I`.
        ///
        /// [`DataRegister::VF`] is not altered.
        AddAssignI { source_register: DataRegister } = (0xF, source_register, 0x1, 0xE),
        /// Assign the address of the built-in hex char sprite
        /// corresponding to the value in `hex_char_register`
        /// to the special address register `I`.
        /// See [`GLYPHS`](crate::font::GLYPHS).
        ///
        /// For any value of `hex_char_register` that is greater than `0xF`
        /// a runtime error will be emitted.
        AssignHexCharSpriteAddrToI { hex_char_register: DataRegister } = (0xF, hex_char_register, 0x2, 0x9),
        /// Store the three digit binary-coded decimal equivalent
        /// to the value in `source_register`
        /// in the three consecutive bytes of memory
        /// beginning at the address in the special address register `I`.
        /// The digits are stored in order of significance,
        /// e.g. the digit for hundreds is stored at the address in `I`.
        StoreBCD { source_register: DataRegister } = (0xF, source_register, 0x3, 0x3),
        /// Store the values from registers [`DataRegister::V0`] up to,
        /// but not including, `end_register`
        /// in consecutive bytes of memory
        /// beginning at the address in the special address register `I`.
        ///
        /// The special address register `I` is then advanced
        /// by the number of `end_register` plus one.
        StoreRegisterValues { end_register: DataRegister } = (0xF, end_register, 0x5, 0x5),
        /// Load the values of consecutive bytes of memory
        /// beginning at the address in the special address register `I`
        /// into the registers from [`DataRegister::V0`] up to,
        /// but not including, `end_register`.
        ///
        /// The special address register `I` is then advanced
        /// by the number of `end_register` plus one.
        LoadRegisterValues { end_register: DataRegister } = (0xF, end_register, 0x6, 0x5),
    }
}

impl Instruction {
    /// Decode the instruction from its big-endian bytes.
    pub fn decode(bytes: [u8; 2]) -> Self {
        Opcode::from_bytes(bytes).into()
    }

    /// Encode the instruction into its big-endian bytes.
    pub fn encode(self) -> [u8; 2] {
        Opcode::from(self).to_bytes()
    }
}

use num_enum::{IntoPrimitive, TryFromPrimitive, UnsafeFromPrimitive};
use static_assertions::const_assert_eq;

use crate::nibble_ints::U4;

/// Data register of the CHIP-8 processor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    UnsafeFromPrimitive,
)]
#[repr(u8)]
pub enum DataRegister {
    /// Used as the offset in [`Instruction::JumpOffset`](crate::instruction::Instruction::JumpOffset).
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    VA,
    VB,
    VC,
    VD,
    VE,
    /// Used for carry/borrow flags, set to the shifted-out bit after bit shifts
    /// and to the collision flag after drawing a sprite.
    VF,
}

impl DataRegister {
    /// Number of data registers.
    pub const COUNT: usize = 16;

    /// All data registers in ascending order.
    pub const ALL: [DataRegister; Self::COUNT] = [
        Self::V0,
        Self::V1,
        Self::V2,
        Self::V3,
        Self::V4,
        Self::V5,
        Self::V6,
        Self::V7,
        Self::V8,
        Self::V9,
        Self::VA,
        Self::VB,
        Self::VC,
        Self::VD,
        Self::VE,
        Self::VF,
    ];

    pub const fn index(self) -> usize {
        self as u8 as usize
    }
}

const_assert_eq!(DataRegister::COUNT, U4::MAX.into_u8() as usize + 1);

impl From<DataRegister> for U4 {
    fn from(reg: DataRegister) -> Self {
        U4::from_u8_masked(reg as u8)
    }
}

impl From<U4> for DataRegister {
    fn from(val: U4) -> Self {
        // SAFETY: DataRegister has exactly U4::MAX + 1 variants.
        unsafe { DataRegister::from_unchecked(u8::from(val)) }
    }
}

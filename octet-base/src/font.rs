//! The built-in hexadecimal glyph table, stored at the start of memory.

macro_rules! pixel_to_bit {
    (#) => {
        1
    };
    (,) => {
        0
    };
}

macro_rules! sprite_4x5_font {
    (
        $(
            $(
                ($pixel0:tt $pixel1:tt $pixel2:tt $pixel3:tt)
            )*
            ------
        )*
    ) => {
        [
            $(
                $(
                    // Shift pixels into high nibble / left half of the sprite.
                    (pixel_to_bit!($pixel0) << 7
                        | pixel_to_bit!($pixel1) << 6
                        | pixel_to_bit!($pixel2) << 5
                        | pixel_to_bit!($pixel3) << 4),
                )*
            )*
        ]
    };
}

/// Height of a glyph in rows (and bytes).
pub const GLYPH_HEIGHT: usize = 5;

/// Number of glyphs, one per hexadecimal digit.
pub const GLYPH_COUNT: usize = 0xF + 1;

/// Length of the glyph table in bytes.
pub const GLYPHS_LEN: usize = GLYPH_HEIGHT * GLYPH_COUNT;

/// Address of the glyph table in memory.
pub const GLYPHS_ADDRESS: u16 = 0x0;

/// A 4x5 sprite font of the hexadecimal digits.
///
/// Since a CHIP-8 sprite is always one byte wide,
/// the low nibble is 0 for all of these character sprites.
/// The actual symbols are in the high nibble only.
pub const GLYPHS: [u8; GLYPHS_LEN] = sprite_4x5_font![
    (####)
    (#,,#)
    (#,,#)
    (#,,#)
    (####)
    ------
    (,,#,)
    (,##,)
    (,,#,)
    (,,#,)
    (,###)
    ------
    (####)
    (,,,#)
    (####)
    (#,,,)
    (####)
    ------
    (####)
    (,,,#)
    (####)
    (,,,#)
    (####)
    ------
    (#,,#)
    (#,,#)
    (####)
    (,,,#)
    (,,,#)
    ------
    (####)
    (#,,,)
    (####)
    (,,,#)
    (####)
    ------
    (####)
    (#,,,)
    (####)
    (#,,#)
    (####)
    ------
    (####)
    (,,,#)
    (,,#,)
    (,#,,)
    (,#,,)
    ------
    (####)
    (#,,#)
    (####)
    (#,,#)
    (####)
    ------
    (####)
    (#,,#)
    (####)
    (,,,#)
    (####)
    ------
    (####)
    (#,,#)
    (####)
    (#,,#)
    (#,,#)
    ------
    (###,)
    (#,,#)
    (###,)
    (#,,#)
    (###,)
    ------
    (####)
    (#,,,)
    (#,,,)
    (#,,,)
    (####)
    ------
    (###,)
    (#,,#)
    (#,,#)
    (#,,#)
    (###,)
    ------
    (####)
    (#,,,)
    (####)
    (#,,,)
    (####)
    ------
    (####)
    (#,,,)
    (####)
    (#,,,)
    (#,,,)
    ------
];

/// Address of the glyph for the hexadecimal digit `digit`,
/// or `None` if `digit` is not a hexadecimal digit.
pub const fn glyph_address(digit: u8) -> Option<u16> {
    if digit as usize >= GLYPH_COUNT {
        return None;
    }
    Some(GLYPHS_ADDRESS + digit as u16 * GLYPH_HEIGHT as u16)
}

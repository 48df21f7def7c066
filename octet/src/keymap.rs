use octet_base::processor::{Key, KeyState};
use winit::event::{ElementState, VirtualKeyCode};

pub trait TryIntoKey {
    type Error;

    fn try_into_key(&self) -> Result<Key, Self::Error>;
}

impl TryIntoKey for VirtualKeyCode {
    type Error = ();

    /// Maps the left 4x4 block of a QWERTY keyboard onto the hex keypad:
    ///
    /// ```text
    /// 1 2 3 4      1 2 3 C
    /// Q W E R      4 5 6 D
    /// A S D F  ->  7 8 9 E
    /// Z X C V      A 0 B F
    /// ```
    fn try_into_key(&self) -> Result<Key, Self::Error> {
        use VirtualKeyCode::*;

        match *self {
            // row 1
            Key1 => Ok(Key::K1),
            Key2 => Ok(Key::K2),
            Key3 => Ok(Key::K3),
            Key4 => Ok(Key::KC),
            // row 2
            Q => Ok(Key::K4),
            W => Ok(Key::K5),
            E => Ok(Key::K6),
            R => Ok(Key::KD),
            // row 3
            A => Ok(Key::K7),
            S => Ok(Key::K8),
            D => Ok(Key::K9),
            F => Ok(Key::KE),
            // row 4
            Z => Ok(Key::KA),
            X => Ok(Key::K0),
            C => Ok(Key::KB),
            V => Ok(Key::KF),
            _ => Err(()),
        }
    }
}

pub trait IntoKeyState {
    fn into_key_state(&self) -> KeyState;
}

impl IntoKeyState for ElementState {
    fn into_key_state(&self) -> KeyState {
        match *self {
            ElementState::Pressed => KeyState::Pressed,
            ElementState::Released => KeyState::NotPressed,
        }
    }
}

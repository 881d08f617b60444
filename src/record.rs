//! The `INPUT` event record: a tagged union handed to the OS as raw bytes.
//!
//! `SendInput` receives an array of these records plus `size_of` one record
//! and reads them as raw memory, so the layout here must match winuser.h
//! bit-for-bit: a 4-byte discriminant, padding up to pointer alignment, then
//! a true union of the three payload shapes. Total size is the payload offset
//! plus the largest payload (mouse): 40 bytes on 64-bit Windows, 28 on 32-bit.
//!
//! Layout is pinned by const assertions below and by the tests at the bottom;
//! `platform::windows` passes `&[InputRecord]` straight to `SendInput` with a
//! pointer cast on the strength of those checks.

use std::mem;

// ---------------------------------------------------------------------------
// OS ABI constants (winuser.h)
// ---------------------------------------------------------------------------

/// `INPUT.type` discriminant: mouse payload.
pub const INPUT_MOUSE: u32 = 0;
/// `INPUT.type` discriminant: keyboard payload.
pub const INPUT_KEYBOARD: u32 = 1;
/// `INPUT.type` discriminant: raw hardware payload.
pub const INPUT_HARDWARE: u32 = 2;

/// Keyboard flag: the scan code is for an extended key (0xE0/0xE1 prefix).
pub const KEYEVENTF_EXTENDEDKEY: u32 = 0x0001;
/// Keyboard flag: key release. Absent means key press.
pub const KEYEVENTF_KEYUP: u32 = 0x0002;
/// Keyboard flag: `scan` carries a UTF-16 code unit, `vk` must be 0.
pub const KEYEVENTF_UNICODE: u32 = 0x0004;
/// Keyboard flag: the OS interprets `scan` rather than `vk`.
pub const KEYEVENTF_SCANCODE: u32 = 0x0008;

pub const MOUSEEVENTF_MOVE: u32 = 0x0001;
pub const MOUSEEVENTF_LEFTDOWN: u32 = 0x0002;
pub const MOUSEEVENTF_LEFTUP: u32 = 0x0004;
pub const MOUSEEVENTF_RIGHTDOWN: u32 = 0x0008;
pub const MOUSEEVENTF_RIGHTUP: u32 = 0x0010;
pub const MOUSEEVENTF_MIDDLEDOWN: u32 = 0x0020;
pub const MOUSEEVENTF_MIDDLEUP: u32 = 0x0040;
pub const MOUSEEVENTF_XDOWN: u32 = 0x0080;
pub const MOUSEEVENTF_XUP: u32 = 0x0100;
pub const MOUSEEVENTF_WHEEL: u32 = 0x0800;
pub const MOUSEEVENTF_HWHEEL: u32 = 0x1000;
/// `dx`/`dy` are absolute coordinates in the [0, 65535] virtual screen range.
pub const MOUSEEVENTF_ABSOLUTE: u32 = 0x8000;

// ---------------------------------------------------------------------------
// Payload shapes (MOUSEINPUT / KEYBDINPUT / HARDWAREINPUT)
// ---------------------------------------------------------------------------

/// Mouse payload. The largest of the three shapes; it sets the union size.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct MousePayload {
    pub dx: i32,
    pub dy: i32,
    /// Wheel delta or X-button id, depending on `flags`. 0 otherwise.
    pub mouse_data: u32,
    pub flags: u32,
    /// Event timestamp in ms; 0 lets the OS assign one.
    pub time: u32,
    /// Opaque tag the OS attaches to the injected event.
    pub extra_info: usize,
}

/// Keyboard payload.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct KeyboardPayload {
    pub vk: u16,
    pub scan: u16,
    pub flags: u32,
    pub time: u32,
    pub extra_info: usize,
}

/// Raw hardware payload: an opaque message with two 16-bit parameter halves.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct HardwarePayload {
    pub msg: u32,
    pub param_l: u16,
    pub param_h: u16,
}

/// The payload union. A true union: the three shapes share one memory
/// region, and only the variant named by [`InputRecord::kind`] is meaningful.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RecordPayload {
    pub mouse: MousePayload,
    pub keyboard: KeyboardPayload,
    pub hardware: HardwarePayload,
}

// ---------------------------------------------------------------------------
// The record itself
// ---------------------------------------------------------------------------

/// One unit of injectable input, layout-compatible with winuser.h `INPUT`.
///
/// Built fresh per submission via [`InputRecord::keyboard`],
/// [`InputRecord::mouse`], or [`InputRecord::hardware`]; the OS copies the
/// bytes during the `SendInput` call, so records never outlive one call.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct InputRecord {
    /// Discriminant: one of `INPUT_MOUSE`, `INPUT_KEYBOARD`, `INPUT_HARDWARE`.
    pub kind: u32,
    pub payload: RecordPayload,
}

// The OS reads these as raw bytes; pin the contract at compile time.
// Header is the discriminant padded to the union's (pointer) alignment.
const _: () = assert!(
    mem::size_of::<InputRecord>()
        == mem::align_of::<RecordPayload>() + mem::size_of::<RecordPayload>()
);
const _: () = assert!(mem::size_of::<RecordPayload>() == mem::size_of::<MousePayload>());

impl InputRecord {
    /// A keyboard record. `time` is always 0 (OS assigns).
    pub fn keyboard(vk: u16, scan: u16, flags: u32, extra_info: usize) -> Self {
        Self {
            kind: INPUT_KEYBOARD,
            payload: RecordPayload {
                keyboard: KeyboardPayload {
                    vk,
                    scan,
                    flags,
                    time: 0,
                    extra_info,
                },
            },
        }
    }

    /// A mouse record. `mouse_data` carries the wheel delta or X-button id
    /// when `flags` says so; the high-level operations always pass 0.
    pub fn mouse(dx: i32, dy: i32, mouse_data: u32, flags: u32, extra_info: usize) -> Self {
        Self {
            kind: INPUT_MOUSE,
            payload: RecordPayload {
                mouse: MousePayload {
                    dx,
                    dy,
                    mouse_data,
                    flags,
                    time: 0,
                    extra_info,
                },
            },
        }
    }

    /// A raw hardware record.
    pub fn hardware(msg: u32, param_l: u16, param_h: u16) -> Self {
        Self {
            kind: INPUT_HARDWARE,
            payload: RecordPayload {
                hardware: HardwarePayload {
                    msg,
                    param_l,
                    param_h,
                },
            },
        }
    }

    /// The keyboard view of the payload.
    ///
    /// Meaningful only when `kind == INPUT_KEYBOARD`; reading another
    /// variant's bytes through this view is garbage, not an error.
    pub fn as_keyboard(&self) -> &KeyboardPayload {
        // SAFETY: all payload shapes are plain-old-data with every bit
        // pattern valid, so the union read itself cannot be UB.
        unsafe { &self.payload.keyboard }
    }

    /// The mouse view of the payload. Meaningful only when `kind == INPUT_MOUSE`.
    pub fn as_mouse(&self) -> &MousePayload {
        // SAFETY: as above.
        unsafe { &self.payload.mouse }
    }

    /// The hardware view of the payload. Meaningful only when `kind == INPUT_HARDWARE`.
    pub fn as_hardware(&self) -> &HardwarePayload {
        // SAFETY: as above.
        unsafe { &self.payload.hardware }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Win32 implementation of `PlatformServices`.
//!
//! Every method is a single synchronous Win32 call; no state, no threads.
//! `submit` passes the crate's own `InputRecord` array to `SendInput` with a
//! pointer cast: `record.rs` pins the layout to the winuser.h `INPUT`
//! contract, and `SendInput` receives the exact per-record byte size so the
//! OS slices the array identically.

use std::mem;

use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, GetKeyboardLayout, MapVirtualKeyExW, SendInput, VkKeyScanW,
};
use windows_sys::Win32::UI::WindowsAndMessaging::GetMessageExtraInfo;

use super::{LayoutHandle, PlatformServices, VK_TO_VSC_EX};
use crate::record::InputRecord;

/// Live Win32 services. Stateless; construct freely.
pub struct Win32Services;

impl Win32Services {
    pub fn new() -> Self {
        Win32Services
    }
}

impl Default for Win32Services {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformServices for Win32Services {
    fn key_state(&self, vk: u16) -> u16 {
        // SAFETY: GetAsyncKeyState is a pure query, safe for any argument.
        unsafe { GetAsyncKeyState(vk as i32) as u16 }
    }

    fn char_to_vkey_raw(&self, ch: char) -> i16 {
        // VkKeyScanW takes one UTF-16 unit; anything outside the BMP has no
        // single key under any layout, so report the platform sentinel.
        let Ok(unit) = u16::try_from(u32::from(ch)) else {
            return -1;
        };
        // SAFETY: pure translation query.
        unsafe { VkKeyScanW(unit) }
    }

    fn keyboard_layout(&self) -> LayoutHandle {
        // SAFETY: thread id 0 means "the foreground thread's layout".
        unsafe { GetKeyboardLayout(0) as LayoutHandle }
    }

    fn vkey_to_scan_code(&self, vk: u16, layout: LayoutHandle) -> u32 {
        // SAFETY: pure translation query; an unknown vk yields 0.
        unsafe { MapVirtualKeyExW(vk as u32, VK_TO_VSC_EX, layout as _) }
    }

    fn extra_info_tag(&self) -> usize {
        // SAFETY: returns the calling thread's extra-info value, no
        // preconditions.
        unsafe { GetMessageExtraInfo() as usize }
    }

    fn submit(&self, records: &[InputRecord]) -> u32 {
        if records.is_empty() {
            return 0;
        }
        // SAFETY: records is a contiguous initialized array, the cast is
        // backed by the layout assertions in record.rs, and the OS copies
        // the bytes before returning.
        unsafe {
            SendInput(
                records.len() as u32,
                records.as_ptr().cast(),
                mem::size_of::<InputRecord>() as i32,
            )
        }
    }
}

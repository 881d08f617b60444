//! Platform service boundary.
//!
//! Everything the builder and injector need from the OS is behind the
//! `PlatformServices` trait: key-state queries, layout-dependent translation,
//! the injected-input tag, and record submission. The real implementation
//! (`Win32Services`) lives in the `windows` child module; tests substitute
//! stubs, so translation and submission policy are exercised off-platform.

pub mod stub;
#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::Win32Services;

use crate::record::InputRecord;

/// Opaque handle to a keyboard layout (Win32 `HKL`).
pub type LayoutHandle = isize;

/// Virtual-key → scan-code mode that keeps the 0xE0/0xE1 extended prefix
/// (Win32 `MAPVK_VK_TO_VSC_EX`).
pub const VK_TO_VSC_EX: u32 = 4;

/// The OS services consumed by this crate, as a capability interface.
///
/// Methods mirror the underlying Win32 calls one-to-one and return the raw
/// platform values; named decoding (sentinels, state bits) happens in the
/// caller immediately after, so raw magic values never travel further.
pub trait PlatformServices {
    /// Raw 16-bit key state (`GetAsyncKeyState`): high bit = currently down,
    /// low bit = pressed since the previous query.
    fn key_state(&self, vk: u16) -> u16;

    /// Packed (shift-state byte, virtual-key byte) for a character under the
    /// active layout (`VkKeyScanW`). -1 in both bytes means not mappable.
    fn char_to_vkey_raw(&self, ch: char) -> i16;

    /// The active keyboard layout of the foreground thread
    /// (`GetKeyboardLayout(0)`). Re-fetched per operation; layouts change at
    /// runtime, so the handle is never cached.
    fn keyboard_layout(&self) -> LayoutHandle;

    /// Scan code for a virtual key under `layout`, extended prefix included
    /// (`MapVirtualKeyExW` with [`VK_TO_VSC_EX`]). 0 means no mapping.
    fn vkey_to_scan_code(&self, vk: u16, layout: LayoutHandle) -> u32;

    /// The tag the OS attaches to input injected by this process
    /// (`GetMessageExtraInfo`), so consumers can tell synthetic from physical.
    fn extra_info_tag(&self) -> usize;

    /// Hands `records` to the OS injection queue (`SendInput`) and returns
    /// how many were accepted, `0..=records.len()`. Accepted records are
    /// queued asynchronously; this call does not wait for delivery.
    fn submit(&self, records: &[InputRecord]) -> u32;
}

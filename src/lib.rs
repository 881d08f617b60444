//! winject -- Windows keyboard and mouse input synthesis.
//!
//! Builds winuser.h `INPUT` records with byte-exact layout and hands them to
//! the OS injection queue (`SendInput`), where they join the same stream as
//! physical device input. Scan codes are resolved through the active
//! keyboard layout on every call, extended keys (0xE0/0xE1 scan prefixes)
//! get `KEYEVENTF_EXTENDEDKEY`, and a press is a down/up pair submitted as
//! one two-record array so the OS queues them back-to-back.
//!
//! Everything the crate needs from the OS sits behind the
//! [`PlatformServices`] trait; [`platform::stub::StubServices`] swaps the OS
//! out for tests, and `Injector::win32()` (Windows only) wires up the live
//! services.
//!
//! Scope: no window targeting, no macro playback, no scheduling, no
//! cross-platform emulation. An operation either fully enters the input
//! queue or reports [`InjectError`]; a partial acceptance by the OS is
//! reported as failure and is not rolled back.

pub mod builder;
pub mod injector;
pub mod platform;
pub mod record;
pub mod vk;

pub use builder::{CharMapping, ScanCode};
pub use injector::{InjectError, Injector};
pub use platform::{LayoutHandle, PlatformServices};
pub use record::InputRecord;

#[cfg(windows)]
pub use platform::Win32Services;

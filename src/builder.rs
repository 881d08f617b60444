//! Event record construction and layout-dependent translation.
//!
//! All translation happens here, before a record exists: virtual key → scan
//! code under the active keyboard layout, extended-key classification from
//! the scan code's prefix byte, and character → virtual key with the platform
//! sentinel decoded into [`CharMapping`] the moment it crosses the boundary.
//!
//! Scan codes are recomputed on every call. The active layout can change
//! between calls, so nothing here is cached.

use crate::injector::InjectError;
use crate::platform::PlatformServices;
use crate::record::{
    InputRecord, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE,
};

// ---------------------------------------------------------------------------
// Scan codes
// ---------------------------------------------------------------------------

/// A resolved hardware scan code, extended prefix included.
///
/// Extended keys (right-side modifiers, the navigation cluster, numpad
/// Enter) translate with an 0xE0 or 0xE1 prefix byte and need
/// `KEYEVENTF_EXTENDEDKEY` set for the OS to pick the right physical key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanCode(u16);

impl ScanCode {
    /// Wraps a raw translation result. 0 is the platform's "no mapping"
    /// sentinel and yields `None`; anything above u16 range is truncated the
    /// way the OS itself does.
    pub fn new(raw: u32) -> Option<Self> {
        match raw as u16 {
            0 => None,
            code => Some(ScanCode(code)),
        }
    }

    /// True iff the prefix byte is one of the two extended-key prefixes.
    pub fn is_extended(self) -> bool {
        matches!(self.0 >> 8, 0xE0 | 0xE1)
    }

    /// The value to place in the record's `scan` field: the prefix byte is
    /// carried by `KEYEVENTF_EXTENDEDKEY` instead, so extended codes keep
    /// only their low byte.
    pub fn wscan(self) -> u16 {
        if self.is_extended() {
            self.0 & 0xFF
        } else {
            self.0
        }
    }

    pub fn raw(self) -> u16 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Character translation boundary
// ---------------------------------------------------------------------------

/// Result of asking the active layout which key produces a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharMapping {
    /// A key exists. `shift_state` describes the modifiers the layout needs
    /// (bit 0 Shift, bit 1 Ctrl, bit 2 Alt); this crate reports it but does
    /// not synthesize the modifier events.
    Mapped { vk: u16, shift_state: u8 },
    /// No key under the active layout produces this character.
    NotMappable,
}

impl CharMapping {
    /// Decodes the packed `VkKeyScanW` result: low byte = virtual key, high
    /// byte = shift state. Not mappable iff *both* bytes equal -1; that is
    /// the literal platform contract, partial -1s are still mappings.
    pub fn from_packed(raw: i16) -> Self {
        let vk = (raw & 0xFF) as u8;
        let shift_state = ((raw >> 8) & 0xFF) as u8;
        if vk == 0xFF && shift_state == 0xFF {
            CharMapping::NotMappable
        } else {
            CharMapping::Mapped {
                vk: vk as u16,
                shift_state,
            }
        }
    }
}

/// Asks the active layout for the key producing `ch`, decoding the sentinel
/// at the boundary. On `NotMappable` the caller must stop; there is no
/// fallback translation.
pub fn char_to_vkey<S: PlatformServices>(services: &S, ch: char) -> CharMapping {
    CharMapping::from_packed(services.char_to_vkey_raw(ch))
}

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

/// Resolves `vk` under the currently active layout.
fn resolve_scan_code<S: PlatformServices>(services: &S, vk: u16) -> Result<ScanCode, InjectError> {
    let layout = services.keyboard_layout();
    ScanCode::new(services.vkey_to_scan_code(vk, layout)).ok_or(InjectError::NoScanCode { vk })
}

fn keyboard_record(vk: u16, scan: ScanCode, key_up: bool, extra_info: usize) -> InputRecord {
    let mut flags = KEYEVENTF_SCANCODE;
    if scan.is_extended() {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    InputRecord::keyboard(vk, scan.wscan(), flags, extra_info)
}

/// One keyboard record for `vk`, key-up or key-down, scan-code mode.
///
/// Fails when the layout has no scan code for `vk`; no record is produced
/// in that case, so garbage never reaches the injection queue.
pub fn key_event<S: PlatformServices>(
    services: &S,
    vk: u16,
    key_up: bool,
) -> Result<InputRecord, InjectError> {
    let scan = resolve_scan_code(services, vk)?;
    Ok(keyboard_record(vk, scan, key_up, services.extra_info_tag()))
}

/// A down/up record pair for `vk`, resolved once so both records carry the
/// identical scan code and extended flag even if the layout changes mid-call.
pub fn key_pair<S: PlatformServices>(
    services: &S,
    vk: u16,
) -> Result<[InputRecord; 2], InjectError> {
    let scan = resolve_scan_code(services, vk)?;
    let tag = services.extra_info_tag();
    Ok([
        keyboard_record(vk, scan, false, tag),
        keyboard_record(vk, scan, true, tag),
    ])
}

/// One mouse record. `flags` is the caller's `MOUSEEVENTF_*` mask, passed
/// through untouched; no wheel or X-button data at this layer.
pub fn mouse_event<S: PlatformServices>(services: &S, dx: i32, dy: i32, flags: u32) -> InputRecord {
    InputRecord::mouse(dx, dy, 0, flags, services.extra_info_tag())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::stub::StubServices;
    use crate::vk;

    /// Extended-ness is a pure function of the prefix byte: 0xE0 and 0xE1
    /// and nothing else.
    #[test]
    fn extended_key_classification() {
        assert!(ScanCode::new(0xE050).unwrap().is_extended()); // Down arrow
        assert!(ScanCode::new(0xE150).unwrap().is_extended());
        assert!(ScanCode::new(0xE01C).unwrap().is_extended()); // Numpad Enter
        assert!(!ScanCode::new(0x001E).unwrap().is_extended()); // "A" on US layout
        assert!(!ScanCode::new(0x0050).unwrap().is_extended());
        assert!(!ScanCode::new(0xDF50).unwrap().is_extended());
    }

    #[test]
    fn extended_codes_keep_only_low_byte_in_wscan() {
        assert_eq!(ScanCode::new(0xE050).unwrap().wscan(), 0x50);
        assert_eq!(ScanCode::new(0x001E).unwrap().wscan(), 0x1E);
    }

    #[test]
    fn zero_scan_code_is_the_unmapped_sentinel() {
        assert_eq!(ScanCode::new(0), None);
        // raw() keeps the prefix that wscan() strips.
        assert_eq!(ScanCode::new(0xE050).unwrap().raw(), 0xE050);
    }

    /// Both bytes -1 is the one and only not-mappable encoding.
    #[test]
    fn char_mapping_sentinel_decoding() {
        assert_eq!(CharMapping::from_packed(-1), CharMapping::NotMappable);
        assert_eq!(
            CharMapping::from_packed(0x0041),
            CharMapping::Mapped {
                vk: 0x41,
                shift_state: 0
            }
        );
        // Shifted character: shift-state byte set, still a mapping.
        assert_eq!(
            CharMapping::from_packed(0x0132),
            CharMapping::Mapped {
                vk: 0x32,
                shift_state: 1
            }
        );
        // A single -1 byte is not the sentinel.
        assert_eq!(
            CharMapping::from_packed(0x01FF),
            CharMapping::Mapped {
                vk: 0xFF,
                shift_state: 1
            }
        );
        assert_eq!(
            CharMapping::from_packed(-256), // 0xFF00: vk 0, shift -1
            CharMapping::Mapped {
                vk: 0x00,
                shift_state: 0xFF
            }
        );
    }

    #[test]
    fn key_event_composes_scan_code_mode_flags() {
        let services = StubServices::new()
            .with_scan(vk::VK_A, 0x001E)
            .with_extra_info(0x77);

        let down = key_event(&services, vk::VK_A, false).unwrap();
        let ki = down.as_keyboard();
        assert_eq!(ki.vk, vk::VK_A);
        assert_eq!(ki.scan, 0x1E);
        assert_eq!(ki.flags, KEYEVENTF_SCANCODE);
        assert_eq!(ki.time, 0);
        assert_eq!(ki.extra_info, 0x77);

        let up = key_event(&services, vk::VK_A, true).unwrap();
        assert_eq!(up.as_keyboard().flags, KEYEVENTF_SCANCODE | KEYEVENTF_KEYUP);
    }

    #[test]
    fn key_event_sets_extended_flag_from_scan_prefix() {
        let services = StubServices::new().with_scan(vk::VK_RIGHT, 0xE04D);
        let rec = key_event(&services, vk::VK_RIGHT, false).unwrap();
        let ki = rec.as_keyboard();
        assert_eq!(ki.scan, 0x4D);
        assert_eq!(ki.flags, KEYEVENTF_SCANCODE | KEYEVENTF_EXTENDEDKEY);
    }

    #[test]
    fn key_event_fails_on_unmapped_virtual_key() {
        let services = StubServices::new();
        assert!(matches!(
            key_event(&services, 0xE8, false),
            Err(InjectError::NoScanCode { vk: 0xE8 })
        ));
    }

    #[test]
    fn mouse_event_passes_flags_through() {
        let services = StubServices::new().with_extra_info(9);
        let rec = mouse_event(&services, -3, 12, 0x8001);
        let mi = rec.as_mouse();
        assert_eq!((mi.dx, mi.dy), (-3, 12));
        assert_eq!(mi.mouse_data, 0);
        assert_eq!(mi.flags, 0x8001);
        assert_eq!(mi.extra_info, 9);
    }
}

//! High-level injection operations.
//!
//! Each operation is a fixed sequence: build one or two records, hand them
//! to the OS in a single submission, compare the accepted count. No retry,
//! no backoff, no state between calls. `Injector` holds only its services
//! handle; concurrent operations are ordered by the OS queue, not by us.

use crate::builder;
use crate::platform::PlatformServices;
use crate::record::InputRecord;

#[cfg(windows)]
use crate::platform::Win32Services;

/// High bit of the raw key state: the key is currently down.
const STATE_DOWN: u16 = 0x8000;
/// Low bit: the key was pressed since the previous query.
const STATE_CHANGED: u16 = 0x0001;

/// Why an injection operation produced no (complete) effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InjectError {
    /// No key under the active layout produces this character. Nothing was
    /// built or submitted.
    #[error("character {0:?} has no key under the active keyboard layout")]
    Unmapped(char),

    /// The active layout has no scan code for this virtual key. Nothing was
    /// built or submitted.
    #[error("virtual key {vk:#04x} has no scan code under the active keyboard layout")]
    NoScanCode { vk: u16 },

    /// The OS accepted fewer records than submitted. The accepted records
    /// already entered the input stream and are not rolled back; a partial
    /// press may have happened.
    #[error("input queue accepted {accepted} of {submitted} records")]
    Shortfall { submitted: u32, accepted: u32 },
}

/// Synthesizes keyboard and mouse input through a [`PlatformServices`]
/// implementation.
///
/// Virtual keys are the Win32 `VK_*` codes (see the [`crate::vk`] constants).
/// Mouse flags are the `MOUSEEVENTF_*` bits from [`crate::record`], passed
/// through to the OS untouched.
pub struct Injector<S: PlatformServices> {
    services: S,
}

#[cfg(windows)]
impl Injector<Win32Services> {
    /// An injector over the live Win32 services.
    pub fn win32() -> Self {
        Self::new(Win32Services::new())
    }
}

impl<S: PlatformServices> Injector<S> {
    pub fn new(services: S) -> Self {
        Self { services }
    }

    // -- key-state queries (read-only, no records built) --------------------

    /// Whether `vk` is down right now.
    pub fn is_key_pressed(&self, vk: u16) -> bool {
        self.services.key_state(vk) & STATE_DOWN != 0
    }

    /// Whether `vk` was pressed since the previous query of this key.
    pub fn was_key_pressed(&self, vk: u16) -> bool {
        self.services.key_state(vk) & STATE_CHANGED != 0
    }

    // -- injection ----------------------------------------------------------

    /// Injects a key-down for `vk` (one record).
    pub fn set_key_down(&self, vk: u16) -> Result<(), InjectError> {
        let record = builder::key_event(&self.services, vk, false)?;
        log::debug!("inject: key down vk={vk:#04x}");
        self.submit_all(&[record])
    }

    /// Injects a key-up for `vk` (one record).
    pub fn set_key_up(&self, vk: u16) -> Result<(), InjectError> {
        let record = builder::key_event(&self.services, vk, true)?;
        log::debug!("inject: key up vk={vk:#04x}");
        self.submit_all(&[record])
    }

    /// Presses and releases `vk`: a down/up pair sharing one resolved scan
    /// code, submitted as a single two-record array so the OS queues them
    /// back-to-back. The OS guarantees queue order, not atomicity.
    pub fn press_key(&self, vk: u16) -> Result<(), InjectError> {
        let pair = builder::key_pair(&self.services, vk)?;
        log::debug!("inject: press vk={vk:#04x}");
        self.submit_all(&pair)
    }

    /// Presses and releases the key producing `ch` under the active layout.
    ///
    /// Fails fast with [`InjectError::Unmapped`] when no key produces `ch`;
    /// nothing is submitted in that case.
    ///
    /// Known limitation: a shift-dependent character (e.g. `'!'`) resolves to
    /// its base key, and the modifier key events the layout implies are not
    /// synthesized. The caller owns modifier state.
    pub fn press_char(&self, ch: char) -> Result<(), InjectError> {
        match builder::char_to_vkey(&self.services, ch) {
            builder::CharMapping::Mapped { vk, .. } => self.press_key(vk),
            builder::CharMapping::NotMappable => Err(InjectError::Unmapped(ch)),
        }
    }

    /// Injects one mouse record with the given deltas (or absolute
    /// coordinates, per `flags`) and `MOUSEEVENTF_*` mask.
    pub fn set_mouse_state(&self, dx: i32, dy: i32, flags: u32) -> Result<(), InjectError> {
        let record = builder::mouse_event(&self.services, dx, dy, flags);
        log::debug!("inject: mouse dx={dx} dy={dy} flags={flags:#06x}");
        self.submit_all(&[record])
    }

    /// Success iff the OS accepted every record. A short count, including
    /// zero, is one failure; already-accepted records are not rolled back.
    fn submit_all(&self, records: &[InputRecord]) -> Result<(), InjectError> {
        let submitted = records.len() as u32;
        let accepted = self.services.submit(records);
        if accepted == submitted {
            Ok(())
        } else {
            log::debug!("inject: queue accepted {accepted} of {submitted}");
            Err(InjectError::Shortfall {
                submitted,
                accepted,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::stub::StubServices;
    use crate::record::{KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, MOUSEEVENTF_MOVE};
    use crate::vk;

    fn stub_with_a() -> StubServices {
        StubServices::new().with_scan(vk::VK_A, 0x001E)
    }

    /// A press is exactly two records in one submission: down first, up
    /// second, identical scan code and extended flag on both.
    #[test]
    fn press_submits_down_up_pair_in_one_call() {
        let injector = Injector::new(stub_with_a());
        injector.press_key(vk::VK_A).unwrap();

        let subs = injector.services.submissions.lock().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].len(), 2);

        let down = subs[0][0].as_keyboard();
        let up = subs[0][1].as_keyboard();
        assert_eq!(down.flags & KEYEVENTF_KEYUP, 0);
        assert_ne!(up.flags & KEYEVENTF_KEYUP, 0);
        assert_eq!(down.scan, up.scan);
        assert_eq!(
            down.flags & KEYEVENTF_EXTENDEDKEY,
            up.flags & KEYEVENTF_EXTENDEDKEY
        );
    }

    #[test]
    fn press_pair_shares_extended_flag_for_extended_keys() {
        let injector = Injector::new(StubServices::new().with_scan(vk::VK_DOWN, 0xE050));
        injector.press_key(vk::VK_DOWN).unwrap();

        let subs = injector.services.submissions.lock().unwrap();
        for record in &subs[0] {
            let ki = record.as_keyboard();
            assert_eq!(ki.scan, 0x50);
            assert_ne!(ki.flags & KEYEVENTF_EXTENDEDKEY, 0);
        }
    }

    /// Success iff every record was accepted: for a two-record press, each
    /// accepted count below 2 is the same failure.
    #[test]
    fn press_fails_on_every_partial_acceptance() {
        for accepted in 0..2u32 {
            let injector = Injector::new(stub_with_a().accepting(accepted));
            assert_eq!(
                injector.press_key(vk::VK_A),
                Err(InjectError::Shortfall {
                    submitted: 2,
                    accepted,
                })
            );
        }

        let injector = Injector::new(stub_with_a().accepting(2));
        assert_eq!(injector.press_key(vk::VK_A), Ok(()));
    }

    #[test]
    fn single_record_operations_fail_on_zero_acceptance() {
        let injector = Injector::new(stub_with_a().accepting(0));
        assert_eq!(
            injector.set_key_down(vk::VK_A),
            Err(InjectError::Shortfall {
                submitted: 1,
                accepted: 0,
            })
        );
        assert_eq!(
            injector.set_mouse_state(1, 1, MOUSEEVENTF_MOVE),
            Err(InjectError::Shortfall {
                submitted: 1,
                accepted: 0,
            })
        );
    }

    #[test]
    fn set_key_up_sets_the_key_up_flag() {
        let injector = Injector::new(stub_with_a());
        injector.set_key_up(vk::VK_A).unwrap();

        let subs = injector.services.submissions.lock().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].len(), 1);
        assert_ne!(subs[0][0].as_keyboard().flags & KEYEVENTF_KEYUP, 0);
    }

    /// An unmappable character is a hard stop: failure reported, zero
    /// submission calls made.
    #[test]
    fn unmapped_char_short_circuits_before_submission() {
        let injector = Injector::new(StubServices::new());
        assert_eq!(injector.press_char('ß'), Err(InjectError::Unmapped('ß')));
        assert_eq!(injector.services.submit_calls(), 0);
    }

    #[test]
    fn mapped_char_delegates_to_press() {
        let injector = Injector::new(
            StubServices::new()
                .with_char('a', 0x0041)
                .with_scan(0x41, 0x001E),
        );
        injector.press_char('a').unwrap();

        let subs = injector.services.submissions.lock().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].len(), 2);
        assert_eq!(subs[0][0].as_keyboard().vk, 0x41);
    }

    /// A shifted character still resolves to its single base key; no
    /// modifier records appear (documented limitation).
    #[test]
    fn shifted_char_presses_base_key_only() {
        let injector = Injector::new(
            StubServices::new()
                .with_char('!', 0x0131) // Shift + "1"
                .with_scan(0x31, 0x0002),
        );
        injector.press_char('!').unwrap();

        let subs = injector.services.submissions.lock().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].len(), 2);
        assert_eq!(subs[0][0].as_keyboard().vk, 0x31);
    }

    #[test]
    fn mouse_state_submits_one_mouse_record() {
        let injector = Injector::new(StubServices::new());
        injector.set_mouse_state(-5, 9, MOUSEEVENTF_MOVE).unwrap();

        let subs = injector.services.submissions.lock().unwrap();
        assert_eq!(subs.len(), 1);
        let mi = subs[0][0].as_mouse();
        assert_eq!((mi.dx, mi.dy), (-5, 9));
        assert_eq!(mi.flags, MOUSEEVENTF_MOVE);
        assert_eq!(mi.mouse_data, 0);
    }

    /// Queries never mutate: repeated calls against unchanged stub state
    /// answer identically, and no records are built or submitted.
    #[test]
    fn key_state_queries_are_idempotent_and_read_only() {
        let injector = Injector::new(
            StubServices::new()
                .with_key_state(vk::VK_SHIFT, 0x8001)
                .with_key_state(vk::VK_A, 0x0001),
        );

        assert!(injector.is_key_pressed(vk::VK_SHIFT));
        assert!(injector.is_key_pressed(vk::VK_SHIFT));
        assert!(injector.was_key_pressed(vk::VK_SHIFT));
        assert!(injector.was_key_pressed(vk::VK_SHIFT));

        assert!(!injector.is_key_pressed(vk::VK_A));
        assert!(injector.was_key_pressed(vk::VK_A));
        assert!(!injector.is_key_pressed(vk::VK_RETURN));
        assert!(!injector.was_key_pressed(vk::VK_RETURN));

        assert_eq!(injector.services.submit_calls(), 0);
    }
}

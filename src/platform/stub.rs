//! In-memory `PlatformServices` stub for tests.
//!
//! The real services talk to the OS input queue: they move the cursor and
//! press keys on whatever machine runs the tests, and their effects cannot
//! be observed from Rust. `StubServices` replaces every call with table
//! lookups and records each submission verbatim, so translation, flag
//! composition and the all-or-nothing success policy can be asserted
//! off-platform.
//!
//! Unknown keys answer with the platform's own miss values: scan code 0,
//! packed character result -1, key state 0. `accept_limit` caps how many
//! records a single `submit` call accepts, which is how partial-acceptance
//! behavior is provoked.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{LayoutHandle, PlatformServices};
use crate::record::InputRecord;

/// Records every call instead of touching the OS. Construct with
/// [`StubServices::new`] and chain the `with_*` helpers.
pub struct StubServices {
    /// Raw 16-bit key states by virtual key; missing keys read as 0.
    pub key_states: Mutex<HashMap<u16, u16>>,
    /// Packed `VkKeyScanW`-style answers; missing characters read as -1.
    pub char_map: Mutex<HashMap<char, i16>>,
    /// Scan codes by virtual key; missing keys read as 0 (unmapped).
    pub scan_map: Mutex<HashMap<u16, u32>>,
    /// Handle reported by `keyboard_layout`.
    pub layout: LayoutHandle,
    /// Tag reported by `extra_info_tag`.
    pub extra_info: usize,
    /// Max records accepted per `submit` call; `None` accepts everything.
    pub accept_limit: Option<u32>,
    /// Every record array handed to `submit`, in call order.
    pub submissions: Mutex<Vec<Vec<InputRecord>>>,
}

impl Default for StubServices {
    fn default() -> Self {
        Self {
            key_states: Mutex::new(HashMap::new()),
            char_map: Mutex::new(HashMap::new()),
            scan_map: Mutex::new(HashMap::new()),
            layout: 1,
            extra_info: 0,
            accept_limit: None,
            submissions: Mutex::new(Vec::new()),
        }
    }
}

impl StubServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan(self, vk: u16, scan: u32) -> Self {
        self.scan_map.lock().unwrap().insert(vk, scan);
        self
    }

    pub fn with_char(self, ch: char, packed: i16) -> Self {
        self.char_map.lock().unwrap().insert(ch, packed);
        self
    }

    pub fn with_key_state(self, vk: u16, state: u16) -> Self {
        self.key_states.lock().unwrap().insert(vk, state);
        self
    }

    pub fn with_extra_info(mut self, tag: usize) -> Self {
        self.extra_info = tag;
        self
    }

    /// Caps acceptance at `limit` records per `submit` call.
    pub fn accepting(mut self, limit: u32) -> Self {
        self.accept_limit = Some(limit);
        self
    }

    /// Number of `submit` calls made so far.
    pub fn submit_calls(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

impl PlatformServices for StubServices {
    fn key_state(&self, vk: u16) -> u16 {
        self.key_states.lock().unwrap().get(&vk).copied().unwrap_or(0)
    }

    fn char_to_vkey_raw(&self, ch: char) -> i16 {
        self.char_map.lock().unwrap().get(&ch).copied().unwrap_or(-1)
    }

    fn keyboard_layout(&self) -> LayoutHandle {
        self.layout
    }

    fn vkey_to_scan_code(&self, vk: u16, _layout: LayoutHandle) -> u32 {
        self.scan_map.lock().unwrap().get(&vk).copied().unwrap_or(0)
    }

    fn extra_info_tag(&self) -> usize {
        self.extra_info
    }

    fn submit(&self, records: &[InputRecord]) -> u32 {
        self.submissions.lock().unwrap().push(records.to_vec());
        let n = records.len() as u32;
        match self.accept_limit {
            Some(limit) => n.min(limit),
            None => n,
        }
    }
}

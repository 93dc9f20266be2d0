/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Three-byte control event value shared by every pipeline stage.

use std::fmt::{Display, Formatter};

/// First status value of the channel-less system category.
pub const SYSTEM_STATUS: u8 = 0xF0;

///
/// [`Event`] is one control message in MIDI wire layout: a status byte followed by
/// two data bytes.
///
/// The high nibble of `status` selects the message category. For channel-voice
/// categories (`0x80..=0xEF`) the low nibble carries the zero-based channel.
/// Statuses at or above [`SYSTEM_STATUS`] are system messages and have no channel.
///
/// Events are `Copy`: every route works on its own value and nothing is shared
/// between concurrently routed outputs.
///
/// # Examples
///
/// ```
/// use midi_muxer::Event;
///
/// let note_on = Event::new(0x93, 60, 100);
/// assert_eq!(note_on.category(), 0x90);
/// assert_eq!(note_on.channel(), Some(4));
/// assert!(!note_on.is_system());
///
/// let clock = Event::new(0xF8, 0, 0);
/// assert_eq!(clock.channel(), None);
/// assert_eq!(clock.wire_len(), 1);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Event {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl Event {
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    /// Builds an event from raw wire bytes. Missing data bytes become `0`.
    ///
    /// Returns `None` for an empty slice. Bytes past the third are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        Some(Self {
            status,
            data1: data.first().copied().unwrap_or_default(),
            data2: data.get(1).copied().unwrap_or_default(),
        })
    }

    pub const fn to_bytes(&self) -> [u8; 3] {
        [self.status, self.data1, self.data2]
    }

    pub const fn is_system(&self) -> bool {
        self.status >= SYSTEM_STATUS
    }

    /// High nibble of the status byte.
    pub const fn category(&self) -> u8 {
        self.status & 0xF0
    }

    /// One-based channel for channel-voice messages.
    pub const fn channel(&self) -> Option<u8> {
        match self.status {
            0x80..=0xEF => Some((self.status & 0x0F) + 1),
            _ => None,
        }
    }

    /// Number of bytes this message occupies on the wire.
    ///
    /// Program change, channel pressure and the two-byte system common messages
    /// carry a single data byte; real-time and other single-byte system messages
    /// carry none. Everything else is written as three bytes.
    pub const fn wire_len(&self) -> usize {
        match self.status {
            0xC0..=0xDF | 0xF1 | 0xF3 => 2,
            0xF2 => 3,
            0xF0..=0xFF => 1,
            _ => 3,
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "status=0x{:02X} data1={} data2={}",
            self.status, self.data1, self.data2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Event;

    #[test]
    fn channel_is_low_nibble_plus_one_for_channel_voice() {
        assert_eq!(Event::new(0x80, 0, 0).channel(), Some(1));
        assert_eq!(Event::new(0x9F, 0, 0).channel(), Some(16));
        assert_eq!(Event::new(0xE5, 0, 0).channel(), Some(6));
    }

    #[test]
    fn system_and_data_statuses_have_no_channel() {
        assert_eq!(Event::new(0xF0, 0, 0).channel(), None);
        assert_eq!(Event::new(0xFE, 0, 0).channel(), None);
        assert_eq!(Event::new(0x05, 0, 0).channel(), None);
        assert!(Event::new(0xF8, 0, 0).is_system());
        assert!(!Event::new(0xEF, 0, 0).is_system());
    }

    #[test]
    fn from_bytes_fills_missing_data_bytes_with_zero() {
        assert_eq!(Event::from_bytes(&[]), None);
        assert_eq!(Event::from_bytes(&[0xF8]), Some(Event::new(0xF8, 0, 0)));
        assert_eq!(Event::from_bytes(&[0xC2, 7]), Some(Event::new(0xC2, 7, 0)));
        assert_eq!(
            Event::from_bytes(&[0x90, 60, 100, 0xFF]),
            Some(Event::new(0x90, 60, 100))
        );
    }

    #[test]
    fn wire_len_follows_status_category() {
        assert_eq!(Event::new(0x90, 60, 100).wire_len(), 3);
        assert_eq!(Event::new(0xB0, 7, 127).wire_len(), 3);
        assert_eq!(Event::new(0xC0, 42, 0).wire_len(), 2);
        assert_eq!(Event::new(0xD3, 90, 0).wire_len(), 2);
        assert_eq!(Event::new(0xE0, 0, 64).wire_len(), 3);
        assert_eq!(Event::new(0xF2, 1, 2).wire_len(), 3);
        assert_eq!(Event::new(0xF3, 1, 0).wire_len(), 2);
        assert_eq!(Event::new(0xF8, 0, 0).wire_len(), 1);
    }

    #[test]
    fn display_uses_hex_status() {
        assert_eq!(
            Event::new(0x90, 60, 100).to_string(),
            "status=0x90 data1=60 data2=100"
        );
    }
}

//! Event predicates that decide whether a route forwards an event.

use crate::event::{Event, SYSTEM_STATUS};
use serde::{Deserialize, Serialize};

/// Predicate over an [`Event`]. Returning `false` drops the event for one route.
pub trait Filter: Send + Sync {
    fn accepts(&self, event: Event) -> bool;
}

impl<F> Filter for F
where
    F: Fn(Event) -> bool + Send + Sync,
{
    fn accepts(&self, event: Event) -> bool {
        self(event)
    }
}

/// Passes system messages and channel messages on one channel (1-16).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChannelFilter {
    channel: u8,
}

const MIN_CHANNEL: u8 = 1;
const MAX_CHANNEL: u8 = 16;

impl ChannelFilter {
    /// Debug builds panic on a channel outside 1-16, which would never match a
    /// channel message. Use [`ChannelFilter::try_new`] for unchecked input.
    pub const fn new(channel: u8) -> Self {
        debug_assert!(
            channel >= MIN_CHANNEL && channel <= MAX_CHANNEL,
            "channel must be 1-16"
        );
        Self { channel }
    }

    /// Returns `None` for a channel outside 1-16.
    pub const fn try_new(channel: u8) -> Option<Self> {
        if channel >= MIN_CHANNEL && channel <= MAX_CHANNEL {
            Some(Self { channel })
        } else {
            None
        }
    }

    pub const fn channel(&self) -> u8 {
        self.channel
    }
}

impl Filter for ChannelFilter {
    fn accepts(&self, event: Event) -> bool {
        event.status >= SYSTEM_STATUS || (event.status % 16) + 1 == self.channel
    }
}

/// Comparison applied by [`NoteFilter`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteCondition {
    GreaterThan,
    LessThan,
}

/// Passes note-bearing events above or below a threshold note.
///
/// Events with status `0xB0` or higher (control change and everything after it)
/// carry no note number in `data1` and always pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NoteFilter {
    note: u8,
    condition: NoteCondition,
}

impl NoteFilter {
    pub const fn new(note: u8, condition: NoteCondition) -> Self {
        Self { note, condition }
    }
}

impl Filter for NoteFilter {
    fn accepts(&self, event: Event) -> bool {
        if event.status >= 0xB0 {
            return true;
        }

        match self.condition {
            NoteCondition::GreaterThan => event.data1 > self.note,
            NoteCondition::LessThan => event.data1 < self.note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelFilter, Filter, NoteCondition, NoteFilter};
    use crate::event::Event;

    const LOW_NOTE_OFF_CH1: Event = Event::new(0x80, 65, 127);
    const HIGH_NOTE_OFF_CH2: Event = Event::new(0x81, 30, 50);

    #[test]
    fn channel_filter_matches_low_nibble() {
        let filter = ChannelFilter::new(1);

        assert!(filter.accepts(LOW_NOTE_OFF_CH1));
        assert!(!filter.accepts(HIGH_NOTE_OFF_CH2));
    }

    #[test]
    fn channel_filter_always_passes_system_messages() {
        let filter = ChannelFilter::new(9);

        assert!(filter.accepts(Event::new(0xF8, 0, 0)));
        assert!(filter.accepts(Event::new(0xF0, 0x7E, 0)));
    }

    #[test]
    fn channel_filter_applies_modulo_to_data_statuses() {
        assert!(ChannelFilter::new(6).accepts(Event::new(0x05, 0, 0)));
        assert!(!ChannelFilter::new(1).accepts(Event::new(0x05, 0, 0)));
    }

    #[test]
    fn try_new_rejects_channels_outside_one_to_sixteen() {
        assert_eq!(ChannelFilter::try_new(0), None);
        assert_eq!(ChannelFilter::try_new(17), None);
        assert_eq!(
            ChannelFilter::try_new(16).map(|filter| filter.channel()),
            Some(16)
        );
        assert_eq!(ChannelFilter::try_new(1), Some(ChannelFilter::new(1)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "channel must be 1-16")]
    fn new_panics_on_channel_zero_in_debug_builds() {
        let _ = ChannelFilter::new(0);
    }

    #[test]
    fn note_filter_less_than() {
        let filter = NoteFilter::new(60, NoteCondition::LessThan);

        assert!(!filter.accepts(LOW_NOTE_OFF_CH1));
        assert!(filter.accepts(HIGH_NOTE_OFF_CH2));
    }

    #[test]
    fn note_filter_greater_than() {
        let filter = NoteFilter::new(35, NoteCondition::GreaterThan);

        assert!(filter.accepts(LOW_NOTE_OFF_CH1));
        assert!(!filter.accepts(HIGH_NOTE_OFF_CH2));
    }

    #[test]
    fn note_filter_rejects_equal_note() {
        assert!(!NoteFilter::new(65, NoteCondition::GreaterThan).accepts(LOW_NOTE_OFF_CH1));
        assert!(!NoteFilter::new(65, NoteCondition::LessThan).accepts(LOW_NOTE_OFF_CH1));
    }

    #[test]
    fn note_filter_passes_control_change_and_above() {
        let filter = NoteFilter::new(127, NoteCondition::GreaterThan);

        assert!(filter.accepts(Event::new(0xB0, 1, 64)));
        assert!(filter.accepts(Event::new(0xE3, 0, 64)));
        assert!(filter.accepts(Event::new(0xFE, 0, 0)));
        assert!(!filter.accepts(Event::new(0xA0, 10, 64)));
    }

    #[test]
    fn closures_are_filters() {
        let odd_status = |event: Event| event.status % 2 == 1;

        assert!(odd_status.accepts(Event::new(5, 0, 0)));
        assert!(!odd_status.accepts(Event::new(4, 0, 0)));
    }
}

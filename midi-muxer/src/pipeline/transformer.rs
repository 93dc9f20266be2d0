//! Event rewrites applied to accepted events.

use crate::event::Event;

/// Pure rewrite of an [`Event`]. Each route folds its own copy of the event.
pub trait Transformer: Send + Sync {
    fn transform(&self, event: Event) -> Event;
}

impl<F> Transformer for F
where
    F: Fn(Event) -> Event + Send + Sync,
{
    fn transform(&self, event: Event) -> Event {
        self(event)
    }
}

/// Rewrites polyphonic and channel aftertouch into pitch bend on the same channel.
///
/// The pressure value moves into the pitch bend MSB (`data2`) and the LSB is zeroed.
/// Every other event passes through unchanged.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AftertouchToPitchBend;

impl Transformer for AftertouchToPitchBend {
    fn transform(&self, event: Event) -> Event {
        match event.status {
            0xA0..=0xAF | 0xD0..=0xDF => Event::new(0xE0 + event.status % 16, 0, event.data1),
            _ => event,
        }
    }
}

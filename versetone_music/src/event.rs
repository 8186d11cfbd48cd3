// Playback events.
//
// The event log is the engine's only output besides note indices. Its order
// is the playback order: renderers walk it front to back and never reorder.
// Values are kept exactly as the algorithms computed them (velocities above
// 127 or below 0, negative advances); clamping to what a MIDI file can hold
// is the MIDI writer's job.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    NoteOn { channel: u8, note: i32, velocity: i32 },
    NoteOff { channel: u8, note: i32 },
    /// Move the playback clock forward before the next event.
    Advance { delta_ms: i64 },
    EndOfTrack,
}

#[cfg(test)]
impl Event {
    pub fn is_note_on(&self) -> bool {
        matches!(self, Event::NoteOn { .. })
    }

    pub fn is_note_off(&self) -> bool {
        matches!(self, Event::NoteOff { .. })
    }
}

/// Total time covered by a log, in ms, counting negative advances as zero.
pub fn total_duration_ms(events: &[Event]) -> i64 {
    events
        .iter()
        .map(|e| match e {
            Event::Advance { delta_ms } => (*delta_ms).max(0),
            _ => 0,
        })
        .sum()
}

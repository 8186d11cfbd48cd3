// Session state: everything one render mutates.
//
// A session owns the word table, the carried tempo, its random source and
// the event log. Nothing here is shared: each MIDI file and each
// descriptive-data pass gets a fresh session, so occurrence numbering
// starts over every time.
//
// The carried tempo (the base ms between notes for the carried-tempo
// variants) starts at 0. A generator that wants one render's final tempo to
// seed the next passes it in through `with_carried_tempo`.

use crate::event::Event;
use crate::tracker::WordTracker;
use versetone_prng::VerseRng;

#[derive(Debug, Clone)]
pub struct SessionState {
    tracker: WordTracker,
    carried_tempo: i64,
    events: Vec<Event>,
    rng: VerseRng,
}

impl SessionState {
    pub fn new(rng: VerseRng) -> Self {
        SessionState {
            tracker: WordTracker::new(),
            carried_tempo: 0,
            events: Vec::new(),
            rng,
        }
    }

    /// A session with an unpredictable random stream.
    pub fn unseeded() -> Self {
        Self::new(VerseRng::from_entropy())
    }

    pub fn with_carried_tempo(mut self, tempo_ms: i64) -> Self {
        self.carried_tempo = tempo_ms;
        self
    }

    pub fn tracker(&self) -> &WordTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut WordTracker {
        &mut self.tracker
    }

    pub fn carried_tempo(&self) -> i64 {
        self.carried_tempo
    }

    pub fn set_carried_tempo(&mut self, tempo_ms: i64) {
        self.carried_tempo = tempo_ms;
    }

    pub fn rng_mut(&mut self) -> &mut VerseRng {
        &mut self.rng
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Append to the log. Events are never removed or reordered.
    pub fn push_events(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

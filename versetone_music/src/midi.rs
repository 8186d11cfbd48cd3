// MIDI output from event logs.
//
// Converts a session's event log into a Standard MIDI File for playback.
// Output is SMF Format 0 (one track) at 480 ticks per quarter note: a tempo
// meta-event, a 4/4 time signature, the notes, end of track.
//
// Event timing is in milliseconds. Each advance moves an absolute
// millisecond clock, and every MIDI delta is the difference between
// successive absolute tick positions, so rounding never accumulates across
// a long poem. Negative advances add no time.
//
// Values the algorithms are free to produce but MIDI cannot hold are
// saturated here: note numbers into 0-127 (presets already keep them in
// range), velocities into 1-127 since a NoteOn at velocity 0 is a note-off.
//
// Uses the `midly` crate for MIDI writing.

use crate::error::{EngineError, Result};
use crate::event::Event;
use crate::preset::Preset;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Microseconds per quarter note when none is configured.
pub const DEFAULT_TEMPO_US: u32 = 250_000;

/// Velocity written on every note-off.
const NOTE_OFF_VELOCITY: u8 = 64;

/// Largest value a tempo meta-event holds.
const MAX_TEMPO_US: u32 = 0x00FF_FFFF;

/// Largest variable-length delta.
const MAX_DELTA: u64 = 0x0FFF_FFFF;

/// Output file name for a render: `a{algorithm}_{preset name}_{label}`.
pub fn midi_file_name(preset: &Preset, label: &str) -> String {
    format!(
        "a{}_{}_{}",
        preset.algorithm.id(),
        preset.name.replace(' ', "_"),
        label
    )
}

/// Convert an event log to MIDI and write it to a file.
pub fn write_midi(events: &[Event], tempo_us: u32, path: &Path) -> Result<()> {
    let buf = midi_bytes(events, tempo_us).map_err(|e| EngineError::io(path, e))?;
    std::fs::write(path, &buf).map_err(|e| EngineError::io(path, e))?;
    Ok(())
}

/// Serialize an event log to SMF bytes.
pub fn midi_bytes(events: &[Event], tempo_us: u32) -> std::io::Result<Vec<u8>> {
    let smf = events_to_smf(events, tempo_us);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Convert an event log to an in-memory SMF.
pub fn events_to_smf(events: &[Event], tempo_us: u32) -> Smf<'static> {
    let tempo_us = tempo_us.clamp(1, MAX_TEMPO_US);
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let mut track: Track<'static> = Vec::with_capacity(events.len() + 3);
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_us))),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
    });

    let mut clock_ms: u64 = 0;
    let mut last_event_tick: u64 = 0;
    let mut ended = false;

    for event in events {
        let kind = match *event {
            Event::Advance { delta_ms } => {
                clock_ms += delta_ms.max(0) as u64;
                continue;
            }
            Event::NoteOn {
                channel,
                note,
                velocity,
            } => TrackEventKind::Midi {
                channel: channel_number(channel),
                message: MidiMessage::NoteOn {
                    key: seven_bit(note),
                    vel: note_on_velocity(velocity),
                },
            },
            Event::NoteOff { channel, note } => TrackEventKind::Midi {
                channel: channel_number(channel),
                message: MidiMessage::NoteOff {
                    key: seven_bit(note),
                    vel: u7::new(NOTE_OFF_VELOCITY),
                },
            },
            Event::EndOfTrack => {
                ended = true;
                TrackEventKind::Meta(MetaMessage::EndOfTrack)
            }
        };

        let tick = ms_to_ticks(clock_ms, tempo_us);
        track.push(TrackEvent {
            delta: u28::new((tick - last_event_tick).min(MAX_DELTA) as u32),
            kind,
        });
        last_event_tick = tick;
        if ended {
            break;
        }
    }

    // A log without its marker still has to produce a valid file.
    if !ended {
        let tick = ms_to_ticks(clock_ms, tempo_us);
        track.push(TrackEvent {
            delta: u28::new((tick - last_event_tick).min(MAX_DELTA) as u32),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
    }

    smf.tracks.push(track);
    smf
}

/// Absolute tick position of an absolute millisecond time.
fn ms_to_ticks(ms: u64, tempo_us: u32) -> u64 {
    let ticks = ms as u128 * 1000 * TICKS_PER_QUARTER as u128 / tempo_us as u128;
    ticks.min(u64::MAX as u128) as u64
}

fn seven_bit(value: i32) -> u7 {
    u7::new(value.clamp(0, 127) as u8)
}

fn note_on_velocity(value: i32) -> u7 {
    u7::new(value.clamp(1, 127) as u8)
}

fn channel_number(channel: u8) -> u4 {
    u4::new(channel.min(15))
}

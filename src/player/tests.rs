use super::*;
use crate::chord::Chord;
use crate::error::ChordError;
use crate::output::{MessageLog, MidiMessage, NoteEvent};
use crate::theory::{PitchClass, SeventhType, TriadType};

fn player() -> (NotePlayer, MessageLog) {
    let log = MessageLog::new();
    (NotePlayer::new(Box::new(log.clone())), log)
}

fn chord(root: i32, triad: TriadType) -> Chord {
    Chord::new(PitchClass::new(root), 4, triad)
}

fn on(note: u8) -> MidiMessage {
    MidiMessage::note_on(0, note, 100)
}

fn off(note: u8) -> MidiMessage {
    MidiMessage::note_off(0, note, 100)
}

#[test]
fn test_play_sends_note_on_per_note() {
    let (mut player, log) = player();
    player.play(&chord(0, TriadType::Major));

    assert_eq!(log.take(), vec![on(60), on(64), on(67)]);
    assert_eq!(player.sounding_notes(), vec![60, 64, 67]);
}

#[test]
fn test_shared_note_stays_sounding() {
    let (mut player, log) = player();
    let c_major = chord(0, TriadType::Major); // 60 64 67
    let g_major = Chord::new(PitchClass::new(7), 3, TriadType::Major); // 55 59 62
    let e_minor = chord(4, TriadType::Minor); // 64 67 71

    player.play(&c_major);
    player.play(&e_minor);
    assert_eq!(player.hold_count(67), 2);

    let sent = log.take();
    assert_eq!(sent.iter().filter(|m| **m == on(67)).count(), 1);
    assert_eq!(sent, vec![on(60), on(64), on(67), on(71)]);

    player.stop(&c_major);
    assert_eq!(log.take(), vec![off(60)]);
    assert!(player.is_sounding(67));

    player.stop(&e_minor);
    assert_eq!(log.take(), vec![off(64), off(67), off(71)]);
    assert!(player.sounding_notes().is_empty());

    player.play(&g_major);
    assert_eq!(log.take(), vec![on(55), on(59), on(62)]);
}

#[test]
fn test_stop_without_play_is_silent() {
    let (mut player, log) = player();
    player.stop(&chord(0, TriadType::Major));

    assert!(log.messages().is_empty());
    assert_eq!(player.hold_count(60), 0);
}

#[test]
fn test_double_release_is_noop() {
    let (mut player, log) = player();
    let chord = chord(9, TriadType::Minor);

    player.play(&chord);
    player.stop(&chord);
    player.stop(&chord);

    let offs = log
        .take()
        .into_iter()
        .filter(|m| matches!(m.event(), NoteEvent::Off { .. }))
        .count();
    assert_eq!(offs, 3);
    assert!(player.sounding_notes().is_empty());
}

#[test]
fn test_outputs_receive_in_registration_order() {
    let shared = MessageLog::new();

    struct Tagged {
        tag: &'static str,
        log: std::sync::Arc<parking_lot::Mutex<Vec<(&'static str, MidiMessage)>>>,
    }

    impl crate::output::SoundOutput for Tagged {
        fn name(&self) -> &str {
            self.tag
        }

        fn send(&mut self, message: MidiMessage) {
            self.log.lock().push((self.tag, message));
        }
    }

    let order = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let mut player = NotePlayer::new(Box::new(Tagged {
        tag: "first",
        log: order.clone(),
    }));
    player.add_output(Box::new(Tagged {
        tag: "second",
        log: order.clone(),
    }));
    player.add_output(Box::new(shared.clone()));
    assert_eq!(player.output_names(), vec!["first", "second", "log"]);

    player.play(&Chord::new(PitchClass::C, 4, TriadType::Diminished));

    let order = order.lock();
    assert_eq!(order.len(), 6);
    assert_eq!(order[0], ("first", on(60)));
    assert_eq!(order[1], ("second", on(60)));
    assert_eq!(order[2], ("first", on(63)));
    assert_eq!(shared.messages().len(), 3);
}

#[test]
fn test_custom_channel_and_velocity() {
    let log = MessageLog::new();
    let mut player = NotePlayer::new(Box::new(log.clone()))
        .with_settings(9, 80)
        .unwrap();
    let chord = chord(0, TriadType::Major);

    player.play(&chord);
    player.stop(&chord);

    let sent = log.take();
    assert_eq!(sent[0].to_bytes(), [0x99, 60, 80]);
    assert_eq!(sent[3].to_bytes(), [0x89, 60, 80]);
}

#[test]
fn test_seventh_chord_notes() {
    let (mut player, log) = player();
    let chord = chord(0, TriadType::Minor).with_seventh(SeventhType::Minor);

    player.play(&chord);
    assert_eq!(log.take(), vec![on(60), on(63), on(67), on(70)]);
}

#[test]
fn test_out_of_range_notes_skipped() {
    let (mut player, log) = player();
    // G9 = 127, B9 = 131, D10 = 134
    let chord = Chord::new(PitchClass::new(7), 9, TriadType::Major);

    player.play(&chord);
    assert_eq!(log.take(), vec![on(127)]);

    player.stop(&chord);
    assert_eq!(log.take(), vec![off(127)]);
}

#[test]
fn test_extreme_octaves_are_skipped() {
    let (mut player, log) = player();
    let high = Chord::from_json(r#"{"root":"C","octave":2147483647,"type":"major"}"#).unwrap();
    let low = Chord::new(PitchClass::new(4), i32::MIN, TriadType::Minor);
    let far = crate::generate_layout("fifths", "C", 200_000_000).unwrap()[0];

    for chord in [high, low, far] {
        player.play(&chord);
        player.stop(&chord);
    }
    assert!(log.messages().is_empty());
    assert!(player.sounding_notes().is_empty());
}

#[test]
fn test_settings_are_validated() {
    let log = MessageLog::new();
    assert!(matches!(
        NotePlayer::new(Box::new(log.clone())).with_settings(16, 100),
        Err(ChordError::Config(_))
    ));
    assert!(matches!(
        NotePlayer::new(Box::new(log.clone())).with_settings(0, 0),
        Err(ChordError::Config(_))
    ));
    assert!(matches!(
        NotePlayer::new(Box::new(log.clone())).with_settings(0, 128),
        Err(ChordError::Config(_))
    ));

    let player = NotePlayer::new(Box::new(log)).with_settings(15, 127).unwrap();
    assert_eq!((player.channel(), player.velocity()), (15, 127));
}

#[test]
fn test_stop_all_silences_everything() {
    let (mut player, log) = player();
    player.play(&chord(0, TriadType::Major));
    player.play(&chord(0, TriadType::Major));
    log.take();

    player.stop_all();
    assert_eq!(log.take(), vec![off(60), off(64), off(67)]);
    assert_eq!(player.hold_count(60), 0);
}

#[test]
fn test_ledger_underflow() {
    let mut ledger = Ledger::new();
    assert!(matches!(
        ledger.release(60),
        Err(ChordError::LedgerUnderflow { note: 60 })
    ));

    assert!(ledger.hold(60));
    assert!(!ledger.hold(60));
    assert_eq!(ledger.release(60).ok(), Some(false));
    assert_eq!(ledger.release(60).ok(), Some(true));
    assert!(ledger.is_empty());
}

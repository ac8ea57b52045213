#![no_main]

use arbitrary::Arbitrary;
use chrono::{NaiveDate, NaiveTime};
use libfuzzer_sys::fuzz_target;
use placegrid::prelude::*;
use placegrid::{EditorSnapshot, ScreenSize};

#[derive(Debug, Arbitrary)]
enum Op {
    Toggle(bool),
    Down { id: u8, x: i16, y: i16 },
    Move { id: u8, x: i16, y: i16 },
    Up { id: u8, x: i16, y: i16 },
    Cancel { id: u8 },
    Wheel { x: i16, y: i16, factor: u8 },
    Pan { dx: i16, dy: i16 },
    Viewport { w: u16, h: u16 },
    Add { x: i16, y: i16 },
    AddCentered,
    Move2 { zone: u8, x: i16, y: i16 },
    Resize { zone: u8, corner: u8, dx: i16, dy: i16 },
    Copy { zone: u8 },
    Delete { zone: u8 },
    Rename { zone: u8, len: u16 },
    Book { zone: u8, day: u8, start: u8, len: u8 },
    Unbook { zone: u8, index: u8 },
}

fn zone_id(raw: u8) -> ZoneId {
    ZoneId::new(u64::from(raw) % 16 + 1).expect("non-zero")
}

fn to_event(op: Op) -> EditorEvent {
    let point = |x: i16, y: i16| ScreenPoint::new(f64::from(x), f64::from(y));
    match op {
        Op::Toggle(true) => EditorEvent::Open,
        Op::Toggle(false) => EditorEvent::Close,
        Op::Down { id, x, y } => EditorEvent::Pointer {
            pointer: PointerEvent::down(u32::from(id % 3), f64::from(x), f64::from(y)),
        },
        Op::Move { id, x, y } => EditorEvent::Pointer {
            pointer: PointerEvent::moved(u32::from(id % 3), f64::from(x), f64::from(y)),
        },
        Op::Up { id, x, y } => EditorEvent::Pointer {
            pointer: PointerEvent::up(u32::from(id % 3), f64::from(x), f64::from(y)),
        },
        Op::Cancel { id } => EditorEvent::Pointer {
            pointer: PointerEvent::cancel(u32::from(id % 3)),
        },
        Op::Wheel { x, y, factor } => EditorEvent::Wheel {
            pivot: point(x, y),
            factor: f64::from(factor) / 64.0,
        },
        Op::Pan { dx, dy } => EditorEvent::Pan {
            dx: f64::from(dx),
            dy: f64::from(dy),
        },
        Op::Viewport { w, h } => EditorEvent::ResizeViewport {
            viewport: ScreenSize::new(f64::from(w), f64::from(h)),
        },
        Op::Add { x, y } => EditorEvent::AddZone {
            at: Some(WorldPos::new(f64::from(x), f64::from(y))),
        },
        Op::AddCentered => EditorEvent::AddZone { at: None },
        Op::Move2 { zone, x, y } => EditorEvent::MoveZone {
            zone: zone_id(zone),
            to: WorldPos::new(f64::from(x), f64::from(y)),
        },
        Op::Resize {
            zone,
            corner,
            dx,
            dy,
        } => EditorEvent::ResizeZone {
            zone: zone_id(zone),
            corner: Corner::ALL[usize::from(corner) % Corner::ALL.len()],
            delta: WorldDelta::new(f64::from(dx), f64::from(dy)),
        },
        Op::Copy { zone } => EditorEvent::CopyZone {
            zone: zone_id(zone),
        },
        Op::Delete { zone } => EditorEvent::DeleteZone {
            zone: zone_id(zone),
        },
        Op::Rename { zone, len } => EditorEvent::RenameZone {
            zone: zone_id(zone),
            label: "x".repeat(usize::from(len % 300)),
        },
        Op::Book {
            zone,
            day,
            start,
            len,
        } => {
            let date = NaiveDate::from_ymd_opt(2024, 1, 1 + u32::from(day % 28));
            let start_hour = u32::from(start % 24);
            let end_hour = (start_hour + u32::from(len % 4)).min(23);
            EditorEvent::AddReservation {
                zone: zone_id(zone),
                request: ReservationRequest {
                    date,
                    start: NaiveTime::from_hms_opt(start_hour, 0, 0),
                    end: NaiveTime::from_hms_opt(end_hour, 0, 0),
                    title: String::new(),
                },
                now: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .expect("valid timestamp"),
            }
        }
        Op::Unbook { zone, index } => EditorEvent::DeleteReservation {
            zone: zone_id(zone),
            index: usize::from(index % 4),
        },
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut editor = EditorState::new(EditorConfig::default()).expect("default config");
    for op in ops.into_iter().take(256) {
        let event = to_event(op);
        // Pointer id 0 is malformed and must leave the state untouched.
        let before = editor.clone();
        if editor.apply(&event).is_err() {
            assert_eq!(editor, before);
        }
        assert_eq!(editor.world().check_invariants(), Ok(()));
    }
    EditorSnapshot::capture(&editor)
        .validate()
        .expect("live state is always a valid snapshot");
});

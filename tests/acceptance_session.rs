//! Acceptance test: one full study session driven through the public
//! sequencer API with a scripted clock, asserting both session logs
//! byte for byte.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use image::{GrayImage, Luma};
use lfstudy::config::StudyConfig;
use lfstudy::depth::{DepthMap, InMemoryDepthMaps};
use lfstudy::model::SceneId;
use lfstudy::state::{AnswerOutcome, DisplaySink, SessionComplete, StudySequencer};

#[derive(Debug, Default)]
struct RecordingSink {
    renders: Vec<String>,
}

impl DisplaySink for RecordingSink {
    fn render(&mut self, image_path: &str) {
        self.renders.push(image_path.to_string());
    }
}

/// 10:00:00 UTC plus an offset in milliseconds.
fn t(ms: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 5, 1, 10, 0, 0)
        .single()
        .expect("valid timestamp")
        + TimeDelta::milliseconds(ms)
}

/// Depth map whose columns put taps at view x = 0, 3, 6, 9 into buckets
/// 0, 3, 7, 10 (depth resolution 11, tap scaled 4/3 onto map columns).
fn zoned_map() -> DepthMap {
    let pixels = GrayImage::from_fn(16, 16, |x, _| {
        Luma([match x {
            0..=1 => 0,
            2..=5 => 77,
            6..=9 => 179,
            _ => 255,
        }])
    });
    DepthMap::from_gray(pixels)
}

#[test]
fn full_session_produces_exact_logs() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = StudyConfig {
        playlist: vec!["Bikes".to_string(), "Flowers".to_string()],
        ..StudyConfig::default()
    };
    let mut maps = InMemoryDepthMaps::new();
    maps.insert(
        SceneId::new("Bikes").expect("valid scene name"),
        zoned_map(),
    );
    // Flowers deliberately has no depth map.

    let mut seq = StudySequencer::start(&config, RecordingSink::default(), maps, dir.path(), t(0))
        .expect("start session");

    // --- Scene 1: Bikes ---
    seq.gesture_start();
    seq.gesture_drag(-20.0, 0.0, t(1_000)); // pan to 008_007
    seq.gesture_drag(-60.0, 0.0, t(2_500)); // same gesture, on to 010_007

    // First refocus jumps straight from the all-in-focus stack.
    assert!(seq.double_tap(3.0, 0.0, t(4_000)).is_none());

    // Second refocus animates 3 -> 7, one plane per 20 ms tick.
    let mut pending = seq.double_tap(6.0, 0.0, t(5_000));
    while let Some(tick) = pending {
        pending = seq.tick(tick, tick.due);
    }

    assert_eq!(
        seq.record_answer("Annoying", t(8_000)),
        Ok(AnswerOutcome::Advanced)
    );

    // --- Scene 2: Flowers (no depth map: taps are inert) ---
    let renders_before = seq.viewport().display().renders.len();
    assert!(seq.double_tap(3.0, 0.0, t(9_000)).is_none());
    assert_eq!(seq.viewport().display().renders.len(), renders_before);

    seq.gesture_start();
    seq.gesture_drag(20.0, 20.0, t(10_000)); // pan to 006_006

    assert_eq!(
        seq.record_answer("Imperceptible", t(12_000)),
        Ok(AnswerOutcome::Complete)
    );
    assert!(seq.is_complete());
    assert_eq!(
        seq.record_answer("Annoying", t(13_000)),
        Err(SessionComplete)
    );

    // --- Rendered image sequence ---
    assert_eq!(
        seq.viewport().display().renders,
        vec![
            "Bikes/007_007",
            "Bikes/008_007",
            "Bikes/010_007",
            "Bikes/007_007_003",
            "Bikes/007_007_004",
            "Bikes/007_007_005",
            "Bikes/007_007_006",
            "Bikes/007_007_007",
            "Flowers/007_007",
            "Flowers/006_006",
        ]
    );

    // --- Tracking log, byte for byte ---
    let tracking =
        std::fs::read_to_string(seq.logger().tracking_path()).expect("read tracking log");
    let expected = "\
Bikes/008_007  start: 10:00:01.000000  end: 10:00:02.500000  on-screen: 00:00:01.500000
Bikes/010_007  start: 10:00:02.500000  end: 10:00:04.000000  on-screen: 00:00:01.500000
Bikes/007_007_003  start: 10:00:04.000000  end: 10:00:05.000000  on-screen: 00:00:01.000000
Bikes/007_007_004  start: 10:00:05.000000  end: 10:00:05.020000  on-screen: 00:00:00.020000
Bikes/007_007_005  start: 10:00:05.020000  end: 10:00:05.040000  on-screen: 00:00:00.020000
Bikes/007_007_006  start: 10:00:05.040000  end: 10:00:05.060000  on-screen: 00:00:00.020000
Bikes/007_007_007  start: 10:00:05.060000  end: 10:00:08.000000  on-screen: 00:00:02.940000

Flowers/006_006  start: 10:00:10.000000  end: 10:00:12.000000  on-screen: 00:00:02.000000
";
    assert_eq!(tracking, expected);

    // --- Answers log ---
    let answers = std::fs::read_to_string(seq.logger().answers_path()).expect("read answers log");
    let expected_answers = format!(
        "{:>30}Annoying\n{:>30}Imperceptible\n",
        "Bikes", "Flowers"
    );
    assert_eq!(answers, expected_answers);

    // Log files carry the session-start prefix.
    let name = seq
        .logger()
        .tracking_path()
        .file_name()
        .and_then(|n| n.to_str())
        .expect("tracking file name");
    assert_eq!(name, "2017.05.01-10.00.00-tracking.txt");

    assert_eq!(seq.logger().write_failures(), 0);
}

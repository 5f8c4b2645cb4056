use super::*;
use crate::config::ConfigError;
use crate::depth::{DepthMap, InMemoryDepthMaps};
use chrono::{TimeDelta, TimeZone};
use image::{GrayImage, Luma};
use tempfile::TempDir;

#[derive(Debug, Default)]
struct RecordingSink {
    renders: Vec<String>,
}

impl DisplaySink for RecordingSink {
    fn render(&mut self, image_path: &str) {
        self.renders.push(image_path.to_string());
    }
}

fn t(ms: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 5, 1, 10, 0, 0)
        .single()
        .expect("valid timestamp")
        + TimeDelta::milliseconds(ms)
}

fn config() -> StudyConfig {
    StudyConfig {
        playlist: vec!["Bikes".to_string(), "Flowers".to_string()],
        ..StudyConfig::default()
    }
}

fn maps() -> InMemoryDepthMaps {
    let mut maps = InMemoryDepthMaps::new();
    let gray = DepthMap::from_gray(GrayImage::from_pixel(16, 16, Luma([128])));
    maps.insert(SceneId::new("Bikes").expect("valid scene name"), gray);
    maps
}

fn sequencer() -> (TempDir, StudySequencer<RecordingSink, InMemoryDepthMaps>) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let seq = StudySequencer::start(
        &config(),
        RecordingSink::default(),
        maps(),
        dir.path(),
        t(0),
    )
    .expect("start session");
    (dir, seq)
}

fn read(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).expect("read log file")
}

#[test]
fn start_rejects_invalid_config() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let empty = StudyConfig::default(); // no playlist
    let result = StudySequencer::start(
        &empty,
        RecordingSink::default(),
        InMemoryDepthMaps::new(),
        dir.path(),
        t(0),
    );
    assert!(matches!(
        result,
        Err(StudyError::Config(ConfigError::EmptyPlaylist))
    ));
}

#[test]
fn start_renders_the_first_scene_default_view() {
    let (_dir, seq) = sequencer();
    assert_eq!(seq.viewport().display().renders, vec!["Bikes/007_007"]);
    assert_eq!(seq.state(), SequencerState::Running(0));
    assert_eq!(
        seq.current_scene().map(SceneId::as_str),
        Some("Bikes")
    );
}

#[test]
fn answer_advances_to_the_next_scene() {
    let (_dir, mut seq) = sequencer();
    let outcome = seq.record_answer("Annoying", t(5_000)).expect("running");
    assert_eq!(outcome, AnswerOutcome::Advanced);
    assert_eq!(seq.state(), SequencerState::Running(1));
    assert_eq!(
        seq.viewport().display().renders,
        vec!["Bikes/007_007", "Flowers/007_007"]
    );
}

#[test]
fn answer_on_last_scene_completes_the_session() {
    let (_dir, mut seq) = sequencer();
    seq.record_answer("Annoying", t(5_000)).expect("running");
    let outcome = seq
        .record_answer("Imperceptible", t(9_000))
        .expect("running");
    assert_eq!(outcome, AnswerOutcome::Complete);
    assert!(seq.is_complete());
}

#[test]
fn answers_after_completion_are_rejected() {
    let (_dir, mut seq) = sequencer();
    seq.record_answer("Annoying", t(5_000)).expect("running");
    seq.record_answer("Annoying", t(6_000)).expect("running");
    assert_eq!(
        seq.record_answer("Annoying", t(7_000)),
        Err(SessionComplete)
    );
    // Still exactly one render per scene load.
    assert_eq!(seq.viewport().display().renders.len(), 2);
}

#[test]
fn answers_log_matches_fixed_width_contract() {
    let (_dir, mut seq) = sequencer();
    seq.record_answer("Annoying", t(5_000)).expect("running");
    seq.record_answer("Imperceptible", t(9_000)).expect("running");

    let contents = read(seq.logger().answers_path());
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], format!("{:>30}Annoying", "Bikes"));
    assert_eq!(lines[1], format!("{:>30}Imperceptible", "Flowers"));
}

#[test]
fn exactly_one_blank_line_separates_scenes_in_tracking_log() {
    let (_dir, mut seq) = sequencer();
    // Generate one dwell window per scene so the separator is framed.
    seq.gesture_start();
    seq.gesture_drag(-20.0, 0.0, t(1_000));
    seq.gesture_drag(-40.0, 0.0, t(2_000));
    seq.record_answer("Annoying", t(5_000)).expect("running");

    seq.gesture_start();
    seq.gesture_drag(-20.0, 0.0, t(6_000));
    seq.gesture_drag(-40.0, 0.0, t(7_000));
    seq.record_answer("Imperceptible", t(9_000)).expect("running");

    let contents = read(seq.logger().tracking_path());
    let lines: Vec<&str> = contents.lines().collect();
    let blanks = lines.iter().filter(|line| line.is_empty()).count();
    assert_eq!(blanks, 1);

    // Bikes dwell lines, separator, Flowers dwell lines.
    assert!(lines[0].starts_with("Bikes/"));
    assert_eq!(lines[2], "");
    assert!(lines[3].starts_with("Flowers/"));
}

#[test]
fn dwell_windows_do_not_leak_across_scenes() {
    let (_dir, mut seq) = sequencer();
    seq.gesture_start();
    seq.gesture_drag(-20.0, 0.0, t(1_000));
    seq.record_answer("Annoying", t(5_000)).expect("running");

    // The next scene starts with a fresh window: its first transition
    // must not be logged.
    seq.gesture_start();
    seq.gesture_drag(-20.0, 0.0, t(6_000));

    let contents = read(seq.logger().tracking_path());
    let flowers_lines = contents
        .lines()
        .filter(|line| line.starts_with("Flowers/"))
        .count();
    assert_eq!(flowers_lines, 0);
}

#[test]
fn double_tap_works_only_where_a_depth_map_exists() {
    let (_dir, mut seq) = sequencer();
    // Bikes has a map: the tap refocuses.
    assert!(seq.double_tap(3.0, 3.0, t(1_000)).is_none()); // jump, no animation
    assert_eq!(seq.viewport().current().depth, Some(5));

    seq.record_answer("Annoying", t(5_000)).expect("running");
    // Flowers has none: the tap is a no-op.
    let renders = seq.viewport().display().renders.len();
    assert!(seq.double_tap(3.0, 3.0, t(6_000)).is_none());
    assert_eq!(seq.viewport().display().renders.len(), renders);
}

#[test]
fn no_log_writes_are_dropped_in_a_normal_session() {
    let (_dir, mut seq) = sequencer();
    seq.gesture_start();
    seq.gesture_drag(-20.0, 0.0, t(1_000));
    seq.record_answer("Annoying", t(5_000)).expect("running");
    seq.record_answer("Imperceptible", t(9_000)).expect("running");
    assert_eq!(seq.logger().write_failures(), 0);
}

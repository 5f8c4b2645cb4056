//! Study sequencer: the playlist state machine.
//!
//! Owns the ordered scene list, the session logs, the depth-map source
//! and the viewport, and is the single object the host shell talks to.
//! The lifecycle is strictly linear: `Running(i)` advances to
//! `Running(i + 1)` on each recorded answer until the last scene's
//! answer lands the session in `Complete`, after which further answers
//! are rejected.

use crate::config::StudyConfig;
use crate::depth::DepthMapSource;
use crate::model::{SceneId, StudyError};
use crate::session::SessionLogger;
use crate::state::viewport::{DisplaySink, RefocusTick, ViewportController};
use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Where the session stands in the playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Scene at this playlist position is on screen, awaiting an answer.
    Running(usize),
    /// Every scene has been answered. Terminal.
    Complete,
}

/// What a successfully recorded answer led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The next scene was loaded and rendered.
    Advanced,
    /// That was the last scene; the host should show its end screen.
    Complete,
}

/// Rejection of an answer recorded after the session completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Study session is already complete")]
pub struct SessionComplete;

/// Root object of one study session.
pub struct StudySequencer<D: DisplaySink, M: DepthMapSource> {
    playlist: Vec<SceneId>,
    state: SequencerState,
    viewport: ViewportController<D>,
    logger: SessionLogger,
    maps: M,
}

impl<D: DisplaySink, M: DepthMapSource> StudySequencer<D, M> {
    /// Validate the configuration, open the session logs and load the
    /// first scene. Fails fast: a session that cannot log or has
    /// nothing to show never starts.
    pub fn start(
        config: &StudyConfig,
        display: D,
        maps: M,
        log_dir: &Path,
        now: DateTime<Utc>,
    ) -> Result<Self, StudyError> {
        config.validate()?;
        let playlist = config.scene_playlist()?;
        let logger = SessionLogger::open(log_dir, now)?;
        let viewport = ViewportController::new(config, display);
        let mut sequencer = Self {
            playlist,
            state: SequencerState::Running(0),
            viewport,
            logger,
            maps,
        };
        sequencer.load_scene_at(0);
        info!(scenes = sequencer.playlist.len(), "study session started");
        Ok(sequencer)
    }

    /// Finger down on the displayed image.
    pub fn gesture_start(&mut self) {
        self.viewport.gesture_start();
    }

    /// Drag translation since gesture start, in UI points.
    pub fn gesture_drag(&mut self, dx: f32, dy: f32, now: DateTime<Utc>) {
        self.viewport.gesture_drag(dx, dy, &mut self.logger, now);
    }

    /// Double-tap at a position in displayed-view coordinates.
    pub fn double_tap(&mut self, x: f32, y: f32, now: DateTime<Utc>) -> Option<RefocusTick> {
        self.viewport.refocus(x, y, &mut self.logger, now)
    }

    /// Run a due refocus animation step.
    pub fn tick(&mut self, tick: RefocusTick, now: DateTime<Utc>) -> Option<RefocusTick> {
        self.viewport.tick(tick, &mut self.logger, now)
    }

    /// Record the participant's rating for the current scene and move
    /// on: log the answer, close the dwell window, then either load the
    /// next scene (after the blank separator line) or complete the
    /// session.
    pub fn record_answer(
        &mut self,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionComplete> {
        let SequencerState::Running(position) = self.state else {
            return Err(SessionComplete);
        };
        let scene_name = self.playlist[position].as_str().to_owned();
        self.logger.log_answer(&scene_name, answer);
        self.viewport.close_current_image(&mut self.logger, now);

        if position + 1 == self.playlist.len() {
            self.state = SequencerState::Complete;
            info!(scene = %scene_name, "study session complete");
            return Ok(AnswerOutcome::Complete);
        }

        self.logger.log_scene_boundary();
        self.state = SequencerState::Running(position + 1);
        self.load_scene_at(position + 1);
        Ok(AnswerOutcome::Advanced)
    }

    /// Current playlist state.
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Whether every scene has been answered.
    pub fn is_complete(&self) -> bool {
        self.state == SequencerState::Complete
    }

    /// Scene currently (or last) on screen.
    pub fn current_scene(&self) -> Option<&SceneId> {
        self.viewport.scene()
    }

    /// Borrow the viewport (tests inspect the display sink through it).
    pub fn viewport(&self) -> &ViewportController<D> {
        &self.viewport
    }

    /// Borrow the session logger (for log paths and failure counts).
    pub fn logger(&self) -> &SessionLogger {
        &self.logger
    }

    fn load_scene_at(&mut self, position: usize) {
        // Positions come from `Running(i)` with `i < playlist.len()`.
        let scene = self.playlist[position].clone();
        let map = self.maps.depth_map(&scene);
        self.viewport.load_scene(scene, map);
    }
}

#[cfg(test)]
#[path = "sequencer_tests.rs"]
mod tests;

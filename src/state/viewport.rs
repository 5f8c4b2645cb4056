//! Viewport controller: the interactive image-index state machine.
//!
//! Converts drag deltas into clamped grid moves, drives the stepwise
//! refocus animation across depth planes, and decides when the display
//! must re-render. All index transitions funnel through one commit path
//! that closes the outgoing image's dwell window, so the tracking log
//! observes exactly the sequence of rendered images.
//!
//! # Refocus animation
//!
//! The controller never sleeps. A refocus that needs animation returns a
//! [`RefocusTick`] stamped with a due time 20 ms out and the current
//! animation generation; the host event loop calls [`ViewportController::tick`]
//! when its clock reaches the due time. Every new refocus (and every
//! committed pan) bumps the generation, so a tick held over from a
//! superseded animation is recognized as stale and ignored instead of
//! stepping toward an outdated target.

use crate::config::StudyConfig;
use crate::depth::DepthMap;
use crate::model::{SceneId, SubapertureIndex};
use crate::session::SessionLogger;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, trace};

/// Delay between consecutive refocus animation steps.
pub const REFOCUS_STEP_MS: i64 = 20;

/// Render target for committed index changes.
///
/// The real host shows the image; tests record the path.
pub trait DisplaySink {
    /// Show the image identified by `image_path`.
    fn render(&mut self, image_path: &str);
}

/// Token for one scheduled refocus animation step.
///
/// Fire it back into [`ViewportController::tick`] once the host clock
/// reaches `due`. The embedded generation makes superseded tokens inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefocusTick {
    generation: u64,
    /// Host-clock instant at which this step should run.
    pub due: DateTime<Utc>,
}

/// Interactive image-index state machine for one study session.
pub struct ViewportController<D: DisplaySink> {
    resolution_x: i32,
    resolution_y: i32,
    move_unit: f32,
    depth_resolution: u32,
    default_index: SubapertureIndex,
    display: D,
    scene: Option<SceneId>,
    depth_map: Option<DepthMap>,
    /// Index at gesture start; drags are measured against it.
    base: SubapertureIndex,
    /// Index actually displayed. The only index the logger observes.
    current: SubapertureIndex,
    /// Start of the displayed image's dwell window. `None` until the
    /// first committed transition of a scene, so the first image is
    /// never dwell-logged.
    dwell_start: Option<DateTime<Utc>>,
    /// Target depth plane of the active refocus animation.
    animation: Option<i32>,
    generation: u64,
}

impl<D: DisplaySink> ViewportController<D> {
    /// Build a controller from the study configuration. No scene is
    /// loaded yet; gestures are no-ops until [`Self::load_scene`].
    pub fn new(config: &StudyConfig, display: D) -> Self {
        let default_index = config.default_index();
        Self {
            resolution_x: config.angular_width as i32,
            resolution_y: config.angular_height as i32,
            move_unit: config.move_unit,
            depth_resolution: config.depth_resolution,
            default_index,
            display,
            scene: None,
            depth_map: None,
            base: default_index,
            current: default_index,
            dwell_start: None,
            animation: None,
            generation: 0,
        }
    }

    /// Reset to a new scene: default view, fresh depth map, no open
    /// dwell window, any in-flight animation superseded. Renders the
    /// default index once.
    pub fn load_scene(&mut self, scene: SceneId, depth_map: Option<DepthMap>) {
        let path = self.default_index.image_path(&scene);
        self.cancel_animation();
        self.scene = Some(scene);
        self.depth_map = depth_map;
        self.base = self.default_index;
        self.current = self.default_index;
        self.dwell_start = None;
        self.display.render(&path);
    }

    /// Finger down: drags are now measured from the displayed index.
    pub fn gesture_start(&mut self) {
        self.base = self.current;
    }

    /// Translate a drag delta into a clamped grid move and commit it if
    /// the target differs from the displayed index.
    ///
    /// The delta-to-steps conversion truncates toward zero, and panning
    /// is inverted relative to the drag (dragging left pans right across
    /// the grid). A committed pan drops back to the all-in-focus stack:
    /// the new index carries no depth, and any running refocus animation
    /// is superseded.
    pub fn gesture_drag(
        &mut self,
        dx: f32,
        dy: f32,
        logger: &mut SessionLogger,
        now: DateTime<Utc>,
    ) {
        if self.scene.is_none() {
            return;
        }
        let diff_x = (-dx / self.move_unit) as i32;
        let diff_y = (-dy / self.move_unit) as i32;
        let next = SubapertureIndex::angular(
            clamp_to_grid(self.base.x, diff_x, self.resolution_x),
            clamp_to_grid(self.base.y, diff_y, self.resolution_y),
        );
        if self.commit(next, logger, now) {
            self.cancel_animation();
        }
    }

    /// Double-tap: sample the depth map under the tap and move toward
    /// the tapped depth plane.
    ///
    /// Without a depth map this is a silent no-op. From the all-in-focus
    /// stack the view jumps straight to the default position at the
    /// target depth (there is no current depth to interpolate from).
    /// From an already-focused view the transition animates one plane at
    /// a time: the first step commits immediately and the returned tick,
    /// if any, schedules the next step [`REFOCUS_STEP_MS`] out.
    pub fn refocus(
        &mut self,
        tap_x: f32,
        tap_y: f32,
        logger: &mut SessionLogger,
        now: DateTime<Utc>,
    ) -> Option<RefocusTick> {
        let Some(map) = self.depth_map.as_ref() else {
            debug!("double-tap ignored: scene has no depth map");
            return None;
        };
        let target = map.depth_bucket(tap_x, tap_y, self.depth_resolution);
        match self.current.depth {
            None => {
                self.cancel_animation();
                let next = SubapertureIndex::new(
                    self.default_index.x,
                    self.default_index.y,
                    Some(target),
                );
                self.commit(next, logger, now);
                None
            }
            Some(_) => {
                self.generation = self.generation.wrapping_add(1);
                self.animation = Some(target);
                self.step_animation(logger, now)
            }
        }
    }

    /// Run one scheduled animation step. Stale tokens (superseded by a
    /// newer refocus, a committed pan, or a scene load) are no-ops.
    pub fn tick(
        &mut self,
        tick: RefocusTick,
        logger: &mut SessionLogger,
        now: DateTime<Utc>,
    ) -> Option<RefocusTick> {
        if tick.generation != self.generation {
            trace!(
                stale = tick.generation,
                current = self.generation,
                "ignoring superseded refocus tick"
            );
            return None;
        }
        self.step_animation(logger, now)
    }

    /// Close the displayed image's dwell window, flushing its tracking
    /// line. Called by the sequencer at answer boundaries.
    pub fn close_current_image(&mut self, logger: &mut SessionLogger, now: DateTime<Utc>) {
        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        if let Some(start) = self.dwell_start.take() {
            logger.log_dwell(&self.current.image_path(scene), start, now);
        }
    }

    /// The index currently displayed.
    pub fn current(&self) -> SubapertureIndex {
        self.current
    }

    /// The scene currently loaded, if any.
    pub fn scene(&self) -> Option<&SceneId> {
        self.scene.as_ref()
    }

    /// Borrow the display sink (tests inspect recorded renders here).
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Advance the animation by one depth plane and commit the move.
    /// Terminal when the displayed depth reaches the target.
    fn step_animation(
        &mut self,
        logger: &mut SessionLogger,
        now: DateTime<Utc>,
    ) -> Option<RefocusTick> {
        let target = self.animation?;
        let Some(depth) = self.current.depth else {
            // A pan dropped the depth out from under the animation.
            self.animation = None;
            return None;
        };
        if depth == target {
            self.animation = None;
            return None;
        }
        let next_depth = depth + (target - depth).signum();
        let next = SubapertureIndex::new(self.current.x, self.current.y, Some(next_depth));
        self.commit(next, logger, now);
        if next_depth == target {
            self.animation = None;
            return None;
        }
        Some(RefocusTick {
            generation: self.generation,
            due: now + TimeDelta::milliseconds(REFOCUS_STEP_MS),
        })
    }

    /// Render-if-changed: the single path every index transition takes.
    /// Closes the outgoing image's dwell window (when one is open),
    /// reopens it at `now`, and renders the incoming index.
    fn commit(
        &mut self,
        next: SubapertureIndex,
        logger: &mut SessionLogger,
        now: DateTime<Utc>,
    ) -> bool {
        if next == self.current {
            return false;
        }
        let Some(scene) = self.scene.as_ref() else {
            return false;
        };
        if let Some(start) = self.dwell_start {
            logger.log_dwell(&self.current.image_path(scene), start, now);
        }
        let path = next.image_path(scene);
        trace!(index = %next, image = %path, "committing index change");
        self.dwell_start = Some(now);
        self.current = next;
        self.display.render(&path);
        true
    }

    /// Supersede any in-flight animation so held-over ticks go stale.
    fn cancel_animation(&mut self) {
        if self.animation.take().is_some() {
            self.generation = self.generation.wrapping_add(1);
        }
    }
}

/// Offset a grid coordinate and clamp into `[0, resolution)`. Runs in
/// i64 so extreme drag deltas cannot overflow.
fn clamp_to_grid(base: i32, diff: i32, resolution: i32) -> i32 {
    let hi = i64::from(resolution.max(1)) - 1;
    (i64::from(base) + i64::from(diff)).clamp(0, hi) as i32
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;

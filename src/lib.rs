//! Light-field study runner (lfstudy)
//!
//! Interactive image-index core for perceptual user studies on
//! light-field captures: a participant pans across a grid of
//! sub-aperture views, double-taps to refocus at a tapped depth, and
//! rates each scene. The crate owns the state machines and session
//! logging; display, input and the clock are host collaborators, with a
//! headless JSONL replay driver standing in for them.

pub mod config;
pub mod depth;
pub mod logging;
pub mod model;
pub mod replay;
pub mod session;
pub mod state;

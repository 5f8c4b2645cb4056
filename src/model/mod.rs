//! Domain model: value types and the error taxonomy.

pub mod error;
pub mod index;
pub mod scene;

pub use error::StudyError;
pub use index::SubapertureIndex;
pub use scene::{InvalidSceneName, SceneId};

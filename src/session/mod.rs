/*!
 * Session lifecycle: the per-lesson workflow state and its in-memory store.
 */

pub mod models;
pub mod store;

pub use models::{Session, SessionAudio, SessionStage};
pub use store::SessionStore;

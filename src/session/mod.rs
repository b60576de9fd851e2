//! Session-oriented rendering API.

/// Progress reporting and cooperative cancellation.
pub mod control;
/// Render sessions, previews and full renders.
pub mod render_session;

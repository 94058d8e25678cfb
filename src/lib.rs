//! Gazeguard — webcam-gaze attention inference core.
//!
//! Estimates, from a per-frame stream of facial landmark coordinates,
//! whether a user is visually attending to on-screen playback, and
//! debounces noisy per-frame signals into single-fire pause / zone-out
//! triggers. Landmark detection, player control, and UI are external
//! collaborators; this library crate exposes the inference core for
//! the binary and for integration testing.

pub mod attention;
pub mod clock;
pub mod frame_source;

//! A ball to fling around a few tilted platforms, and a stick-figure ragdoll
//! to poke. The physics lives in [`physics`] and runs without a window; the
//! Bevy plugin there only feeds it input and draws it.

pub mod config;
pub mod physics;

//! Remote control client for a networked music player.
//!
//! The gateway bounds every backend call, the sync engine keeps playback
//! position smooth between polls, and the controller owns browse state.
//! Presentation is reached only through [`render::Renderer`].

pub mod config;
pub mod controller;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod render;
pub mod sync;
pub mod view;

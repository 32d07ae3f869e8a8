//! `tideloop` - Headless looping narrative animation engine
//!
//! This library provides the phase scheduler, pause-aware clock,
//! particle lifecycle, and interaction handling behind a short looping
//! narrative scene. Rendering is delegated to an injected collaborator;
//! the engine only emits render operations.

pub mod capture;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod interact;
pub mod observability;
pub mod particle;
pub mod pause;
pub mod render;
pub mod scene;
pub mod timeline;

//! Floor-plan editor engine.
//!
//! This crate is compiled to WebAssembly and runs in the browser, but every
//! piece of editing logic is plain Rust so it can be tested natively. It owns
//! the interactive floor-plan canvas: translating raw DOM input events into
//! scene mutations, maintaining the pan/zoom camera, hit-testing tables and
//! their handles, keeping undo/redo history, drawing the scene, and reconciling
//! local edits against the persistence service on explicit save.
//!
//! The host JavaScript layer wires DOM events to the engine, schedules
//! [`engine::Engine::render`] every animation frame, presents
//! [`notice::Notice`]s as toasts, and runs [`sync::save`] when the user saves.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`scene`] | Tables, their kinds/statuses, and the insertion-ordered scene |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`geometry`] | Rotation, snapping, seat layout and resize math |
//! | [`hit`] | Hit-testing against tables, resize handles and the rotate handle |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`history`] | Bounded undo/redo of scene snapshots |
//! | [`sync`] | Diffing against the persisted baseline and dispatching saves |
//! | [`render`] | Scene rendering onto a 2D canvas context |
//! | [`notice`] | User-facing notifications emitted to the host |
//! | [`config`] | Editor configuration |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod history;
pub mod input;
pub mod notice;
pub mod render;
pub mod scene;
pub mod sync;

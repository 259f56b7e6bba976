//! Interactive-canvas engine for scientific data views.
//!
//! This crate is compiled to WebAssembly and runs in the browser, behind a
//! host widget that owns the DOM canvas. The engine maps between canvas
//! pixels and the data's own world coordinates, decides which tool or
//! overlay receives each input event, and composes every frame from a
//! domain background plus the tools' and overlays' drawings. The host wires
//! DOM events in and repaints when the engine's redraw signal fires.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`transform`] | Pan/zoom transform and coordinate conversions |
//! | [`host`] | Tool host state machine and input dispatch |
//! | [`tool`] | Tool and UI element contracts, tool ids, selection service |
//! | [`tools`] | Pan, zoom and range-select tools |
//! | [`elements`] | Cursor overlay and scale bar |
//! | [`input`] | Input event types and the interaction result |
//! | [`render`] | Two-pass frame composition |
//! | [`background`] | Image and spectrum backgrounds |
//! | [`surface`] | Render-target trait, browser impl, recording impl |
//! | [`axis`] | Nice-number axis ticks |
//! | [`config`] | Engine configuration and loaders |
//! | [`signal`] | Synchronous subscribe/emit notifications |
//! | [`consts`] | Shared numeric constants (zoom limits, overlay sizes, etc.) |

pub mod axis;
pub mod background;
pub mod config;
pub mod consts;
pub mod elements;
pub mod engine;
pub mod host;
pub mod input;
pub mod render;
pub mod signal;
pub mod surface;
pub mod tool;
pub mod tools;
pub mod transform;

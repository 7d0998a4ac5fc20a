//! Canvas knowledge-graph explorer.
//!
//! The pure modules (`layout`, `viewport`, `visibility`, `scene`, `state`) hold
//! all behavior and are tested natively; `render` and `component` only talk to
//! the browser.

mod component;
mod config;
mod error;
mod fixtures;
mod layout;
mod render;
mod scene;
mod source;
mod state;
mod style;
mod types;
mod viewport;
mod visibility;

pub use component::KnowledgeGraph;

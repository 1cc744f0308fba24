//! Dealdeck — sales documents in, client-ready slide decks out.
//!
//! Single Rust binary. Scrapes project facts and environment signals from
//! a deal-transfer document or a filled proposal template, infers the
//! deployment topology, renders the architecture as a Mermaid diagram,
//! and assembles a validated slide outline.
//!
//! See `DESIGN.md` for the full architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classify;
pub mod config;
pub mod deck;
pub mod diagram;
pub mod logging;
pub mod pipeline;
pub mod signals;
pub mod slides;

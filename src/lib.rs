//! Compositor-side window overview effect.
//!
//! The library computes non-overlapping, aspect-preserving layouts for a
//! host compositor's window stack, animates windows toward those layouts,
//! and runs the interactive selection surface on top (hover highlight, text
//! filtering, keyboard navigation, drag-to-close). A small themed decoration
//! button toolkit rides along.
//!
//! The host is abstract: it feeds [`host::HostEvent`]s and elapsed-time
//! ticks into an [`effect::OverviewEffect`], drains [`host::HostCommand`]s
//! back out, and paints the [`host::RenderElement`]s the effect produces.

pub mod config;
pub mod decoration;
pub mod effect;
pub mod geometry;
pub mod host;
pub mod ipc;
pub mod layout;
pub mod motion;
pub mod selection;
pub mod session;
pub mod timers;
pub mod tracing_sub;

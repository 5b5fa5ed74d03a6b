//! `formkit-core` provides the primitives shared by the `formkit` widgets.
//!
//! This crate is backend-agnostic: widgets consume [`input::InputEvent`]s and
//! draw into a `ratatui` buffer, and the app decides where events come from.
//! The optional `crossterm` feature adds conversions from `crossterm` events.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you drive input + rendering from your app.
//! - No async runtime: all components run on the main thread.
//! - State lives in the widget; the app observes it through accessors and the
//!   actions returned by `handle_event`.
//!
//! Most users should depend on the facade crate `formkit`. Use this crate
//! directly if you only need the event and theming primitives.

pub mod input;
pub mod keymap;
pub mod render;
pub mod theme;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

//! Flip-clock widget for Flipclock
//!
//! This crate provides:
//! - [`Palette`]: indexed colours with per-index transparency
//! - [`SpriteSheet`] and [`SpriteSheets`]: paletted BMP sheets holding the
//!   static digits and the two flip animations
//! - [`FlipClock`]: the widget, drawing to any `embedded-graphics` target
//!   and implementing `flipclock_core::traits::ClockFace`
//!
//! # Layout
//!
//! ```text
//!  position
//!  ▼
//!  ┌────┬────┐   ┌────┬────┐
//!  │ top│ top│ ▪ │ top│ top│   top halves
//!  ├────┼────┤   ├────┼────┤
//!  │ btm│ btm│ ▪ │ btm│ btm│   bottom halves
//!  └────┴────┘   └────┴────┘
//!   first pair    second pair
//! ```
//!
//! Changing a digit plays the flip: the new top half appears behind the
//! old top half folding down, then the new bottom half folds down over the
//! old bottom half.

#![no_std]
#![deny(unsafe_code)]

pub mod palette;
pub mod sheet;
pub mod widget;

pub use palette::Palette;
pub use sheet::{Half, SheetError, SpriteSheet, SpriteSheets, TileGeometry};
pub use widget::{FlipClock, FlipClockConfig};

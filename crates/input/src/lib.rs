//! Input routing: raw key press/release events mapped to motion intents and
//! discrete viewer actions.
//!
//! # Invariants
//! - The router is the only writer of the intent vectors.
//! - Releasing a key zeroes only the axis it controls.
//! - Opposite keys on one axis resolve last-write-wins.

pub mod action;
mod router;

pub use action::{Action, Key};
pub use router::{InputRouter, MotionIntent};

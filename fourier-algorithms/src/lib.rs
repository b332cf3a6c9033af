//! This crate provides the fixed-size transforms ("codelets") dispatched by the
//! [`fourier`](../fourier/index.html) crate.  The API is low level, so you are probably looking
//! for that crate instead.
//!
//! Every codelet has the [`CodeletFn`] signature.  Direction is selected by the root table the
//! caller passes, and a codelet declines (returns `false`) rather than writing partial output
//! when it cannot handle its input.
//!
//! [`CodeletFn`]: type.CodeletFn.html
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod autosort;
pub mod bluesteins;
mod codelet;
pub mod dit;
pub mod eight_step;
mod float;
pub mod leaf;
pub mod six_step;
pub mod transpose;
mod twiddle;

pub use codelet::*;
pub use float::Float;
pub use twiddle::*;

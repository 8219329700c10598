//! # Realm Development Tools
//!
//! Command-line tools for development:
//! - Economy data validator
//! - Save record inspector and repairer
//! - Headless idle simulator

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod inspect;
pub mod simulate;
pub mod validate;

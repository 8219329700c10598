//! Data-driven economy configuration.
//!
//! Pure data structures deserialized from RON files. Defaults mirror
//! `assets/data/economy.ron`.

mod economy_config;

pub use economy_config::EconomyConfig;

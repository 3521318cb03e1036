//! Cyclic signal-time arithmetic.
//!
//! Every phase boundary, arrival time and band edge in the crate is reduced
//! modulo the signal cycle through [`cyclic::normalize`].

pub mod cyclic;

pub use cyclic::{
    cyclic_distance, kmh_to_mps, normalize, rounded_travel_time_secs, travel_time_secs,
    CyclicWindow,
};

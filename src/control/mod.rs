//! Closed-loop control: on/off climate regulation with dead bands.

pub mod hysteresis;

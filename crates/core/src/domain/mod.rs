pub mod moves;
pub mod ppm;
pub mod shipment;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which status enumeration a raw value was checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Move,
    Ppm,
    Shipment,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Move => "move",
            Self::Ppm => "ppm",
            Self::Shipment => "shipment",
        };
        f.write_str(label)
    }
}

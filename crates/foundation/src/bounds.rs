use serde::{Deserialize, Serialize};

/// Geographic extent in degrees.
///
/// `west > east` denotes a rectangle crossing the antimeridian.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Rectangle {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Rectangle {
            west,
            south,
            east,
            north,
        }
    }
}

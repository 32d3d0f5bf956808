//! Motion axes and axis sets
//!
//! The gantry exposes five axes: X, Y, Z plus the A and B extruder/auxiliary
//! axes. Commands that address a subset of axes carry a 5-bit mask with
//! bit 0 = X through bit 4 = B. The mask is an encoding detail; API users
//! work with [`Axis`] and [`AxisSet`] values and the bits only appear at the
//! frame-encode step.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single motion axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// X axis (bit 0)
    X,
    /// Y axis (bit 1)
    Y,
    /// Z axis (bit 2)
    Z,
    /// A axis (bit 3)
    A,
    /// B axis (bit 4)
    B,
}

impl Axis {
    /// All five axes in mask-bit order.
    pub const ALL: [Axis; 5] = [Axis::X, Axis::Y, Axis::Z, Axis::A, Axis::B];

    /// The bit this axis occupies in an axis mask.
    pub fn bit(self) -> u8 {
        match self {
            Axis::X => 0b0000_0001,
            Axis::Y => 0b0000_0010,
            Axis::Z => 0b0000_0100,
            Axis::A => 0b0000_1000,
            Axis::B => 0b0001_0000,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
            Axis::Z => write!(f, "Z"),
            Axis::A => write!(f, "A"),
            Axis::B => write!(f, "B"),
        }
    }
}

impl FromStr for Axis {
    type Err = UnknownAxis;

    /// Parse an axis name. Case-insensitive: `"x"` and `"X"` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            "a" | "A" => Ok(Axis::A),
            "b" | "B" => Ok(Axis::B),
            other => Err(UnknownAxis {
                name: other.to_string(),
            }),
        }
    }
}

/// Error returned when an axis name is not one of X, Y, Z, A, B.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown axis name: {name}")]
pub struct UnknownAxis {
    /// The name that failed to parse.
    pub name: String,
}

/// A set of motion axes, stored as the protocol's 5-bit mask.
///
/// Construction is order-insensitive; membership is what encodes, not the
/// order axes were added in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AxisSet(u8);

impl AxisSet {
    /// The empty set.
    pub const EMPTY: AxisSet = AxisSet(0);

    /// Create an empty set.
    pub fn new() -> Self {
        AxisSet(0)
    }

    /// The set containing all five axes (mask `0b0001_1111`).
    pub fn all() -> Self {
        AxisSet(0b0001_1111)
    }

    /// Parse a collection of axis names, case-insensitive and
    /// order-insensitive. Duplicates are harmless.
    pub fn from_names<I, S>(names: I) -> Result<Self, UnknownAxis>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = AxisSet::new();
        for name in names {
            set.insert(name.as_ref().parse::<Axis>()?);
        }
        Ok(set)
    }

    /// Add an axis to the set.
    pub fn insert(&mut self, axis: Axis) {
        self.0 |= axis.bit();
    }

    /// Remove an axis from the set.
    pub fn remove(&mut self, axis: Axis) {
        self.0 &= !axis.bit();
    }

    /// Whether the set contains `axis`.
    pub fn contains(&self, axis: Axis) -> bool {
        self.0 & axis.bit() != 0
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The wire mask: bit 0 = X, bit 1 = Y, bit 2 = Z, bit 3 = A, bit 4 = B.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Iterate the member axes in mask-bit order.
    pub fn iter(&self) -> impl Iterator<Item = Axis> + '_ {
        let mask = self.0;
        Axis::ALL.into_iter().filter(move |a| mask & a.bit() != 0)
    }
}

impl FromIterator<Axis> for AxisSet {
    fn from_iter<I: IntoIterator<Item = Axis>>(iter: I) -> Self {
        let mut set = AxisSet::new();
        for axis in iter {
            set.insert(axis);
        }
        set
    }
}

impl fmt::Display for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for axis in self.iter() {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}", axis)?;
            first = false;
        }
        Ok(())
    }
}

// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Mass properties
//!
//! Mass and moment of inertia both store their inverse alongside the value.
//! Values at or below [`IMMOVABLE_THRESHOLD`] are treated as infinite, giving
//! an inverse of zero; every dynamics routine multiplies by the inverse, so
//! immovable bodies need no special casing beyond that.

use crate::error::ConfigError;

/// Threshold below which mass or inertia is considered effectively zero (immovable)
pub const IMMOVABLE_THRESHOLD: f64 = 1e-10;

/// Mass component with a cached inverse
///
/// # Examples
///
/// ```
/// use rigid_body_sim::dynamics::Mass;
///
/// let mass = Mass::new(2.0).unwrap();
/// assert_eq!(mass.inverse(), 0.5);
/// assert!(!mass.is_immovable());
///
/// let immovable = Mass::immovable();
/// assert_eq!(immovable.inverse(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mass {
    value: f64,
    inverse: f64,
}

impl Mass {
    /// Create a mass in kilograms
    ///
    /// Zero (or near-zero) mass yields an immovable body. Negative, NaN and
    /// infinite values are rejected.
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value >= 0.0 && value.is_finite() {
            Ok(Mass {
                value,
                inverse: invert(value),
            })
        } else {
            Err(ConfigError::InvalidMass(value))
        }
    }

    /// Create an immovable mass (treated as infinite mass)
    pub fn immovable() -> Self {
        Mass {
            value: 0.0,
            inverse: 0.0,
        }
    }

    /// Get the mass value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Get the inverse mass, zero for immovable bodies
    pub fn inverse(&self) -> f64 {
        self.inverse
    }

    /// Check if this is an immovable body
    pub fn is_immovable(&self) -> bool {
        self.inverse == 0.0
    }
}

/// Moment of inertia about the centre of mass, with a cached inverse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inertia {
    value: f64,
    inverse: f64,
}

impl Inertia {
    /// Create a moment of inertia in kg·m²
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value >= 0.0 && value.is_finite() {
            Ok(Inertia {
                value,
                inverse: invert(value),
            })
        } else {
            Err(ConfigError::InvalidInertia(value))
        }
    }

    /// Inertia of a body that cannot rotate
    pub fn immovable() -> Self {
        Inertia {
            value: 0.0,
            inverse: 0.0,
        }
    }

    /// Get the inertia value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Get the inverse inertia, zero for bodies that cannot rotate
    pub fn inverse(&self) -> f64 {
        self.inverse
    }
}

fn invert(value: f64) -> f64 {
    if value < IMMOVABLE_THRESHOLD {
        0.0
    } else {
        1.0 / value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_creation() {
        let mass = Mass::new(10.5).unwrap();
        assert_eq!(mass.value(), 10.5);
        assert!(!mass.is_immovable());
    }

    #[test]
    fn test_mass_rejects_invalid() {
        assert_eq!(Mass::new(-1.0), Err(ConfigError::InvalidMass(-1.0)));
        assert!(Mass::new(f64::NAN).is_err());
        assert!(Mass::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_mass_zero_handling() {
        let zero_mass = Mass::new(0.0).unwrap();
        assert!(zero_mass.is_immovable());
        assert_eq!(zero_mass.inverse(), 0.0);

        let near_zero = Mass::new(1e-15).unwrap();
        assert!(near_zero.is_immovable());
    }

    #[test]
    fn test_mass_inverse() {
        assert_eq!(Mass::new(2.0).unwrap().inverse(), 0.5);
        assert_eq!(Mass::new(100.0).unwrap().inverse(), 0.01);
    }

    #[test]
    fn test_inertia() {
        let inertia = Inertia::new(4.0).unwrap();
        assert_eq!(inertia.inverse(), 0.25);
        assert_eq!(Inertia::immovable().inverse(), 0.0);
        assert_eq!(Inertia::new(-0.5), Err(ConfigError::InvalidInertia(-0.5)));
    }
}

//! Closed numeric intervals.
//!
//! ```text
//!   min    center    max
//!    |________|_______|
//! ```

use std::fmt;

use crate::error::{Error, Result};

/// A closed interval `[min, max]` with `min <= max`.
///
/// Operations that could produce an inverted interval return
/// [`Error::InvalidArgument`] instead.
///
/// # Examples
///
/// ```
/// use u_inventory::zone::Zone;
///
/// let zone = Zone::new(1.0, 5.0).unwrap();
/// assert_eq!(zone.center(), 3.0);
/// assert_eq!(zone.intersection(&Zone::of(3.0, 7.0)), Some(Zone::of(3.0, 5.0)));
/// assert!(Zone::new(5.0, 1.0).is_err());
/// assert_eq!(zone.to_string(), "Zone[1.0, 5.0]");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawZone")
)]
pub struct Zone {
    min: f64,
    max: f64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawZone {
    min: f64,
    max: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawZone> for Zone {
    type Error = Error;

    fn try_from(raw: RawZone) -> Result<Self> {
        Zone::new(raw.min, raw.max)
    }
}

impl Zone {
    /// Creates `[min, max]`. Fails if `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min > max {
            return Err(Error::invalid(format!(
                "minimum cannot be greater than maximum: {min} > {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Creates a zone from two endpoints in either order.
    pub fn of(a: f64, b: f64) -> Self {
        if a < b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Creates `[center - radius, center + radius]`.
    pub fn of_radius(center: f64, radius: f64) -> Result<Self> {
        if radius < 0.0 {
            return Err(Error::invalid(format!(
                "radius must be non-negative, got {radius}"
            )));
        }
        Self::new(center - radius, center + radius)
    }

    /// Creates a zone of the given length centered at `center`.
    pub fn of_length(center: f64, length: f64) -> Result<Self> {
        if length < 0.0 {
            return Err(Error::invalid(format!(
                "length must be non-negative, got {length}"
            )));
        }
        Self::new(center - length / 2.0, center + length / 2.0)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Half the length.
    pub fn radius(&self) -> f64 {
        (self.max - self.min) / 2.0
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Scales the zone around its center. Fails for a negative factor.
    pub fn scale(&self, factor: f64) -> Result<Self> {
        Self::of_length(self.center(), self.length() * factor)
    }

    /// Shifts both ends by `offset`.
    pub fn move_by(&self, offset: f64) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Overlap of the two zones, or `None` if they are disjoint.
    ///
    /// ```text
    /// this:          |--------|
    /// that:               |---------|
    /// intersection:       |---|
    /// ```
    pub fn intersection(&self, other: &Zone) -> Option<Zone> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(Zone { min, max })
    }

    /// Smallest zone covering both, or `None` if they are disjoint.
    ///
    /// ```text
    /// this:   |--------|
    /// that:        |---------|
    /// union:  |--------------|
    /// ```
    pub fn union(&self, other: &Zone) -> Option<Zone> {
        self.has_intersection(other).then(|| Zone {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        })
    }

    /// Returns `true` if the zones share at least one point.
    pub fn has_intersection(&self, other: &Zone) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Grows both sides by `delta`.
    ///
    /// A negative `delta` shrinks the zone. Shrinking by exactly the radius
    /// collapses it to its center; shrinking further fails.
    pub fn expand(&self, delta: f64) -> Result<Self> {
        let limit = -self.radius();
        if delta < limit {
            return Err(Error::invalid(format!(
                "expansion must be no less than {limit}, got {delta}"
            )));
        }
        if delta == limit {
            return Self::of_radius(self.center(), 0.0);
        }
        Self::new(self.min - delta, self.max + delta)
    }

    /// Grows the lower side by `left` and the upper side by `right`.
    ///
    /// Each delta must be at least `-radius`.
    pub fn expand_sides(&self, left: f64, right: f64) -> Result<Self> {
        let limit = -self.radius();
        if left < limit {
            return Err(Error::invalid(format!("left delta < -radius: {left} < {limit}")));
        }
        if right < limit {
            return Err(Error::invalid(format!(
                "right delta < -radius: {right} < {limit}"
            )));
        }
        Self::new(self.min - left, self.max + right)
    }

    /// Shrinks both sides by `d`. Fails if `d` exceeds the radius.
    pub fn squeeze(&self, d: f64) -> Result<Self> {
        self.expand(-d)
    }

    /// Shrinks both sides by `d`, stopping at the center.
    pub fn squeeze_safely(&self, d: f64) -> Self {
        let r = d.min(self.radius());
        Self::of(self.min + r, self.max - r)
    }

    /// Returns `true` if this zone ends at or before `other` starts.
    pub fn is_before(&self, other: &Zone) -> bool {
        self.max <= other.min
    }

    /// Returns `true` if this zone starts at or after `other` ends.
    pub fn is_after(&self, other: &Zone) -> bool {
        self.min >= other.max
    }

    /// The zone of the given length ending at this zone's minimum.
    ///
    /// ```text
    /// this:          |----|
    /// neighbor:  |---|
    /// ```
    pub fn less_neighbor(&self, length: f64) -> Result<Self> {
        if length < 0.0 {
            return Err(Error::invalid(format!(
                "length must be non-negative, got {length}"
            )));
        }
        Self::new(self.min - length, self.min)
    }

    /// The zone of the given length starting at this zone's maximum.
    ///
    /// ```text
    /// this:     |----|
    /// neighbor:      |---|
    /// ```
    pub fn greater_neighbor(&self, length: f64) -> Result<Self> {
        if length < 0.0 {
            return Err(Error::invalid(format!(
                "length must be non-negative, got {length}"
            )));
        }
        Self::new(self.max, self.max + length)
    }

    /// The point of the zone closest to `value`.
    pub fn nearest(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// The point of the zone furthest from `value`.
    pub fn furthest(&self, value: f64) -> f64 {
        if value <= self.center() {
            self.max
        } else {
            self.min
        }
    }

    /// Distance from `value` to the zone; zero inside it.
    pub fn distance(&self, value: f64) -> f64 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }

    /// Gap between two zones; zero if they touch or overlap.
    pub fn distance_to_zone(&self, other: &Zone) -> f64 {
        if self.max <= other.min {
            other.min - self.max
        } else if self.min >= other.max {
            self.min - other.max
        } else {
            0.0
        }
    }

    /// Returns `true` if this zone lies entirely within `other`.
    pub fn is_inside(&self, other: &Zone) -> bool {
        other.min <= self.min && self.max <= other.max
    }

    /// Returns `true` if `other` lies entirely within this zone.
    pub fn contains_zone(&self, other: &Zone) -> bool {
        other.min >= self.min && other.max <= self.max
    }

    /// Returns `true` if `value` lies within the zone, ends included.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Same minimum, new maximum.
    pub fn with_max(&self, max: f64) -> Result<Self> {
        Self::new(self.min, max)
    }

    /// New minimum, same maximum.
    pub fn with_min(&self, min: f64) -> Result<Self> {
        Self::new(min, self.max)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Zone[{:?}, {:?}]", self.min, self.max)
    }
}

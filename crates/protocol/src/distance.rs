use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CityId, ProtocolError};

/// Literal written wherever a city cannot be reached from the source.
pub const UNREACHED_MARKER: &str = "INF";

/// Distance from a fixed source city.
///
/// `Unreached` is a distinct state rather than a large sentinel value, so it
/// can never take part in arithmetic or be mistaken for a real distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Distance {
    Finite(i64),
    Unreached,
}

impl Distance {
    pub fn is_reached(&self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    pub fn finite(&self) -> Option<i64> {
        match self {
            Distance::Finite(d) => Some(*d),
            Distance::Unreached => None,
        }
    }

    /// Distance obtained by following a road of `weight` from a city at this
    /// distance. Unreached stays unreached; `None` if the sum leaves the `i64`
    /// range.
    pub fn extended_by(&self, weight: i32) -> Option<Distance> {
        match self {
            Distance::Finite(d) => d.checked_add(i64::from(weight)).map(Distance::Finite),
            Distance::Unreached => Some(Distance::Unreached),
        }
    }

    /// True if `self` is a strict improvement over `other`.
    pub fn improves_on(&self, other: &Distance) -> bool {
        match (self, other) {
            (Distance::Finite(a), Distance::Finite(b)) => a < b,
            (Distance::Finite(_), Distance::Unreached) => true,
            (Distance::Unreached, _) => false,
        }
    }
}

impl From<Option<i64>> for Distance {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Distance::Unreached, Distance::Finite)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(d) => write!(f, "{}", d),
            Distance::Unreached => f.write_str(UNREACHED_MARKER),
        }
    }
}

impl FromStr for Distance {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(UNREACHED_MARKER) {
            return Ok(Distance::Unreached);
        }
        trimmed
            .parse::<i64>()
            .map(Distance::Finite)
            .map_err(|_| ProtocolError::InvalidDistance(s.to_string()))
    }
}

impl From<Distance> for String {
    fn from(value: Distance) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Distance {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One distance per city, indexed by [`CityId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistanceVector(Vec<Distance>);

impl DistanceVector {
    /// Every city unreached except `source`, which sits at distance zero.
    pub fn from_source(city_count: usize, source: CityId) -> Self {
        let mut distances = vec![Distance::Unreached; city_count];
        if let Some(slot) = distances.get_mut(source) {
            *slot = Distance::Finite(0);
        }
        Self(distances)
    }

    pub fn get(&self, city: CityId) -> Option<Distance> {
        self.0.get(city).copied()
    }

    pub(crate) fn slot_mut(&mut self, city: CityId) -> Option<&mut Distance> {
        self.0.get_mut(city)
    }

    /// Lowers the distance of `city` to `candidate` if that is an improvement.
    /// Returns whether the entry changed.
    pub fn relax(&mut self, city: CityId, candidate: Distance) -> bool {
        match self.slot_mut(city) {
            Some(slot) if candidate.improves_on(slot) => {
                *slot = candidate;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CityId, Distance)> + '_ {
        self.0.iter().copied().enumerate()
    }

    pub fn as_slice(&self) -> &[Distance] {
        &self.0
    }

    pub fn reached_count(&self) -> usize {
        self.0.iter().filter(|d| d.is_reached()).count()
    }
}

impl From<Vec<Distance>> for DistanceVector {
    fn from(value: Vec<Distance>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreached_never_improves() {
        assert!(!Distance::Unreached.improves_on(&Distance::Unreached));
        assert!(!Distance::Unreached.improves_on(&Distance::Finite(i64::MAX)));
        assert!(Distance::Finite(i64::MAX).improves_on(&Distance::Unreached));
        assert!(Distance::Finite(-3).improves_on(&Distance::Finite(-2)));
        assert!(!Distance::Finite(4).improves_on(&Distance::Finite(4)));
    }

    #[test]
    fn test_extended_by_keeps_unreached() {
        assert_eq!(Distance::Unreached.extended_by(-5), Some(Distance::Unreached));
        assert_eq!(Distance::Finite(2).extended_by(-5), Some(Distance::Finite(-3)));
        assert_eq!(
            Distance::Finite(i64::from(i32::MAX)).extended_by(i32::MAX),
            Some(Distance::Finite(2 * i64::from(i32::MAX)))
        );
    }

    #[test]
    fn test_extended_by_reports_overflow() {
        assert_eq!(Distance::Finite(i64::MIN + 5).extended_by(-6), None);
        assert_eq!(Distance::Finite(i64::MAX - 1).extended_by(2), None);
        assert_eq!(
            Distance::Finite(i64::MIN + 5).extended_by(-5),
            Some(Distance::Finite(i64::MIN))
        );
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Distance::Finite(-7).to_string(), "-7");
        assert_eq!(Distance::Unreached.to_string(), "INF");
        assert_eq!("INF".parse::<Distance>().unwrap(), Distance::Unreached);
        assert_eq!("inf".parse::<Distance>().unwrap(), Distance::Unreached);
        assert_eq!(" 12 ".parse::<Distance>().unwrap(), Distance::Finite(12));
        assert!("twelve".parse::<Distance>().is_err());
        assert!("".parse::<Distance>().is_err());
    }

    #[test]
    fn test_zero_is_not_unreached() {
        let zero = Distance::Finite(0);
        assert!(zero.is_reached());
        assert_ne!(zero, Distance::Unreached);
        assert_eq!(zero.finite(), Some(0));
        assert_eq!(Distance::Unreached.finite(), None);
    }

    #[test]
    fn test_json_uses_textual_form() {
        let vector = DistanceVector::from(vec![Distance::Finite(0), Distance::Unreached]);
        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(json, r#"["0","INF"]"#);

        let back: DistanceVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vector);
    }

    #[test]
    fn test_vector_from_source() {
        let vector = DistanceVector::from_source(3, 1);
        assert_eq!(vector.len(), 3);
        assert_eq!(vector.get(0), Some(Distance::Unreached));
        assert_eq!(vector.get(1), Some(Distance::Finite(0)));
        assert_eq!(vector.get(3), None);
        assert_eq!(vector.reached_count(), 1);
    }

    #[test]
    fn test_relax_only_on_improvement() {
        let mut vector = DistanceVector::from_source(2, 0);
        assert!(vector.relax(1, Distance::Finite(9)));
        assert!(!vector.relax(1, Distance::Finite(9)));
        assert!(!vector.relax(1, Distance::Unreached));
        assert!(vector.relax(1, Distance::Finite(-1)));
        assert_eq!(vector.get(1), Some(Distance::Finite(-1)));
        assert!(!vector.relax(5, Distance::Finite(0)));
    }
}

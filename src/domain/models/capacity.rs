use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::domain::errors::ConfigError;

/// Upper bound on the number of committed entries a store may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCapacity", into = "RawCapacity")]
pub enum Capacity {
    Bounded(NonZeroUsize),
    Unbounded,
}

impl Capacity {
    /// Build a bounded capacity, rejecting zero.
    pub fn bounded(limit: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(limit)
            .map(Self::Bounded)
            .ok_or(ConfigError::ZeroCapacity)
    }

    /// The numeric limit, or `None` when unbounded.
    pub const fn limit(self) -> Option<usize> {
        match self {
            Self::Bounded(n) => Some(n.get()),
            Self::Unbounded => None,
        }
    }

    /// Whether a store holding `len` entries is already at the bound.
    pub fn is_full(self, len: usize) -> bool {
        self.limit().is_some_and(|limit| len >= limit)
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::Bounded(NonZeroUsize::new(100).unwrap_or(NonZeroUsize::MIN))
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{n}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

impl FromStr for Capacity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("unbounded") {
            return Ok(Self::Unbounded);
        }
        let n: i64 = trimmed
            .parse()
            .map_err(|_| ConfigError::InvalidCapacity(s.to_string()))?;
        Self::try_from(RawCapacity::Limit(n))
    }
}

/// Wire form: an integer limit or the keyword `"unbounded"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawCapacity {
    Limit(i64),
    Keyword(String),
}

impl TryFrom<RawCapacity> for Capacity {
    type Error = ConfigError;

    fn try_from(raw: RawCapacity) -> Result<Self, Self::Error> {
        match raw {
            RawCapacity::Limit(n) if n < 0 => Err(ConfigError::NegativeCapacity(n)),
            RawCapacity::Limit(n) => {
                let n = usize::try_from(n).map_err(|_| ConfigError::InvalidCapacity(n.to_string()))?;
                Self::bounded(n)
            }
            RawCapacity::Keyword(word) => word.parse(),
        }
    }
}

impl From<Capacity> for RawCapacity {
    fn from(capacity: Capacity) -> Self {
        match capacity {
            Capacity::Bounded(n) => Self::Limit(i64::try_from(n.get()).unwrap_or(i64::MAX)),
            Capacity::Unbounded => Self::Keyword("unbounded".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_rejects_zero() {
        assert_eq!(Capacity::bounded(0), Err(ConfigError::ZeroCapacity));
        assert_eq!(Capacity::bounded(3).unwrap().limit(), Some(3));
    }

    #[test]
    fn test_parse_keyword_and_numbers() {
        assert_eq!("unbounded".parse::<Capacity>().unwrap(), Capacity::Unbounded);
        assert_eq!("UNBOUNDED".parse::<Capacity>().unwrap(), Capacity::Unbounded);
        assert_eq!("42".parse::<Capacity>().unwrap().limit(), Some(42));
        assert_eq!("-1".parse::<Capacity>(), Err(ConfigError::NegativeCapacity(-1)));
        assert_eq!("0".parse::<Capacity>(), Err(ConfigError::ZeroCapacity));
        assert!(matches!(
            "lots".parse::<Capacity>(),
            Err(ConfigError::InvalidCapacity(_))
        ));
    }

    #[test]
    fn test_yaml_forms() {
        let bounded: Capacity = serde_yaml::from_str("16").unwrap();
        assert_eq!(bounded.limit(), Some(16));

        let unbounded: Capacity = serde_yaml::from_str("unbounded").unwrap();
        assert_eq!(unbounded, Capacity::Unbounded);

        assert!(serde_yaml::from_str::<Capacity>("-5").is_err());
        assert!(serde_yaml::from_str::<Capacity>("0").is_err());
    }

    #[test]
    fn test_serialize_round_trips_through_raw_form() {
        assert_eq!(serde_json::to_string(&Capacity::Unbounded).unwrap(), "\"unbounded\"");
        assert_eq!(serde_json::to_string(&Capacity::bounded(7).unwrap()).unwrap(), "7");
    }

    #[test]
    fn test_is_full() {
        let cap = Capacity::bounded(2).unwrap();
        assert!(!cap.is_full(1));
        assert!(cap.is_full(2));
        assert!(!Capacity::Unbounded.is_full(usize::MAX));
    }

    #[test]
    fn test_display() {
        assert_eq!(Capacity::Unbounded.to_string(), "unbounded");
        assert_eq!(Capacity::bounded(9).unwrap().to_string(), "9");
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ShdwError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeUnit {
    KB,
    MB,
    GB,
    TB,
}

impl SizeUnit {
    /// Binary multiplier, matching how the storage program sizes accounts.
    pub fn multiplier(self) -> u64 {
        match self {
            SizeUnit::KB => 1 << 10,
            SizeUnit::MB => 1 << 20,
            SizeUnit::GB => 1 << 30,
            SizeUnit::TB => 1 << 40,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
            SizeUnit::TB => "TB",
        }
    }
}

/// Requested storage account capacity, written as `"<n><unit>"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageSize {
    amount: u64,
    unit: SizeUnit,
}

impl StorageSize {
    pub const ONE_GB: StorageSize = StorageSize::new(1, SizeUnit::GB);
    pub const TEN_GB: StorageSize = StorageSize::new(10, SizeUnit::GB);
    pub const FIFTY_GB: StorageSize = StorageSize::new(50, SizeUnit::GB);

    /// Capacities offered by the account creation form.
    pub const PRESETS: [StorageSize; 3] = [Self::ONE_GB, Self::TEN_GB, Self::FIFTY_GB];

    pub const fn new(amount: u64, unit: SizeUnit) -> Self {
        Self { amount, unit }
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn unit(&self) -> SizeUnit {
        self.unit
    }

    /// Capacity in bytes, saturating on overflow.
    pub fn bytes(&self) -> u64 {
        self.amount.saturating_mul(self.unit.multiplier())
    }
}

impl Default for StorageSize {
    fn default() -> Self {
        Self::ONE_GB
    }
}

impl fmt::Display for StorageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.as_str())
    }
}

impl FromStr for StorageSize {
    type Err = ShdwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ShdwError::InvalidSize(format!("{s}: missing unit")))?;
        let (digits, unit) = trimmed.split_at(split);

        let amount: u64 = digits
            .parse()
            .map_err(|_| ShdwError::InvalidSize(format!("{s}: missing amount")))?;
        if amount == 0 {
            return Err(ShdwError::InvalidSize(format!("{s}: must be greater than zero")));
        }

        let unit = match unit.trim().to_ascii_uppercase().as_str() {
            "KB" => SizeUnit::KB,
            "MB" => SizeUnit::MB,
            "GB" => SizeUnit::GB,
            "TB" => SizeUnit::TB,
            other => return Err(ShdwError::InvalidSize(format!("{s}: unknown unit {other}"))),
        };

        Ok(Self { amount, unit })
    }
}

impl Serialize for StorageSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StorageSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presets() {
        assert_eq!("1GB".parse::<StorageSize>().unwrap(), StorageSize::ONE_GB);
        assert_eq!("10GB".parse::<StorageSize>().unwrap(), StorageSize::TEN_GB);
        assert_eq!("50GB".parse::<StorageSize>().unwrap(), StorageSize::FIFTY_GB);
    }

    #[test]
    fn test_parse_is_case_and_space_tolerant() {
        let size: StorageSize = " 512 mb ".parse().unwrap();
        assert_eq!(size, StorageSize::new(512, SizeUnit::MB));
        assert_eq!(size.to_string(), "512MB");
    }

    #[test]
    fn test_bytes_uses_binary_units() {
        assert_eq!(StorageSize::ONE_GB.bytes(), 1_073_741_824);
        assert_eq!(StorageSize::new(3, SizeUnit::KB).bytes(), 3072);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("GB".parse::<StorageSize>().is_err());
        assert!("10".parse::<StorageSize>().is_err());
        assert!("0GB".parse::<StorageSize>().is_err());
        assert!("10PB".parse::<StorageSize>().is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&StorageSize::TEN_GB).unwrap();
        assert_eq!(json, "\"10GB\"");
        let back: StorageSize = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StorageSize::TEN_GB);
    }
}

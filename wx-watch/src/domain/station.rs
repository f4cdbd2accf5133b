//! Station reference types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid ICAO code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ICAO code: {reason}")]
pub struct InvalidIcao {
    reason: &'static str,
}

/// A valid 4-character ICAO location indicator.
///
/// The first character is an uppercase ASCII letter, the remaining three are
/// uppercase letters or digits. Any `IcaoCode` value is valid by construction.
///
/// # Examples
///
/// ```
/// use wx_watch::domain::IcaoCode;
///
/// let lcy = IcaoCode::parse("EGLC").unwrap();
/// assert_eq!(lcy.as_str(), "EGLC");
///
/// // Lowercase is rejected by `parse` but accepted by `parse_normalized`
/// assert!(IcaoCode::parse("eglc").is_err());
/// assert!(IcaoCode::parse_normalized(" eglc ").is_ok());
///
/// // Wrong length is rejected
/// assert!(IcaoCode::parse("LCY").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IcaoCode([u8; 4]);

impl IcaoCode {
    /// Parse an ICAO code from a string.
    ///
    /// The input must be exactly 4 characters: an uppercase letter followed
    /// by three uppercase letters or digits.
    pub fn parse(s: &str) -> Result<Self, InvalidIcao> {
        let bytes = s.as_bytes();

        if bytes.len() != 4 {
            return Err(InvalidIcao {
                reason: "must be exactly 4 characters",
            });
        }

        if !bytes[0].is_ascii_uppercase() {
            return Err(InvalidIcao {
                reason: "must start with an uppercase ASCII letter",
            });
        }

        for &b in &bytes[1..] {
            if !(b.is_ascii_uppercase() || b.is_ascii_digit()) {
                return Err(InvalidIcao {
                    reason: "must be uppercase ASCII letters or digits",
                });
            }
        }

        Ok(IcaoCode([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Parse user input: trims whitespace and uppercases before validating.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidIcao> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII letters and digits are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for IcaoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IcaoCode({})", self.as_str())
    }
}

impl fmt::Display for IcaoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IcaoCode {
    type Err = InvalidIcao;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_normalized(s)
    }
}

impl Serialize for IcaoCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IcaoCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        IcaoCode::parse_normalized(&s).map_err(serde::de::Error::custom)
    }
}

/// Name of the fleet a station is assigned to.
///
/// Fleet names are case-insensitive and stored lowercase. An empty name is
/// the "unassigned" fleet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Fleet(String);

const UNASSIGNED: &str = "unassigned";

impl Fleet {
    /// Create a fleet from a display name.
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            Self::unassigned()
        } else {
            Fleet(name)
        }
    }

    /// The fleet for stations without an assignment.
    pub fn unassigned() -> Self {
        Fleet(UNASSIGNED.to_string())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0 == UNASSIGNED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Fleet {
    fn default() -> Self {
        Self::unassigned()
    }
}

impl From<String> for Fleet {
    fn from(s: String) -> Self {
        Fleet::new(&s)
    }
}

impl From<&str> for Fleet {
    fn from(s: &str) -> Self {
        Fleet::new(s)
    }
}

impl From<Fleet> for String {
    fn from(f: Fleet) -> Self {
        f.0
    }
}

impl fmt::Display for Fleet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A station in the monitored network.
///
/// Stations are loaded from configuration or added at runtime by an
/// operator; they are never modified afterwards, only removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// ICAO code, unique within the registry.
    pub code: IcaoCode,

    /// Second naming scheme (IATA code), for display and lookup.
    #[serde(default)]
    pub alt_code: Option<String>,

    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub position: Position,

    /// Assigned runway heading in degrees. Zero means unknown.
    #[serde(default)]
    pub runway_heading: Option<u16>,

    #[serde(default)]
    pub fleet: Fleet,

    /// Challenging approach profile: raised minima apply.
    #[serde(default)]
    pub special_category: bool,
}

impl Station {
    /// Create an unassigned, standard-category station with no runway heading.
    pub fn new(code: IcaoCode, position: Position) -> Self {
        Self {
            code,
            alt_code: None,
            name: code.as_str().to_string(),
            position,
            runway_heading: None,
            fleet: Fleet::unassigned(),
            special_category: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_alt_code(mut self, alt_code: impl Into<String>) -> Self {
        self.alt_code = Some(alt_code.into());
        self
    }

    pub fn with_runway_heading(mut self, heading: u16) -> Self {
        self.runway_heading = Some(heading);
        self
    }

    pub fn with_fleet(mut self, fleet: impl Into<Fleet>) -> Self {
        self.fleet = fleet.into();
        self
    }

    pub fn special(mut self) -> Self {
        self.special_category = true;
        self
    }

    /// The runway heading, if one is known.
    ///
    /// A configured heading of 0 is treated as absent (runway 36 is 360).
    pub fn runway_heading(&self) -> Option<u16> {
        self.runway_heading.filter(|h| *h != 0)
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SuretyError},
    utils::AccountId,
};

/// Status codes reported by oracles for a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    pub fn code(&self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    /// Only a delay attributed to the airline entitles insurees to a payout.
    pub fn entitles_payout(&self) -> bool {
        matches!(self, FlightStatus::LateAirline)
    }
}

impl From<FlightStatus> for u8 {
    fn from(s: FlightStatus) -> Self {
        s.code()
    }
}

impl TryFrom<u8> for FlightStatus {
    type Error = SuretyError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(FlightStatus::Unknown),
            10 => Ok(FlightStatus::OnTime),
            20 => Ok(FlightStatus::LateAirline),
            30 => Ok(FlightStatus::LateWeather),
            40 => Ok(FlightStatus::LateTechnical),
            50 => Ok(FlightStatus::LateOther),
            other => Err(SuretyError::State(format!("Unknown flight status code: {}", other))),
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlightStatus::Unknown => "UNKNOWN",
            FlightStatus::OnTime => "ON_TIME",
            FlightStatus::LateAirline => "LATE_AIRLINE",
            FlightStatus::LateWeather => "LATE_WEATHER",
            FlightStatus::LateTechnical => "LATE_TECHNICAL",
            FlightStatus::LateOther => "LATE_OTHER",
        };
        write!(f, "{}", s)
    }
}

/// Natural key of a flight: the operating airline, the flight code and the departure timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightKey {
    pub airline: AccountId,
    pub code: String,
    pub timestamp: u64,
}

impl FlightKey {
    pub fn new(airline: AccountId, code: impl Into<String>, timestamp: u64) -> Self {
        Self {
            airline,
            code: code.into(),
            timestamp,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.airline, self.code, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_roundtrip_through_u8() {
        for status in FlightStatus::ALL {
            assert_eq!(FlightStatus::try_from(status.code()).unwrap(), status);
        }
        assert!(FlightStatus::try_from(15).is_err());
    }

    #[test]
    fn test_status_serializes_as_code() {
        let json = serde_json::to_string(&FlightStatus::LateAirline).unwrap();
        assert_eq!(json, "20");
        let back: FlightStatus = serde_json::from_str("10").unwrap();
        assert_eq!(back, FlightStatus::OnTime);
    }

    #[test]
    fn test_only_late_airline_pays() {
        let paying: Vec<_> = FlightStatus::ALL.iter().filter(|s| s.entitles_payout()).collect();
        assert_eq!(paying, vec![&FlightStatus::LateAirline]);
    }
}

use serde::{Deserialize, Serialize};

/// Membership status of an airline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AirlineStatus {
    Unregistered,
    Pending,
    Registered,
    Active,
}

impl std::fmt::Display for AirlineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AirlineStatus::Unregistered => "UNREGISTERED",
            AirlineStatus::Pending => "PENDING",
            AirlineStatus::Registered => "REGISTERED",
            AirlineStatus::Active => "ACTIVE",
        };
        write!(f, "{}", s)
    }
}

impl AirlineStatus {
    /// Position along UNREGISTERED -> PENDING -> REGISTERED -> ACTIVE.
    pub fn rank(&self) -> u8 {
        match self {
            AirlineStatus::Unregistered => 0,
            AirlineStatus::Pending => 1,
            AirlineStatus::Registered => 2,
            AirlineStatus::Active => 3,
        }
    }
}

//! Shared domain status enums

use serde::{Deserialize, Serialize};

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

// ---------------------------------------------------------------------------
// AssetStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum AssetStatus {
    NotAvailable = 0,
    Available = 1,
    Assigned = 2,
    WaitingForRecycling = 3,
    Recycled = 4,
}

impl AssetStatus {
    /// Convert a raw database value, `None` for values outside the enumeration
    pub fn from_raw(v: i16) -> Option<Self> {
        match v {
            0 => Some(AssetStatus::NotAvailable),
            1 => Some(AssetStatus::Available),
            2 => Some(AssetStatus::Assigned),
            3 => Some(AssetStatus::WaitingForRecycling),
            4 => Some(AssetStatus::Recycled),
            _ => None,
        }
    }
}

impl From<i16> for AssetStatus {
    fn from(v: i16) -> Self {
        AssetStatus::from_raw(v).unwrap_or(AssetStatus::NotAvailable)
    }
}

impl From<AssetStatus> for i16 {
    fn from(s: AssetStatus) -> Self {
        s as i16
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "notavailable" => Ok(AssetStatus::NotAvailable),
            "available" => Ok(AssetStatus::Available),
            "assigned" => Ok(AssetStatus::Assigned),
            "waitingforrecycling" => Ok(AssetStatus::WaitingForRecycling),
            "recycled" => Ok(AssetStatus::Recycled),
            _ => Err(format!("Invalid asset state: {}", s)),
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AssetStatus::NotAvailable => "Not available",
            AssetStatus::Available => "Available",
            AssetStatus::Assigned => "Assigned",
            AssetStatus::WaitingForRecycling => "Waiting for recycling",
            AssetStatus::Recycled => "Recycled",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// AssignmentStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum AssignmentStatus {
    WaitingForAcceptance = 0,
    Accepted = 1,
    Declined = 2,
    Returned = 3,
}

impl AssignmentStatus {
    /// Convert a raw value, `None` for values outside the enumeration
    pub fn from_raw(v: i16) -> Option<Self> {
        match v {
            0 => Some(AssignmentStatus::WaitingForAcceptance),
            1 => Some(AssignmentStatus::Accepted),
            2 => Some(AssignmentStatus::Declined),
            3 => Some(AssignmentStatus::Returned),
            _ => None,
        }
    }

    /// True while the assignment still ties up its asset
    pub fn is_active(self) -> bool {
        matches!(
            self,
            AssignmentStatus::WaitingForAcceptance | AssignmentStatus::Accepted
        )
    }
}

impl From<i16> for AssignmentStatus {
    fn from(v: i16) -> Self {
        AssignmentStatus::from_raw(v).unwrap_or(AssignmentStatus::WaitingForAcceptance)
    }
}

impl From<AssignmentStatus> for i16 {
    fn from(s: AssignmentStatus) -> Self {
        s as i16
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "waitingforacceptance" => Ok(AssignmentStatus::WaitingForAcceptance),
            "accepted" => Ok(AssignmentStatus::Accepted),
            "declined" => Ok(AssignmentStatus::Declined),
            "returned" => Ok(AssignmentStatus::Returned),
            _ => Err(format!("Invalid assignment state: {}", s)),
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AssignmentStatus::WaitingForAcceptance => "Waiting for acceptance",
            AssignmentStatus::Accepted => "Accepted",
            AssignmentStatus::Declined => "Declined",
            AssignmentStatus::Returned => "Returned",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// ReturnRequestStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a return request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum ReturnRequestStatus {
    WaitingForReturning = 0,
    Completed = 1,
}

impl ReturnRequestStatus {
    pub fn from_raw(v: i16) -> Option<Self> {
        match v {
            0 => Some(ReturnRequestStatus::WaitingForReturning),
            1 => Some(ReturnRequestStatus::Completed),
            _ => None,
        }
    }
}

impl From<i16> for ReturnRequestStatus {
    fn from(v: i16) -> Self {
        ReturnRequestStatus::from_raw(v).unwrap_or(ReturnRequestStatus::WaitingForReturning)
    }
}

impl From<ReturnRequestStatus> for i16 {
    fn from(s: ReturnRequestStatus) -> Self {
        s as i16
    }
}

impl std::str::FromStr for ReturnRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "waitingforreturning" => Ok(ReturnRequestStatus::WaitingForReturning),
            "completed" => Ok(ReturnRequestStatus::Completed),
            _ => Err(format!("Invalid return request state: {}", s)),
        }
    }
}

impl std::fmt::Display for ReturnRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReturnRequestStatus::WaitingForReturning => "Waiting for returning",
            ReturnRequestStatus::Completed => "Completed",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_status_parses_spaced_and_cased_forms() {
        assert_eq!("Available".parse::<AssetStatus>().unwrap(), AssetStatus::Available);
        assert_eq!(
            "waiting for recycling".parse::<AssetStatus>().unwrap(),
            AssetStatus::WaitingForRecycling
        );
        assert_eq!(
            "Not_Available".parse::<AssetStatus>().unwrap(),
            AssetStatus::NotAvailable
        );
        assert!("borrowed".parse::<AssetStatus>().is_err());
    }

    #[test]
    fn assignment_status_raw_round_trip() {
        for v in 0..=3i16 {
            let s = AssignmentStatus::from_raw(v).unwrap();
            assert_eq!(i16::from(s), v);
        }
        assert!(AssignmentStatus::from_raw(99).is_none());
    }

    #[test]
    fn active_assignment_states() {
        assert!(AssignmentStatus::WaitingForAcceptance.is_active());
        assert!(AssignmentStatus::Accepted.is_active());
        assert!(!AssignmentStatus::Declined.is_active());
        assert!(!AssignmentStatus::Returned.is_active());
    }

    #[test]
    fn return_request_status_parses() {
        assert_eq!(
            "completed".parse::<ReturnRequestStatus>().unwrap(),
            ReturnRequestStatus::Completed
        );
        assert!("cancelled".parse::<ReturnRequestStatus>().is_err());
    }
}

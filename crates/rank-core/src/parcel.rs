//! Parcels, their lifecycle status, and their binding to a trip leg.

use serde::{Deserialize, Serialize};

use crate::{PackageTypeId, ParcelId, TripId};

// ── ParcelStatus ──────────────────────────────────────────────────────────────

/// Parcel lifecycle.  Status only ever moves forward:
///
/// ```text
/// awaiting-pickup → in-transit → delivered → received
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParcelStatus {
    #[default]
    AwaitingPickup,
    InTransit,
    Delivered,
    /// Reached only by receiver OTP verification.
    Received,
}

impl ParcelStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ParcelStatus::AwaitingPickup => "awaiting-pickup",
            ParcelStatus::InTransit      => "in-transit",
            ParcelStatus::Delivered      => "delivered",
            ParcelStatus::Received       => "received",
        }
    }

    /// `true` if `next` is strictly later in the lifecycle.
    #[inline]
    pub fn precedes(self, next: ParcelStatus) -> bool {
        self < next
    }
}

impl std::fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParcelStatus {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "awaiting-pickup" => Ok(ParcelStatus::AwaitingPickup),
            "in-transit"      => Ok(ParcelStatus::InTransit),
            "delivered"       => Ok(ParcelStatus::Delivered),
            "received"        => Ok(ParcelStatus::Received),
            other => Err(crate::CoreError::Parse(format!("unknown parcel status {other:?}"))),
        }
    }
}

// ── Supporting values ─────────────────────────────────────────────────────────

/// Name and phone of a sender or receiver.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name:  String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// The package embedded in a parcel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackageRef {
    /// Client-supplied package identifier (label, barcode, …).
    pub id:           String,
    pub package_type: PackageTypeId,
}

/// A parcel's position on a trip: `leg_index` is 0-based into the trip's legs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegBinding {
    pub trip:      TripId,
    pub leg_index: usize,
}

// ── Parcel ────────────────────────────────────────────────────────────────────

/// A parcel document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub id:              ParcelId,
    /// Server-generated, unique.
    pub tracking_number: String,
    /// Server-generated receiver PIN.
    pub otp:             String,
    pub sender:          Contact,
    pub receiver:        Contact,
    pub package:         PackageRef,
    /// `None` while the parcel is not riding any trip.
    #[serde(default)]
    pub binding:         Option<LegBinding>,
    #[serde(default)]
    pub status:          ParcelStatus,
    #[serde(default)]
    pub version:         u64,
}

impl Parcel {
    pub fn trip(&self) -> Option<TripId> {
        self.binding.map(|b| b.trip)
    }

    pub fn leg_index(&self) -> Option<usize> {
        self.binding.map(|b| b.leg_index)
    }
}

/// Client input for parcel creation.  Codes and status are server-assigned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewParcel {
    pub sender:    Contact,
    pub receiver:  Contact,
    pub package:   PackageRef,
    #[serde(default)]
    pub trip:      Option<TripId>,
    #[serde(default)]
    pub leg_index: Option<i64>,
}

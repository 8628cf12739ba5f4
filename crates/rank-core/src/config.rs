//! Dispatch policy configuration.
//!
//! Every behaviour that the domain leaves as a product decision (self-trips,
//! reverse-route creation, parallel edges) is an explicit field here rather
//! than being baked into the graph or trip logic.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

// ── ParallelRoutePolicy ───────────────────────────────────────────────────────

/// Which route to use when several route documents connect the same
/// `from_rank → to_rank` pair.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParallelRoutePolicy {
    /// Lowest `RouteId`, i.e. the route created first.
    #[default]
    FirstById,
    /// Lowest package `price`; ties fall back to lowest `RouteId`.
    LowestPrice,
    /// Lowest `distance`; ties fall back to lowest `RouteId`.
    ShortestDistance,
}

impl ParallelRoutePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ParallelRoutePolicy::FirstById        => "first-by-id",
            ParallelRoutePolicy::LowestPrice      => "lowest-price",
            ParallelRoutePolicy::ShortestDistance => "shortest-distance",
        }
    }
}

impl std::fmt::Display for ParallelRoutePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DispatchConfig ────────────────────────────────────────────────────────────

/// Shortest and longest receiver OTP the code generator will produce.
pub const OTP_DIGITS_RANGE: std::ops::RangeInclusive<u8> = 4..=10;

/// Top-level policy configuration for the dispatcher.
///
/// Typically deserialized from a JSON file by the application and passed to
/// `DispatcherBuilder`.  Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Accept `origin == destination` and persist a zero-leg trip.  When
    /// `false` such a request is rejected as a validation error.
    pub allow_empty_trips: bool,

    /// `link_destination` also creates the `to → from` edge.
    pub auto_reverse_routes: bool,

    /// `link_destination` refuses a second edge for an existing pair.
    pub reject_parallel_routes: bool,

    /// Edge selection when parallel routes exist.
    pub parallel_route_policy: ParallelRoutePolicy,

    /// Length of the receiver OTP.
    pub otp_digits: u8,

    /// Seed for tracking-number and OTP generation.  `None` seeds from OS
    /// entropy; tests set it for reproducible codes.
    pub code_seed: Option<u64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            allow_empty_trips:      false,
            auto_reverse_routes:    false,
            reject_parallel_routes: false,
            parallel_route_policy:  ParallelRoutePolicy::FirstById,
            otp_digits:             6,
            code_seed:              None,
        }
    }
}

impl DispatchConfig {
    /// Reject values the dispatcher cannot honour.
    pub fn validate(&self) -> CoreResult<()> {
        if !OTP_DIGITS_RANGE.contains(&self.otp_digits) {
            return Err(CoreError::Config(format!(
                "otp_digits must be within {}..={}, got {}",
                OTP_DIGITS_RANGE.start(),
                OTP_DIGITS_RANGE.end(),
                self.otp_digits,
            )));
        }
        Ok(())
    }
}

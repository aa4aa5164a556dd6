//! Provisioned throughput value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// Explicit provisioned throughput of a container, in request units per second
///
/// Absent on containers provisioned in shared or autoscale modes; reading
/// throughput on such a container yields
/// [`StoreError::ThroughputNotConfigured`](crate::domain::StoreError::ThroughputNotConfigured)
/// rather than a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThroughputSetting {
    request_units: i32,
}

impl ThroughputSetting {
    pub fn new(request_units: i32) -> Self {
        Self { request_units }
    }

    /// The provisioned RU/s
    pub fn request_units(&self) -> i32 {
        self.request_units
    }

    /// A setting increased by the given amount, as in the scale-up pattern
    pub fn increased_by(&self, delta: i32) -> Self {
        Self {
            request_units: self.request_units + delta,
        }
    }
}

impl fmt::Display for ThroughputSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} RU/s", self.request_units)
    }
}

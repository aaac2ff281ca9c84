//! Customer snapshot types.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque identifier of a local customer.
///
/// The same identifier keys the remote customer resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Creates a customer ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CustomerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Tax exemption category accepted by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExemptionType {
    /// Wholesale / resale exemption.
    Wholesale,
    /// Government entity.
    Government,
    /// Any other exempt organisation.
    Other,
    /// Explicitly not exempt.
    NonExempt,
}

impl ExemptionType {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExemptionType::Wholesale => "wholesale",
            ExemptionType::Government => "government",
            ExemptionType::Other => "other",
            ExemptionType::NonExempt => "non_exempt",
        }
    }
}

impl fmt::Display for ExemptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExemptionType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "wholesale" => Ok(ExemptionType::Wholesale),
            "government" => Ok(ExemptionType::Government),
            "other" => Ok(ExemptionType::Other),
            "non_exempt" => Ok(ExemptionType::NonExempt),
            _ => Err(ProtocolError::UnknownExemptionType(s.to_string())),
        }
    }
}

/// A region in which the customer is tax exempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExemptRegion {
    /// Two-letter country code.
    pub country: String,
    /// Canonical state code (e.g. "CA").
    pub state: String,
}

impl ExemptRegion {
    /// Creates an exempt region.
    pub fn new(country: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            state: state.into(),
        }
    }
}

/// Postal address of a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Country code.
    #[serde(default)]
    pub country: Option<String>,
    /// Region/state code.
    #[serde(default)]
    pub state_code: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub postal_code: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Full street, all lines joined.
    #[serde(default)]
    pub street_full: Option<String>,
}

/// Point in time of a successful sync, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncTimestamp(u64);

impl SyncTimestamp {
    /// Creates a timestamp from unix seconds.
    pub fn from_unix_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the current wall-clock time.
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Returns the timestamp as unix seconds.
    pub fn as_unix_secs(&self) -> u64 {
        self.0
    }
}

impl From<SystemTime> for SyncTimestamp {
    fn from(time: SystemTime) -> Self {
        // Clock set before the epoch clamps to zero.
        Self(
            time.duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        )
    }
}

impl fmt::Display for SyncTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable view of a local customer at event time.
///
/// A snapshot is the only input to payload mapping. `last_sync` is `None`
/// when the customer has never been confirmed by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    /// Customer identifier.
    pub id: CustomerId,
    /// Exemption category, if any.
    #[serde(default)]
    pub exemption_type: Option<ExemptionType>,
    /// Display name ("First Last").
    #[serde(default)]
    pub display_name: String,
    /// Regions the customer is exempt in, already resolved to state codes.
    #[serde(default)]
    pub exempt_regions: BTreeSet<ExemptRegion>,
    /// Primary address, if the customer has one.
    #[serde(default)]
    pub address: Option<Address>,
    /// Last confirmed sync.
    #[serde(default)]
    pub last_sync: Option<SyncTimestamp>,
}

impl CustomerSnapshot {
    /// Creates a snapshot with no address, regions, exemption or sync history.
    pub fn new(id: impl Into<CustomerId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            exemption_type: None,
            display_name: display_name.into(),
            exempt_regions: BTreeSet::new(),
            address: None,
            last_sync: None,
        }
    }

    /// Sets the exemption type.
    pub fn with_exemption_type(mut self, exemption_type: ExemptionType) -> Self {
        self.exemption_type = Some(exemption_type);
        self
    }

    /// Adds an exempt region.
    pub fn with_exempt_region(mut self, region: ExemptRegion) -> Self {
        self.exempt_regions.insert(region);
        self
    }

    /// Sets the address.
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Sets the last confirmed sync time.
    pub fn with_last_sync(mut self, timestamp: SyncTimestamp) -> Self {
        self.last_sync = Some(timestamp);
        self
    }

    /// Returns true if the customer has been confirmed by the remote service before.
    pub fn has_synced(&self) -> bool {
        self.last_sync.is_some()
    }
}

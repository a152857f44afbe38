use std::fmt;
use serde::{Serialize, Deserialize};

use super::{FeePolicy, SuretyConfig};

/// Named behaviour profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolProfile {
    /// Mirrors the deployed protocol, gaps included
    Reference,
    /// Dedups oracle reports, pins oracle indexes, expires requests and
    /// requires exact fees
    Hardened,
}

impl Default for ProtocolProfile {
    fn default() -> Self {
        ProtocolProfile::Reference
    }
}

impl fmt::Display for ProtocolProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolProfile::Reference => write!(f, "Reference"),
            ProtocolProfile::Hardened => write!(f, "Hardened"),
        }
    }
}

/// Request lifetime used by the hardened profile
pub const HARDENED_REQUEST_TTL: u64 = 256;

impl SuretyConfig {
    pub fn reference() -> Self {
        SuretyConfig::default()
    }

    pub fn hardened() -> Self {
        let mut config = SuretyConfig::default();
        config.admission.fee_policy = FeePolicy::RequireExact;
        config.oracle.strict_dedup = true;
        config.oracle.allow_reregistration = false;
        config.oracle.request_ttl_blocks = Some(HARDENED_REQUEST_TTL);
        config
    }

    pub fn from_profile(profile: ProtocolProfile) -> Self {
        match profile {
            ProtocolProfile::Reference => Self::reference(),
            ProtocolProfile::Hardened => Self::hardened(),
        }
    }

    /// Which profile this configuration's behaviour flags correspond to, if any
    pub fn profile(&self) -> Option<ProtocolProfile> {
        [ProtocolProfile::Reference, ProtocolProfile::Hardened]
            .into_iter()
            .find(|p| Self::from_profile(*p).behaviour_flags() == self.behaviour_flags())
    }

    fn behaviour_flags(&self) -> (FeePolicy, bool, bool, Option<u64>) {
        (
            self.admission.fee_policy,
            self.oracle.strict_dedup,
            self.oracle.allow_reregistration,
            self.oracle.request_ttl_blocks,
        )
    }
}

//! Type-safe brand feature flags
//!
//! RapidPro gates its navigation menu on `BRAND["features"]`. These enums
//! replace a stringly-typed list so a typo in a config file is caught when
//! the file is loaded instead of silently hiding a menu.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A RapidPro brand feature flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Feature {
    Signups,
    Msgs,
    Flows,
    Contacts,
    Triggers,
    Campaigns,
    Globals,
    Api,
    Users,
    Tickets,
    Locations,
    Airtime,
    Ivr,
    Channels,
}

impl Feature {
    /// Flag name as RapidPro expects it in `BRAND["features"]`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signups => "signups",
            Self::Msgs => "msgs",
            Self::Flows => "flows",
            Self::Contacts => "contacts",
            Self::Triggers => "triggers",
            Self::Campaigns => "campaigns",
            Self::Globals => "globals",
            Self::Api => "api",
            Self::Users => "users",
            Self::Tickets => "tickets",
            Self::Locations => "locations",
            Self::Airtime => "airtime",
            Self::Ivr => "ivr",
            Self::Channels => "channels",
        }
    }
}

// ── Identity and account records ──
//
// These types carry everything needed to construct both backends for a
// fireplace. They round-trip through JSON so integrations can persist
// them between sessions (credential fields are therefore plain strings).

use serde::{Deserialize, Serialize};

use firelink_api::CloudCookies;

/// Which backend serves an operation. Read routing and control routing
/// each carry their own `ApiMode`; the two may differ at the same time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApiMode {
    #[default]
    Local,
    Cloud,
}

impl ApiMode {
    /// The other mode.
    pub fn other(self) -> Self {
        match self {
            Self::Local => Self::Cloud,
            Self::Cloud => Self::Local,
        }
    }
}

/// Everything needed to construct both backends for one fireplace.
///
/// The identity fields never change for the lifetime of a façade; only
/// `read_mode` and `control_mode` are mutated, and only by the façade
/// that owns the record, to mirror its active modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonFireplaceData {
    /// Module address on the LAN.
    pub ip_address: String,
    /// Per-fireplace API key (hex), used for local command signing.
    pub api_key: String,
    /// Fireplace serial number, the cloud-side identifier.
    pub serial: String,
    /// Account auth cookie.
    pub auth_cookie: String,
    /// Account user identifier.
    pub user_id: String,
    /// Web client identifier cookie.
    pub web_client_id: String,
    #[serde(default)]
    pub read_mode: ApiMode,
    #[serde(default)]
    pub control_mode: ApiMode,
}

impl CommonFireplaceData {
    /// The cloud cookie set carried by this record.
    pub fn cookies(&self) -> CloudCookies {
        CloudCookies {
            user_id: self.user_id.clone(),
            auth_cookie: self.auth_cookie.clone(),
            web_client_id: self.web_client_id.clone(),
        }
    }
}

/// Account-level record: the cookie set plus one
/// [`CommonFireplaceData`] per fireplace registered to the account.
///
/// Produced by an external account-fetch flow; read-only here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserData {
    pub auth_cookie: String,
    pub user_id: String,
    pub web_client_id: String,
    pub fireplaces: Vec<CommonFireplaceData>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UserData {
    /// Find the record for a given serial number.
    pub fn get_data_for_serial(&self, serial: &str) -> Option<&CommonFireplaceData> {
        self.fireplaces.iter().find(|fp| fp.serial == serial)
    }

    /// Find the record for a given LAN address.
    pub fn get_data_for_ip(&self, ip_address: &str) -> Option<&CommonFireplaceData> {
        self.fireplaces.iter().find(|fp| fp.ip_address == ip_address)
    }
}

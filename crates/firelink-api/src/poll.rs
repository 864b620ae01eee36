// ── Fireplace status snapshot ──
//
// One model serves both backends: the module's local /poll endpoint and
// the cloud's apppoll endpoint return the same logical status under
// slightly different key names (handled with serde aliases). The cloud
// additionally encodes numbers and booleans as JSON strings, so every
// scalar field deserializes through a coercing helper.

use serde::{Deserialize, Serialize};

/// Current status of a fireplace, as reported by either backend.
///
/// Missing fields fall back to the vendor defaults in [`Default`], so a
/// freshly constructed (never polled) backend still yields a usable
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)] // mirrors the wire format
pub struct FireplacePollData {
    #[serde(deserialize_with = "de::int")]
    pub battery: i64,
    pub brand: String,
    #[serde(alias = "remote_connection_quality", deserialize_with = "de::int")]
    pub connection_quality: i64,
    #[serde(alias = "remote_downtime", deserialize_with = "de::int")]
    pub downtime: i64,
    #[serde(deserialize_with = "de::int")]
    pub ecm_latency: i64,
    #[serde(deserialize_with = "de::int_list")]
    pub errors: Vec<i64>,
    #[serde(deserialize_with = "de::int")]
    pub fanspeed: i64,
    #[serde(alias = "height", deserialize_with = "de::int")]
    pub flameheight: i64,
    #[serde(alias = "firmware_version_string")]
    pub fw_ver_str: String,
    #[serde(alias = "firmware_version")]
    pub fw_version: String,
    #[serde(alias = "feature_fan", deserialize_with = "de::bool")]
    pub has_fan: bool,
    #[serde(alias = "feature_light", deserialize_with = "de::bool")]
    pub has_light: bool,
    #[serde(alias = "power_vent", deserialize_with = "de::bool")]
    pub has_power_vent: bool,
    #[serde(alias = "feature_thermostat", deserialize_with = "de::bool")]
    pub has_thermostat: bool,
    pub ipv4_address: String,
    #[serde(alias = "hot", deserialize_with = "de::bool")]
    pub is_hot: bool,
    #[serde(alias = "power", deserialize_with = "de::bool")]
    pub is_on: bool,
    #[serde(alias = "light", deserialize_with = "de::int")]
    pub light_level: i64,
    /// Only reported by the cloud API.
    pub name: String,
    #[serde(alias = "pilot", deserialize_with = "de::bool")]
    pub pilot_on: bool,
    #[serde(deserialize_with = "de::int")]
    pub prepurge: i64,
    /// Thermostat setpoint in hundredths of a degree celsius.
    #[serde(alias = "setpoint", deserialize_with = "de::int")]
    pub raw_thermostat_setpoint: i64,
    /// Only reported by the local API.
    pub serial: String,
    #[serde(alias = "temperature", deserialize_with = "de::int")]
    pub temperature_c: i64,
    #[serde(alias = "thermostat", deserialize_with = "de::bool")]
    pub thermostat_on: bool,
    #[serde(alias = "timer", deserialize_with = "de::bool")]
    pub timer_on: bool,
    #[serde(alias = "timeremaining", deserialize_with = "de::int")]
    pub timeremaining_s: i64,
    #[serde(alias = "remote_uptime", deserialize_with = "de::int")]
    pub uptime: i64,
}

impl Default for FireplacePollData {
    fn default() -> Self {
        Self {
            battery: 0,
            brand: "unset".into(),
            connection_quality: 0,
            downtime: 0,
            ecm_latency: 0,
            errors: Vec::new(),
            fanspeed: 0,
            flameheight: 0,
            fw_ver_str: "unset".into(),
            fw_version: "unset".into(),
            has_fan: false,
            has_light: false,
            has_power_vent: false,
            has_thermostat: false,
            ipv4_address: "127.0.0.1".into(),
            is_hot: false,
            is_on: false,
            light_level: 0,
            name: "unset".into(),
            pilot_on: false,
            prepurge: 0,
            raw_thermostat_setpoint: 2200,
            serial: "unset".into(),
            temperature_c: 18,
            thermostat_on: false,
            timer_on: false,
            timeremaining_s: 0,
            uptime: 0,
        }
    }
}

impl FireplacePollData {
    /// Room temperature in fahrenheit.
    #[allow(clippy::cast_precision_loss)]
    pub fn temperature_f(&self) -> f64 {
        (self.temperature_c as f64) * 9.0 / 5.0 + 32.0
    }

    /// Thermostat setpoint in celsius.
    #[allow(clippy::cast_precision_loss)]
    pub fn thermostat_setpoint_c(&self) -> f64 {
        (self.raw_thermostat_setpoint as f64) / 100.0
    }

    /// Thermostat setpoint in fahrenheit.
    pub fn thermostat_setpoint_f(&self) -> f64 {
        self.thermostat_setpoint_c() * 9.0 / 5.0 + 32.0
    }

    /// Recognized error codes currently reported by the module.
    /// Unknown raw codes are skipped; the raw list stays in `errors`.
    pub fn error_codes(&self) -> Vec<ErrorCode> {
        self.errors.iter().filter_map(|&c| ErrorCode::from_raw(c)).collect()
    }

    /// Whether a specific error is currently reported.
    pub fn has_error(&self, code: ErrorCode) -> bool {
        self.errors.contains(&(code as i64))
    }

    /// Whether any error code is present.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Recognized error codes as a comma-separated string.
    pub fn error_codes_string(&self) -> String {
        self.error_codes()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Vendor error codes reported in the `errors` array of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum ErrorCode {
    PilotFlame = 2,
    Flame = 4,
    FanDelay = 6,
    Maintenance = 64,
    Disabled = 129,
    Fan = 130,
    Lights = 132,
    Accessory = 133,
    SoftLockOut = 134,
    Offline = 642,
    EcmOffline = 3269,
}

impl ErrorCode {
    /// Map a raw code from the wire to a known error, if recognized.
    pub fn from_raw(raw: i64) -> Option<Self> {
        Some(match raw {
            2 => Self::PilotFlame,
            4 => Self::Flame,
            6 => Self::FanDelay,
            64 => Self::Maintenance,
            129 => Self::Disabled,
            130 => Self::Fan,
            132 => Self::Lights,
            133 => Self::Accessory,
            134 => Self::SoftLockOut,
            642 => Self::Offline,
            3269 => Self::EcmOffline,
            _ => return None,
        })
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PilotFlame => "PILOT_FLAME",
            Self::Flame => "FLAME",
            Self::FanDelay => "FAN_DELAY",
            Self::Maintenance => "MAINTENANCE",
            Self::Disabled => "DISABLED",
            Self::Fan => "FAN",
            Self::Lights => "LIGHTS",
            Self::Accessory => "ACCESSORY",
            Self::SoftLockOut => "SOFT_LOCK_OUT",
            Self::Offline => "OFFLINE",
            Self::EcmOffline => "ECM_OFFLINE",
        };
        f.write_str(name)
    }
}

// Coercing deserializers. The local endpoint emits proper JSON types;
// the cloud emits everything as strings ("temperature":"22","power":"0").
mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Bool(bool),
        Str(String),
    }

    fn scalar_to_int<E: serde::de::Error>(s: Scalar) -> Result<i64, E> {
        match s {
            Scalar::Int(i) => Ok(i),
            Scalar::Bool(b) => Ok(i64::from(b)),
            Scalar::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| E::custom(format!("invalid integer: {s:?}"))),
        }
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        scalar_to_int(Scalar::deserialize(d)?)
    }

    pub fn bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Scalar::deserialize(d)? {
            Scalar::Bool(b) => Ok(b),
            other => Ok(scalar_to_int::<D::Error>(other)? != 0),
        }
    }

    pub fn int_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<i64>, D::Error> {
        let raw = Vec::<Scalar>::deserialize(d)?;
        raw.into_iter().map(scalar_to_int::<D::Error>).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn local_poll_parses_native_types() {
        let body = r#"{
            "name": "",
            "serial": "ABCD1234",
            "temperature": 17,
            "battery": 0,
            "pilot": 0,
            "light": 2,
            "height": 3,
            "fanspeed": 1,
            "hot": 0,
            "power": 1,
            "thermostat": 0,
            "setpoint": 0,
            "timer": 0,
            "timeremaining": 0,
            "prepurge": 0,
            "feature_light": 1,
            "feature_thermostat": 1,
            "power_vent": 0,
            "feature_fan": 1,
            "errors": [],
            "fw_version": "0x01000000",
            "fw_ver_str": "0.1.0+hash",
            "downtime": 0,
            "uptime": 10,
            "connection_quality": 987690,
            "ecm_latency": 0,
            "ipv4_address": "192.168.1.80"
        }"#;

        let data: FireplacePollData = serde_json::from_str(body).unwrap();
        assert_eq!(data.serial, "ABCD1234");
        assert_eq!(data.temperature_c, 17);
        assert_eq!(data.flameheight, 3);
        assert!(data.is_on);
        assert!(!data.pilot_on);
        assert!(data.has_fan);
        assert_eq!(data.ipv4_address, "192.168.1.80");
    }

    #[test]
    fn cloud_poll_parses_string_encoded_scalars() {
        // The cloud encodes numbers and flags as strings.
        let body = r#"{
            "name": "undefined",
            "temperature": "22",
            "battery": "0",
            "pilot": "0",
            "light": "3",
            "height": "4",
            "fanspeed": "0",
            "hot": "0",
            "power": "0",
            "thermostat": "0",
            "setpoint": "0",
            "timer": "0",
            "timeremaining": "0",
            "prepurge": "0",
            "feature_light": "1",
            "feature_thermostat": "1",
            "power_vent": "0",
            "feature_fan": "1",
            "errors": [3269],
            "firmware_version": "0x01000000",
            "brand": "H&G"
        }"#;

        let data: FireplacePollData = serde_json::from_str(body).unwrap();
        assert_eq!(data.temperature_c, 22);
        assert_eq!(data.flameheight, 4);
        assert_eq!(data.light_level, 3);
        assert!(data.has_light);
        assert!(!data.is_on);
        assert_eq!(data.brand, "H&G");
        assert_eq!(data.fw_version, "0x01000000");
        assert_eq!(data.error_codes(), vec![ErrorCode::EcmOffline]);
        assert!(data.has_error(ErrorCode::EcmOffline));
        assert_eq!(data.error_codes_string(), "ECM_OFFLINE");
    }

    #[test]
    fn defaults_match_vendor_unset_values() {
        let data = FireplacePollData::default();
        assert_eq!(data.serial, "unset");
        assert_eq!(data.brand, "unset");
        assert_eq!(data.raw_thermostat_setpoint, 2200);
        assert_eq!(data.temperature_c, 18);
        assert_eq!(data.ipv4_address, "127.0.0.1");
        assert!(!data.has_errors());
    }

    #[test]
    fn temperature_conversions() {
        let data = FireplacePollData {
            temperature_c: 20,
            raw_thermostat_setpoint: 2200,
            ..FireplacePollData::default()
        };
        assert!((data.temperature_f() - 68.0).abs() < f64::EPSILON);
        assert!((data.thermostat_setpoint_c() - 22.0).abs() < f64::EPSILON);
        assert!((data.thermostat_setpoint_f() - 71.6).abs() < 1e-9);
    }

    #[test]
    fn unknown_error_codes_are_skipped_but_kept_raw() {
        let data = FireplacePollData {
            errors: vec![2, 9999],
            ..FireplacePollData::default()
        };
        assert_eq!(data.error_codes(), vec![ErrorCode::PilotFlame]);
        assert!(data.has_errors());
        assert_eq!(data.errors.len(), 2);
    }
}

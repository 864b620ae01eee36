// ── Control command table ──
//
// Each command carries its wire name and the inclusive value range the
// module accepts. Both backends take the same `{name}={value}` pair; the
// local backend additionally signs it (see local.rs).

use crate::error::Error;

/// Control commands accepted by a fireplace module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireplaceCommand {
    Power,
    Pilot,
    Beep,
    Light,
    FlameHeight,
    FanSpeed,
    ThermostatSetpoint,
    TimeRemaining,
    SoftReset,
}

impl FireplaceCommand {
    /// Key used in the command body on both surfaces.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Pilot => "pilot",
            Self::Beep => "beep",
            Self::Light => "light",
            Self::FlameHeight => "height",
            Self::FanSpeed => "fanspeed",
            Self::ThermostatSetpoint => "thermostat_setpoint",
            Self::TimeRemaining => "time_remaining",
            Self::SoftReset => "soft_reset",
        }
    }

    /// Inclusive range of values the module accepts for this command.
    pub fn value_range(self) -> std::ops::RangeInclusive<u16> {
        match self {
            Self::Power | Self::Pilot => 0..=1,
            Self::Beep | Self::SoftReset => 1..=1,
            Self::Light => 0..=3,
            Self::FlameHeight | Self::FanSpeed => 0..=4,
            // Hundredths of a degree celsius; 0 disables the thermostat.
            Self::ThermostatSetpoint => 0..=3700,
            // Seconds, in whole minutes, up to three hours.
            Self::TimeRemaining => 0..=10800,
        }
    }

    /// Validate a value against the command's accepted range.
    pub fn validate(self, value: u16) -> Result<(), Error> {
        let range = self.value_range();
        if !range.contains(&value) {
            return Err(Error::InvalidParameter(format!(
                "{}={value} outside accepted range {}..={}",
                self.wire_name(),
                range.start(),
                range.end()
            )));
        }
        if self == Self::TimeRemaining && value % 60 != 0 {
            return Err(Error::InvalidParameter(format!(
                "time_remaining={value} must be a multiple of 60"
            )));
        }
        Ok(())
    }
}

//! LoRa radio parameters: field metadata, validation, presets.
//!
//! The UI never touches the PHY; it only validates what the user typed and
//! hands the resulting values to the mesh engine's preferences.

use core::fmt::Write;

use heapless::String;

use crate::config::NUMERIC_CHARS;
use crate::error::Error;

/// One editable radio parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioField {
    Frequency,
    Bandwidth,
    SpreadingFactor,
    CodingRate,
    TxPower,
}

impl RadioField {
    /// Wizard order; `wizard_step` indexes into this.
    pub const SEQUENCE: [RadioField; 5] = [
        RadioField::Frequency,
        RadioField::Bandwidth,
        RadioField::SpreadingFactor,
        RadioField::CodingRate,
        RadioField::TxPower,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RadioField::Frequency => "Frequency",
            RadioField::Bandwidth => "Bandwidth",
            RadioField::SpreadingFactor => "Spreading factor",
            RadioField::CodingRate => "Coding rate",
            RadioField::TxPower => "TX power",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            RadioField::Frequency => "MHz",
            RadioField::Bandwidth => "kHz",
            RadioField::TxPower => "dBm",
            RadioField::SpreadingFactor | RadioField::CodingRate => "",
        }
    }

    /// Notification text shown when validation fails.
    pub fn invalid_message(self) -> &'static str {
        match self {
            RadioField::Frequency => "Invalid frequency",
            RadioField::Bandwidth => "Invalid bandwidth",
            RadioField::SpreadingFactor => "Invalid SF",
            RadioField::CodingRate => "Invalid CR",
            RadioField::TxPower => "Invalid TX power",
        }
    }

    /// Frequency and bandwidth take one decimal point; the rest are integers.
    pub fn accepts_decimal(self) -> bool {
        matches!(self, RadioField::Frequency | RadioField::Bandwidth)
    }

    /// Whether `c` may be appended to a buffer currently holding `current`.
    pub fn accepts_char(self, current: &str, c: char) -> bool {
        match c {
            '0'..='9' => true,
            '.' => self.accepts_decimal() && !current.contains('.'),
            _ => false,
        }
    }

    /// Parse and range-check `text`.
    pub fn parse(self, text: &str) -> Result<RadioValue, Error> {
        let invalid = Error::InvalidParameter(self);
        if text.is_empty() {
            return Err(invalid);
        }
        match self {
            RadioField::Frequency | RadioField::Bandwidth => {
                let value: f32 = text.parse().map_err(|_| invalid)?;
                let (min, max) = if self == RadioField::Frequency {
                    (400.0, 2500.0)
                } else {
                    (7.8, 500.0)
                };
                if !(min..=max).contains(&value) {
                    return Err(invalid);
                }
                Ok(RadioValue::Decimal(value))
            }
            RadioField::SpreadingFactor | RadioField::CodingRate | RadioField::TxPower => {
                let value: u8 = text.parse().map_err(|_| invalid)?;
                let (min, max) = match self {
                    RadioField::SpreadingFactor => (5, 12),
                    RadioField::CodingRate => (5, 8),
                    _ => (1, 22),
                };
                if !(min..=max).contains(&value) {
                    return Err(invalid);
                }
                Ok(RadioValue::Integer(value))
            }
        }
    }
}

/// A validated parameter value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RadioValue {
    Decimal(f32),
    Integer(u8),
}

/// Radio settings as stored in the node preferences.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioParams {
    pub frequency_mhz: f32,
    pub bandwidth_khz: f32,
    pub spreading_factor: u8,
    pub coding_rate: u8,
    pub tx_power_dbm: u8,
}

impl Default for RadioParams {
    fn default() -> Self {
        Self {
            frequency_mhz: 910.525,
            bandwidth_khz: 62.5,
            spreading_factor: 7,
            coding_rate: 5,
            tx_power_dbm: 22,
        }
    }
}

impl RadioParams {
    /// Store a validated value into the matching field.
    pub fn apply(&mut self, field: RadioField, value: RadioValue) {
        match (field, value) {
            (RadioField::Frequency, RadioValue::Decimal(v)) => self.frequency_mhz = v,
            (RadioField::Bandwidth, RadioValue::Decimal(v)) => self.bandwidth_khz = v,
            (RadioField::SpreadingFactor, RadioValue::Integer(v)) => self.spreading_factor = v,
            (RadioField::CodingRate, RadioValue::Integer(v)) => self.coding_rate = v,
            (RadioField::TxPower, RadioValue::Integer(v)) => self.tx_power_dbm = v,
            _ => {}
        }
    }

    /// Current value of `field` as editable text.
    pub fn format_field(&self, field: RadioField) -> String<NUMERIC_CHARS> {
        match field {
            RadioField::Frequency => format_decimal(self.frequency_mhz, 3),
            RadioField::Bandwidth => format_decimal(self.bandwidth_khz, 2),
            RadioField::SpreadingFactor => format_integer(self.spreading_factor),
            RadioField::CodingRate => format_integer(self.coding_rate),
            RadioField::TxPower => format_integer(self.tx_power_dbm),
        }
    }

    /// Overwrite the four PHY fields from a preset, keeping TX power.
    pub fn apply_preset(&mut self, preset: &RadioPreset) {
        self.frequency_mhz = preset.frequency_mhz;
        self.bandwidth_khz = preset.bandwidth_khz;
        self.spreading_factor = preset.spreading_factor;
        self.coding_rate = preset.coding_rate;
    }
}

/// Format with up to `decimals` places, trimming trailing zeros ("62.5", "250").
pub fn format_decimal(value: f32, decimals: usize) -> String<NUMERIC_CHARS> {
    let mut out: String<NUMERIC_CHARS> = String::new();
    let _ = write!(out, "{:.*}", decimals, value);
    if out.contains('.') {
        while out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }
    }
    out
}

fn format_integer(value: u8) -> String<NUMERIC_CHARS> {
    let mut out = String::new();
    let _ = write!(out, "{value}");
    out
}

/// Named, pre-validated radio configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadioPreset {
    pub name: &'static str,
    pub frequency_mhz: f32,
    pub bandwidth_khz: f32,
    pub spreading_factor: u8,
    pub coding_rate: u8,
}

/// Regional presets offered under Radio Setup.
pub const RADIO_PRESETS: [RadioPreset; 7] = [
    RadioPreset {
        name: "USA/Canada",
        frequency_mhz: 910.525,
        bandwidth_khz: 62.5,
        spreading_factor: 7,
        coding_rate: 5,
    },
    RadioPreset {
        name: "EU/UK Narrow",
        frequency_mhz: 869.618,
        bandwidth_khz: 62.5,
        spreading_factor: 8,
        coding_rate: 8,
    },
    RadioPreset {
        name: "EU/UK Long Range",
        frequency_mhz: 869.525,
        bandwidth_khz: 250.0,
        spreading_factor: 11,
        coding_rate: 5,
    },
    RadioPreset {
        name: "EU/UK Medium",
        frequency_mhz: 869.525,
        bandwidth_khz: 250.0,
        spreading_factor: 10,
        coding_rate: 5,
    },
    RadioPreset {
        name: "Australia",
        frequency_mhz: 915.8,
        bandwidth_khz: 250.0,
        spreading_factor: 10,
        coding_rate: 5,
    },
    RadioPreset {
        name: "New Zealand",
        frequency_mhz: 917.375,
        bandwidth_khz: 250.0,
        spreading_factor: 11,
        coding_rate: 5,
    },
    RadioPreset {
        name: "Czech Narrow",
        frequency_mhz: 869.432,
        bandwidth_khz: 62.5,
        spreading_factor: 7,
        coding_rate: 5,
    },
];

//! Buck converter component dimensioning for the LT3741 power stage.
//!
//! A fixed sequence of textbook formulas: minimum inductance for a 30 %
//! ripple current at the worst-case duty cycle (D = 0.5), inductor peak
//! current at that inductance, and current-sense resistor dissipation.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DesignError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}

/// Operating point of the converter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignInputs {
    /// Current sense resistor, ohms (0 A - 5 A range).
    pub sense_resistance: f64,
    /// Maximum output current, amperes.
    pub output_current: f64,
    /// Input voltage, volts.
    pub input_voltage: f64,
    /// Switching frequency, hertz.
    pub switching_frequency: f64,
    /// MOSFET drain-source on-resistance, ohms.
    pub on_resistance: f64,
}

impl Default for DesignInputs {
    fn default() -> Self {
        Self {
            sense_resistance: 50e-3,
            output_current: 5.0,
            input_voltage: 36.0,
            switching_frequency: 500e3,
            on_resistance: 30e-3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensioning {
    pub inductance_min: f64,
    pub peak_current: f64,
    pub sense_resistance: f64,
    pub sense_power: f64,
    pub on_resistance: f64,
}

/// Evaluate the dimensioning formulas for `inputs`.
pub fn dimension(inputs: &DesignInputs) -> Result<Dimensioning, DesignError> {
    positive("output current", inputs.output_current)?;
    positive("input voltage", inputs.input_voltage)?;
    positive("switching frequency", inputs.switching_frequency)?;

    let v_in = inputs.input_voltage;
    let f_s = inputs.switching_frequency;
    let i_o = inputs.output_current;
    // V_IN^2 * D * (1 - D) at the worst-case duty cycle D = 0.5
    let volt_seconds = v_in.powi(2) / 4.0;

    let inductance_min = volt_seconds / (0.3 * f_s * i_o * v_in);
    let peak_current = i_o + volt_seconds / (2.0 * f_s * inductance_min * v_in);
    let sense_power = inputs.sense_resistance.powi(2) * i_o;

    Ok(Dimensioning {
        inductance_min,
        peak_current,
        sense_resistance: inputs.sense_resistance,
        sense_power,
        on_resistance: inputs.on_resistance,
    })
}

fn positive(name: &'static str, value: f64) -> Result<(), DesignError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(DesignError::NonPositive { name, value })
    }
}

impl fmt::Display for Dimensioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "inductor selection")?;
        writeln!(f, "    inductance (min): {}", format_si(self.inductance_min, "H"))?;
        writeln!(f, "    peak current: {}", format_si(self.peak_current, "A"))?;
        writeln!(f, "current sense resistor selection")?;
        writeln!(f, "    resistance: {}", format_si(self.sense_resistance, "Ohm"))?;
        writeln!(f, "    power: {}", format_si(self.sense_power, "W"))?;
        writeln!(f, "MOSFET selection")?;
        write!(f, "    on-resistance: {}", format_si(self.on_resistance, "Ohm"))
    }
}

/// Format a value with an SI prefix, e.g. `1.2e-5, "H"` -> `"12 µH"`.
pub fn format_si(value: f64, unit: &str) -> String {
    const PREFIXES: [(f64, &str); 8] = [
        (1e9, "G"),
        (1e6, "M"),
        (1e3, "k"),
        (1.0, ""),
        (1e-3, "m"),
        (1e-6, "µ"),
        (1e-9, "n"),
        (1e-12, "p"),
    ];

    if value == 0.0 || !value.is_finite() {
        return format!("{value} {unit}");
    }

    let round3 = |x: f64| (x * 1000.0).round() / 1000.0;
    let magnitude = value.abs();
    let mut index = PREFIXES
        .iter()
        .position(|(scale, _)| magnitude >= *scale)
        .unwrap_or(PREFIXES.len() - 1);
    // Rounding can carry into the next prefix: 0.9999996 is "1", not "1000 m".
    if index > 0 && round3(magnitude / PREFIXES[index].0) >= 1000.0 {
        index -= 1;
    }

    let (scale, prefix) = PREFIXES[index];
    let scaled = round3(value / scale);
    let text = format!("{scaled:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {prefix}{unit}")
}

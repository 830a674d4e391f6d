//! Calculation parameters sent to the solver.
//!
//! [`CalculationParams`] is also the editable form model: its [`Default`] is the
//! documented defaults table, and [`CalculationParams::validate`] is the gate every
//! submission passes before it reaches the remote port.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{InputValidationError, ValidationResult};

pub const DEFAULT_EQUATION: &str = "H2+O2=H2O";
pub const DEFAULT_TARGET_NUM: u32 = 0;
pub const DEFAULT_TARGET_MASS: f64 = 1.0;
pub const DEFAULT_INTIFY: bool = true;
pub const DEFAULT_OUTPUT_PRECISION: u8 = 4;
pub const DEFAULT_FLOAT_TOLERANCE: u8 = 8;
pub const DEFAULT_MAX_COMB: u32 = 15;

pub const OUTPUT_PRECISION_RANGE: RangeInclusive<u8> = 0..=20;
/// Exponent range; the solver uses `10^-x` as its tolerance.
pub const FLOAT_TOLERANCE_RANGE: RangeInclusive<u8> = 1..=15;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal, { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = InputValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(InputValidationError::UnknownVariant {
                        what: $what,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum!(
    /// What the solver computes for the equation.
    CalcMode, "mode", {
        Formula => "formula",
        Balance => "balance",
        #[default]
        Masses => "masses",
    }
);

wire_enum!(
    /// Balancing algorithm requested from the solver.
    Algorithm, "algorithm", {
        #[default]
        Auto => "auto",
        Inv => "inv",
        Gpinv => "gpinv",
        Ppinv => "ppinv",
        Comb => "comb",
    }
);

wire_enum!(
    /// How strictly the solver treats the given coefficients.
    RunMode, "run mode", {
        #[default]
        Balance => "balance",
        Check => "check",
        Force => "force",
    }
);

impl CalcMode {
    /// Only masses mode produces a tabular section.
    pub fn has_tabular(self) -> bool {
        matches!(self, CalcMode::Masses)
    }
}

/// Request payload for one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationParams {
    pub equation: String,
    pub mode: CalcMode,
    pub algorithm: Algorithm,
    pub run_mode: RunMode,
    pub target_num: u32,
    pub target_mass: f64,
    pub intify: bool,
    pub output_precision: u8,
    pub float_tolerance: u8,
    pub max_comb: u32,
}

impl Default for CalculationParams {
    fn default() -> Self {
        Self {
            equation: DEFAULT_EQUATION.to_string(),
            mode: CalcMode::default(),
            algorithm: Algorithm::default(),
            run_mode: RunMode::default(),
            target_num: DEFAULT_TARGET_NUM,
            target_mass: DEFAULT_TARGET_MASS,
            intify: DEFAULT_INTIFY,
            output_precision: DEFAULT_OUTPUT_PRECISION,
            float_tolerance: DEFAULT_FLOAT_TOLERANCE,
            max_comb: DEFAULT_MAX_COMB,
        }
    }
}

impl CalculationParams {
    pub fn with_equation(equation: impl Into<String>) -> Self {
        Self {
            equation: equation.into(),
            ..Self::default()
        }
    }

    /// Check every field against its declared constraint.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.equation.trim().is_empty() {
            return Err(InputValidationError::EmptyEquation);
        }
        if !is_valid_target_mass(self.target_mass) {
            return Err(InputValidationError::TargetMass {
                value: self.target_mass,
            });
        }
        if !OUTPUT_PRECISION_RANGE.contains(&self.output_precision) {
            return Err(InputValidationError::OutputPrecision {
                value: self.output_precision,
            });
        }
        if !FLOAT_TOLERANCE_RANGE.contains(&self.float_tolerance) {
            return Err(InputValidationError::FloatTolerance {
                value: self.float_tolerance,
            });
        }
        if self.max_comb == 0 {
            return Err(InputValidationError::MaxComb {
                value: self.max_comb,
            });
        }
        Ok(())
    }

    /// Tolerance as the solver consumes it.
    pub fn tolerance(&self) -> f64 {
        10f64.powi(-i32::from(self.float_tolerance))
    }
}

pub fn is_valid_target_mass(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

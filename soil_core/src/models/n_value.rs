//! SPT blow count (N value) with an explicit refusal state.
//!
//! A refusal means the sampler could not be driven the full interval. It
//! ranks above every finite count, absorbs all arithmetic, and only turns
//! into the conventional count of 50 when a formula asks for an integer
//! via [`NValue::to_i32`].
//!
//! ## Rounding
//!
//! Scaled and shifted counts round half-up (add 0.5, truncate). Downstream
//! classification thresholds depend on this exact rule.
//!
//! ## JSON
//!
//! A finite count serializes as a plain number, a refusal as `"R"`:
//!
//! ```rust
//! use soil_core::models::NValue;
//!
//! let blows: Vec<NValue> = serde_json::from_str(r#"[12, "R", "r"]"#).unwrap();
//! assert_eq!(blows, vec![NValue::Finite(12), NValue::Refusal, NValue::Refusal]);
//! assert_eq!(serde_json::to_string(&blows).unwrap(), r#"[12,"R","R"]"#);
//! ```

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::idealization::SelectionMethod;

/// Blow count used in formulas for a refusal
pub const REFUSAL_BLOW_COUNT: i32 = 50;

/// SPT N value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawNValue", into = "RawNValue")]
pub enum NValue {
    /// Counted blows
    Finite(u32),
    /// Sampler refusal
    Refusal,
}

/// Wire form: a count or a token
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawNValue {
    Count(u32),
    Token(String),
}

impl TryFrom<RawNValue> for NValue {
    type Error = CalcError;

    fn try_from(raw: RawNValue) -> CalcResult<Self> {
        match raw {
            RawNValue::Count(n) => Ok(NValue::Finite(n)),
            RawNValue::Token(token) => token.parse(),
        }
    }
}

impl From<NValue> for RawNValue {
    fn from(n: NValue) -> Self {
        match n {
            NValue::Finite(count) => RawNValue::Count(count),
            NValue::Refusal => RawNValue::Token("R".to_string()),
        }
    }
}

/// Round half-up onto the non-negative integers.
fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor().max(0.0) as u32
}

impl NValue {
    /// Build from a signed count.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` for negative counts
    pub fn from_i32(n: i32) -> CalcResult<Self> {
        u32::try_from(n)
            .map(NValue::Finite)
            .map_err(|_| CalcError::invalid_input("spt.n", n.to_string(), "N value cannot be negative"))
    }

    /// Integer count for formulas; a refusal counts as 50.
    pub fn to_i32(self) -> i32 {
        match self {
            NValue::Finite(n) => i32::try_from(n).unwrap_or(i32::MAX),
            NValue::Refusal => REFUSAL_BLOW_COUNT,
        }
    }

    pub fn is_refusal(self) -> bool {
        matches!(self, NValue::Refusal)
    }

    /// Scale by a correction factor, rounding half-up.
    pub fn mul_by_f64(self, factor: f64) -> Self {
        match self {
            NValue::Finite(n) => NValue::Finite(round_half_up(n as f64 * factor)),
            NValue::Refusal => NValue::Refusal,
        }
    }

    /// Shift by a scalar, rounding half-up.
    pub fn add_f64(self, other: f64) -> Self {
        match self {
            NValue::Finite(n) => NValue::Finite(round_half_up(n as f64 + other)),
            NValue::Refusal => NValue::Refusal,
        }
    }

    /// Sum two counts; a refusal on either side wins.
    pub fn sum_with(self, other: NValue) -> Self {
        match (self, other) {
            (NValue::Finite(a), NValue::Finite(b)) => NValue::Finite(a.saturating_add(b)),
            _ => NValue::Refusal,
        }
    }

    /// Representative value of several counts at one depth.
    ///
    /// `Min`/`Max` follow the N-value order (refusal is largest). `Avg` of
    /// refusals only is a refusal; a mixed set averages the formula counts
    /// and rounds half-up. No counts yields `Finite(0)`.
    pub fn select(method: SelectionMethod, values: &[NValue]) -> NValue {
        let picked = match method {
            SelectionMethod::Min => values.iter().min().copied(),
            SelectionMethod::Max => values.iter().max().copied(),
            SelectionMethod::Avg if values.is_empty() => None,
            SelectionMethod::Avg if values.iter().all(|n| n.is_refusal()) => Some(NValue::Refusal),
            SelectionMethod::Avg => {
                let sum: f64 = values.iter().map(|n| n.to_i32() as f64).sum();
                Some(NValue::Finite(round_half_up(sum / values.len() as f64)))
            }
        };
        picked.unwrap_or_default()
    }
}

impl Default for NValue {
    fn default() -> Self {
        NValue::Finite(0)
    }
}

impl Ord for NValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (NValue::Finite(a), NValue::Finite(b)) => a.cmp(b),
            (NValue::Finite(_), NValue::Refusal) => Ordering::Less,
            (NValue::Refusal, NValue::Finite(_)) => Ordering::Greater,
            (NValue::Refusal, NValue::Refusal) => Ordering::Equal,
        }
    }
}

impl PartialOrd for NValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for NValue {
    type Err = CalcError;

    /// `"R"` (any case) is a refusal; anything else must be a non-negative
    /// integer.
    fn from_str(s: &str) -> CalcResult<Self> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("r") {
            return Ok(NValue::Refusal);
        }
        token.parse::<u32>().map(NValue::Finite).map_err(|_| {
            CalcError::invalid_input("spt.n", token, "N value must be a non-negative integer or 'R'")
        })
    }
}

impl From<u32> for NValue {
    fn from(n: u32) -> Self {
        NValue::Finite(n)
    }
}

impl std::fmt::Display for NValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NValue::Finite(n) => write!(f, "{}", n),
            NValue::Refusal => write!(f, "R"),
        }
    }
}

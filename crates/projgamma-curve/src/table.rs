//! Device gamma table format.
//!
//! The projector takes one table per colour channel:
//!
//! - [`TABLE_SIZE`] entries, indexed by input code value
//! - 10-bit output codes, `0..=`[`CODE_MAX`]
//! - output codes encode linear light with gamma [`OUTPUT_GAMMA`]

use std::fmt;
use std::ops::Index;

use crate::error::{CurveError, CurveResult};

/// Entries per table.
pub const TABLE_SIZE: usize = 256;

/// Highest output code.
pub const CODE_MAX: u16 = 1023;

/// Gamma of the output code encoding.
pub const OUTPUT_GAMMA: f64 = 2.2;

/// Converts linear light relative to the device peak to an output code.
///
/// `round(l^(1/2.2) * 1023)`, with non-positive (and NaN) input mapped to 0
/// and anything above peak to [`CODE_MAX`].
///
/// # Example
///
/// ```rust
/// use projgamma_curve::table::{quantize, CODE_MAX};
///
/// assert_eq!(quantize(0.0), 0);
/// assert_eq!(quantize(1.0), CODE_MAX);
/// assert_eq!(quantize(4.0), CODE_MAX);
/// ```
#[inline]
pub fn quantize(level: f64) -> u16 {
    if !(level > 0.0) {
        return 0;
    }
    let code = (level.powf(1.0 / OUTPUT_GAMMA) * CODE_MAX as f64).round();
    code.min(CODE_MAX as f64) as u16
}

/// Linear light relative to the device peak for an output code.
#[inline]
pub fn dequantize(code: u16) -> f64 {
    (code.min(CODE_MAX) as f64 / CODE_MAX as f64).powf(OUTPUT_GAMMA)
}

/// A validated device gamma table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeTable {
    codes: Vec<u16>,
}

impl CodeTable {
    /// Linear ramp from 0 to [`CODE_MAX`], the table of a pure 2.2 EOTF.
    pub fn identity() -> Self {
        let codes = (0..TABLE_SIZE)
            .map(|i| (i as f64 / (TABLE_SIZE - 1) as f64 * CODE_MAX as f64).round() as u16)
            .collect();
        Self { codes }
    }

    /// Creates a table from raw codes.
    ///
    /// Fails unless there are exactly [`TABLE_SIZE`] codes, each at most
    /// [`CODE_MAX`].
    pub fn from_codes(codes: Vec<u16>) -> CurveResult<Self> {
        if codes.len() != TABLE_SIZE {
            return Err(CurveError::InvalidSize(format!(
                "expected {TABLE_SIZE} entries, got {}",
                codes.len()
            )));
        }
        if let Some((i, code)) = codes.iter().enumerate().find(|(_, c)| **c > CODE_MAX) {
            return Err(CurveError::InvalidSize(format!(
                "entry {i} is {code}, above {CODE_MAX}"
            )));
        }
        Ok(Self { codes })
    }

    /// Builds a table entry by entry; results are clamped to [`CODE_MAX`].
    pub fn from_fn(mut f: impl FnMut(usize) -> u16) -> Self {
        Self {
            codes: (0..TABLE_SIZE).map(|i| f(i).min(CODE_MAX)).collect(),
        }
    }

    /// Output codes in input order.
    #[inline]
    pub fn codes(&self) -> &[u16] {
        &self.codes
    }

    /// Consumes the table, returning its codes.
    pub fn into_codes(self) -> Vec<u16> {
        self.codes
    }

    /// Returns true if no entry is lower than the one before it.
    pub fn is_monotonic(&self) -> bool {
        self.codes.windows(2).all(|w| w[0] <= w[1])
    }

    /// Highest code in the table.
    pub fn peak(&self) -> u16 {
        self.codes.iter().copied().max().unwrap_or(0)
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::identity()
    }
}

impl Index<usize> for CodeTable {
    type Output = u16;

    fn index(&self, index: usize) -> &u16 {
        &self.codes[index]
    }
}

impl fmt::Display for CodeTable {
    /// Sixteen codes per row, prefixed with the index of the first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.codes.chunks(16).enumerate() {
            write!(f, "{:3}:", row * 16)?;
            for code in chunk {
                write!(f, " {code:4}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A table read back from the device or loaded without parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable(pub CodeTable);

impl RawTable {
    /// The table's codes.
    pub fn table(&self) -> &CodeTable {
        &self.0
    }
}

impl AsRef<CodeTable> for CodeTable {
    fn as_ref(&self) -> &CodeTable {
        self
    }
}

impl AsRef<CodeTable> for RawTable {
    fn as_ref(&self) -> &CodeTable {
        &self.0
    }
}

impl From<CodeTable> for RawTable {
    fn from(table: CodeTable) -> Self {
        Self(table)
    }
}

//! Scalar key components that have no direct std equivalent.
//!
//! [`Decimal`] is a fixed-point number with up to 28 fractional digits.
//! [`DateTime`] is a count of 100ns ticks, so ordering timestamps is
//! ordering integers.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Largest number of fractional digits a [`Decimal`] may carry.
pub const MAX_DECIMAL_SCALE: u8 = 28;

/// A fixed-point decimal: `mantissa / 10^scale`.
///
/// Values compare by numeric value, so `1.50` and `1.5` are equal and
/// hash alike.
///
/// # Invariants
///
/// - `scale <= MAX_DECIMAL_SCALE`.
#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    mantissa: i128,
    scale: u8,
}

impl Decimal {
    /// Zero.
    pub const ZERO: Self = Self {
        mantissa: 0,
        scale: 0,
    };

    /// Smallest representable value.
    pub const MIN: Self = Self {
        mantissa: i128::MIN,
        scale: 0,
    };

    /// Largest representable value.
    pub const MAX: Self = Self {
        mantissa: i128::MAX,
        scale: 0,
    };

    /// Build a decimal from its parts.
    ///
    /// Returns `None` when `scale` exceeds [`MAX_DECIMAL_SCALE`].
    #[must_use]
    pub const fn new(mantissa: i128, scale: u8) -> Option<Self> {
        if scale > MAX_DECIMAL_SCALE {
            return None;
        }
        Some(Self { mantissa, scale })
    }

    /// The unscaled integer value.
    #[must_use]
    pub const fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Number of fractional digits.
    #[must_use]
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// Strip trailing fractional zeros.
    #[must_use]
    pub const fn normalize(self) -> Self {
        let mut mantissa = self.mantissa;
        let mut scale = self.scale;
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        Self { mantissa, scale }
    }

    /// Split into the floor integer part and a non-negative fraction
    /// expressed in units of `10^-scale`.
    fn split(&self) -> (i128, i128) {
        let unit = 10_i128.pow(u32::from(self.scale));
        (
            self.mantissa.div_euclid(unit),
            self.mantissa.rem_euclid(unit),
        )
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (int_a, frac_a) = self.split();
        let (int_b, frac_b) = other.split();
        int_a.cmp(&int_b).then_with(|| {
            // Both fractions are below 10^scale, so rescaling to the wider
            // scale stays below 10^28.
            let scale = self.scale.max(other.scale);
            let a = frac_a * 10_i128.pow(u32::from(scale - self.scale));
            let b = frac_b * 10_i128.pow(u32::from(scale - other.scale));
            a.cmp(&b)
        })
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let normalized = self.normalize();
        normalized.mantissa.hash(state);
        normalized.scale.hash(state);
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self {
            mantissa: i128::from(value),
            scale: 0,
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let unit = 10_u128.pow(u32::from(self.scale));
        let magnitude = self.mantissa.unsigned_abs();
        let sign = if self.mantissa < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:0width$}",
            magnitude / unit,
            magnitude % unit,
            width = usize::from(self.scale)
        )
    }
}

/// A point in time as a signed count of 100ns ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DateTime(pub i64);

impl DateTime {
    /// Earliest representable instant.
    pub const MIN: Self = Self(i64::MIN);
    /// Latest representable instant.
    pub const MAX: Self = Self(i64::MAX);

    /// Tick count.
    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t", self.0)
    }
}

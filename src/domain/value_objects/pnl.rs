use crate::domain::errors::ValidationError;

/// Profit and Loss value object
///
/// Unlike Price, PnL can be negative to represent losses. This type ensures
/// PnL values are valid (finite) but allows negative values.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PnL(f64);

impl PnL {
    /// Create a new PnL value
    ///
    /// # Errors
    /// Returns ValidationError::MustBeFinite if the value is NaN or infinite
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::MustBeFinite);
        }
        Ok(PnL(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Breakeven
    pub fn zero() -> Self {
        PnL(0.0)
    }
}

impl std::fmt::Display for PnL {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 >= 0.0 {
            write!(f, "+{:.2} TND", self.0)
        } else {
            write!(f, "-{:.2} TND", self.0.abs())
        }
    }
}

impl std::ops::Add for PnL {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        // Safe: sum of finite numbers is finite
        PnL(self.0 + other.0)
    }
}

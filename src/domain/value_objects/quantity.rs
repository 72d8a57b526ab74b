use crate::domain::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quantity(f64);

impl Quantity {
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::MustBeFinite);
        }
        if value < 0.0 {
            return Err(ValidationError::InvalidQuantity(
                "must be non-negative".to_string(),
            ));
        }
        Ok(Quantity(value))
    }

    /// Strictly positive quantity, required for orders and open positions
    pub fn positive(value: f64) -> Result<Self, ValidationError> {
        let quantity = Quantity::new(value)?;
        if quantity.0 <= 0.0 {
            return Err(ValidationError::InvalidQuantity(
                "must be greater than 0".to_string(),
            ));
        }
        Ok(quantity)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_new_valid() {
        let qty = Quantity::new(100.0);
        assert!(qty.is_ok());
        assert_eq!(qty.unwrap().value(), 100.0);
    }

    #[test]
    fn test_quantity_new_negative() {
        assert!(Quantity::new(-5.0).is_err());
    }

    #[test]
    fn test_quantity_new_zero() {
        let qty = Quantity::new(0.0);
        assert!(qty.is_ok());
    }

    #[test]
    fn test_quantity_positive_rejects_zero() {
        assert!(Quantity::positive(0.0).is_err());
    }

    #[test]
    fn test_quantity_positive_rejects_negative() {
        assert!(Quantity::positive(-1.0).is_err());
    }

    #[test]
    fn test_quantity_positive_valid() {
        let qty = Quantity::positive(10.0);
        assert!(qty.is_ok());
        assert_eq!(qty.unwrap().value(), 10.0);
    }

    #[test]
    fn test_quantity_new_nan() {
        assert_eq!(Quantity::new(f64::NAN), Err(ValidationError::MustBeFinite));
    }
}

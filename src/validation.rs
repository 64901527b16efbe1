use rust_decimal::Decimal;
use validator::ValidationError;

/// Validates that a monetary amount is zero or positive
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        let mut error = ValidationError::new("invalid_amount");
        error.message = Some("Amount must not be negative".into());
        return Err(error);
    }
    Ok(())
}

/// Validates that a name contains something other than whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Value must not be blank".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_non_negative_amount() {
        assert!(validate_non_negative_amount(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(&Decimal::from_str("0.01").unwrap()).is_ok());
        assert!(validate_non_negative_amount(&Decimal::from_str("-0.01").unwrap()).is_err());
    }

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("groceries").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }
}

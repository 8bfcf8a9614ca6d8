//! Validation Utilities

use validator::ValidationErrors;

use super::error::{AppError, FieldError};

/// Convert validation errors to AppError with the field list attached
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
            })
        })
        .collect();

    AppError::ValidationFields(field_errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 2, message = "too short"))]
        name: String,
    }

    #[test]
    fn test_validation_error_carries_fields() {
        let probe = Probe { name: "x".into() };
        let err = validation_error(probe.validate().unwrap_err());
        match err {
            AppError::ValidationFields(fields) => {
                assert_eq!(fields[0].field, "name");
                assert_eq!(fields[0].message, "too short");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

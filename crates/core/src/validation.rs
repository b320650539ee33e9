//! Bridging `validator` derive results into [`CoreError::InvalidFields`].

use validator::{Validate, ValidationErrors};

use crate::error::{CoreError, FieldErrors};
use crate::item_status::MAX_STATUS_LEN;

/// Minimum password length for user accounts.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of short text columns (`VARCHAR(255)`).
pub const MAX_TEXT_LEN: usize = 255;

/// Run the derived validation rules on `input`.
pub fn validate<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::InvalidFields(to_field_errors(&errors)))
}

/// Flatten `validator` errors into `field -> [message]`.
///
/// Rules without an explicit message get a generic one built from the code.
pub fn to_field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        let field = field.to_string();
        let messages = errs
            .iter()
            .map(|e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("The {} field is invalid ({}).", field, e.code),
            })
            .collect();
        out.insert(field, messages);
    }
    out
}

/// Append a message for `field`.
pub fn push_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.into());
}

/// Turn a collected error map into a result.
pub fn finish(errors: FieldErrors) -> Result<(), CoreError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidFields(errors))
    }
}

/// Item status tags are free-form but must be non-blank and short.
pub fn validate_status_tag(status: &str) -> Result<(), validator::ValidationError> {
    let trimmed = status.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_STATUS_LEN {
        let mut err = validator::ValidationError::new("status_tag");
        err.message = Some(
            format!("The status must be between 1 and {MAX_STATUS_LEN} characters.").into(),
        );
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, max = 5, message = "The name field is required."))]
        name: String,
        #[validate(email)]
        email: String,
        #[validate(custom(function = "validate_status_tag"))]
        status: String,
    }

    #[test]
    fn valid_input_passes() {
        let input = Sample {
            name: "ok".into(),
            email: "a@b.co".into(),
            status: "in_use".into(),
        };
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn errors_are_keyed_by_field() {
        let input = Sample {
            name: String::new(),
            email: "not-an-email".into(),
            status: "   ".into(),
        };
        let err = validate(&input).unwrap_err();
        assert_matches!(err, CoreError::InvalidFields(ref fields) => {
            assert_eq!(fields["name"], vec!["The name field is required.".to_string()]);
            assert!(fields["email"][0].contains("email"));
            assert!(fields["status"][0].contains("between 1 and"));
        });
    }

    #[test]
    fn finish_is_ok_only_when_empty() {
        assert!(finish(FieldErrors::new()).is_ok());
        let mut errors = FieldErrors::new();
        push_error(&mut errors, "email", "taken");
        push_error(&mut errors, "email", "also bad");
        assert_eq!(errors["email"].len(), 2);
        assert!(finish(errors).is_err());
    }
}

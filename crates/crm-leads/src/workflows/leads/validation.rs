use super::domain::{present, LeadIdentity};

/// Identity problems caught before a save is attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeadValidationError {
    #[error("first name is required")]
    MissingFirstName,
    #[error("last name is required")]
    MissingLastName,
    #[error("email address {0:?} is not valid")]
    InvalidEmail(String),
}

/// Returns the first problem found, in form order.
pub fn validate_identity(identity: &LeadIdentity) -> Result<(), LeadValidationError> {
    if !present(&identity.first_name) {
        return Err(LeadValidationError::MissingFirstName);
    }
    if !present(&identity.last_name) {
        return Err(LeadValidationError::MissingLastName);
    }
    if let Some(email) = identity.email.as_deref().map(str::trim) {
        if !email.is_empty() && !is_plausible_email(email) {
            return Err(LeadValidationError::InvalidEmail(email.to_string()));
        }
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    let mut labels = domain.split('.');
    let first = labels.next().unwrap_or_default();
    let rest: Vec<&str> = labels.collect();
    !first.is_empty() && !rest.is_empty() && rest.iter().all(|label| !label.is_empty())
}

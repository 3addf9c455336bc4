use crate::controller::{ ErrorCause, ErrorInfo };

/// Normalizes a raw address string for submission. Only trims and rejects
/// empty input; IP-syntax checking is left to the backend so the client
/// never has to track evolving address-format rules.
pub fn validate(raw: &str) -> Result<String, ErrorInfo> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ErrorInfo {
            message: "please enter an IP address".to_string(),
            cause: ErrorCause::EmptyInput,
        });
    }
    Ok(trimmed.to_string())
}

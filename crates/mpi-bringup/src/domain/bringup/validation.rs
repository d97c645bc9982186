use error_stack::Report;

use super::types::BringUpError;

const MAX_DNS_LABEL_LEN: usize = 63;

/// Object names must be RFC 1123 labels.
pub(crate) fn ensure_dns_label(field: &str, value: &str) -> Result<(), Report<BringUpError>> {
    if value.is_empty() {
        return Err(Report::new(BringUpError::validation(field, "must not be empty")));
    }
    if value.len() > MAX_DNS_LABEL_LEN {
        return Err(Report::new(BringUpError::validation(
            field,
            format!("`{value}` is longer than {MAX_DNS_LABEL_LEN} characters"),
        )));
    }
    let valid_chars = value
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    let alnum_edges = !value.starts_with('-') && !value.ends_with('-');
    if !valid_chars || !alnum_edges {
        return Err(Report::new(BringUpError::validation(
            field,
            format!("`{value}` must consist of lower case alphanumerics or '-', starting and ending with an alphanumeric"),
        )));
    }
    Ok(())
}

pub(crate) fn ensure_not_empty(field: &str, value: &str) -> Result<(), Report<BringUpError>> {
    if value.trim().is_empty() {
        return Err(Report::new(BringUpError::validation(field, "must not be empty")));
    }
    Ok(())
}

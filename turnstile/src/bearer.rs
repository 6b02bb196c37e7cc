use turnstile_jose::JwtRef;

use crate::AuthorizeError;

const BEARER_PREFIX: &str = "bearer ";

/// Extracts the bearer token from the value of an authorization header
///
/// The scheme is matched without regard to case. Everything after the
/// single space that ends the scheme is the token, exactly as given, so
/// `"Bearer  abc"` yields `" abc"` and fails to decompose later.
///
/// ```
/// use turnstile::bearer::extract_bearer_token;
///
/// let token = extract_bearer_token(Some("Bearer eyJ.eyJ.c2ln")).unwrap();
/// assert_eq!(token.as_str(), "eyJ.eyJ.c2ln");
///
/// assert!(extract_bearer_token(Some("Basic xyz")).is_err());
/// assert!(extract_bearer_token(None).is_err());
/// ```
///
/// # Errors
///
/// [`AuthorizeError::MissingHeader`] if the header is absent or empty, or
/// [`AuthorizeError::MalformedHeader`] if it does not carry a bearer token.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&JwtRef, AuthorizeError> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AuthorizeError::MissingHeader),
    };

    let scheme_matches = header
        .get(..BEARER_PREFIX.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(BEARER_PREFIX));
    if !scheme_matches {
        return Err(AuthorizeError::MalformedHeader);
    }

    let token = &header[BEARER_PREFIX.len()..];
    if token.is_empty() {
        return Err(AuthorizeError::MalformedHeader);
    }

    Ok(JwtRef::from_str(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_case_insensitive() {
        for header in ["Bearer abc", "bearer abc", "BEARER abc", "bEaReR abc"] {
            let token = extract_bearer_token(Some(header)).unwrap();
            assert_eq!(token.as_str(), "abc");
        }
    }

    #[test]
    fn remainder_is_not_trimmed() {
        let token = extract_bearer_token(Some("Bearer  abc.def.ghi")).unwrap();
        assert_eq!(token.as_str(), " abc.def.ghi");

        let token = extract_bearer_token(Some("Bearer abc.def.ghi ")).unwrap();
        assert_eq!(token.as_str(), "abc.def.ghi ");
    }

    #[test]
    fn absent_or_empty_header_is_missing() {
        assert!(matches!(
            extract_bearer_token(None),
            Err(AuthorizeError::MissingHeader)
        ));
        assert!(matches!(
            extract_bearer_token(Some("")),
            Err(AuthorizeError::MissingHeader)
        ));
    }

    #[test]
    fn other_schemes_are_malformed() {
        for header in ["Basic xyz", "Bearer", "Bearerabc", "Token abc", "abc.def.ghi"] {
            assert!(
                matches!(
                    extract_bearer_token(Some(header)),
                    Err(AuthorizeError::MalformedHeader)
                ),
                "{header:?}"
            );
        }
    }

    #[test]
    fn empty_token_is_malformed() {
        assert!(matches!(
            extract_bearer_token(Some("Bearer ")),
            Err(AuthorizeError::MalformedHeader)
        ));
    }

    #[test]
    fn multibyte_prefix_does_not_panic() {
        assert!(matches!(
            extract_bearer_token(Some("Beärer abc")),
            Err(AuthorizeError::MalformedHeader)
        ));
    }
}

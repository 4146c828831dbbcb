//! Validation helpers and reset-link construction.

use regex::Regex;

/// Last line of defense; richer validation lives in the client.
pub(super) const MIN_PASSWORD_LEN: usize = 8;

pub(super) const ROLES: [&str; 3] = ["guest", "member", "admin"];
pub(super) const WORK_AREAS: [&str; 5] = ["", "north", "central", "south", "east"];
pub(super) const IDENTITY_TYPES: [&str; 3] = ["", "public", "private"];

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

pub(super) fn long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub(super) fn all_digits(password: &str) -> bool {
    !password.is_empty() && password.chars().all(|ch| ch.is_ascii_digit())
}

pub(super) fn valid_role(role: &str) -> bool {
    ROLES.contains(&role)
}

pub(super) fn valid_work_area(work_area: &str) -> bool {
    WORK_AREAS.contains(&work_area)
}

pub(super) fn valid_identity_type(identity_type: &str) -> bool {
    IDENTITY_TYPES.contains(&identity_type)
}

/// Build the frontend reset link included in outbound emails.
/// The plaintext reset token only ever travels inside this link.
pub(super) fn build_reset_url(frontend_base_url: &str, token: &str) -> String {
    let base = frontend_base_url.trim_end_matches('/');
    format!("{base}/reset-password/{token}")
}

/// Plain-text body for the reset email.
pub(super) fn reset_email_body(reset_url: &str) -> String {
    format!(
        "You are receiving this email because a password reset was requested \
         for your account.\n\
         \n\
         Follow this link to choose a new password:\n\
         \n\
         {reset_url}\n\
         \n\
         The link expires in 10 minutes.\n\
         \n\
         If you did not request a password reset, you can ignore this email."
    )
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn password_minimum_is_eight_chars() {
        assert!(!long_enough("short1!"));
        assert!(long_enough("longpass"));
    }

    #[test]
    fn all_digits_detection() {
        assert!(all_digits("12345678"));
        assert!(!all_digits("1234567a"));
        assert!(!all_digits(""));
    }

    #[test]
    fn role_enum_values() {
        assert!(valid_role("guest"));
        assert!(valid_role("member"));
        assert!(valid_role("admin"));
        assert!(!valid_role("root"));
        assert!(!valid_role(""));
    }

    #[test]
    fn work_area_enum_values() {
        assert!(valid_work_area(""));
        assert!(valid_work_area("north"));
        assert!(!valid_work_area("invalid-zone"));
    }

    #[test]
    fn identity_type_enum_values() {
        assert!(valid_identity_type(""));
        assert!(valid_identity_type("public"));
        assert!(valid_identity_type("private"));
        assert!(!valid_identity_type("secret"));
    }

    #[test]
    fn build_reset_url_trims_trailing_slash() {
        let url = build_reset_url("https://app.anagrafe.dev/", "token");
        assert_eq!(url, "https://app.anagrafe.dev/reset-password/token");
    }

    #[test]
    fn reset_email_mentions_link_and_expiry() {
        let body = reset_email_body("https://app.anagrafe.dev/reset-password/abc");
        assert!(body.contains("https://app.anagrafe.dev/reset-password/abc"));
        assert!(body.contains("expires in 10 minutes"));
        assert!(body.contains("did not request"));
    }
}

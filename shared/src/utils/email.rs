//! Email address helpers

/// Trim and lower-case an address; invitations and accounts are keyed this way
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Mask an email address for logs (e.g., a***@example.com)
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}

//! Password checks for login.

use store::User;

/// Decides whether a presented password matches a user.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, user: &User, password: &str) -> bool;
}

/// Exact comparison against the stored password.
///
/// Stored passwords are plaintext. Swap in a salted-hash verifier once
/// stored credentials are migrated; callers only see [`CredentialVerifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn verify(&self, user: &User, password: &str) -> bool {
        user.password == password
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Role;

    fn user(password: &str) -> User {
        User {
            id: "u1".to_string(),
            role: Role::Customer,
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn plaintext_requires_exact_match() {
        let verifier = PlaintextVerifier;
        assert!(verifier.verify(&user("secret"), "secret"));
        assert!(!verifier.verify(&user("secret"), "Secret"));
        assert!(!verifier.verify(&user("secret"), "secret "));
    }
}

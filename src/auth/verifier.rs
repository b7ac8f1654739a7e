//! Constant-time credential verification
//!
//! Both the candidate password and the stored secret are hashed with
//! SHA-256 before comparison, so the comparison always runs over two 32-byte
//! digests. Unknown users are compared against a random decoy secret and the
//! verdict is combined from presence and equality without branching.

use crate::auth::secret_store::SecretStore;
use crate::error::{InterviewError, Result};
use crate::session::Session;
use sha2::{Digest, Sha256};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

type SecretDigest = Zeroizing<[u8; 32]>;

fn digest(bytes: &[u8]) -> SecretDigest {
    Zeroizing::new(Sha256::digest(bytes).into())
}

/// Checks username/password pairs against a [`SecretStore`]
///
/// # Examples
///
/// ```
/// use interview_keeper::auth::{CredentialVerifier, StaticSecretStore};
///
/// let verifier = CredentialVerifier::new(Box::new(StaticSecretStore::from_pairs([
///     ("alice", "wonderland"),
/// ])));
/// assert!(verifier.verify("alice", "wonderland"));
/// assert!(!verifier.verify("alice", "wonderlant"));
/// assert!(!verifier.verify("mallory", "wonderland"));
/// ```
pub struct CredentialVerifier {
    store: Box<dyn SecretStore>,
    decoy: Zeroizing<[u8; 32]>,
}

impl CredentialVerifier {
    /// Creates a verifier over the given store
    pub fn new(store: Box<dyn SecretStore>) -> Self {
        Self {
            store,
            decoy: Zeroizing::new(rand::random::<[u8; 32]>()),
        }
    }

    /// Returns `true` iff `username` exists and its secret equals `password`
    ///
    /// A store failure counts as a rejection.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let stored = match self.store.lookup(username) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(username = %username, error = %e, "Secret lookup failed");
                None
            }
        };

        let known = Choice::from(u8::from(stored.is_some()));
        let expected = match &stored {
            Some(secret) => digest(secret.as_bytes()),
            None => digest(&self.decoy[..]),
        };
        let candidate = digest(password.as_bytes());

        bool::from(known & candidate[..].ct_eq(&expected[..]))
    }

    /// Verifies a login attempt and opens a session on success
    ///
    /// The password buffer is wiped before this returns, whatever the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns [`InterviewError::AuthenticationRejected`] when the pair does
    /// not match; the caller may retry.
    pub fn login(&self, username: &str, password: Zeroizing<String>) -> Result<Session> {
        let accepted = self.verify(username, &password);
        drop(password);

        if accepted {
            tracing::info!(username = %username, "Login succeeded");
            Ok(Session::start(username))
        } else {
            tracing::warn!(username = %username, "Login rejected");
            Err(InterviewError::AuthenticationRejected.into())
        }
    }
}

//! Shared fixtures for the client tests.

use std::sync::OnceLock;

use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;

use crate::credentials::ServiceAccountKey;

pub const CLIENT_EMAIL: &str = "bot@livelo-intel.iam.gserviceaccount.com";

/// One 2048-bit key per test binary; generation is slow.
pub fn private_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("keygen failed"))
}

pub fn service_account(token_uri: &str) -> ServiceAccountKey {
    let pem = private_key()
        .to_pkcs8_pem(LineEnding::LF)
        .expect("pem encode failed")
        .to_string();
    ServiceAccountKey {
        client_email: CLIENT_EMAIL.into(),
        private_key: pem,
        project_id: None,
        private_key_id: None,
        token_uri: token_uri.into(),
    }
}

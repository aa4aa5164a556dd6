//! Account-key protection using the secrecy crate
//!
//! The account key grants full access to the database account, so it is held
//! in a [`Secret`] wrapper: memory is zeroed on drop, Debug output is
//! redacted, and reading the value requires an explicit `expose_secret()`
//! call at the single place the transport hands it to the SDK.

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Newtype wrapper for String implementing the traits `Secret` requires
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl From<SecretValue> for String {
    fn from(mut s: SecretValue) -> Self {
        std::mem::take(&mut s.0)
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A protected string: zeroed on drop, redacted in Debug output
pub type SecretString = Secret<SecretValue>;

/// Wraps a String in a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_expose_secret() {
        let secret = secret_string("account-key".to_string());
        assert_eq!(secret.expose_secret().as_ref(), "account-key");
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = secret_string("account-key".to_string());
        let output = format!("{secret:?}");
        assert!(!output.contains("account-key"));
    }

    #[test]
    fn test_serde_round_trip() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            key: SecretString,
        }

        let json = r#"{"key":"k-123"}"#;
        let wrapper: Wrapper = serde_json::from_str(json).unwrap();
        assert_eq!(wrapper.key.expose_secret().as_ref(), "k-123");
    }
}

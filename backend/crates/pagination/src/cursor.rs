//! Opaque cursor encoding.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors raised while decoding a client-supplied cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The cursor is not valid URL-safe base64.
    #[error("cursor is not valid base64: {message}")]
    Encoding {
        /// Decoder diagnostic.
        message: String,
    },
    /// The decoded bytes do not describe a key of the expected shape.
    #[error("cursor payload is malformed: {message}")]
    Payload {
        /// Deserialiser diagnostic.
        message: String,
    },
}

/// Position marker carrying the ordering key of the last row on a page.
///
/// # Examples
/// ```
/// use pagination::Cursor;
///
/// let cursor = Cursor::new("SKU-0042".to_owned());
/// let token = cursor.encode().expect("string keys serialise");
/// let decoded = Cursor::<String>::decode(&token).expect("valid token");
/// assert_eq!(decoded.key(), "SKU-0042");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap an ordering key.
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the ordering key.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Consume the cursor and return its key.
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Encode the key as URL-safe base64 JSON.
    ///
    /// # Errors
    /// Returns [`CursorError::Payload`] when the key cannot be serialised.
    pub fn encode(&self) -> Result<String, CursorError> {
        let json = serde_json::to_vec(&self.key).map_err(|err| CursorError::Payload {
            message: err.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Decode a token produced by [`Cursor::encode`].
    ///
    /// # Errors
    /// Returns [`CursorError::Encoding`] for malformed base64 and
    /// [`CursorError::Payload`] when the JSON does not match `K`.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|err| CursorError::Encoding {
                message: err.to_string(),
            })?;
        let key = serde_json::from_slice(&bytes).map_err(|err| CursorError::Payload {
            message: err.to_string(),
        })?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn integer_keys_survive_encoding() {
        let token = Cursor::new(42_i32).encode().expect("encode");
        let decoded = Cursor::<i32>::decode(&token).expect("decode");
        assert_eq!(decoded.into_key(), 42);
    }

    #[rstest]
    fn tokens_are_url_safe() {
        let token = Cursor::new("a/b+c?d=e".to_owned()).encode().expect("encode");
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[rstest]
    #[case("not base64!")]
    #[case("%%%")]
    fn rejects_malformed_base64(#[case] token: &str) {
        let result = Cursor::<i32>::decode(token);
        assert!(matches!(result, Err(CursorError::Encoding { .. })));
    }

    #[rstest]
    fn rejects_keys_of_the_wrong_type() {
        let token = Cursor::new("SKU-1".to_owned()).encode().expect("encode");
        let result = Cursor::<i32>::decode(&token);
        assert!(matches!(result, Err(CursorError::Payload { .. })));
    }
}

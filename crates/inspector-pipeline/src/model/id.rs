//! Field identities used as cache keys.
//!
//! Identities are 16-byte hashes derived with SHA-256, in one of two scopes:
//! - **Persistent**: declaring type + field path. Shared by every instance of
//!   the type, so state keyed this way belongs to the kind of field.
//! - **Volatile**: editing session + field path. A new session yields new
//!   keys, so state keyed this way never leaks between inspectors.

use std::fmt;

use sha2::{Digest, Sha256};

/// A 16-byte hashed identifier.
pub type Id = [u8; 16];

/// The zero identifier.
pub const NIL_ID: Id = [0u8; 16];

/// Domain separator for persistent field identities.
const PERSISTENT_PREFIX: &[u8] = b"inspector:persistent:";

/// Domain separator for volatile field identities.
const VOLATILE_PREFIX: &[u8] = b"inspector:volatile:";

/// Derives a UUIDv8-shaped identifier from input bytes using SHA-256.
///
/// ```text
/// hash = SHA-256(input_bytes)[0:16]
/// hash[6] = (hash[6] & 0x0F) | 0x80  // version 8
/// hash[8] = (hash[8] & 0x3F) | 0x80  // RFC 4122 variant
/// ```
pub fn derived_id(input: &[u8]) -> Id {
    let hash = Sha256::digest(input);
    let mut id = [0u8; 16];
    id.copy_from_slice(&hash[..16]);

    id[6] = (id[6] & 0x0F) | 0x80;
    id[8] = (id[8] & 0x3F) | 0x80;

    id
}

/// Formats an identifier as non-hyphenated lowercase hex.
pub fn format_id(id: &Id) -> String {
    let mut s = String::with_capacity(32);
    for byte in id {
        s.push_str(&format!("{:02x}", byte));
    }
    s
}

/// Identifies one editing session (one open inspector over a set of targets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Id);

impl SessionId {
    /// Creates a fresh random session id.
    pub fn new() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Creates a session id from raw bytes.
    pub fn from_bytes(bytes: Id) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &Id {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_id(&self.0))
    }
}

/// Scope of a [`FieldIdentity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Persistent,
    Volatile,
}

/// A key naming one field occurrence for caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldIdentity {
    Persistent(Id),
    Volatile(Id),
}

impl FieldIdentity {
    /// Derives the persistent identity for a field of a declaring type.
    ///
    /// ```text
    /// id = derived_id("inspector:persistent:" || declaring_type || 0x00 || field_path)
    /// ```
    ///
    /// The separator byte keeps ("ab", "c") and ("a", "bc") apart.
    pub fn persistent(declaring_type: &str, field_path: &str) -> Self {
        let mut input =
            Vec::with_capacity(PERSISTENT_PREFIX.len() + declaring_type.len() + 1 + field_path.len());
        input.extend_from_slice(PERSISTENT_PREFIX);
        input.extend_from_slice(declaring_type.as_bytes());
        input.push(0);
        input.extend_from_slice(field_path.as_bytes());
        FieldIdentity::Persistent(derived_id(&input))
    }

    /// Derives the volatile identity for a field within an editing session.
    ///
    /// ```text
    /// id = derived_id("inspector:volatile:" || session_id || field_path)
    /// ```
    pub fn volatile(session: SessionId, field_path: &str) -> Self {
        let mut input = Vec::with_capacity(VOLATILE_PREFIX.len() + 16 + field_path.len());
        input.extend_from_slice(VOLATILE_PREFIX);
        input.extend_from_slice(session.as_bytes());
        input.extend_from_slice(field_path.as_bytes());
        FieldIdentity::Volatile(derived_id(&input))
    }

    /// Returns the scope of this identity.
    pub fn kind(&self) -> KeyKind {
        match self {
            FieldIdentity::Persistent(_) => KeyKind::Persistent,
            FieldIdentity::Volatile(_) => KeyKind::Volatile,
        }
    }

    /// Returns the raw identifier bytes.
    pub fn id(&self) -> &Id {
        match self {
            FieldIdentity::Persistent(id) | FieldIdentity::Volatile(id) => id,
        }
    }
}

impl fmt::Display for FieldIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIdentity::Persistent(id) => write!(f, "p:{}", format_id(id)),
            FieldIdentity::Volatile(id) => write!(f, "v:{}", format_id(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_id_version_and_variant() {
        let id = derived_id(b"test");
        assert_eq!(id[6] & 0xF0, 0x80);
        assert_eq!(id[8] & 0xC0, 0x80);
    }

    #[test]
    fn test_derived_id_deterministic() {
        let id1 = derived_id(b"hello world");
        let id2 = derived_id(b"hello world");
        assert_eq!(id1, id2);
        assert_ne!(id1, derived_id(b"different"));
    }

    #[test]
    fn test_persistent_identity_is_instance_agnostic() {
        let a = FieldIdentity::persistent("Enemy", "health");
        let b = FieldIdentity::persistent("Enemy", "health");
        assert_eq!(a, b);
        assert_eq!(a.kind(), KeyKind::Persistent);

        assert_ne!(a, FieldIdentity::persistent("Enemy", "armor"));
        assert_ne!(a, FieldIdentity::persistent("Player", "health"));
    }

    #[test]
    fn test_persistent_identity_separator() {
        let a = FieldIdentity::persistent("ab", "c");
        let b = FieldIdentity::persistent("a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_volatile_identity_per_session() {
        let s1 = SessionId::new();
        let s2 = SessionId::new();
        assert_ne!(s1, s2);

        let a = FieldIdentity::volatile(s1, "waypoints");
        assert_eq!(a, FieldIdentity::volatile(s1, "waypoints"));
        assert_ne!(a, FieldIdentity::volatile(s2, "waypoints"));
        assert_eq!(a.kind(), KeyKind::Volatile);
    }

    #[test]
    fn test_scopes_never_collide() {
        let session = SessionId::from_bytes(NIL_ID);
        let p = FieldIdentity::persistent("", "x");
        let v = FieldIdentity::volatile(session, "x");
        assert_ne!(p.id(), v.id());
    }

    #[test]
    fn test_display() {
        let id = FieldIdentity::persistent("Enemy", "health");
        let s = id.to_string();
        assert!(s.starts_with("p:"));
        assert_eq!(s.len(), 34);
    }
}

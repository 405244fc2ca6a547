//! Identifiers for cluster entities and workload objects.
//!
//! The cluster mints its own identifiers (node names, service identifiers,
//! the active configuration profile). They are opaque tokens: the harness
//! compares them for equality and passes them back verbatim, never parsing
//! them for meaning.

use std::fmt;

use rand::Rng;

/// Macro to generate opaque string token wrappers.
///
/// Each token type wraps a `String` minted by the cluster and provides:
/// - Type safety (can't pass a `ServiceId` where a `NodeName` is expected)
/// - Equality/ordering by the raw token (never by parsed content)
/// - Cheap construction from anything string-like
macro_rules! define_token {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw token as minted by the cluster.
            #[must_use]
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            /// Returns the raw token.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(token: &str) -> Self {
                Self::new(token)
            }
        }

        impl From<String> for $name {
            fn from(token: String) -> Self {
                Self(token)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_token!(NodeName, "Name of a cluster node, as reported by the cluster.");
define_token!(
    ServiceId,
    "Opaque identifier of a per-node service process, minted by the cluster."
);
define_token!(
    ProfileId,
    "Opaque token identifying the active cluster configuration profile."
);

/// Identifier of a workload object: two independently drawn random 64-bit
/// integers, rendered `"a:b"`.
///
/// Ids are generated from an injected random source so test runs can be
/// made deterministic. Collision probability across one run is treated as
/// negligible; ids are not deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    hi: u64,
    lo: u64,
}

impl ObjectId {
    /// Creates an object id from its two halves.
    #[must_use]
    pub const fn new(hi: u64, lo: u64) -> Self {
        Self { hi, lo }
    }

    /// Draws a fresh object id from the given random source.
    #[must_use]
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        Self {
            hi: rng.gen(),
            lo: rng.gen(),
        }
    }

    /// Returns the two halves.
    #[must_use]
    pub const fn parts(self) -> (u64, u64) {
        (self.hi, self.lo)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hi, self.lo)
    }
}

impl std::str::FromStr for ObjectId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hi, lo) = s.split_once(':').unwrap_or((s, ""));
        Ok(Self {
            hi: hi.parse()?,
            lo: lo.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeSet;

    #[test]
    fn test_token_equality_is_opaque() {
        let a = NodeName::new("node-1");
        let b = NodeName::new("node-1");
        let c = NodeName::new("node-2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str(), "node-1");
    }

    #[test]
    fn test_object_id_rendering() {
        let id = ObjectId::new(17, 42);
        assert_eq!(id.to_string(), "17:42");
        assert_eq!("17:42".parse::<ObjectId>().unwrap(), id);
    }

    #[test]
    fn test_object_id_deterministic_for_seed() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(7);
        let mut rng2 = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(ObjectId::generate(&mut rng1), ObjectId::generate(&mut rng2));
    }

    #[test]
    fn test_object_ids_pairwise_distinct() {
        // Statistical, not by construction: 10k draws from one stream.
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let ids: BTreeSet<ObjectId> = (0..10_000).map(|_| ObjectId::generate(&mut rng)).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_object_id_parse_rejects_garbage() {
        assert!("not-an-id".parse::<ObjectId>().is_err());
        assert!("12".parse::<ObjectId>().is_err());
        assert!("a:b".parse::<ObjectId>().is_err());
    }
}

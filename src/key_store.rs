//! An immutable catalog of [`SecretKey`](crate::secret_key::SecretKey)s,
//! indexed by 4-bit key id, with exactly one key marked active.

use std::collections::BTreeMap;

use crate::error::IdMaskError;
use crate::secret_key::SecretKey;

/// An immutable catalog of [`SecretKey`]s, indexed by 4-bit key id, with
/// exactly one key marked active.
///
/// Once built, a `KeyStore` is read-only for the lifetime of the engines
/// bound to it; rotating keys means building a new store (and a new
/// engine around it), not mutating this one. Dropping a `KeyStore` drops
/// (and zeroizes) every key it holds — that is the entirety of the
/// "clearing" lifecycle `spec.md` alludes to; there is no explicit `clear()`
/// method because Rust's ownership model already gives callers that for
/// free.
pub struct KeyStore {
    keys: BTreeMap<u8, SecretKey>,
    active_key_id: u8,
}

impl KeyStore {
    /// Builds a store from one mandatory active key plus any number of
    /// additional (e.g. retiring) keys.
    ///
    /// # Errors
    /// Returns [`IdMaskError::InvalidArgument`] if `others` contains a key
    /// whose id collides with `active`'s id or with another entry in
    /// `others`.
    pub fn new(active: SecretKey, others: Vec<SecretKey>) -> Result<Self, IdMaskError> {
        let active_key_id = active.key_id();
        let mut keys = BTreeMap::new();
        keys.insert(active_key_id, active);
        for key in others {
            if keys.insert(key.key_id(), key).is_some() {
                return Err(IdMaskError::InvalidArgument("duplicate key id in key store"));
            }
        }
        Ok(Self { keys, active_key_id })
    }

    /// The key currently used to mint new tokens.
    #[must_use]
    pub fn active_key(&self) -> &SecretKey {
        self.keys.get(&self.active_key_id).expect("active key id is always resident")
    }

    /// Looks up a key by id, returning `None` if absent rather than
    /// panicking — callers (the engines) turn `None` into
    /// [`IdMaskError::StateMismatch`] on the `unmask` path, per `spec.md`
    /// Open Question 4.
    #[must_use]
    pub fn key(&self, id: u8) -> Option<&SecretKey> {
        self.keys.get(&id)
    }

    /// Number of keys resident in the store.
    #[must_use]
    pub fn size(&self) -> usize {
        self.keys.len()
    }

    /// Ids of every key resident in the store, in ascending order.
    pub fn key_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.keys.keys().copied()
    }
}

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Password based key derivation (PBKDF2-HMAC-SHA256).

use std::fmt;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// PBKDF2 round count.
pub const ITERATIONS: u32 = 100_000;
/// Derived key length in bytes.
pub const KEY_LEN: usize = 32;
/// Per-file salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Symmetric key derived from a password.
///
/// Never stored anywhere, restore recomputes it from the password
/// and the salt embedded in the trailer. Wiped on drop.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Key as base64url text (padded).
    pub fn to_base64url(&self) -> String {
        URL_SAFE.encode(&*self.0)
    }

    pub fn from_base64url(s: &str) -> Result<Self> {
        let raw = Zeroizing::new(URL_SAFE.decode(s).map_err(|_| Error::KeyDerivation)?);
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        if raw.len() != KEY_LEN {
            return Err(Error::KeyDerivation);
        }
        key.copy_from_slice(&raw);
        Ok(Self(key))
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl Eq for DerivedKey {}

/// Derives a key from password and salt.
///
/// Deterministic: same password and salt always give the same key.
/// Empty password is accepted (it just makes a weak key).
pub fn derive_key(password: &str, salt: &[u8]) -> Result<DerivedKey> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, ITERATIONS, &mut *key)
        .map_err(|_| Error::KeyDerivation)?;
    Ok(DerivedKey(key))
}

/// Fresh random salt for a new shuffled file.
pub fn random_salt<R: RngCore + ?Sized>(random: &mut R) -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    random.fill_bytes(&mut salt);
    salt
}

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

//! Shuffle metadata and its sealed (encrypted) form.
//!
//! Sealed layout, as stored after the trailer tag:
//!
//! ```text
//! version (1) || salt (16) || nonce (12) || ciphertext || gcm tag (16)
//! ```
//!
//! The ciphertext is the JSON encoding of [Metadata].

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cipher;
use crate::error::{Error, Result};
use crate::key::{derive_key, random_salt, SALT_LEN};
use crate::shuffle::{Grid, Permutation};

pub const FORMAT_VERSION: u8 = 1;

/// Everything restore needs besides the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub rows: usize,
    pub cols: usize,
    pub permutation: Permutation,
    pub original_height: usize,
    pub original_width: usize,
}

impl Metadata {
    pub fn new(grid: Grid, permutation: Permutation, height: usize, width: usize) -> Self {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            permutation,
            original_height: height,
            original_width: width,
        }
    }

    pub fn grid(&self) -> Result<Grid> {
        Grid::new(self.rows, self.cols)
    }

    /// Encrypts under a key derived from `password` and a fresh salt.
    pub fn seal<R: RngCore + ?Sized>(&self, password: &str, random: &mut R) -> Result<Vec<u8>> {
        let salt = random_salt(random);
        let key = derive_key(password, &salt)?;
        let plaintext = serde_json::to_vec(self)?;
        let ciphertext = cipher::encrypt(&key, &plaintext)?;
        debug!(
            plaintext = plaintext.len(),
            ciphertext = ciphertext.len(),
            "sealed metadata"
        );

        let mut out = Vec::with_capacity(1 + SALT_LEN + ciphertext.len());
        out.push(FORMAT_VERSION);
        out.extend_from_slice(&salt);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Reverses [Metadata::seal].
    ///
    /// A wrong password surfaces as [Error::Authentication].
    pub fn open(sealed: &[u8], password: &str) -> Result<Self> {
        let (&version, rest) = sealed.split_first().ok_or(Error::Authentication)?;
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        if rest.len() < SALT_LEN {
            return Err(Error::Authentication);
        }
        let (salt, ciphertext) = rest.split_at(SALT_LEN);

        let key = derive_key(password, salt)?;
        let plaintext = cipher::decrypt(&key, ciphertext)?;
        let metadata: Self = serde_json::from_slice(&plaintext)?;
        debug!(rows = metadata.rows, cols = metadata.cols, "opened metadata");
        Ok(metadata)
    }
}

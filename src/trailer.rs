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

//! Tagged file layout: `image bytes || TAG || sealed metadata`.
//!
//! The tag is a plain delimiter and is also how a shuffled file is
//! recognized. Splitting uses the first occurrence of the tag, so an image
//! encoding that happens to contain the tag cannot be restored (the
//! sealed part then fails to authenticate).

use crate::error::{Error, Result};

/// Marker between the encoded image and the sealed metadata.
pub const TAG: &[u8] = b"--tryduck--";

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Returns `tag || ciphertext`, to be appended after the image bytes.
pub fn build_trailer(tag: &[u8], ciphertext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tag.len() + ciphertext.len());
    out.extend_from_slice(tag);
    out.extend_from_slice(ciphertext);
    out
}

/// Splits a file into `(image bytes, ciphertext)` at the first `tag`.
pub fn split_trailer<'a>(file: &'a [u8], tag: &[u8]) -> Result<(&'a [u8], &'a [u8])> {
    let at = find(file, tag).ok_or(Error::UnrecognizedFormat)?;
    Ok((&file[..at], &file[at + tag.len()..]))
}

/// Whether the file carries the tryduck tag.
pub fn is_tagged(file: &[u8]) -> bool {
    find(file, TAG).is_some()
}

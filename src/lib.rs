//! Library to scramble an image block-wise and undo it with a password.
//!
//! The image is cut into a `rows x cols` grid ([Grid]) and the blocks are
//! shuffled ([shuffle()]). The block order ([Permutation]) is
//! encrypted with a password-derived key and appended to the encoded
//! image after a fixed tag ([trailer::TAG]). [restore()] reads it back and
//! puts every block where it came from.
//!
//! * No pixel is duplicated nor removed, content inside a block stays as is.
//! * Images not divisible by the grid are zero padded on the bottom/right,
//!   restore crops the padding away.
//! * Only the block order is secret, the image data itself is not encrypted.

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//

pub mod cipher;
pub mod error;
pub mod fetch;
pub mod key;
pub mod metadata;
pub mod pipeline;
pub mod raster;
mod shuffle;
pub mod trailer;

pub use crate::error::{Error, Result};
pub use crate::metadata::Metadata;
pub use crate::pipeline::{restore_image, shuffle_image, RestoreOptions, ShuffleOptions, Source};
pub use crate::raster::Raster;
#[doc(inline)]
pub use crate::shuffle::{restore, shuffle, Grid, Permutation};

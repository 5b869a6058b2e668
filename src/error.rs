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

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to derive encryption key")]
    KeyDerivation,

    #[error("Failed to encrypt shuffle metadata")]
    Encryption,

    /// Wrong password, or the trailer was corrupted/tampered with.
    #[error("Wrong password or corrupted shuffle metadata")]
    Authentication,

    #[error("The image was not shuffled by tryduck")]
    UnrecognizedFormat,

    #[error("Unsupported trailer version {0}")]
    UnsupportedVersion(u8),

    #[error("Invalid grid {rows}x{cols} for {height}x{width} image")]
    InvalidGrid {
        rows: usize,
        cols: usize,
        height: usize,
        width: usize,
    },

    #[error("Image does not match recorded grid: {0}")]
    GridMismatch(String),

    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Output file '{}' already exists. Choose a different name.", .0.display())]
    OutputExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

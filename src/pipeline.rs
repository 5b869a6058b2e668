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

//! The two user facing operations, shuffle and restore.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::fetch::fetch;
use crate::metadata::Metadata;
use crate::raster::{is_lossy, Raster};
use crate::shuffle::{self, Grid};
use crate::trailer::{build_trailer, split_trailer, TAG};

/// Where the image to shuffle comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    fn read(&self) -> Result<Vec<u8>> {
        match self {
            Self::Path(p) => Ok(fs::read(p)?),
            Self::Url(u) => fetch(u),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShuffleOptions {
    pub source: Source,
    pub output: PathBuf,
    pub password: String,
    pub grid: Grid,
    /// Seed for reproducible block order. Random if `None`.
    pub seed: Option<String>,
}

impl Default for ShuffleOptions {
    fn default() -> Self {
        Self {
            source: Source::Path(PathBuf::new()),
            output: PathBuf::new(),
            password: String::new(),
            grid: Grid::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub password: String,
}

fn ensure_absent(output: &Path) -> Result<()> {
    if output.exists() {
        return Err(Error::OutputExists(output.to_owned()));
    }
    Ok(())
}

fn output_format(output: &Path) -> Result<ImageFormat> {
    let format = ImageFormat::from_path(output).map_err(Error::Encode)?;
    if is_lossy(format) {
        warn!(
            ?format,
            "lossy output format, restored image will not be bit-exact"
        );
    }
    Ok(format)
}

/// Writes to a temporary file next to `output`, then moves it in place
/// without replacing anything that appeared in the meantime.
fn write_new(output: &Path, parts: &[&[u8]]) -> Result<()> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    for part in parts {
        tmp.write_all(part)?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist_noclobber(output).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            Error::OutputExists(output.to_owned())
        } else {
            Error::Io(e.error)
        }
    })?;
    Ok(())
}

fn rng(seed: Option<&str>) -> Xoshiro256StarStar {
    match seed {
        Some(seed) => {
            let mut hasher = Sha256::new();
            hasher.update(seed);
            Xoshiro256StarStar::from_seed(hasher.finalize().into())
        }
        None => Xoshiro256StarStar::from_entropy(),
    }
}

/// Shuffles the source image and writes it, trailer included, to
/// `options.output`.
pub fn shuffle_image(options: &ShuffleOptions) -> Result<()> {
    ensure_absent(&options.output)?;
    let format = output_format(&options.output)?;

    let raster = Raster::decode(&options.source.read()?)?;
    let (height, width) = (raster.height(), raster.width());
    debug!(height, width, color = ?raster.color, "decoded source");

    let mut random = rng(options.seed.as_deref());
    let (pixels, permutation) =
        shuffle::shuffle(raster.pixels.view(), options.grid, &mut random)?;
    let image = Raster::new(pixels, raster.color).encode(format)?;

    let metadata = Metadata::new(options.grid, permutation, height, width);
    let sealed = metadata.seal(&options.password, &mut rand::thread_rng())?;

    let trailer = build_trailer(TAG, &sealed);
    write_new(&options.output, &[image.as_slice(), trailer.as_slice()])?;
    debug!(output = %options.output.display(), "wrote shuffled image");
    Ok(())
}

/// Restores a file written by [shuffle_image].
pub fn restore_image(options: &RestoreOptions) -> Result<()> {
    ensure_absent(&options.output)?;
    let format = output_format(&options.output)?;

    let file = fs::read(&options.input)?;
    let (image, sealed) = split_trailer(&file, TAG)?;
    let metadata = Metadata::open(sealed, &options.password)?;
    let grid = metadata.grid()?;

    let raster = Raster::decode(image)?;
    debug!(
        height = raster.height(),
        width = raster.width(),
        "decoded shuffled image"
    );

    let pixels = shuffle::restore(
        raster.pixels.view(),
        grid,
        &metadata.permutation,
        metadata.original_height,
        metadata.original_width,
    )?;
    let image = Raster::new(pixels, raster.color).encode(format)?;

    write_new(&options.output, &[image.as_slice()])?;
    debug!(output = %options.output.display(), "wrote restored image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rng_is_reproducible() {
        use rand::Rng;

        let a: u64 = rng(Some("duck")).gen();
        let b: u64 = rng(Some("duck")).gen();
        let c: u64 = rng(Some("goose")).gen();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn write_new_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");

        write_new(&path, &[b"one".as_slice(), b"two".as_slice()]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"onetwo");

        assert!(matches!(
            write_new(&path, &[b"three".as_slice()]),
            Err(Error::OutputExists(_))
        ));
        assert_eq!(fs::read(&path).unwrap(), b"onetwo");
    }

    #[test]
    fn unknown_extension() {
        assert!(matches!(
            output_format(Path::new("out.unknownext")),
            Err(Error::Encode(_))
        ));
        assert_eq!(output_format(Path::new("a/b.png")).unwrap(), ImageFormat::Png);
    }
}

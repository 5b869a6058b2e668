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

//! Image decode/encode into plain `(height, width, bytes per pixel)` arrays.

use std::io::{self, Cursor};

use image::io::Reader as ImageReader;
use image::{ColorType, ImageFormat};
use ndarray::prelude::*;

use crate::error::{Error, Result};

/// Decoded image.
///
/// Channels are the raw bytes of a pixel, so 16-bit and float images
/// go through the shuffle untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub pixels: Array3<u8>,
    pub color: ColorType,
}

impl Raster {
    pub fn new(pixels: Array3<u8>, color: ColorType) -> Self {
        Self { pixels, color }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let im = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .decode()
            .map_err(Error::Decode)?;

        let (width, height) = (im.width() as usize, im.height() as usize);
        let color = im.color();
        let pixels = Array3::from_shape_vec(
            (height, width, color.bytes_per_pixel() as usize),
            im.into_bytes(),
        )
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(Self { pixels, color })
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>> {
        let (height, width, _) = self.pixels.dim();
        let pixels = self.pixels.as_standard_layout();

        let mut out = Cursor::new(Vec::new());
        image::write_buffer_with_format(
            &mut out,
            pixels.as_slice().expect("Should be standard-layout"),
            dim_u32(width)?,
            dim_u32(height)?,
            self.color,
            format,
        )
        .map_err(Error::Encode)?;

        Ok(out.into_inner())
    }
}

fn dim_u32(v: usize) -> Result<u32> {
    u32::try_from(v).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidInput, e)))
}

/// Whether re-encoding in `format` can change pixel values.
pub fn is_lossy(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Avif)
}

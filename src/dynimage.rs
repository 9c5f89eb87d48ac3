// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bridges to the `image` crate.
//!
//! Decoding and encoding stay with `image`; these only move a decoded
//! buffer into a carver and the visible result back out.

use crate::error::{CarverError, Result};
use crate::pixel::{ImageType, PixelData, PixelLayout};
use crate::seamcarver::Carver;
use image::{
    DynamicImage, ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgb32FImage, Rgba, Rgba32FImage,
};
use std::convert::TryFrom;
use tracing::debug;

fn buffer<P: Pixel>(
    width: u32,
    height: u32,
    data: Vec<P::Subpixel>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    ImageBuffer::from_raw(width, height, data).ok_or_else(|| {
        CarverError::Bounds(format!("carved buffer does not fill a {}x{} image", width, height))
    })
}

fn layout(image_type: ImageType) -> Result<PixelLayout> {
    PixelLayout::new(image_type)
}

impl Carver {
    /// Build a carver over a decoded image.  Grey, grey-alpha, RGB and
    /// RGBA images keep their own encoding; anything else is converted
    /// to 8-bit RGBA first.
    pub fn from_image(img: &DynamicImage) -> Result<Self> {
        let (width, height) = (img.width() as usize, img.height() as usize);
        match img {
            DynamicImage::ImageLuma8(b) => Carver::new(b.as_raw().clone(), width, height, layout(ImageType::Grey)?),
            DynamicImage::ImageLumaA8(b) => Carver::new(b.as_raw().clone(), width, height, layout(ImageType::GreyA)?),
            DynamicImage::ImageRgb8(b) => Carver::new(b.as_raw().clone(), width, height, layout(ImageType::Rgb)?),
            DynamicImage::ImageRgba8(b) => Carver::new(b.as_raw().clone(), width, height, layout(ImageType::Rgba)?),
            DynamicImage::ImageLuma16(b) => Carver::new(b.as_raw().clone(), width, height, layout(ImageType::Grey)?),
            DynamicImage::ImageLumaA16(b) => Carver::new(b.as_raw().clone(), width, height, layout(ImageType::GreyA)?),
            DynamicImage::ImageRgb16(b) => Carver::new(b.as_raw().clone(), width, height, layout(ImageType::Rgb)?),
            DynamicImage::ImageRgba16(b) => Carver::new(b.as_raw().clone(), width, height, layout(ImageType::Rgba)?),
            DynamicImage::ImageRgb32F(b) => Carver::new(b.as_raw().clone(), width, height, layout(ImageType::Rgb)?),
            DynamicImage::ImageRgba32F(b) => Carver::new(b.as_raw().clone(), width, height, layout(ImageType::Rgba)?),
            other => {
                debug!(color = ?other.color(), "converting to rgba8");
                Carver::new(other.to_rgba8().into_raw(), width, height, layout(ImageType::Rgba)?)
            }
        }
    }

    /// The visible image as a `DynamicImage`.  Only the layouts and
    /// encodings `image` itself can hold are supported.
    pub fn to_image(&self) -> Result<DynamicImage> {
        let dimension = |v: usize| {
            u32::try_from(v)
                .map_err(|_| CarverError::Bounds(format!("dimension {} too large for an image", v)))
        };
        let (width, height) = (dimension(self.width())?, dimension(self.height())?);
        let image_type = self.layout().image_type();

        let img = match (self.pixels(), image_type) {
            (PixelData::U8(_), ImageType::Grey) => {
                DynamicImage::ImageLuma8(buffer::<Luma<u8>>(width, height, self.to_vec()?)?)
            }
            (PixelData::U8(_), ImageType::GreyA) => {
                DynamicImage::ImageLumaA8(buffer::<LumaA<u8>>(width, height, self.to_vec()?)?)
            }
            (PixelData::U8(_), ImageType::Rgb) => {
                DynamicImage::ImageRgb8(buffer::<Rgb<u8>>(width, height, self.to_vec()?)?)
            }
            (PixelData::U8(_), ImageType::Rgba) => {
                DynamicImage::ImageRgba8(buffer::<Rgba<u8>>(width, height, self.to_vec()?)?)
            }
            (PixelData::U16(_), ImageType::Grey) => {
                DynamicImage::ImageLuma16(buffer::<Luma<u16>>(width, height, self.to_vec()?)?)
            }
            (PixelData::U16(_), ImageType::GreyA) => {
                DynamicImage::ImageLumaA16(buffer::<LumaA<u16>>(width, height, self.to_vec()?)?)
            }
            (PixelData::U16(_), ImageType::Rgb) => {
                DynamicImage::ImageRgb16(buffer::<Rgb<u16>>(width, height, self.to_vec()?)?)
            }
            (PixelData::U16(_), ImageType::Rgba) => {
                DynamicImage::ImageRgba16(buffer::<Rgba<u16>>(width, height, self.to_vec()?)?)
            }
            (PixelData::F32(_), ImageType::Rgb) => {
                let img: Rgb32FImage = buffer(width, height, self.to_vec()?)?;
                DynamicImage::ImageRgb32F(img)
            }
            (PixelData::F32(_), ImageType::Rgba) => {
                let img: Rgba32FImage = buffer(width, height, self.to_vec()?)?;
                DynamicImage::ImageRgba32F(img)
            }
            (data, image_type) => {
                return Err(CarverError::Configuration(format!(
                    "no image encoding holds {:?} {:?} pixels",
                    data.depth(),
                    image_type
                )))
            }
        };
        Ok(img)
    }
}

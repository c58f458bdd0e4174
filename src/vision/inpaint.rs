// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inpainting backends
//!
//! The OpenCV backend (Telea fast-marching) is part of the default build and
//! needs a system OpenCV install. Builds with `--no-default-features` have no
//! backend, and text removal is reported as unavailable.

use image::{GrayImage, RgbImage};
use std::sync::Arc;

/// Default neighbourhood radius considered around each masked pixel
pub const DEFAULT_INPAINT_RADIUS: u32 = 3;

/// Reconstructs masked pixels from their surroundings
pub trait Inpainter: Send + Sync {
    fn name(&self) -> &str;

    /// Fill every pixel where `mask` is non-zero
    ///
    /// `mask` has the same dimensions as `image`; the result must too.
    fn inpaint(&self, image: &RgbImage, mask: &GrayImage, radius: u32) -> anyhow::Result<RgbImage>;
}

/// Best backend compiled into this build, if any
pub fn default_inpainter() -> Option<Arc<dyn Inpainter>> {
    #[cfg(feature = "opencv")]
    {
        Some(Arc::new(OpenCvInpainter))
    }
    #[cfg(not(feature = "opencv"))]
    {
        tracing::warn!("Built without the `opencv` feature; text removal is unavailable");
        None
    }
}

#[cfg(feature = "opencv")]
pub use self::opencv_backend::OpenCvInpainter;

#[cfg(feature = "opencv")]
mod opencv_backend {
    use anyhow::Context;
    use image::{GrayImage, Rgb, RgbImage};
    use opencv::core::{Mat, Scalar, VecN, CV_8UC1, CV_8UC3};
    use opencv::photo;
    use opencv::prelude::*;

    use super::Inpainter;

    /// Telea fast-marching inpainting via OpenCV
    #[derive(Debug, Default, Clone, Copy)]
    pub struct OpenCvInpainter;

    impl Inpainter for OpenCvInpainter {
        fn name(&self) -> &str {
            "opencv-telea"
        }

        fn inpaint(
            &self,
            image: &RgbImage,
            mask: &GrayImage,
            radius: u32,
        ) -> anyhow::Result<RgbImage> {
            let (width, height) = image.dimensions();
            if mask.dimensions() != (width, height) {
                anyhow::bail!(
                    "Mask is {}x{} but image is {}x{}",
                    mask.width(),
                    mask.height(),
                    width,
                    height
                );
            }

            let mut src = Mat::new_rows_cols_with_default(
                height as i32,
                width as i32,
                CV_8UC3,
                Scalar::all(0.0),
            )?;
            let mut src_mask = Mat::new_rows_cols_with_default(
                height as i32,
                width as i32,
                CV_8UC1,
                Scalar::all(0.0),
            )?;

            for (x, y, pixel) in image.enumerate_pixels() {
                *src.at_2d_mut::<VecN<u8, 3>>(y as i32, x as i32)? = VecN(pixel.0);
                *src_mask.at_2d_mut::<u8>(y as i32, x as i32)? = mask.get_pixel(x, y)[0];
            }

            let mut dst = Mat::default();
            photo::inpaint(&src, &src_mask, &mut dst, radius as f64, photo::INPAINT_TELEA)
                .context("OpenCV inpaint failed")?;

            let mut result = RgbImage::new(width, height);
            for y in 0..height {
                for x in 0..width {
                    let pixel = dst.at_2d::<VecN<u8, 3>>(y as i32, x as i32)?;
                    result.put_pixel(x, y, Rgb(pixel.0));
                }
            }

            Ok(result)
        }
    }

}

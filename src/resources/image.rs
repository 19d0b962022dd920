//! In-memory images and pixel-level iteration.
//!
//! An [`Image`] is a `width × height` grid of [`Color`] pixels addressed by
//! `(x, y)` with `0 <= x < width` and `0 <= y < height`. Every bulk
//! operation walks the grid with `x` as the outer loop and `y` as the inner
//! loop.
//!
//! Bulk writes happen inside a [`PixelLock`], which a rendering backend can
//! use to batch uploads. The lock is released when the guard drops, so an
//! early return or a panic inside a transform still releases it.

use std::convert::Infallible;
use std::fmt;
use std::ops::{Deref, DerefMut, Index, IndexMut};

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLANK: Color = Color::new(0, 0, 0, 0);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0, 255);
    pub const GREEN: Color = Color::new(0, 255, 0, 255);
    pub const BLUE: Color = Color::new(0, 0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with every channel but alpha inverted.
    pub fn inverted(self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b, self.a)
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to load `{filename}`: {reason}")]
    Load { filename: String, reason: String },

    #[error("pixel ({x}, {y}) is outside a {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("expected {expected} pixels, got {actual}")]
    PixelCount { expected: usize, actual: usize },
}

/// Pixel grid with lock bookkeeping for bulk writes.
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    locked: bool,
    lock_count: usize,
}

impl Image {
    pub const BITS_PER_PIXEL: u32 = 32;

    /// Image filled with a single color.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
            locked: false,
            lock_count: 0,
        }
    }

    /// Build from row-major pixel data (`pixels[y * width + x]`).
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(ImageError::PixelCount {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            locked: false,
            lock_count: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alias of [`width`](Self::width).
    pub fn w(&self) -> u32 {
        self.width
    }

    /// Alias of [`height`](Self::height).
    pub fn h(&self) -> u32 {
        self.height
    }

    pub fn bits_per_pixel(&self) -> u32 {
        Self::BITS_PER_PIXEL
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    fn out_of_bounds(&self, x: u32, y: u32) -> ImageError {
        ImageError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) -> Result<(), ImageError> {
        let i = self.offset(x, y).ok_or_else(|| self.out_of_bounds(x, y))?;
        self.pixels[i] = color;
        Ok(())
    }

    /// Acquire the pixel lock until the returned guard drops.
    pub fn lock(&mut self) -> PixelLock<'_> {
        self.locked = true;
        self.lock_count += 1;
        trace!("Locked {:?}", self);
        PixelLock { image: self }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// How many times the lock has been acquired over this image's lifetime.
    pub fn lock_count(&self) -> usize {
        self.lock_count
    }

    /// Every pixel, `x` outer and `y` inner.
    pub fn pixels(&self) -> Pixels<'_> {
        Pixels {
            inner: self.pixels_with_pos(),
        }
    }

    /// Every pixel with its position, `x` outer and `y` inner.
    pub fn pixels_with_pos(&self) -> PixelsWithPos<'_> {
        PixelsWithPos {
            image: self,
            x: 0,
            y: 0,
        }
    }

    /// Fallible in-place transform. Stops at the first error; pixels already
    /// visited keep their new value.
    pub fn try_map_with_pos_in_place<E, F>(&mut self, mut f: F) -> Result<&mut Self, E>
    where
        F: FnMut(u32, u32, Color) -> Result<Color, E>,
    {
        {
            let mut image = self.lock();
            let (width, height) = (image.width, image.height);
            for x in 0..width {
                for y in 0..height {
                    let i = y as usize * width as usize + x as usize;
                    let current = image.pixels[i];
                    image.pixels[i] = f(x, y, current)?;
                }
            }
        }
        Ok(self)
    }

    pub fn try_map_in_place<E, F>(&mut self, mut f: F) -> Result<&mut Self, E>
    where
        F: FnMut(Color) -> Result<Color, E>,
    {
        self.try_map_with_pos_in_place(|_, _, c| f(c))
    }

    /// Replace every pixel with `f(x, y, pixel)`.
    pub fn map_with_pos_in_place<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(u32, u32, Color) -> Color,
    {
        match self.try_map_with_pos_in_place(|x, y, c| Ok::<_, Infallible>(f(x, y, c))) {
            Ok(image) => image,
            Err(never) => match never {},
        }
    }

    /// Replace every pixel with `f(pixel)`.
    pub fn map_in_place<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(Color) -> Color,
    {
        self.map_with_pos_in_place(|_, _, c| f(c))
    }

    /// Transformed copy; `self` is left untouched.
    pub fn map<F>(&self, f: F) -> Image
    where
        F: FnMut(Color) -> Color,
    {
        let mut copy = self.clone();
        copy.map_in_place(f);
        copy
    }

    /// Transformed copy with positions; `self` is left untouched.
    pub fn map_with_pos<F>(&self, f: F) -> Image
    where
        F: FnMut(u32, u32, Color) -> Color,
    {
        let mut copy = self.clone();
        copy.map_with_pos_in_place(f);
        copy
    }
}

impl Clone for Image {
    /// Independent pixel copy. Lock bookkeeping starts fresh.
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
            locked: false,
            lock_count: 0,
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("w", &self.width)
            .field("h", &self.height)
            .finish()
    }
}

impl Index<(u32, u32)> for Image {
    type Output = Color;

    /// Panics outside `[0, width) × [0, height)`.
    fn index(&self, (x, y): (u32, u32)) -> &Color {
        match self.offset(x, y) {
            Some(i) => &self.pixels[i],
            None => panic!("{}", self.out_of_bounds(x, y)),
        }
    }
}

impl IndexMut<(u32, u32)> for Image {
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut Color {
        match self.offset(x, y) {
            Some(i) => &mut self.pixels[i],
            None => panic!("{}", self.out_of_bounds(x, y)),
        }
    }
}

impl<'a> IntoIterator for &'a Image {
    type Item = Color;
    type IntoIter = Pixels<'a>;

    fn into_iter(self) -> Pixels<'a> {
        self.pixels()
    }
}

/// Scoped pixel lock. Derefs to the locked image.
pub struct PixelLock<'a> {
    image: &'a mut Image,
}

impl Deref for PixelLock<'_> {
    type Target = Image;

    fn deref(&self) -> &Image {
        self.image
    }
}

impl DerefMut for PixelLock<'_> {
    fn deref_mut(&mut self) -> &mut Image {
        self.image
    }
}

impl Drop for PixelLock<'_> {
    fn drop(&mut self) {
        self.image.locked = false;
        trace!("Unlocked {:?}", self.image);
    }
}

/// Iterator over `(x, y, pixel)`. Clone it to restart.
#[derive(Clone)]
pub struct PixelsWithPos<'a> {
    image: &'a Image,
    x: u32,
    y: u32,
}

impl Iterator for PixelsWithPos<'_> {
    type Item = (u32, u32, Color);

    fn next(&mut self) -> Option<Self::Item> {
        if self.x >= self.image.width || self.image.height == 0 {
            return None;
        }
        let (x, y) = (self.x, self.y);
        let pixel = self.image.get(x, y)?;
        self.y += 1;
        if self.y >= self.image.height {
            self.y = 0;
            self.x += 1;
        }
        Some((x, y, pixel))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.image.height == 0 || self.x >= self.image.width {
            0
        } else {
            let h = self.image.height as usize;
            (self.image.width - self.x) as usize * h - self.y as usize
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PixelsWithPos<'_> {}

/// Iterator over pixels only. Clone it to restart.
#[derive(Clone)]
pub struct Pixels<'a> {
    inner: PixelsWithPos<'a>,
}

impl Iterator for Pixels<'_> {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        self.inner.next().map(|(_, _, c)| c)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Pixels<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> Image {
        let mut image = Image::new(w, h, Color::BLANK);
        for x in 0..w {
            for y in 0..h {
                image[(x, y)] = Color::new(x as u8, y as u8, 0, 255);
            }
        }
        image
    }

    #[test]
    fn test_new_fills_every_pixel() {
        let image = Image::new(3, 2, Color::RED);
        assert_eq!(image.w(), 3);
        assert_eq!(image.h(), 2);
        assert_eq!(image.pixels().count(), 6);
        assert!(image.pixels().all(|c| c == Color::RED));
    }

    #[test]
    fn test_iteration_order_is_x_outer_y_inner() {
        let image = gradient(2, 3);
        let positions: Vec<(u32, u32)> = image.pixels_with_pos().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
        for (x, y, c) in image.pixels_with_pos() {
            assert_eq!(c, Color::new(x as u8, y as u8, 0, 255));
        }
    }

    #[test]
    fn test_iterators_restart_and_report_len() {
        let image = gradient(4, 4);
        let iter = image.pixels();
        assert_eq!(iter.len(), 16);
        let first: Vec<Color> = iter.clone().collect();
        let second: Vec<Color> = iter.collect();
        assert_eq!(first, second);
        assert_eq!((&image).into_iter().count(), 16);
    }

    #[test]
    fn test_empty_image_iterates_nothing() {
        assert_eq!(Image::new(0, 5, Color::RED).pixels().count(), 0);
        assert_eq!(Image::new(5, 0, Color::RED).pixels_with_pos().count(), 0);
    }

    #[test]
    fn test_map_in_place_mutates_and_locks_once() {
        let mut image = Image::new(2, 2, Color::BLACK);
        let mut visits = 0;
        let returned = image.map_in_place(|c| {
            visits += 1;
            c.inverted()
        });
        assert_eq!(returned.lock_count(), 1);
        assert_eq!(visits, 4);
        assert!(!image.is_locked());
        assert!(image.pixels().all(|c| c == Color::WHITE));
    }

    #[test]
    fn test_map_returns_copy() {
        let image = gradient(3, 3);
        let copy = image.map_with_pos(|x, y, _| if x == y { Color::WHITE } else { Color::BLACK });
        assert_eq!(copy[(1, 1)], Color::WHITE);
        assert_eq!(copy[(0, 1)], Color::BLACK);
        assert_eq!(image[(1, 1)], Color::new(1, 1, 0, 255));
        assert_eq!(image.lock_count(), 0);
        assert_eq!(copy.lock_count(), 1);
    }

    #[test]
    fn test_lock_released_when_transform_fails() {
        let mut image = Image::new(2, 2, Color::BLACK);
        let result = image.try_map_with_pos_in_place(|x, _, c| {
            if x == 1 { Err("stop") } else { Ok(c.inverted()) }
        });
        assert_eq!(result.err(), Some("stop"));
        assert!(!image.is_locked());
        assert_eq!(image.lock_count(), 1);
        assert_eq!(image[(0, 0)], Color::WHITE);
        assert_eq!(image[(1, 0)], Color::BLACK);
    }

    #[test]
    fn test_lock_released_when_transform_panics() {
        let mut image = Image::new(2, 2, Color::BLACK);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            image.map_in_place(|_| panic!("bad pixel"));
        }));
        assert!(outcome.is_err());
        assert!(!image.is_locked());
        assert_eq!(image.lock_count(), 1);
    }

    #[test]
    fn test_lock_guard_derefs_to_image() {
        let mut image = Image::new(1, 1, Color::BLACK);
        {
            let mut lock = image.lock();
            assert!(lock.is_locked());
            lock.set(0, 0, Color::GREEN).unwrap();
        }
        assert!(!image.is_locked());
        assert_eq!(image.get(0, 0), Some(Color::GREEN));
    }

    #[test]
    fn test_bounds() {
        let mut image = Image::new(2, 2, Color::BLACK);
        assert_eq!(image.get(2, 0), None);
        assert!(matches!(
            image.set(0, 2, Color::WHITE),
            Err(ImageError::OutOfBounds { x: 0, y: 2, .. })
        ));
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_bounds_panics() {
        let image = Image::new(2, 2, Color::BLACK);
        let _pixel = image[(5, 5)];
    }

    #[test]
    fn test_from_pixels_checks_len() {
        assert!(Image::from_pixels(2, 2, vec![Color::RED; 4]).is_ok());
        assert!(matches!(
            Image::from_pixels(2, 2, vec![Color::RED; 3]),
            Err(ImageError::PixelCount { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_debug_shows_dimensions() {
        assert_eq!(format!("{:?}", Image::new(4, 3, Color::BLANK)), "Image { w: 4, h: 3 }");
    }
}

//! Image cache resource.
//!
//! A non-send resource that memoizes images by filename. The first lookup of
//! a filename asks the [`ImageLoader`] for it; later lookups hand back the
//! same shared [`ImageHandle`], so a change made through one handle is seen
//! through every other.
//!
//! Note: handles are `Rc<RefCell<_>>`, hence non-send. Insert with
//! `insert_non_send_resource` and access via `NonSend`/`NonSendMut`.

use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt;
use std::rc::Rc;

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::resources::image::{Color, Image, ImageError};

/// Shared, mutable reference to a cached image.
pub type ImageHandle = Rc<RefCell<Image>>;

/// Turns a filename into pixels. Decoding lives behind this trait.
pub trait ImageLoader {
    fn load(&self, filename: &str) -> Result<Image, ImageError>;
}

impl<F> ImageLoader for F
where
    F: Fn(&str) -> Result<Image, ImageError>,
{
    fn load(&self, filename: &str) -> Result<Image, ImageError> {
        self(filename)
    }
}

/// Loader that ignores the filename and produces a solid image.
#[derive(Debug, Clone, Copy)]
pub struct SolidLoader {
    pub width: u32,
    pub height: u32,
    pub fill: Color,
}

impl SolidLoader {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            fill,
        }
    }
}

impl ImageLoader for SolidLoader {
    fn load(&self, _filename: &str) -> Result<Image, ImageError> {
        Ok(Image::new(self.width, self.height, self.fill))
    }
}

/// Map of filenames to loaded images.
// NonSend resource: insert with insert_non_send_resource and access via NonSend/NonSendMut
pub struct ImageCache {
    images: FxHashMap<String, ImageHandle>,
    loader: Box<dyn ImageLoader>,
}

impl ImageCache {
    pub fn new(loader: impl ImageLoader + 'static) -> Self {
        Self {
            images: FxHashMap::default(),
            loader: Box::new(loader),
        }
    }

    /// Cached image for `filename`, loading it on first access.
    pub fn lookup(&mut self, filename: &str) -> Result<ImageHandle, ImageError> {
        if let Some(handle) = self.images.get(filename) {
            return Ok(handle.clone());
        }
        let image = self.loader.load(filename)?;
        debug!("Loaded `{}` into image cache: {:?}", filename, image);
        let handle = Rc::new(RefCell::new(image));
        self.images.insert(filename.to_string(), handle.clone());
        Ok(handle)
    }

    /// Cached image for `filename` without loading.
    pub fn get(&self, filename: &str) -> Option<ImageHandle> {
        self.images.get(filename).cloned()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.images.contains_key(filename)
    }

    /// Keep only the images for which `keep` holds. Returns how many were evicted.
    pub fn retain_if<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str, &Image) -> bool,
    {
        match self.try_prune(true, |name, image| Ok::<_, Infallible>(keep(name, image))) {
            Ok(evicted) => evicted,
            Err(never) => match never {},
        }
    }

    /// Evict the images for which `evict` holds. Returns how many were evicted.
    pub fn evict_if<F>(&mut self, mut evict: F) -> usize
    where
        F: FnMut(&str, &Image) -> bool,
    {
        match self.try_prune(false, |name, image| Ok::<_, Infallible>(evict(name, image))) {
            Ok(evicted) => evicted,
            Err(never) => match never {},
        }
    }

    /// Fallible [`retain_if`](Self::retain_if). Entries evicted before the
    /// failure stay evicted.
    pub fn try_retain_if<E, F>(&mut self, keep: F) -> Result<usize, E>
    where
        F: FnMut(&str, &Image) -> Result<bool, E>,
    {
        self.try_prune(true, keep)
    }

    /// Fallible [`evict_if`](Self::evict_if). Entries evicted before the
    /// failure stay evicted.
    pub fn try_evict_if<E, F>(&mut self, evict: F) -> Result<usize, E>
    where
        F: FnMut(&str, &Image) -> Result<bool, E>,
    {
        self.try_prune(false, evict)
    }

    /// Evict every entry whose verdict differs from `keep_when`. Entries that
    /// are mutably borrowed through a handle are skipped and kept.
    fn try_prune<E, F>(&mut self, keep_when: bool, mut verdict: F) -> Result<usize, E>
    where
        F: FnMut(&str, &Image) -> Result<bool, E>,
    {
        let names: Vec<String> = self.images.keys().cloned().collect();
        let mut evicted = 0;
        for name in names {
            let Some(handle) = self.images.get(&name) else {
                continue;
            };
            let decision = match handle.try_borrow() {
                Ok(image) => verdict(&name, &*image)?,
                Err(_) => {
                    warn!("Keeping `{}` in image cache: it is being modified", name);
                    continue;
                }
            };
            if decision != keep_when {
                self.images.remove(&name);
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!("Evicted {} image(s) from cache", evicted);
        }
        Ok(evicted)
    }

    /// Cached filenames, sorted.
    pub fn filenames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.images.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Remove all cached images.
    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCache")
            .field("images", &self.filenames())
            .finish()
    }
}

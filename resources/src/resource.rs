// compositor/resources/src/resource.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A single texture or bitmap and its lifecycle state.

use compositor_gpu::{Device, Mailbox, TextureFilter, TextureFormat};
use image::{GenericImageView, ImageBuffer, Rgba, RgbaImage};
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::Vector2I;
use std::fmt::{self, Display, Formatter};

/// Names a resource within one provider. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub u32);

impl ResourceId {
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceType {
    GLTexture,
    Bitmap,
}

/// Bitmaps are always stored as 8-bit RGBA.
pub(crate) const BITMAP_BYTES_PER_PIXEL: usize = 4;

pub struct Resource<D> where D: Device {
    pub(crate) gl_texture: Option<D::Texture>,
    pub(crate) pixels: Option<RgbaImage>,
    pub(crate) gl_pixel_buffer: Option<D::Buffer>,
    pub(crate) gl_upload_query: Option<D::Query>,
    pub(crate) pixel_buffer: Option<Vec<u8>>,
    pub(crate) size: Vector2I,
    pub(crate) format: TextureFormat,
    pub(crate) filter: TextureFilter,
    pub(crate) external: bool,
    pub(crate) mailbox: Mailbox,
    pub(crate) lock_for_read_count: u32,
    pub(crate) locked_for_write: bool,
    pub(crate) exported: bool,
    pub(crate) marked_for_deletion: bool,
    pub(crate) pending_set_pixels: bool,
}

impl<D> Resource<D> where D: Device {
    pub(crate) fn from_texture(texture: D::Texture,
                               size: Vector2I,
                               format: TextureFormat,
                               filter: TextureFilter)
                               -> Resource<D> {
        Resource::new(Some(texture), None, size, format, filter)
    }

    pub(crate) fn from_pixels(pixels: RgbaImage) -> Resource<D> {
        let size = Vector2I::new(pixels.width() as i32, pixels.height() as i32);
        Resource::new(None, Some(pixels), size, TextureFormat::RGBA8, TextureFilter::Linear)
    }

    fn new(gl_texture: Option<D::Texture>,
           pixels: Option<RgbaImage>,
           size: Vector2I,
           format: TextureFormat,
           filter: TextureFilter)
           -> Resource<D> {
        Resource {
            gl_texture,
            pixels,
            gl_pixel_buffer: None,
            gl_upload_query: None,
            pixel_buffer: None,
            size,
            format,
            filter,
            external: false,
            mailbox: Mailbox::zero(),
            lock_for_read_count: 0,
            locked_for_write: false,
            exported: false,
            marked_for_deletion: false,
            pending_set_pixels: false,
        }
    }

    #[inline]
    pub fn resource_type(&self) -> ResourceType {
        if self.gl_texture.is_some() {
            ResourceType::GLTexture
        } else {
            ResourceType::Bitmap
        }
    }

    #[inline]
    pub fn gl_texture(&self) -> Option<&D::Texture> {
        self.gl_texture.as_ref()
    }

    #[inline]
    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }

    #[inline]
    pub fn size(&self) -> Vector2I {
        self.size
    }

    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    #[inline]
    pub fn filter(&self) -> TextureFilter {
        self.filter
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.external
    }

    /// The zero mailbox until the resource is first exported.
    #[inline]
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    #[inline]
    pub fn lock_for_read_count(&self) -> u32 {
        self.lock_for_read_count
    }

    #[inline]
    pub fn is_locked_for_write(&self) -> bool {
        self.locked_for_write
    }

    #[inline]
    pub fn is_exported(&self) -> bool {
        self.exported
    }

    #[inline]
    pub fn is_marked_for_deletion(&self) -> bool {
        self.marked_for_deletion
    }

    #[inline]
    pub fn has_pending_set_pixels(&self) -> bool {
        self.pending_set_pixels
    }

    #[inline]
    pub(crate) fn is_locked(&self) -> bool {
        self.locked_for_write || self.lock_for_read_count > 0
    }

    /// The byte size of a pixel buffer holding the whole resource.
    #[inline]
    pub(crate) fn byte_size(&self) -> usize {
        let bytes_per_pixel = match self.resource_type() {
            ResourceType::GLTexture => self.format.bytes_per_pixel(),
            ResourceType::Bitmap => BITMAP_BYTES_PER_PIXEL,
        };
        self.size.x() as usize * self.size.y() as usize * bytes_per_pixel
    }
}

#[inline]
pub(crate) fn rect_contains_rect(outer: RectI, inner: RectI) -> bool {
    inner.min_x() >= outer.min_x() && inner.min_y() >= outer.min_y() &&
        inner.max_x() <= outer.max_x() && inner.max_y() <= outer.max_y()
}

#[inline]
pub(crate) fn rect_is_empty(rect: RectI) -> bool {
    rect.size().x() <= 0 || rect.size().y() <= 0
}

/// Copies `source_rect` of the RGBA `image`, which covers `image_rect`, into `bitmap` at
/// `dest_offset`.
pub(crate) fn copy_into_bitmap(bitmap: &mut RgbaImage,
                               image: &[u8],
                               image_rect: RectI,
                               source_rect: RectI,
                               dest_offset: Vector2I) {
    assert!(rect_contains_rect(image_rect, source_rect),
            "source rect {:?} lies outside the image {:?}",
            source_rect,
            image_rect);
    if rect_is_empty(source_rect) {
        return;
    }

    let image_size = image_rect.size();
    let image_byte_size = image_size.x() as usize * image_size.y() as usize *
        BITMAP_BYTES_PER_PIXEL;
    assert!(image.len() >= image_byte_size, "image data is smaller than its rect");
    let source: ImageBuffer<Rgba<u8>, &[u8]> =
        match ImageBuffer::from_raw(image_size.x() as u32,
                                    image_size.y() as u32,
                                    &image[0..image_byte_size]) {
            Some(source) => source,
            None => panic!("image rect {:?} doesn't describe the image data", image_rect),
        };

    let offset = source_rect.origin() - image_rect.origin();
    let dest_origin = dest_offset;
    let size = source_rect.size();
    assert!(dest_origin.x() >= 0 && dest_origin.y() >= 0);
    assert!(dest_origin.x() + size.x() <= bitmap.width() as i32 &&
            dest_origin.y() + size.y() <= bitmap.height() as i32,
            "destination lies outside the bitmap");

    let subset = source.view(offset.x() as u32,
                             offset.y() as u32,
                             size.x() as u32,
                             size.y() as u32);
    image::imageops::replace(bitmap, &subset, dest_origin.x() as u32, dest_origin.y() as u32);
}

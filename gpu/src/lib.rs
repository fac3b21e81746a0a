// compositor/gpu/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Minimal abstractions over the GPU context that compositor resources live in.
//!
//! The compositor never draws through this interface. It only needs to create, fill, share,
//! and destroy textures, so the trait is much narrower than a full rendering device.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::Vector2I;
use std::fmt::{self, Debug, Formatter};

pub mod fake;

/// The number of bytes in a mailbox name.
pub const MAILBOX_NAME_LENGTH: usize = 64;

pub trait Device {
    type Buffer;
    type Query;
    type Texture;

    /// Makes the context current. Returns false if the context is lost or otherwise unusable.
    fn make_current(&self) -> bool;
    fn capabilities(&self) -> DeviceCapabilities;
    fn max_texture_size(&self) -> i32;

    fn create_texture(&self) -> Self::Texture;
    fn set_texture_sampling(&self, texture: &Self::Texture, filter: TextureFilter);
    fn set_texture_pool(&self, texture: &Self::Texture, pool: TexturePool);
    fn set_texture_usage_hint(&self, texture: &Self::Texture, hint: TextureUsageHint);
    /// Allocates immutable storage. Only valid if `TEXTURE_STORAGE` is supported.
    fn allocate_texture_storage(&self,
                                texture: &Self::Texture,
                                format: TextureFormat,
                                size: Vector2I);
    fn allocate_texture(&self, texture: &Self::Texture, format: TextureFormat, size: Vector2I);
    /// Uploads tightly packed pixels into `rect` of the texture.
    fn upload_to_texture(&self,
                         texture: &Self::Texture,
                         format: TextureFormat,
                         rect: RectI,
                         data: &[u8]);
    fn bind_texture(&self, texture: &Self::Texture, unit: u32);
    fn delete_texture(&self, texture: Self::Texture);
    /// The raw name that draw quads use for textures the resource provider doesn't manage.
    fn texture_name(&self, texture: &Self::Texture) -> u32;

    fn create_pixel_buffer(&self) -> Self::Buffer;
    /// Reallocates the buffer's storage. A size of zero releases it.
    fn allocate_pixel_buffer(&self, buffer: &mut Self::Buffer, byte_size: usize);
    fn map_pixel_buffer<'a>(&self, buffer: &'a mut Self::Buffer) -> &'a mut [u8];
    fn unmap_pixel_buffer(&self, buffer: &mut Self::Buffer);
    fn upload_to_texture_from_pixel_buffer(&self,
                                           texture: &Self::Texture,
                                           buffer: &Self::Buffer,
                                           format: TextureFormat,
                                           size: Vector2I);
    /// Starts an upload from the pixel buffer that completes asynchronously. `query` becomes
    /// available once the texture contents have been replaced.
    fn begin_async_upload_from_pixel_buffer(&self,
                                            texture: &Self::Texture,
                                            buffer: &Self::Buffer,
                                            format: TextureFormat,
                                            size: Vector2I,
                                            query: &Self::Query);
    fn delete_pixel_buffer(&self, buffer: Self::Buffer);

    fn create_query(&self) -> Self::Query;
    fn begin_query(&self, query: &Self::Query, target: QueryTarget);
    fn end_query(&self, target: QueryTarget);
    fn query_is_available(&self, query: &Self::Query) -> bool;
    /// The query result. For `CommandsIssued` this is the elapsed time in microseconds.
    fn query_result(&self, query: &Self::Query) -> u32;
    fn delete_query(&self, query: Self::Query);

    fn generate_mailbox(&self) -> Mailbox;
    /// Publishes the texture's contents under `mailbox`.
    fn produce_texture(&self, texture: &Self::Texture, mailbox: &Mailbox);
    /// Replaces the texture's contents with whatever was last produced under `mailbox`.
    fn consume_texture(&self, texture: &mut Self::Texture, mailbox: &Mailbox);
    fn insert_sync_point(&self) -> SyncPoint;
    fn wait_sync_point(&self, sync_point: SyncPoint);

    fn flush(&self);
    /// Only valid if `SHALLOW_FLUSH` is supported.
    fn shallow_flush(&self);
}

bitflags! {
    /// Optional features of a device.
    pub struct DeviceCapabilities: u8 {
        /// Immutable texture storage may be allocated.
        const TEXTURE_STORAGE = 0x01;
        /// Textures accept a framebuffer usage hint.
        const TEXTURE_USAGE_HINT = 0x02;
        /// Flushes may be issued without submitting to the GPU.
        const SHALLOW_FLUSH = 0x04;
        /// `BGRA8` textures are supported.
        const BGRA_FORMAT = 0x08;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    RGBA8,
    BGRA8,
    Luminance8,
}

impl TextureFormat {
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::RGBA8 | TextureFormat::BGRA8 => 4,
            TextureFormat::Luminance8 => 1,
        }
    }

    /// Returns true if immutable storage may be allocated for this format.
    #[inline]
    pub fn supports_storage(self) -> bool {
        match self {
            TextureFormat::RGBA8 | TextureFormat::BGRA8 => true,
            TextureFormat::Luminance8 => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

impl Default for TextureFilter {
    #[inline]
    fn default() -> TextureFilter {
        TextureFilter::Linear
    }
}

/// The GPU memory pool a texture is allocated from. Managed textures may be evicted by the
/// driver under memory pressure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TexturePool {
    Managed,
    Unmanaged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureUsageHint {
    Any,
    Framebuffer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryTarget {
    CommandsIssued,
    AsyncTexturesUploaded,
}

/// An opaque name for a texture that can be shared with another context, possibly in another
/// process.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mailbox {
    pub name: [u8; MAILBOX_NAME_LENGTH],
}

impl Mailbox {
    #[inline]
    pub fn zero() -> Mailbox {
        Mailbox { name: [0; MAILBOX_NAME_LENGTH] }
    }

    #[inline]
    pub fn from_name(name: [u8; MAILBOX_NAME_LENGTH]) -> Mailbox {
        Mailbox { name }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.name.iter().all(|&byte| byte == 0)
    }
}

impl Default for Mailbox {
    #[inline]
    fn default() -> Mailbox {
        Mailbox::zero()
    }
}

impl Debug for Mailbox {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        // The leading bytes are enough to tell mailboxes apart in logs.
        write!(formatter, "Mailbox(")?;
        for byte in &self.name[0..8] {
            write!(formatter, "{:02x}", byte)?;
        }
        write!(formatter, "…)")
    }
}

/// A marker in a context's command stream. Waiting on it in another context guarantees that
/// everything issued before it has been submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SyncPoint(pub u32);

/// Logs and forwards to `Device::make_current`.
pub fn ensure_current<D>(device: &D) -> bool where D: Device {
    let current = device.make_current();
    if !current {
        debug!("GPU context unavailable");
    }
    current
}

#[cfg(test)]
mod test {
    use super::{DeviceCapabilities, Mailbox, TextureFormat, MAILBOX_NAME_LENGTH};

    #[test]
    fn test_mailbox_zero() {
        assert!(Mailbox::default().is_zero());
        let mut name = [0; MAILBOX_NAME_LENGTH];
        name[MAILBOX_NAME_LENGTH - 1] = 1;
        assert!(!Mailbox::from_name(name).is_zero());
    }

    #[test]
    fn test_storage_formats() {
        assert!(TextureFormat::RGBA8.supports_storage());
        assert!(TextureFormat::BGRA8.supports_storage());
        assert!(!TextureFormat::Luminance8.supports_storage());
        assert_eq!(TextureFormat::Luminance8.bytes_per_pixel(), 1);
    }

    #[test]
    fn test_capabilities_are_the_ones_providers_consult() {
        assert_eq!(DeviceCapabilities::all(),
                   DeviceCapabilities::TEXTURE_STORAGE | DeviceCapabilities::TEXTURE_USAGE_HINT |
                   DeviceCapabilities::SHALLOW_FLUSH | DeviceCapabilities::BGRA_FORMAT);
    }
}

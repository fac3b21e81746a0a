// compositor/resources/src/options.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Options that control how a resource provider allocates and uploads resources.

use crate::resource::ResourceType;

/// The number of uploads between shallow flushes, unless otherwise specified.
pub const DEFAULT_TEXTURE_UPLOAD_FLUSH_PERIOD: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResourceProviderOptions {
    /// The kind of backing store `create_resource` allocates.
    pub default_resource_type: ResourceType,
    /// How many texture uploads may be issued before the uploader flushes.
    pub texture_upload_flush_period: u32,
    /// Whether the uploader may issue shallow flushes at all. They are only issued if the device
    /// supports them.
    pub use_shallow_flush: bool,
}

impl Default for ResourceProviderOptions {
    #[inline]
    fn default() -> ResourceProviderOptions {
        ResourceProviderOptions {
            default_resource_type: ResourceType::GLTexture,
            texture_upload_flush_period: DEFAULT_TEXTURE_UPLOAD_FLUSH_PERIOD,
            use_shallow_flush: true,
        }
    }
}

impl ResourceProviderOptions {
    /// Options for a provider that keeps every resource in CPU memory.
    #[inline]
    pub fn software() -> ResourceProviderOptions {
        ResourceProviderOptions {
            default_resource_type: ResourceType::Bitmap,
            ..ResourceProviderOptions::default()
        }
    }
}

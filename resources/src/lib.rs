// compositor/resources/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pixel resources used by the compositor.
//!
//! A `ResourceProvider` owns every texture and bitmap the compositor draws from. Callers refer
//! to them by `ResourceId`, lock them around uses, and hand GPU-backed ones to other compositor
//! instances as `TransferableResource`s named by mailboxes.

#[macro_use]
extern crate log;

pub mod locks;
pub mod options;
pub mod provider;
pub mod resource;
pub mod transfer;
pub mod uploader;

pub use crate::locks::{ScopedReadLockGL, ScopedReadLockSoftware, ScopedSamplerGL};
pub use crate::locks::{ScopedWriteLockGL, ScopedWriteLockSoftware};
pub use crate::options::ResourceProviderOptions;
pub use crate::provider::{InitializationError, ResourceProvider};
pub use crate::resource::{Resource, ResourceId, ResourceType};
pub use crate::transfer::{TransferableResource, TransferableResourceList};
pub use crate::uploader::TextureUploader;

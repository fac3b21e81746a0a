// compositor/resources/src/locks.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Guards that hold a resource lock for as long as they live.
//!
//! A guard borrows the provider mutably, so only one can exist at a time. Use the explicit
//! `lock_for_read`/`unlock_for_read` calls to hold several read locks at once.

use crate::provider::ResourceProvider;
use crate::resource::ResourceId;
use compositor_gpu::{Device, TextureFilter};
use image::RgbaImage;

pub struct ScopedReadLockGL<'a, D> where D: Device {
    provider: &'a mut ResourceProvider<D>,
    id: ResourceId,
}

impl<'a, D> ScopedReadLockGL<'a, D> where D: Device {
    pub fn new(provider: &'a mut ResourceProvider<D>, id: ResourceId)
               -> ScopedReadLockGL<'a, D> {
        provider.lock_for_read(id);
        ScopedReadLockGL { provider, id }
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn texture(&self) -> &D::Texture {
        match self.provider.resource(self.id).gl_texture() {
            Some(texture) => texture,
            None => panic!("resource {} isn't a texture", self.id),
        }
    }
}

impl<'a, D> Drop for ScopedReadLockGL<'a, D> where D: Device {
    fn drop(&mut self) {
        self.provider.unlock_for_read(self.id);
    }
}

/// A read lock that also binds the texture for sampling.
pub struct ScopedSamplerGL<'a, D> where D: Device {
    lock: ScopedReadLockGL<'a, D>,
}

impl<'a, D> ScopedSamplerGL<'a, D> where D: Device {
    pub fn new(provider: &'a mut ResourceProvider<D>,
               id: ResourceId,
               unit: u32,
               filter: TextureFilter)
               -> ScopedSamplerGL<'a, D> {
        let mut lock = ScopedReadLockGL::new(provider, id);
        lock.provider.bind_for_sampling(id, unit, filter);
        ScopedSamplerGL { lock }
    }

    #[inline]
    pub fn texture(&self) -> &D::Texture {
        self.lock.texture()
    }
}

pub struct ScopedWriteLockGL<'a, D> where D: Device {
    provider: &'a mut ResourceProvider<D>,
    id: ResourceId,
}

impl<'a, D> ScopedWriteLockGL<'a, D> where D: Device {
    pub fn new(provider: &'a mut ResourceProvider<D>, id: ResourceId)
               -> ScopedWriteLockGL<'a, D> {
        provider.lock_for_write(id);
        ScopedWriteLockGL { provider, id }
    }

    pub fn texture(&self) -> &D::Texture {
        match self.provider.resource(self.id).gl_texture() {
            Some(texture) => texture,
            None => panic!("resource {} isn't a texture", self.id),
        }
    }
}

impl<'a, D> Drop for ScopedWriteLockGL<'a, D> where D: Device {
    fn drop(&mut self) {
        self.provider.unlock_for_write(self.id);
    }
}

pub struct ScopedReadLockSoftware<'a, D> where D: Device {
    provider: &'a mut ResourceProvider<D>,
    id: ResourceId,
}

impl<'a, D> ScopedReadLockSoftware<'a, D> where D: Device {
    pub fn new(provider: &'a mut ResourceProvider<D>, id: ResourceId)
               -> ScopedReadLockSoftware<'a, D> {
        provider.lock_for_read(id);
        ScopedReadLockSoftware { provider, id }
    }

    pub fn pixels(&self) -> &RgbaImage {
        match self.provider.resource(self.id).pixels() {
            Some(pixels) => pixels,
            None => panic!("resource {} isn't a bitmap", self.id),
        }
    }
}

impl<'a, D> Drop for ScopedReadLockSoftware<'a, D> where D: Device {
    fn drop(&mut self) {
        self.provider.unlock_for_read(self.id);
    }
}

pub struct ScopedWriteLockSoftware<'a, D> where D: Device {
    provider: &'a mut ResourceProvider<D>,
    id: ResourceId,
}

impl<'a, D> ScopedWriteLockSoftware<'a, D> where D: Device {
    pub fn new(provider: &'a mut ResourceProvider<D>, id: ResourceId)
               -> ScopedWriteLockSoftware<'a, D> {
        provider.lock_for_write(id);
        ScopedWriteLockSoftware { provider, id }
    }

    pub fn pixels(&mut self) -> &mut RgbaImage {
        let id = self.id;
        match self.provider.resource_mut(id).pixels {
            Some(ref mut pixels) => pixels,
            None => panic!("resource {} isn't a bitmap", id),
        }
    }
}

impl<'a, D> Drop for ScopedWriteLockSoftware<'a, D> where D: Device {
    fn drop(&mut self) {
        self.provider.unlock_for_write(self.id);
    }
}

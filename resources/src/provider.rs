// compositor/resources/src/provider.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The owner of every compositor resource.
//!
//! Misuse of the API (unknown ids, lock conflicts, deleting locked resources) is a bug in the
//! caller and panics. The only condition callers are expected to handle is a lost GPU context,
//! which turns transfers into no-ops.

use crate::options::ResourceProviderOptions;
use crate::resource::{self, Resource, ResourceId, ResourceType, BITMAP_BYTES_PER_PIXEL};
use crate::transfer::{TransferableResource, TransferableResourceList};
use crate::uploader::TextureUploader;
use compositor_gpu::{self as gpu, Device, DeviceCapabilities, TextureFilter, TextureFormat};
use compositor_gpu::{TexturePool, TextureUsageHint};
use fxhash::FxHashMap;
use image::RgbaImage;
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::Vector2I;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::i32;
use std::marker::PhantomData;
use std::thread::{self, ThreadId};

pub struct ResourceProvider<D> where D: Device {
    device: D,
    resources: FxHashMap<ResourceId, Resource<D>>,
    next_id: u32,
    children: FxHashMap<i32, Child>,
    next_child: i32,
    default_resource_type: ResourceType,
    texture_uploader: TextureUploader<D>,
    max_texture_size: i32,
    capabilities: DeviceCapabilities,
    thread_checker: ThreadChecker,
}

/// Id translations for the resources received from one child.
#[derive(Default)]
struct Child {
    parent_to_child_map: FxHashMap<ResourceId, ResourceId>,
    child_to_parent_map: FxHashMap<ResourceId, ResourceId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitializationError {
    /// GPU resources were requested, but the context couldn't be made current.
    ContextLost,
}

impl Display for InitializationError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            InitializationError::ContextLost => write!(formatter, "the GPU context is lost"),
        }
    }
}

impl Error for InitializationError {}

// Pins the provider to the thread that created it.
struct ThreadChecker {
    owner: ThreadId,
    phantom: PhantomData<*const ()>,
}

impl ThreadChecker {
    fn new() -> ThreadChecker {
        ThreadChecker { owner: thread::current().id(), phantom: PhantomData }
    }

    #[inline]
    fn check(&self) {
        debug_assert_eq!(thread::current().id(),
                         self.owner,
                         "resource provider used off its owning thread");
    }
}

impl<D> ResourceProvider<D> where D: Device {
    pub fn new(device: D, options: ResourceProviderOptions)
               -> Result<ResourceProvider<D>, InitializationError> {
        let (max_texture_size, capabilities) = match options.default_resource_type {
            ResourceType::GLTexture => {
                if !gpu::ensure_current(&device) {
                    return Err(InitializationError::ContextLost);
                }
                (device.max_texture_size(), device.capabilities())
            }
            ResourceType::Bitmap => (i32::MAX, DeviceCapabilities::empty()),
        };

        debug!("resource provider: {:?} resources, max texture size {}",
               options.default_resource_type,
               max_texture_size);

        Ok(ResourceProvider {
            device,
            resources: FxHashMap::default(),
            next_id: 1,
            children: FxHashMap::default(),
            next_child: 1,
            default_resource_type: options.default_resource_type,
            texture_uploader: TextureUploader::new(options.texture_upload_flush_period,
                                                   options.use_shallow_flush),
            max_texture_size,
            capabilities,
            thread_checker: ThreadChecker::new(),
        })
    }

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[inline]
    pub fn default_resource_type(&self) -> ResourceType {
        self.default_resource_type
    }

    #[inline]
    pub fn max_texture_size(&self) -> i32 {
        self.max_texture_size
    }

    #[inline]
    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }

    pub fn resource_type(&self, id: ResourceId) -> ResourceType {
        self.thread_checker.check();
        self.resource(id).resource_type()
    }

    /// True if the resource is locked for reading or is out with another compositor.
    pub fn in_use_by_consumer(&self, id: ResourceId) -> bool {
        self.thread_checker.check();
        let resource = self.resource(id);
        resource.lock_for_read_count > 0 || resource.exported
    }

    // Creation and deletion

    pub fn create_resource(&mut self,
                           size: Vector2I,
                           format: TextureFormat,
                           hint: TextureUsageHint)
                           -> ResourceId {
        match self.default_resource_type {
            ResourceType::GLTexture => {
                self.create_gl_texture(size, format, TexturePool::Unmanaged, hint)
            }
            ResourceType::Bitmap => {
                debug_assert_eq!(format, TextureFormat::RGBA8);
                self.create_bitmap(size)
            }
        }
    }

    /// Like `create_resource`, but the driver may evict the texture under memory pressure.
    pub fn create_managed_resource(&mut self,
                                   size: Vector2I,
                                   format: TextureFormat,
                                   hint: TextureUsageHint)
                                   -> ResourceId {
        match self.default_resource_type {
            ResourceType::GLTexture => {
                self.create_gl_texture(size, format, TexturePool::Managed, hint)
            }
            ResourceType::Bitmap => {
                debug_assert_eq!(format, TextureFormat::RGBA8);
                self.create_bitmap(size)
            }
        }
    }

    pub fn create_gl_texture(&mut self,
                             size: Vector2I,
                             format: TextureFormat,
                             pool: TexturePool,
                             hint: TextureUsageHint)
                             -> ResourceId {
        self.thread_checker.check();
        self.check_size(size);
        debug_assert!(format != TextureFormat::BGRA8 ||
                      self.capabilities.contains(DeviceCapabilities::BGRA_FORMAT));

        let texture = self.device.create_texture();
        self.device.set_texture_sampling(&texture, TextureFilter::Linear);
        if hint == TextureUsageHint::Framebuffer &&
                self.capabilities.contains(DeviceCapabilities::TEXTURE_USAGE_HINT) {
            self.device.set_texture_usage_hint(&texture, hint);
        }
        self.device.set_texture_pool(&texture, pool);
        if self.capabilities.contains(DeviceCapabilities::TEXTURE_STORAGE) &&
                format.supports_storage() {
            self.device.allocate_texture_storage(&texture, format, size);
        } else {
            self.device.allocate_texture(&texture, format, size);
        }

        let id = self.insert_resource(Resource::from_texture(texture,
                                                             size,
                                                             format,
                                                             TextureFilter::Linear));
        debug!("created texture {} ({}x{}, {:?}, {:?})",
               id,
               size.x(),
               size.y(),
               format,
               pool);
        id
    }

    pub fn create_bitmap(&mut self, size: Vector2I) -> ResourceId {
        self.thread_checker.check();
        self.check_size(size);
        let pixels = RgbaImage::new(size.x() as u32, size.y() as u32);
        let id = self.insert_resource(Resource::from_pixels(pixels));
        debug!("created bitmap {} ({}x{})", id, size.x(), size.y());
        id
    }

    /// Wraps a texture that someone else owns. The provider sets its sampling parameters but
    /// never deletes it.
    pub fn create_resource_from_external_texture(&mut self, texture: D::Texture) -> ResourceId {
        self.thread_checker.check();
        self.device.set_texture_sampling(&texture, TextureFilter::Linear);
        let mut resource = Resource::from_texture(texture,
                                                  Vector2I::default(),
                                                  TextureFormat::RGBA8,
                                                  TextureFilter::Linear);
        resource.external = true;
        let id = self.insert_resource(resource);
        debug!("wrapped external texture as {}", id);
        id
    }

    pub fn delete_resource(&mut self, id: ResourceId) {
        self.thread_checker.check();
        let resource = lookup_mut(&mut self.resources, id);
        assert!(!resource.is_locked(), "resource {} is locked", id);
        assert!(!resource.marked_for_deletion, "resource {} is already deleted", id);

        if resource.exported {
            debug!("deferring deletion of exported resource {}", id);
            resource.marked_for_deletion = true;
            return;
        }
        self.destroy_resource(id);
    }

    fn destroy_resource(&mut self, id: ResourceId) {
        let resource = match self.resources.remove(&id) {
            Some(resource) => resource,
            None => panic!("no resource {}", id),
        };

        let Resource { gl_texture, gl_upload_query, gl_pixel_buffer, external, .. } = resource;
        if let Some(texture) = gl_texture {
            if !external {
                self.device.delete_texture(texture);
            }
        }
        if let Some(query) = gl_upload_query {
            self.device.delete_query(query);
        }
        if let Some(buffer) = gl_pixel_buffer {
            self.device.delete_pixel_buffer(buffer);
        }
        debug!("deleted resource {}", id);
    }

    // Locking

    pub fn lock_for_read(&mut self, id: ResourceId) -> &Resource<D> {
        self.thread_checker.check();
        let resource = lookup_mut(&mut self.resources, id);
        assert!(!resource.locked_for_write, "resource {} is locked for write", id);
        assert!(!resource.exported, "resource {} is exported", id);
        resource.lock_for_read_count += 1;
        resource
    }

    pub fn unlock_for_read(&mut self, id: ResourceId) {
        self.thread_checker.check();
        let resource = lookup_mut(&mut self.resources, id);
        assert!(resource.lock_for_read_count > 0, "resource {} isn't locked for read", id);
        assert!(!resource.exported);
        resource.lock_for_read_count -= 1;
    }

    pub fn lock_for_write(&mut self, id: ResourceId) -> &Resource<D> {
        self.thread_checker.check();
        let resource = lookup_mut(&mut self.resources, id);
        assert!(!resource.is_locked(), "resource {} is already locked", id);
        assert!(!resource.exported, "resource {} is exported", id);
        assert!(!resource.external, "external resource {} can't be written", id);
        resource.locked_for_write = true;
        resource
    }

    pub fn unlock_for_write(&mut self, id: ResourceId) {
        self.thread_checker.check();
        let resource = lookup_mut(&mut self.resources, id);
        assert!(resource.locked_for_write, "resource {} isn't locked for write", id);
        assert!(!resource.exported);
        assert!(!resource.external);
        resource.locked_for_write = false;
    }

    /// Binds a read-locked texture to `unit`, switching its filter if it differs.
    pub fn bind_for_sampling(&mut self, id: ResourceId, unit: u32, filter: TextureFilter) {
        self.thread_checker.check();
        let device = &self.device;
        let resource = lookup_mut(&mut self.resources, id);
        assert!(resource.lock_for_read_count > 0, "resource {} isn't locked for read", id);
        let texture = match resource.gl_texture {
            Some(ref texture) => texture,
            None => panic!("resource {} has no texture to sample", id),
        };
        device.bind_texture(texture, unit);
        if filter != resource.filter {
            device.set_texture_sampling(texture, filter);
            resource.filter = filter;
        }
    }

    // Uploads

    /// Copies `source_rect` of `image`, an RGBA (or texture-format) image covering
    /// `image_rect`, into the resource at `dest_offset`.
    pub fn set_pixels(&mut self,
                      id: ResourceId,
                      image: &[u8],
                      image_rect: RectI,
                      source_rect: RectI,
                      dest_offset: Vector2I) {
        self.thread_checker.check();
        let resource = lookup_mut(&mut self.resources, id);
        check_writable(resource, id);

        if let Some(ref texture) = resource.gl_texture {
            self.texture_uploader.upload(&self.device,
                                         texture,
                                         resource.format,
                                         resource.size,
                                         image,
                                         image_rect,
                                         source_rect,
                                         dest_offset);
        } else if let Some(ref mut pixels) = resource.pixels {
            resource::copy_into_bitmap(pixels, image, image_rect, source_rect, dest_offset);
        }
    }

    pub fn num_blocking_uploads(&mut self) -> usize {
        self.thread_checker.check();
        self.texture_uploader.num_blocking_uploads(&self.device)
    }

    pub fn mark_pending_uploads_as_non_blocking(&mut self) {
        self.thread_checker.check();
        self.texture_uploader.mark_pending_uploads_as_non_blocking()
    }

    pub fn estimated_uploads_per_second(&mut self) -> f64 {
        self.thread_checker.check();
        self.texture_uploader.estimated_textures_per_second(&self.device)
    }

    pub fn flush_uploads(&mut self) {
        self.thread_checker.check();
        self.texture_uploader.flush(&self.device)
    }

    pub fn release_cached_data(&mut self) {
        self.thread_checker.check();
        self.texture_uploader.release_cached_data(&self.device)
    }

    pub fn flush(&mut self) {
        self.thread_checker.check();
        if gpu::ensure_current(&self.device) {
            self.device.flush();
        }
    }

    /// Returns false if the device has no shallow flush.
    pub fn shallow_flush_if_supported(&mut self) -> bool {
        self.thread_checker.check();
        if !self.capabilities.contains(DeviceCapabilities::SHALLOW_FLUSH) ||
                !gpu::ensure_current(&self.device) {
            return false;
        }
        self.device.shallow_flush();
        true
    }

    // Pixel buffers

    /// Gives the resource a staging buffer big enough for its whole contents.
    pub fn acquire_pixel_buffer(&mut self, id: ResourceId) {
        self.thread_checker.check();
        let device = &self.device;
        let resource = lookup_mut(&mut self.resources, id);
        assert!(!resource.exported && !resource.external);

        let byte_size = resource.byte_size();
        match resource.resource_type() {
            ResourceType::GLTexture => {
                if resource.gl_pixel_buffer.is_none() {
                    resource.gl_pixel_buffer = Some(device.create_pixel_buffer());
                }
                if let Some(ref mut buffer) = resource.gl_pixel_buffer {
                    device.allocate_pixel_buffer(buffer, byte_size);
                }
            }
            ResourceType::Bitmap => {
                if resource.pixel_buffer.is_none() {
                    resource.pixel_buffer = Some(vec![0; byte_size]);
                }
            }
        }
    }

    /// Drops the staging buffer's storage.
    pub fn release_pixel_buffer(&mut self, id: ResourceId) {
        self.thread_checker.check();
        let device = &self.device;
        let resource = lookup_mut(&mut self.resources, id);
        assert!(!resource.exported && !resource.external);

        if let Some(ref mut buffer) = resource.gl_pixel_buffer {
            device.allocate_pixel_buffer(buffer, 0);
        }
        resource.pixel_buffer = None;
    }

    pub fn map_pixel_buffer(&mut self, id: ResourceId) -> &mut [u8] {
        self.thread_checker.check();
        let device = &self.device;
        let resource = lookup_mut(&mut self.resources, id);
        assert!(!resource.exported && !resource.external);

        if let Some(ref mut buffer) = resource.gl_pixel_buffer {
            return device.map_pixel_buffer(buffer);
        }
        match resource.pixel_buffer {
            Some(ref mut buffer) => &mut buffer[..],
            None => panic!("resource {} has no pixel buffer", id),
        }
    }

    pub fn unmap_pixel_buffer(&mut self, id: ResourceId) {
        self.thread_checker.check();
        let device = &self.device;
        let resource = lookup_mut(&mut self.resources, id);
        assert!(!resource.exported && !resource.external);

        if let Some(ref mut buffer) = resource.gl_pixel_buffer {
            device.unmap_pixel_buffer(buffer);
        }
    }

    /// Synchronously copies the whole staging buffer into the resource.
    pub fn set_pixels_from_buffer(&mut self, id: ResourceId) {
        self.thread_checker.check();
        let device = &self.device;
        let resource = lookup_mut(&mut self.resources, id);
        check_writable(resource, id);
        copy_from_pixel_buffer(device, resource, id);
    }

    /// Starts replacing the resource's contents with its staging buffer. The resource stays
    /// locked for write until `did_set_pixels_complete` reports completion.
    pub fn begin_set_pixels(&mut self, id: ResourceId) {
        self.thread_checker.check();
        assert!(!self.resource(id).pending_set_pixels,
                "resource {} already has pixels in flight",
                id);
        self.lock_for_write(id);

        let device = &self.device;
        let resource = lookup_mut(&mut self.resources, id);
        match resource.resource_type() {
            ResourceType::GLTexture => {
                if resource.gl_upload_query.is_none() {
                    resource.gl_upload_query = Some(device.create_query());
                }
                let (texture, buffer, query) = match (&resource.gl_texture,
                                                      &resource.gl_pixel_buffer,
                                                      &resource.gl_upload_query) {
                    (&Some(ref texture), &Some(ref buffer), &Some(ref query)) => {
                        (texture, buffer, query)
                    }
                    _ => panic!("resource {} has no pixel buffer", id),
                };
                device.begin_async_upload_from_pixel_buffer(texture,
                                                            buffer,
                                                            resource.format,
                                                            resource.size,
                                                            query);
            }
            ResourceType::Bitmap => copy_from_pixel_buffer(device, resource, id),
        }
        resource.pending_set_pixels = true;
    }

    /// Polls an upload started by `begin_set_pixels`. Never waits.
    pub fn did_set_pixels_complete(&mut self, id: ResourceId) -> bool {
        self.thread_checker.check();
        let resource = lookup_mut(&mut self.resources, id);
        assert!(resource.locked_for_write);
        assert!(resource.pending_set_pixels, "resource {} has no pixels in flight", id);

        if let Some(ref query) = resource.gl_upload_query {
            if !self.device.query_is_available(query) {
                return false;
            }
        }

        resource.pending_set_pixels = false;
        self.unlock_for_write(id);
        true
    }

    // Children

    pub fn create_child(&mut self) -> i32 {
        self.thread_checker.check();
        let child = self.next_child;
        self.next_child += 1;
        self.children.insert(child, Child::default());
        debug!("created child {}", child);
        child
    }

    /// Deletes every resource received from the child that hasn't been sent back.
    pub fn destroy_child(&mut self, child: i32) {
        self.thread_checker.check();
        let child_info = match self.children.remove(&child) {
            Some(child_info) => child_info,
            None => panic!("no child {}", child),
        };
        let mut ids: Vec<_> = child_info.parent_to_child_map.keys().cloned().collect();
        ids.sort();
        debug!("destroying child {} with {} resources", child, ids.len());
        for id in ids {
            self.delete_resource(id);
        }
    }

    /// Maps the child's resource ids to the ids of the local copies.
    pub fn child_to_parent_map(&self, child: i32) -> &FxHashMap<ResourceId, ResourceId> {
        self.thread_checker.check();
        match self.children.get(&child) {
            Some(child_info) => &child_info.child_to_parent_map,
            None => panic!("no child {}", child),
        }
    }

    // Transfer

    /// Exports the given resources. Resources that are already exported are skipped without
    /// being reported, so the list can be shorter than `ids`.
    pub fn prepare_send_to_parent(&mut self, ids: &[ResourceId]) -> TransferableResourceList {
        self.thread_checker.check();
        let mut list = TransferableResourceList::new();
        if !gpu::ensure_current(&self.device) {
            // Software compositing can't transfer resources.
            return list;
        }

        for &id in ids {
            if let Some(transferable) = self.transfer_resource(id) {
                lookup_mut(&mut self.resources, id).exported = true;
                list.resources.push(transferable);
            }
        }
        if !list.is_empty() {
            list.sync_point = Some(self.device.insert_sync_point());
        }
        debug!("sending {} of {} resources to parent", list.len(), ids.len());
        list
    }

    /// Hands resources received from `child` back to it. The local copies are deleted.
    pub fn prepare_send_to_child(&mut self, child: i32, ids: &[ResourceId])
                                 -> TransferableResourceList {
        self.thread_checker.check();
        let mut list = TransferableResourceList::new();
        if !gpu::ensure_current(&self.device) {
            return list;
        }
        assert!(self.children.contains_key(&child), "no child {}", child);

        for &id in ids {
            let mut transferable = match self.transfer_resource(id) {
                Some(transferable) => transferable,
                None => panic!("resource {} can't be sent to child {}", id, child),
            };
            let child_info = match self.children.get_mut(&child) {
                Some(child_info) => child_info,
                None => panic!("no child {}", child),
            };
            let child_id = match child_info.parent_to_child_map.remove(&id) {
                Some(child_id) => child_id,
                None => panic!("resource {} wasn't received from child {}", id, child),
            };
            child_info.child_to_parent_map.remove(&child_id);
            transferable.id = child_id;
            list.resources.push(transferable);
            self.delete_resource(id);
        }
        if !list.is_empty() {
            list.sync_point = Some(self.device.insert_sync_point());
        }
        debug!("sending {} resources to child {}", list.len(), child);
        list
    }

    pub fn receive_from_child(&mut self, child: i32, list: &TransferableResourceList) {
        self.thread_checker.check();
        if !gpu::ensure_current(&self.device) {
            return;
        }
        assert!(self.children.contains_key(&child), "no child {}", child);
        if let Some(sync_point) = list.sync_point {
            self.device.wait_sync_point(sync_point);
        }

        for transferable in &list.resources {
            let mut texture = self.device.create_texture();
            self.device.consume_texture(&mut texture, &transferable.mailbox);
            let mut resource = Resource::from_texture(texture,
                                                      transferable.size,
                                                      transferable.format,
                                                      transferable.filter);
            resource.mailbox = transferable.mailbox;
            let id = self.insert_resource(resource);

            if let Some(child_info) = self.children.get_mut(&child) {
                child_info.parent_to_child_map.insert(id, transferable.id);
                child_info.child_to_parent_map.insert(transferable.id, id);
            }
        }
        debug!("received {} resources from child {}", list.len(), child);
    }

    /// Takes back resources previously sent with `prepare_send_to_parent`. Resources deleted
    /// while they were away are destroyed now.
    pub fn receive_from_parent(&mut self, list: &TransferableResourceList) {
        self.thread_checker.check();
        if !gpu::ensure_current(&self.device) {
            return;
        }
        if let Some(sync_point) = list.sync_point {
            self.device.wait_sync_point(sync_point);
        }

        for transferable in &list.resources {
            let device = &self.device;
            let resource = lookup_mut(&mut self.resources, transferable.id);
            assert!(resource.exported, "resource {} wasn't exported", transferable.id);
            resource.exported = false;
            if let Some(ref mut texture) = resource.gl_texture {
                device.consume_texture(texture, &transferable.mailbox);
            }
            resource.mailbox = transferable.mailbox;
            if resource.marked_for_deletion {
                self.destroy_resource(transferable.id);
            }
        }
        debug!("received {} resources from parent", list.len());
    }

    /// Produces the resource's texture into its mailbox. Returns `None` if the resource is
    /// already exported or has no texture. Doesn't mark the resource as exported.
    pub fn transfer_resource(&mut self, id: ResourceId) -> Option<TransferableResource> {
        self.thread_checker.check();
        let device = &self.device;
        let resource = lookup_mut(&mut self.resources, id);
        assert!(!resource.is_locked(), "resource {} is locked", id);
        assert!(!resource.external, "external resource {} can't be transferred", id);
        if resource.exported {
            return None;
        }

        let texture = match resource.gl_texture {
            Some(ref texture) => texture,
            None => {
                warn!("bitmap resource {} can't be transferred", id);
                return None;
            }
        };
        if resource.mailbox.is_zero() {
            resource.mailbox = device.generate_mailbox();
        }
        device.produce_texture(texture, &resource.mailbox);

        Some(TransferableResource {
            id,
            format: resource.format,
            filter: resource.filter,
            size: resource.size,
            mailbox: resource.mailbox,
        })
    }

    // Internals

    fn insert_resource(&mut self, resource: Resource<D>) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.resources.insert(id, resource);
        id
    }

    /// Read-only view of a resource's state. Panics if `id` isn't live.
    pub fn resource(&self, id: ResourceId) -> &Resource<D> {
        match self.resources.get(&id) {
            Some(resource) => resource,
            None => panic!("no resource {}", id),
        }
    }

    pub(crate) fn resource_mut(&mut self, id: ResourceId) -> &mut Resource<D> {
        lookup_mut(&mut self.resources, id)
    }

    fn check_size(&self, size: Vector2I) {
        assert!(size.x() >= 0 && size.y() >= 0);
        assert!(size.x() <= self.max_texture_size && size.y() <= self.max_texture_size,
                "{}x{} exceeds the maximum texture size {}",
                size.x(),
                size.y(),
                self.max_texture_size);
    }
}

impl<D> Drop for ResourceProvider<D> where D: Device {
    fn drop(&mut self) {
        if gpu::ensure_current(&self.device) {
            self.texture_uploader.destroy(&self.device);
        }
    }
}

fn lookup_mut<D>(resources: &mut FxHashMap<ResourceId, Resource<D>>, id: ResourceId)
                 -> &mut Resource<D>
                 where D: Device {
    match resources.get_mut(&id) {
        Some(resource) => resource,
        None => panic!("no resource {}", id),
    }
}

fn check_writable<D>(resource: &Resource<D>, id: ResourceId) where D: Device {
    assert!(!resource.is_locked(), "resource {} is locked", id);
    assert!(!resource.external, "external resource {} can't be written", id);
    assert!(!resource.exported, "resource {} is exported", id);
}

fn copy_from_pixel_buffer<D>(device: &D, resource: &mut Resource<D>, id: ResourceId)
                             where D: Device {
    match (&resource.gl_texture, &resource.gl_pixel_buffer) {
        (&Some(ref texture), &Some(ref buffer)) => {
            device.upload_to_texture_from_pixel_buffer(texture,
                                                       buffer,
                                                       resource.format,
                                                       resource.size);
            return;
        }
        (&Some(_), &None) => panic!("resource {} has no pixel buffer", id),
        _ => {}
    }

    match (&mut resource.pixels, &resource.pixel_buffer) {
        (&mut Some(ref mut pixels), &Some(ref buffer)) => {
            let byte_size = pixels.len();
            debug_assert_eq!(byte_size,
                             resource.size.x() as usize * resource.size.y() as usize *
                             BITMAP_BYTES_PER_PIXEL);
            pixels.copy_from_slice(&buffer[0..byte_size]);
        }
        _ => panic!("resource {} has no pixel buffer", id),
    }
}

#[cfg(test)]
mod test {
    use super::{InitializationError, ResourceProvider};
    use crate::options::ResourceProviderOptions;
    use crate::resource::{ResourceId, ResourceType};
    use compositor_gpu::fake::{FakeDevice, FakeShareGroup};
    use compositor_gpu::{Device, DeviceCapabilities, SyncPoint, TextureFilter, TextureFormat};
    use compositor_gpu::{TexturePool, TextureUsageHint};
    use fxhash::FxHashSet;
    use pathfinder_geometry::rect::RectI;
    use pathfinder_geometry::vector::Vector2I;
    use quickcheck;

    fn gl_provider() -> ResourceProvider<FakeDevice> {
        ResourceProvider::new(FakeDevice::new(), ResourceProviderOptions::default()).unwrap()
    }

    fn software_provider() -> ResourceProvider<FakeDevice> {
        ResourceProvider::new(FakeDevice::new(), ResourceProviderOptions::software()).unwrap()
    }

    fn rgba_resource(provider: &mut ResourceProvider<FakeDevice>, size: i32) -> ResourceId {
        provider.create_resource(Vector2I::splat(size), TextureFormat::RGBA8, TextureUsageHint::Any)
    }

    fn texture_of(provider: &ResourceProvider<FakeDevice>, id: ResourceId) -> u32 {
        *provider.resource(id).gl_texture().unwrap()
    }

    #[test]
    fn test_context_loss_fails_gl_initialization() {
        let device = FakeDevice::new();
        device.set_context_lost(true);
        let result = ResourceProvider::new(device, ResourceProviderOptions::default());
        assert_eq!(result.err(), Some(InitializationError::ContextLost));

        let device = FakeDevice::new();
        device.set_context_lost(true);
        assert!(ResourceProvider::new(device, ResourceProviderOptions::software()).is_ok());
    }

    #[test]
    fn test_create_gl_texture_allocates_storage() {
        let mut provider = gl_provider();
        let rgba = rgba_resource(&mut provider, 4);
        let luminance = provider.create_managed_resource(Vector2I::new(3, 2),
                                                         TextureFormat::Luminance8,
                                                         TextureUsageHint::Framebuffer);

        let rgba_texture = provider.device().texture(texture_of(&provider, rgba)).unwrap();
        assert!(rgba_texture.immutable);
        assert_eq!(rgba_texture.pool, Some(TexturePool::Unmanaged));
        assert_eq!(rgba_texture.filter, Some(TextureFilter::Linear));
        assert_eq!(rgba_texture.pixels.len(), 64);

        let luminance_texture =
            provider.device().texture(texture_of(&provider, luminance)).unwrap();
        assert!(!luminance_texture.immutable);
        assert_eq!(luminance_texture.pool, Some(TexturePool::Managed));
        assert_eq!(luminance_texture.usage_hint, TextureUsageHint::Framebuffer);
        assert_eq!(luminance_texture.size, Vector2I::new(3, 2));

        assert_eq!(provider.resource_type(rgba), ResourceType::GLTexture);
        assert_eq!(provider.num_resources(), 2);
    }

    #[test]
    fn test_mutable_allocation_without_texture_storage() {
        let device = FakeDevice::with_capabilities(FakeShareGroup::new(),
                                                   DeviceCapabilities::empty());
        let mut provider = ResourceProvider::new(device, ResourceProviderOptions::default())
            .unwrap();
        let id = provider.create_resource(Vector2I::splat(2),
                                          TextureFormat::RGBA8,
                                          TextureUsageHint::Framebuffer);
        let texture = provider.device().texture(texture_of(&provider, id)).unwrap();
        assert!(!texture.immutable);
        assert_eq!(texture.usage_hint, TextureUsageHint::Any);
    }

    #[test]
    #[should_panic]
    fn test_oversized_resource() {
        let device = FakeDevice::new();
        device.set_max_texture_size(16);
        let mut provider = ResourceProvider::new(device, ResourceProviderOptions::default())
            .unwrap();
        assert_eq!(provider.max_texture_size(), 16);
        rgba_resource(&mut provider, 17);
    }

    #[test]
    fn test_bitmap_resources() {
        let mut provider = software_provider();
        let id = rgba_resource(&mut provider, 2);
        assert_eq!(provider.resource_type(id), ResourceType::Bitmap);
        assert_eq!(provider.max_texture_size(), i32::max_value());

        let image = [1, 2, 3, 4, 5, 6, 7, 8];
        let rect = RectI::new(Vector2I::default(), Vector2I::new(2, 1));
        provider.set_pixels(id, &image, rect, rect, Vector2I::new(0, 1));

        let pixels = provider.lock_for_read(id).pixels().unwrap().clone();
        provider.unlock_for_read(id);
        assert_eq!(&pixels.as_raw()[0..8], &[0; 8]);
        assert_eq!(&pixels.as_raw()[8..16], &image);
        assert_eq!(provider.device().texture_count(), 0);
    }

    #[test]
    fn test_set_pixels_uploads_to_texture() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 2);
        let image: Vec<u8> = (0..16).collect();
        let rect = RectI::new(Vector2I::default(), Vector2I::splat(2));
        provider.set_pixels(id, &image, rect, rect, Vector2I::default());

        let texture = provider.device().texture(texture_of(&provider, id)).unwrap();
        assert_eq!(texture.pixels, image);
        assert_eq!(provider.num_blocking_uploads(), 0);
    }

    // A 4x4 RGBA image whose bytes count up from 0, so pixel (x, y) starts at 16 * y + 4 * x.
    fn counting_image() -> (Vec<u8>, RectI) {
        ((0..64).collect(), RectI::new(Vector2I::default(), Vector2I::splat(4)))
    }

    #[test]
    fn test_set_pixels_places_source_at_dest_offset() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 2);
        let (image, image_rect) = counting_image();

        let source_rect = RectI::new(Vector2I::splat(2), Vector2I::splat(2));
        provider.set_pixels(id, &image, image_rect, source_rect, Vector2I::default());
        let pixels = provider.device().texture(texture_of(&provider, id)).unwrap().pixels;
        assert_eq!(&pixels[0..4], &[40, 41, 42, 43]);
        assert_eq!(&pixels[4..8], &[44, 45, 46, 47]);
        assert_eq!(&pixels[8..16], &image[56..64]);

        let source_rect = RectI::new(Vector2I::new(3, 0), Vector2I::splat(1));
        provider.set_pixels(id, &image, image_rect, source_rect, Vector2I::splat(1));
        let pixels = provider.device().texture(texture_of(&provider, id)).unwrap().pixels;
        assert_eq!(&pixels[12..16], &[12, 13, 14, 15]);
        assert_eq!(&pixels[0..4], &[40, 41, 42, 43]);
    }

    #[test]
    fn test_set_pixels_places_source_at_dest_offset_in_bitmap() {
        let mut provider = software_provider();
        let id = rgba_resource(&mut provider, 2);
        let (image, image_rect) = counting_image();

        let source_rect = RectI::new(Vector2I::splat(2), Vector2I::splat(2));
        provider.set_pixels(id, &image, image_rect, source_rect, Vector2I::default());
        {
            let pixels = provider.resource(id).pixels().unwrap();
            assert_eq!(pixels.get_pixel(0, 0).0, [40, 41, 42, 43]);
            assert_eq!(pixels.get_pixel(1, 1).0, [60, 61, 62, 63]);
        }

        let source_rect = RectI::new(Vector2I::new(3, 0), Vector2I::splat(1));
        provider.set_pixels(id, &image, image_rect, source_rect, Vector2I::splat(1));
        assert_eq!(provider.resource(id).pixels().unwrap().get_pixel(1, 1).0, [12, 13, 14, 15]);
    }

    #[test]
    fn test_ids_are_unique_and_nonzero() {
        quickcheck::quickcheck(prop_ids_unique as fn(Vec<u8>) -> bool);

        fn prop_ids_unique(operations: Vec<u8>) -> bool {
            let mut provider = gl_provider();
            let mut live = vec![];
            let mut seen = FxHashSet::default();
            for operation in operations {
                let id = match operation % 4 {
                    0 => rgba_resource(&mut provider, 1),
                    1 => provider.create_bitmap(Vector2I::splat(1)),
                    2 => {
                        let texture = provider.device().create_texture();
                        provider.create_resource_from_external_texture(texture)
                    }
                    _ => {
                        if let Some(id) = live.pop() {
                            provider.delete_resource(id);
                        }
                        continue;
                    }
                };
                if id.0 == 0 || !seen.insert(id) {
                    return false;
                }
                live.push(id);
            }
            provider.num_resources() == live.len()
        }
    }

    #[test]
    fn test_lock_discipline() {
        quickcheck::quickcheck(prop_lock_discipline as fn(Vec<u8>) -> bool);

        // Applies only the transitions that are legal in the current state and checks that
        // write and read locks never coexist.
        fn prop_lock_discipline(operations: Vec<u8>) -> bool {
            let mut provider = gl_provider();
            let id = rgba_resource(&mut provider, 1);
            for operation in operations {
                let (reads, written, exported) = {
                    let resource = provider.resource(id);
                    (resource.lock_for_read_count(),
                     resource.is_locked_for_write(),
                     resource.is_exported())
                };
                match operation % 6 {
                    0 if !written && !exported => { provider.lock_for_read(id); }
                    1 if reads > 0 => provider.unlock_for_read(id),
                    2 if reads == 0 && !written && !exported => { provider.lock_for_write(id); }
                    3 if written => provider.unlock_for_write(id),
                    4 if reads == 0 && !written && !exported => {
                        provider.prepare_send_to_parent(&[id]);
                    }
                    5 if exported => {
                        let mailbox = *provider.resource(id).mailbox();
                        let list = returned_list(id, mailbox);
                        provider.receive_from_parent(&list);
                    }
                    _ => {}
                }
                let resource = provider.resource(id);
                if resource.is_locked_for_write() && resource.lock_for_read_count() > 0 {
                    return false;
                }
                if resource.is_exported() && (resource.is_locked_for_write() ||
                                              resource.lock_for_read_count() > 0) {
                    return false;
                }
            }
            true
        }
    }

    fn returned_list(id: ResourceId, mailbox: compositor_gpu::Mailbox)
                     -> crate::transfer::TransferableResourceList {
        crate::transfer::TransferableResourceList {
            sync_point: None,
            resources: vec![crate::transfer::TransferableResource {
                id,
                format: TextureFormat::RGBA8,
                filter: TextureFilter::Linear,
                size: Vector2I::splat(1),
                mailbox,
            }],
        }
    }

    #[test]
    #[should_panic]
    fn test_read_lock_while_write_locked() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.lock_for_write(id);
        provider.lock_for_read(id);
    }

    #[test]
    #[should_panic]
    fn test_read_lock_on_exported_resource() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.prepare_send_to_parent(&[id]);
        provider.lock_for_read(id);
    }

    #[test]
    #[should_panic]
    fn test_write_lock_on_exported_resource() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.prepare_send_to_parent(&[id]);
        provider.lock_for_write(id);
    }

    #[test]
    #[should_panic]
    fn test_delete_locked_resource() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.lock_for_read(id);
        provider.delete_resource(id);
    }

    #[test]
    #[should_panic(expected = "is already deleted")]
    fn test_delete_resource_twice_while_exported() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.prepare_send_to_parent(&[id]);
        provider.delete_resource(id);
        assert!(provider.resource(id).is_marked_for_deletion());
        provider.delete_resource(id);
    }

    #[test]
    #[should_panic(expected = "is locked")]
    fn test_delete_resource_with_pixels_in_flight() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.acquire_pixel_buffer(id);
        provider.device().set_queries_available(false);
        provider.begin_set_pixels(id);
        assert!(!provider.did_set_pixels_complete(id));
        provider.delete_resource(id);
    }

    #[test]
    #[should_panic(expected = "can't be written")]
    fn test_write_lock_on_external_resource() {
        let mut provider = gl_provider();
        let texture = provider.device().create_texture();
        let id = provider.create_resource_from_external_texture(texture);
        provider.lock_for_write(id);
    }

    fn set_one_pixel(provider: &mut ResourceProvider<FakeDevice>, id: ResourceId) {
        let rect = RectI::new(Vector2I::default(), Vector2I::splat(1));
        provider.set_pixels(id, &[1, 2, 3, 4], rect, rect, Vector2I::default());
    }

    #[test]
    #[should_panic(expected = "is locked")]
    fn test_set_pixels_on_read_locked_resource() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.lock_for_read(id);
        set_one_pixel(&mut provider, id);
    }

    #[test]
    #[should_panic(expected = "is locked")]
    fn test_set_pixels_on_write_locked_resource() {
        let mut provider = software_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.lock_for_write(id);
        set_one_pixel(&mut provider, id);
    }

    #[test]
    #[should_panic(expected = "is exported")]
    fn test_set_pixels_on_exported_resource() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.prepare_send_to_parent(&[id]);
        set_one_pixel(&mut provider, id);
    }

    #[test]
    #[should_panic(expected = "can't be written")]
    fn test_set_pixels_on_external_resource() {
        let mut provider = gl_provider();
        let texture = provider.device().create_texture();
        let id = provider.create_resource_from_external_texture(texture);
        set_one_pixel(&mut provider, id);
    }

    #[test]
    fn test_external_texture_is_never_deleted() {
        let mut provider = gl_provider();
        let texture = provider.device().create_texture();
        let id = provider.create_resource_from_external_texture(texture);
        assert!(provider.resource(id).is_external());
        assert_eq!(provider.device().texture(texture).unwrap().filter,
                   Some(TextureFilter::Linear));

        provider.delete_resource(id);
        assert_eq!(provider.num_resources(), 0);
        assert!(provider.device().deleted_textures().is_empty());
        assert!(provider.device().texture(texture).is_some());
    }

    #[test]
    fn test_export_is_idempotent() {
        quickcheck::quickcheck(prop_export_idempotent as fn(u8, Vec<u8>, Vec<u8>) -> bool);

        fn prop_export_idempotent(count: u8, first: Vec<u8>, second: Vec<u8>) -> bool {
            let mut provider = gl_provider();
            let ids: Vec<_> = (0..(count % 8 + 1)).map(|_| rgba_resource(&mut provider, 1))
                                                  .collect();
            let pick = |picks: &[u8]| -> Vec<ResourceId> {
                let mut picked: Vec<_> = picks.iter().map(|&pick| {
                    ids[pick as usize % ids.len()]
                }).collect();
                picked.sort();
                picked.dedup();
                picked
            };

            let first = provider.prepare_send_to_parent(&pick(&first));
            let second = provider.prepare_send_to_parent(&pick(&second));
            ids.iter().all(|&id| {
                let occurrences = first.resources.iter()
                                                 .chain(second.resources.iter())
                                                 .filter(|resource| resource.id == id)
                                                 .count();
                occurrences <= 1
            })
        }
    }

    #[test]
    fn test_send_to_parent_skips_exported_resources() {
        let mut provider = gl_provider();
        let (a, b) = (rgba_resource(&mut provider, 1), rgba_resource(&mut provider, 2));

        let first = provider.prepare_send_to_parent(&[a]);
        assert_eq!(first.len(), 1);
        assert!(first.sync_point.is_some());
        assert!(!first.resources[0].mailbox.is_zero());
        assert!(provider.in_use_by_consumer(a));

        let second = provider.prepare_send_to_parent(&[a, b]);
        assert_eq!(second.len(), 1);
        assert_eq!(second.resources[0].id, b);
        assert_eq!(second.resources[0].size, Vector2I::splat(2));

        let third = provider.prepare_send_to_parent(&[a]);
        assert!(third.is_empty());
        assert_eq!(third.sync_point, None);
        assert_eq!(provider.transfer_resource(a), None);
    }

    #[test]
    fn test_bitmaps_are_not_transferred() {
        let mut provider = gl_provider();
        let bitmap = provider.create_bitmap(Vector2I::splat(1));
        let list = provider.prepare_send_to_parent(&[bitmap]);
        assert!(list.is_empty());
        assert!(!provider.in_use_by_consumer(bitmap));
    }

    #[test]
    fn test_deferred_deletion() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        let texture = texture_of(&provider, id);
        let list = provider.prepare_send_to_parent(&[id]);

        provider.delete_resource(id);
        assert!(provider.resource(id).is_marked_for_deletion());
        assert!(provider.device().deleted_textures().is_empty());

        provider.receive_from_parent(&list);
        assert_eq!(provider.num_resources(), 0);
        assert_eq!(provider.device().deleted_textures(), vec![texture]);
        assert_eq!(provider.device().waited_sync_points(), vec![list.sync_point.unwrap()]);
    }

    #[test]
    fn test_receive_from_parent_unexports() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        let list = provider.prepare_send_to_parent(&[id]);
        provider.receive_from_parent(&list);
        assert!(!provider.in_use_by_consumer(id));
        assert_eq!(provider.resource(id).mailbox(), &list.resources[0].mailbox);
        provider.lock_for_write(id);
        provider.unlock_for_write(id);
    }

    #[test]
    fn test_child_round_trip() {
        let share_group = FakeShareGroup::new();
        let mut child_provider =
            ResourceProvider::new(FakeDevice::in_share_group(share_group.clone()),
                                  ResourceProviderOptions::default()).unwrap();
        let mut parent_provider =
            ResourceProvider::new(FakeDevice::in_share_group(share_group.clone()),
                                  ResourceProviderOptions::default()).unwrap();

        let child_id = rgba_resource(&mut child_provider, 1);
        let rect = RectI::new(Vector2I::default(), Vector2I::splat(1));
        child_provider.set_pixels(child_id, &[10, 20, 30, 40], rect, rect, Vector2I::default());
        let sent = child_provider.prepare_send_to_parent(&[child_id]);

        // Give the parent a resource of its own so that the id namespaces diverge.
        let parent_local = rgba_resource(&mut parent_provider, 1);
        let child = parent_provider.create_child();
        parent_provider.receive_from_child(child, &sent);
        assert_eq!(parent_provider.device().waited_sync_points(),
                   vec![sent.sync_point.unwrap()]);
        let parent_id = parent_provider.child_to_parent_map(child)[&child_id];
        assert_ne!(parent_id, child_id);

        let parent_texture = texture_of(&parent_provider, parent_id);
        assert_eq!(parent_provider.device().texture(parent_texture).unwrap().pixels,
                   vec![10, 20, 30, 40]);

        let returned = parent_provider.prepare_send_to_child(child, &[parent_id]);
        assert_eq!(returned.len(), 1);
        assert_eq!(returned.resources[0].id, child_id);
        assert!(returned.sync_point.is_some());
        assert_eq!(parent_provider.num_resources(), 1);
        assert_eq!(parent_provider.resource_type(parent_local), ResourceType::GLTexture);
        assert!(parent_provider.child_to_parent_map(child).is_empty());
        assert_eq!(parent_provider.device().deleted_textures(), vec![parent_texture]);

        child_provider.receive_from_parent(&returned);
        assert!(!child_provider.in_use_by_consumer(child_id));
    }

    #[test]
    #[should_panic]
    fn test_send_unshared_resource_to_child() {
        let mut provider = gl_provider();
        let child = provider.create_child();
        let id = rgba_resource(&mut provider, 1);
        provider.prepare_send_to_child(child, &[id]);
    }

    #[test]
    fn test_destroy_child_deletes_its_resources() {
        let share_group = FakeShareGroup::new();
        let mut child_provider =
            ResourceProvider::new(FakeDevice::in_share_group(share_group.clone()),
                                  ResourceProviderOptions::default()).unwrap();
        let mut parent_provider =
            ResourceProvider::new(FakeDevice::in_share_group(share_group.clone()),
                                  ResourceProviderOptions::default()).unwrap();

        let ids = [rgba_resource(&mut child_provider, 1), rgba_resource(&mut child_provider, 1)];
        let sent = child_provider.prepare_send_to_parent(&ids);
        let child = parent_provider.create_child();
        parent_provider.receive_from_child(child, &sent);
        assert_eq!(parent_provider.num_resources(), 2);

        parent_provider.destroy_child(child);
        assert_eq!(parent_provider.num_resources(), 0);
        assert_eq!(parent_provider.device().deleted_textures().len(), 2);
    }

    #[test]
    fn test_context_loss_makes_transfers_no_ops() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.device().set_context_lost(true);

        let list = provider.prepare_send_to_parent(&[id]);
        assert!(list.is_empty());
        assert!(!provider.in_use_by_consumer(id));

        let child = provider.create_child();
        let mut incoming = returned_list(ResourceId(5), compositor_gpu::Mailbox::zero());
        incoming.sync_point = Some(SyncPoint(3));
        provider.receive_from_child(child, &incoming);
        assert_eq!(provider.num_resources(), 1);
        assert!(provider.device().waited_sync_points().is_empty());
    }

    #[test]
    fn test_bind_for_sampling_only_changes_filter_when_needed() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        let texture = texture_of(&provider, id);
        provider.lock_for_read(id);

        provider.bind_for_sampling(id, 2, TextureFilter::Linear);
        assert_eq!(provider.resource(id).filter(), TextureFilter::Linear);
        provider.bind_for_sampling(id, 2, TextureFilter::Nearest);
        assert_eq!(provider.resource(id).filter(), TextureFilter::Nearest);
        assert_eq!(provider.device().texture(texture).unwrap().filter,
                   Some(TextureFilter::Nearest));
        assert_eq!(provider.device().bound_textures(), vec![(texture, 2), (texture, 2)]);
        provider.unlock_for_read(id);
    }

    #[test]
    fn test_async_pixel_buffer_upload() {
        let mut provider = gl_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.acquire_pixel_buffer(id);
        provider.map_pixel_buffer(id).copy_from_slice(&[1, 2, 3, 4]);
        provider.unmap_pixel_buffer(id);

        provider.device().set_queries_available(false);
        provider.begin_set_pixels(id);
        assert!(provider.resource(id).has_pending_set_pixels());
        assert!(provider.resource(id).is_locked_for_write());
        assert!(!provider.did_set_pixels_complete(id));
        assert!(provider.resource(id).has_pending_set_pixels());

        provider.device().set_queries_available(true);
        assert!(provider.did_set_pixels_complete(id));
        assert!(!provider.resource(id).is_locked_for_write());
        let texture = texture_of(&provider, id);
        assert_eq!(provider.device().texture(texture).unwrap().pixels, vec![1, 2, 3, 4]);

        provider.release_pixel_buffer(id);
        provider.delete_resource(id);
        assert_eq!(provider.device().buffer_count(), 0);
        assert_eq!(provider.device().query_count(), 0);
    }

    #[test]
    fn test_software_pixel_buffer_upload() {
        let mut provider = software_provider();
        let id = rgba_resource(&mut provider, 1);
        provider.acquire_pixel_buffer(id);
        provider.map_pixel_buffer(id).copy_from_slice(&[5, 6, 7, 8]);
        provider.unmap_pixel_buffer(id);
        provider.set_pixels_from_buffer(id);
        assert_eq!(provider.resource(id).pixels().unwrap().as_raw(), &vec![5, 6, 7, 8]);

        provider.map_pixel_buffer(id).copy_from_slice(&[9, 9, 9, 9]);
        provider.begin_set_pixels(id);
        assert!(provider.did_set_pixels_complete(id));
        assert_eq!(provider.resource(id).pixels().unwrap().as_raw(), &vec![9, 9, 9, 9]);
        provider.release_pixel_buffer(id);
    }

    #[test]
    fn test_shallow_flush_if_supported() {
        let mut provider = gl_provider();
        assert!(provider.shallow_flush_if_supported());
        assert_eq!(provider.device().shallow_flush_count(), 1);

        let device = FakeDevice::with_capabilities(FakeShareGroup::new(),
                                                   DeviceCapabilities::TEXTURE_STORAGE);
        let mut provider = ResourceProvider::new(device, ResourceProviderOptions::default())
            .unwrap();
        assert!(!provider.shallow_flush_if_supported());
        provider.flush();
        assert_eq!(provider.device().flush_count(), 1);
    }
}

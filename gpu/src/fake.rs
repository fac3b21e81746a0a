// compositor/gpu/src/fake.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An in-memory device that records what is done to it.
//!
//! Texture contents are kept on the CPU so that uploads, mailbox transfers, and deletions can
//! be checked without a GPU. Devices created in the same `FakeShareGroup` can exchange
//! textures through mailboxes and wait on each other's sync points.

use crate::{Device, DeviceCapabilities, Mailbox, QueryTarget, SyncPoint, TextureFilter};
use crate::{TextureFormat, TexturePool, TextureUsageHint};
use fxhash::FxHashMap;
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::Vector2I;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const DEFAULT_MAX_TEXTURE_SIZE: i32 = 2048;

/// Mailbox and sync point state shared between fake devices.
#[derive(Default)]
pub struct FakeShareGroup {
    next_mailbox: Cell<u32>,
    next_sync_point: Cell<u32>,
    mailboxes: RefCell<FxHashMap<Mailbox, FakeTexture>>,
}

impl FakeShareGroup {
    #[inline]
    pub fn new() -> Rc<FakeShareGroup> {
        Rc::new(FakeShareGroup::default())
    }

    /// The number of mailboxes that currently hold produced contents.
    #[inline]
    pub fn mailbox_count(&self) -> usize {
        self.mailboxes.borrow().len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FakeTexture {
    pub format: Option<TextureFormat>,
    pub size: Vector2I,
    pub pixels: Vec<u8>,
    pub filter: Option<TextureFilter>,
    pub pool: Option<TexturePool>,
    pub usage_hint: TextureUsageHint,
    pub immutable: bool,
}

impl Default for FakeTexture {
    fn default() -> FakeTexture {
        FakeTexture {
            format: None,
            size: Vector2I::default(),
            pixels: vec![],
            filter: None,
            pool: None,
            usage_hint: TextureUsageHint::Any,
            immutable: false,
        }
    }
}

#[derive(Debug)]
pub struct FakeBuffer {
    pub id: u32,
    pub data: Vec<u8>,
    pub mapped: bool,
}

pub struct FakeDevice {
    share_group: Rc<FakeShareGroup>,
    capabilities: DeviceCapabilities,
    max_texture_size: Cell<i32>,
    context_lost: Cell<bool>,
    queries_available: Cell<bool>,
    query_result: Cell<u32>,
    next_object_id: Cell<u32>,
    textures: RefCell<FxHashMap<u32, FakeTexture>>,
    deleted_textures: RefCell<Vec<u32>>,
    bound_textures: RefCell<Vec<(u32, u32)>>,
    live_buffers: Cell<usize>,
    live_queries: Cell<usize>,
    active_query: Cell<Option<QueryTarget>>,
    waited_sync_points: RefCell<Vec<SyncPoint>>,
    flush_count: Cell<u32>,
    shallow_flush_count: Cell<u32>,
}

impl FakeDevice {
    /// Creates a device with every capability in a share group of its own.
    #[inline]
    pub fn new() -> FakeDevice {
        FakeDevice::with_capabilities(FakeShareGroup::new(), DeviceCapabilities::all())
    }

    #[inline]
    pub fn in_share_group(share_group: Rc<FakeShareGroup>) -> FakeDevice {
        FakeDevice::with_capabilities(share_group, DeviceCapabilities::all())
    }

    pub fn with_capabilities(share_group: Rc<FakeShareGroup>, capabilities: DeviceCapabilities)
                             -> FakeDevice {
        FakeDevice {
            share_group,
            capabilities,
            max_texture_size: Cell::new(DEFAULT_MAX_TEXTURE_SIZE),
            context_lost: Cell::new(false),
            queries_available: Cell::new(true),
            query_result: Cell::new(1000),
            next_object_id: Cell::new(1),
            textures: RefCell::new(FxHashMap::default()),
            deleted_textures: RefCell::new(vec![]),
            bound_textures: RefCell::new(vec![]),
            live_buffers: Cell::new(0),
            live_queries: Cell::new(0),
            active_query: Cell::new(None),
            waited_sync_points: RefCell::new(vec![]),
            flush_count: Cell::new(0),
            shallow_flush_count: Cell::new(0),
        }
    }

    #[inline]
    pub fn share_group(&self) -> Rc<FakeShareGroup> {
        self.share_group.clone()
    }

    #[inline]
    pub fn set_context_lost(&self, lost: bool) {
        self.context_lost.set(lost)
    }

    #[inline]
    pub fn set_max_texture_size(&self, size: i32) {
        self.max_texture_size.set(size)
    }

    /// Controls whether queries report themselves as complete.
    #[inline]
    pub fn set_queries_available(&self, available: bool) {
        self.queries_available.set(available)
    }

    #[inline]
    pub fn set_query_result(&self, microseconds: u32) {
        self.query_result.set(microseconds)
    }

    #[inline]
    pub fn texture(&self, texture: u32) -> Option<FakeTexture> {
        self.textures.borrow().get(&texture).cloned()
    }

    /// The number of textures created by this device that have not been deleted.
    #[inline]
    pub fn texture_count(&self) -> usize {
        self.textures.borrow().len()
    }

    #[inline]
    pub fn deleted_textures(&self) -> Vec<u32> {
        self.deleted_textures.borrow().clone()
    }

    #[inline]
    pub fn bound_textures(&self) -> Vec<(u32, u32)> {
        self.bound_textures.borrow().clone()
    }

    #[inline]
    pub fn buffer_count(&self) -> usize {
        self.live_buffers.get()
    }

    #[inline]
    pub fn query_count(&self) -> usize {
        self.live_queries.get()
    }

    #[inline]
    pub fn waited_sync_points(&self) -> Vec<SyncPoint> {
        self.waited_sync_points.borrow().clone()
    }

    #[inline]
    pub fn flush_count(&self) -> u32 {
        self.flush_count.get()
    }

    #[inline]
    pub fn shallow_flush_count(&self) -> u32 {
        self.shallow_flush_count.get()
    }

    fn next_id(&self) -> u32 {
        let id = self.next_object_id.get();
        self.next_object_id.set(id + 1);
        id
    }

    fn update_texture<F>(&self, texture: u32, update: F) where F: FnOnce(&mut FakeTexture) {
        let mut textures = self.textures.borrow_mut();
        update(textures.entry(texture).or_insert_with(FakeTexture::default))
    }

    fn allocate(&self, texture: u32, format: TextureFormat, size: Vector2I, immutable: bool) {
        self.update_texture(texture, |info| {
            debug_assert!(!info.immutable, "immutable texture storage can't be reallocated");
            info.format = Some(format);
            info.size = size;
            info.pixels = vec![0; size.x() as usize * size.y() as usize *
                                  format.bytes_per_pixel()];
            info.immutable = immutable;
        })
    }

    fn write_pixels(&self, texture: u32, format: TextureFormat, rect: RectI, data: &[u8]) {
        self.update_texture(texture, |info| {
            assert_eq!(info.format, Some(format), "upload format doesn't match the texture");
            let bytes_per_pixel = format.bytes_per_pixel();
            let row_length = rect.size().x() as usize * bytes_per_pixel;
            let stride = info.size.x() as usize * bytes_per_pixel;
            assert!(rect.min_x() >= 0 && rect.min_y() >= 0);
            assert!(rect.max_x() <= info.size.x() && rect.max_y() <= info.size.y());
            assert!(data.len() >= row_length * rect.size().y() as usize);
            for row in 0..(rect.size().y() as usize) {
                let dest_start = (rect.min_y() as usize + row) * stride +
                    rect.min_x() as usize * bytes_per_pixel;
                let src_start = row * row_length;
                info.pixels[dest_start..(dest_start + row_length)]
                    .copy_from_slice(&data[src_start..(src_start + row_length)]);
            }
        })
    }
}

impl Default for FakeDevice {
    #[inline]
    fn default() -> FakeDevice {
        FakeDevice::new()
    }
}

impl Device for FakeDevice {
    type Buffer = FakeBuffer;
    type Query = u32;
    type Texture = u32;

    fn make_current(&self) -> bool {
        !self.context_lost.get()
    }

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn max_texture_size(&self) -> i32 {
        self.max_texture_size.get()
    }

    fn create_texture(&self) -> u32 {
        let texture = self.next_id();
        self.textures.borrow_mut().insert(texture, FakeTexture::default());
        texture
    }

    fn set_texture_sampling(&self, texture: &u32, filter: TextureFilter) {
        self.update_texture(*texture, |info| info.filter = Some(filter))
    }

    fn set_texture_pool(&self, texture: &u32, pool: TexturePool) {
        self.update_texture(*texture, |info| info.pool = Some(pool))
    }

    fn set_texture_usage_hint(&self, texture: &u32, hint: TextureUsageHint) {
        assert!(self.capabilities.contains(DeviceCapabilities::TEXTURE_USAGE_HINT));
        self.update_texture(*texture, |info| info.usage_hint = hint)
    }

    fn allocate_texture_storage(&self, texture: &u32, format: TextureFormat, size: Vector2I) {
        assert!(self.capabilities.contains(DeviceCapabilities::TEXTURE_STORAGE));
        self.allocate(*texture, format, size, true)
    }

    fn allocate_texture(&self, texture: &u32, format: TextureFormat, size: Vector2I) {
        self.allocate(*texture, format, size, false)
    }

    fn upload_to_texture(&self, texture: &u32, format: TextureFormat, rect: RectI, data: &[u8]) {
        self.write_pixels(*texture, format, rect, data)
    }

    fn bind_texture(&self, texture: &u32, unit: u32) {
        self.bound_textures.borrow_mut().push((*texture, unit))
    }

    fn delete_texture(&self, texture: u32) {
        self.textures.borrow_mut().remove(&texture);
        self.deleted_textures.borrow_mut().push(texture);
    }

    fn texture_name(&self, texture: &u32) -> u32 {
        *texture
    }

    fn create_pixel_buffer(&self) -> FakeBuffer {
        self.live_buffers.set(self.live_buffers.get() + 1);
        FakeBuffer { id: self.next_id(), data: vec![], mapped: false }
    }

    fn allocate_pixel_buffer(&self, buffer: &mut FakeBuffer, byte_size: usize) {
        assert!(!buffer.mapped);
        buffer.data = vec![0; byte_size];
    }

    fn map_pixel_buffer<'a>(&self, buffer: &'a mut FakeBuffer) -> &'a mut [u8] {
        assert!(!buffer.mapped, "buffer is already mapped");
        buffer.mapped = true;
        &mut buffer.data
    }

    fn unmap_pixel_buffer(&self, buffer: &mut FakeBuffer) {
        assert!(buffer.mapped, "buffer isn't mapped");
        buffer.mapped = false;
    }

    fn upload_to_texture_from_pixel_buffer(&self,
                                           texture: &u32,
                                           buffer: &FakeBuffer,
                                           format: TextureFormat,
                                           size: Vector2I) {
        assert!(!buffer.mapped);
        self.write_pixels(*texture, format, RectI::new(Vector2I::default(), size), &buffer.data)
    }

    fn begin_async_upload_from_pixel_buffer(&self,
                                            texture: &u32,
                                            buffer: &FakeBuffer,
                                            format: TextureFormat,
                                            size: Vector2I,
                                            query: &u32) {
        self.begin_query(query, QueryTarget::AsyncTexturesUploaded);
        self.upload_to_texture_from_pixel_buffer(texture, buffer, format, size);
        self.end_query(QueryTarget::AsyncTexturesUploaded);
    }

    fn delete_pixel_buffer(&self, buffer: FakeBuffer) {
        assert!(!buffer.mapped);
        self.live_buffers.set(self.live_buffers.get() - 1);
    }

    fn create_query(&self) -> u32 {
        self.live_queries.set(self.live_queries.get() + 1);
        self.next_id()
    }

    fn begin_query(&self, _: &u32, target: QueryTarget) {
        assert_eq!(self.active_query.get(), None, "query already active");
        self.active_query.set(Some(target));
    }

    fn end_query(&self, target: QueryTarget) {
        assert_eq!(self.active_query.get(), Some(target), "no matching active query");
        self.active_query.set(None);
    }

    fn query_is_available(&self, _: &u32) -> bool {
        self.queries_available.get()
    }

    fn query_result(&self, _: &u32) -> u32 {
        self.query_result.get()
    }

    fn delete_query(&self, _: u32) {
        self.live_queries.set(self.live_queries.get() - 1);
    }

    fn generate_mailbox(&self) -> Mailbox {
        let serial = self.share_group.next_mailbox.get() + 1;
        self.share_group.next_mailbox.set(serial);
        let mut mailbox = Mailbox::zero();
        mailbox.name[0..4].copy_from_slice(&serial.to_le_bytes());
        mailbox
    }

    fn produce_texture(&self, texture: &u32, mailbox: &Mailbox) {
        let contents = self.texture(*texture).unwrap_or_default();
        self.share_group.mailboxes.borrow_mut().insert(*mailbox, contents);
    }

    fn consume_texture(&self, texture: &mut u32, mailbox: &Mailbox) {
        let contents = self.share_group.mailboxes.borrow().get(mailbox).cloned();
        match contents {
            Some(contents) => { self.textures.borrow_mut().insert(*texture, contents); }
            None => warn!("consumed unknown mailbox {:?}", mailbox),
        }
    }

    fn insert_sync_point(&self) -> SyncPoint {
        let sync_point = self.share_group.next_sync_point.get() + 1;
        self.share_group.next_sync_point.set(sync_point);
        SyncPoint(sync_point)
    }

    fn wait_sync_point(&self, sync_point: SyncPoint) {
        self.waited_sync_points.borrow_mut().push(sync_point)
    }

    fn flush(&self) {
        self.flush_count.set(self.flush_count.get() + 1)
    }

    fn shallow_flush(&self) {
        assert!(self.capabilities.contains(DeviceCapabilities::SHALLOW_FLUSH));
        self.shallow_flush_count.set(self.shallow_flush_count.get() + 1)
    }
}

// compositor/gl/src/device.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The OpenGL implementation of the device abstraction.

use crate::share_group::ShareGroup;
use compositor_gpu::{Device, DeviceCapabilities, Mailbox, QueryTarget, SyncPoint};
use compositor_gpu::{TextureFilter, TextureFormat, TexturePool, TextureUsageHint};
use gl::types::{GLenum, GLint, GLsizei, GLsizeiptr, GLuint, GLvoid};
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::Vector2I;
use std::ptr;
use std::rc::Rc;
use std::slice;

pub struct GLDevice {
    share_group: Rc<ShareGroup>,
    capabilities: DeviceCapabilities,
    max_texture_size: i32,
}

impl GLDevice {
    /// Wraps the GL context that is current on this thread.
    pub fn new(share_group: Rc<ShareGroup>) -> GLDevice {
        let mut max_texture_size = 0;
        unsafe {
            gl::GetIntegerv(gl::MAX_TEXTURE_SIZE, &mut max_texture_size); ck();
        }

        // Core profile contexts always have immutable storage and BGRA uploads. There's no
        // usage hint, shallow flush, or asynchronous pixel transfer support in plain GL.
        let capabilities = DeviceCapabilities::TEXTURE_STORAGE | DeviceCapabilities::BGRA_FORMAT;

        debug!("GL device: max texture size {}, capabilities {:?}",
               max_texture_size,
               capabilities);
        GLDevice { share_group, capabilities, max_texture_size }
    }

    #[inline]
    pub fn share_group(&self) -> &Rc<ShareGroup> {
        &self.share_group
    }

    fn release_texture_name(&self, gl_texture: GLuint) {
        if self.share_group.release_texture(gl_texture) {
            unsafe {
                gl::DeleteTextures(1, &gl_texture); ck();
            }
        }
    }
}

pub struct GLTexture {
    pub gl_texture: GLuint,
}

impl GLTexture {
    /// Wraps a texture owned by someone else. The device never deletes such textures through
    /// the share group.
    #[inline]
    pub fn from_raw(gl_texture: GLuint) -> GLTexture {
        GLTexture { gl_texture }
    }
}

pub struct GLBuffer {
    pub gl_buffer: GLuint,
    size: usize,
}

pub struct GLQuery {
    pub gl_query: GLuint,
}

impl Device for GLDevice {
    type Buffer = GLBuffer;
    type Query = GLQuery;
    type Texture = GLTexture;

    fn make_current(&self) -> bool {
        if !gl::GetGraphicsResetStatus::is_loaded() {
            return true;
        }
        unsafe { gl::GetGraphicsResetStatus() == gl::NO_ERROR }
    }

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn max_texture_size(&self) -> i32 {
        self.max_texture_size
    }

    fn create_texture(&self) -> GLTexture {
        let mut texture = GLTexture { gl_texture: 0 };
        unsafe {
            gl::GenTextures(1, &mut texture.gl_texture); ck();
        }
        self.share_group.retain_texture(texture.gl_texture);
        texture
    }

    fn set_texture_sampling(&self, texture: &GLTexture, filter: TextureFilter) {
        let gl_filter = match filter {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
        };
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, texture.gl_texture); ck();
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl_filter as GLint); ck();
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl_filter as GLint); ck();
            gl::TexParameteri(gl::TEXTURE_2D,
                              gl::TEXTURE_WRAP_S,
                              gl::CLAMP_TO_EDGE as GLint); ck();
            gl::TexParameteri(gl::TEXTURE_2D,
                              gl::TEXTURE_WRAP_T,
                              gl::CLAMP_TO_EDGE as GLint); ck();
        }
    }

    fn set_texture_pool(&self, texture: &GLTexture, pool: TexturePool) {
        // GL drivers manage residency on their own.
        trace!("ignoring pool {:?} for texture {}", pool, texture.gl_texture);
    }

    fn set_texture_usage_hint(&self, _: &GLTexture, _: TextureUsageHint) {
        unreachable!("GL has no texture usage hints")
    }

    fn allocate_texture_storage(&self,
                                texture: &GLTexture,
                                format: TextureFormat,
                                size: Vector2I) {
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, texture.gl_texture); ck();
            gl::TexStorage2D(gl::TEXTURE_2D,
                             1,
                             format.gl_internal_format(),
                             size.x() as GLsizei,
                             size.y() as GLsizei); ck();
        }
    }

    fn allocate_texture(&self, texture: &GLTexture, format: TextureFormat, size: Vector2I) {
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, texture.gl_texture); ck();
            gl::TexImage2D(gl::TEXTURE_2D,
                           0,
                           format.gl_internal_format() as GLint,
                           size.x() as GLsizei,
                           size.y() as GLsizei,
                           0,
                           format.gl_format(),
                           gl::UNSIGNED_BYTE,
                           ptr::null()); ck();
        }
    }

    fn upload_to_texture(&self,
                         texture: &GLTexture,
                         format: TextureFormat,
                         rect: RectI,
                         data: &[u8]) {
        let size = rect.size();
        assert!(data.len() >= size.x() as usize * size.y() as usize * format.bytes_per_pixel());
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, texture.gl_texture); ck();
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1); ck();
            gl::TexSubImage2D(gl::TEXTURE_2D,
                              0,
                              rect.min_x(),
                              rect.min_y(),
                              size.x() as GLsizei,
                              size.y() as GLsizei,
                              format.gl_format(),
                              gl::UNSIGNED_BYTE,
                              data.as_ptr() as *const GLvoid); ck();
        }
    }

    fn bind_texture(&self, texture: &GLTexture, unit: u32) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit); ck();
            gl::BindTexture(gl::TEXTURE_2D, texture.gl_texture); ck();
        }
    }

    fn delete_texture(&self, texture: GLTexture) {
        self.release_texture_name(texture.gl_texture)
    }

    #[inline]
    fn texture_name(&self, texture: &GLTexture) -> u32 {
        texture.gl_texture
    }

    fn create_pixel_buffer(&self) -> GLBuffer {
        let mut buffer = GLBuffer { gl_buffer: 0, size: 0 };
        unsafe {
            gl::GenBuffers(1, &mut buffer.gl_buffer); ck();
        }
        buffer
    }

    fn allocate_pixel_buffer(&self, buffer: &mut GLBuffer, byte_size: usize) {
        unsafe {
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, buffer.gl_buffer); ck();
            gl::BufferData(gl::PIXEL_UNPACK_BUFFER,
                           byte_size as GLsizeiptr,
                           ptr::null(),
                           gl::DYNAMIC_DRAW); ck();
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0); ck();
        }
        buffer.size = byte_size;
    }

    fn map_pixel_buffer<'a>(&self, buffer: &'a mut GLBuffer) -> &'a mut [u8] {
        if buffer.size == 0 {
            return &mut [];
        }
        unsafe {
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, buffer.gl_buffer); ck();
            let data = gl::MapBufferRange(gl::PIXEL_UNPACK_BUFFER,
                                          0,
                                          buffer.size as GLsizeiptr,
                                          gl::MAP_WRITE_BIT | gl::MAP_INVALIDATE_BUFFER_BIT);
            ck();
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0); ck();
            assert!(!data.is_null(), "failed to map pixel buffer {}", buffer.gl_buffer);
            slice::from_raw_parts_mut(data as *mut u8, buffer.size)
        }
    }

    fn unmap_pixel_buffer(&self, buffer: &mut GLBuffer) {
        unsafe {
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, buffer.gl_buffer); ck();
            gl::UnmapBuffer(gl::PIXEL_UNPACK_BUFFER); ck();
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0); ck();
        }
    }

    fn upload_to_texture_from_pixel_buffer(&self,
                                           texture: &GLTexture,
                                           buffer: &GLBuffer,
                                           format: TextureFormat,
                                           size: Vector2I) {
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, texture.gl_texture); ck();
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, buffer.gl_buffer); ck();
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1); ck();
            gl::TexSubImage2D(gl::TEXTURE_2D,
                              0,
                              0,
                              0,
                              size.x() as GLsizei,
                              size.y() as GLsizei,
                              format.gl_format(),
                              gl::UNSIGNED_BYTE,
                              ptr::null()); ck();
            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0); ck();
        }
    }

    fn begin_async_upload_from_pixel_buffer(&self,
                                            texture: &GLTexture,
                                            buffer: &GLBuffer,
                                            format: TextureFormat,
                                            size: Vector2I,
                                            query: &GLQuery) {
        // The query resolves once the GPU has consumed the buffer, which is the closest plain GL
        // gets to an asynchronous upload.
        self.begin_query(query, QueryTarget::AsyncTexturesUploaded);
        self.upload_to_texture_from_pixel_buffer(texture, buffer, format, size);
        self.end_query(QueryTarget::AsyncTexturesUploaded);
    }

    fn delete_pixel_buffer(&self, mut buffer: GLBuffer) {
        unsafe {
            gl::DeleteBuffers(1, &mut buffer.gl_buffer); ck();
        }
    }

    fn create_query(&self) -> GLQuery {
        let mut query = GLQuery { gl_query: 0 };
        unsafe {
            gl::GenQueries(1, &mut query.gl_query); ck();
        }
        query
    }

    fn begin_query(&self, query: &GLQuery, target: QueryTarget) {
        unsafe {
            gl::BeginQuery(target.gl_target(), query.gl_query); ck();
        }
    }

    fn end_query(&self, target: QueryTarget) {
        unsafe {
            gl::EndQuery(target.gl_target()); ck();
        }
    }

    fn query_is_available(&self, query: &GLQuery) -> bool {
        unsafe {
            let mut result = 0;
            gl::GetQueryObjectiv(query.gl_query, gl::QUERY_RESULT_AVAILABLE, &mut result); ck();
            result != gl::FALSE as GLint
        }
    }

    fn query_result(&self, query: &GLQuery) -> u32 {
        let mut nanoseconds = 0;
        unsafe {
            gl::GetQueryObjectui64v(query.gl_query, gl::QUERY_RESULT, &mut nanoseconds); ck();
        }
        (nanoseconds / 1000).min(u32::max_value() as u64) as u32
    }

    fn delete_query(&self, mut query: GLQuery) {
        unsafe {
            gl::DeleteQueries(1, &mut query.gl_query); ck();
        }
    }

    fn generate_mailbox(&self) -> Mailbox {
        self.share_group.generate_mailbox()
    }

    fn produce_texture(&self, texture: &GLTexture, mailbox: &Mailbox) {
        self.share_group.produce(mailbox, texture.gl_texture)
    }

    fn consume_texture(&self, texture: &mut GLTexture, mailbox: &Mailbox) {
        let gl_texture = match self.share_group.lookup(mailbox) {
            Some(gl_texture) => gl_texture,
            None => {
                warn!("consumed unknown mailbox {:?}", mailbox);
                return;
            }
        };
        if gl_texture == texture.gl_texture {
            return;
        }
        self.share_group.retain_texture(gl_texture);
        self.release_texture_name(texture.gl_texture);
        texture.gl_texture = gl_texture;
    }

    fn insert_sync_point(&self) -> SyncPoint {
        unsafe {
            let fence = gl::FenceSync(gl::SYNC_GPU_COMMANDS_COMPLETE, 0); ck();
            // Other contexts can only wait on fences that have been flushed.
            gl::Flush(); ck();
            self.share_group.insert_fence(fence)
        }
    }

    fn wait_sync_point(&self, sync_point: SyncPoint) {
        let fence = match self.share_group.take_fence(sync_point) {
            Some(fence) => fence,
            None => {
                warn!("waited on unknown sync point {:?}", sync_point);
                return;
            }
        };
        unsafe {
            gl::WaitSync(fence, 0, gl::TIMEOUT_IGNORED); ck();
            gl::DeleteSync(fence); ck();
        }
    }

    fn flush(&self) {
        unsafe {
            gl::Flush(); ck();
        }
    }

    fn shallow_flush(&self) {
        self.flush()
    }
}

trait TextureFormatExt {
    fn gl_internal_format(self) -> GLenum;
    fn gl_format(self) -> GLenum;
}

impl TextureFormatExt for TextureFormat {
    fn gl_internal_format(self) -> GLenum {
        match self {
            TextureFormat::RGBA8 | TextureFormat::BGRA8 => gl::RGBA8,
            TextureFormat::Luminance8 => gl::R8,
        }
    }

    fn gl_format(self) -> GLenum {
        match self {
            TextureFormat::RGBA8 => gl::RGBA,
            TextureFormat::BGRA8 => gl::BGRA,
            TextureFormat::Luminance8 => gl::RED,
        }
    }
}

trait QueryTargetExt {
    fn gl_target(self) -> GLenum;
}

impl QueryTargetExt for QueryTarget {
    fn gl_target(self) -> GLenum {
        match self {
            QueryTarget::CommandsIssued | QueryTarget::AsyncTexturesUploaded => gl::TIME_ELAPSED,
        }
    }
}

// Error checking

#[cfg(debug_assertions)]
fn ck() {
    unsafe {
        // Note that ideally we should call glGetError() in a loop until it
        // returns GL_NO_ERROR, but for now we'll just report the first one we find.
        let err = gl::GetError();
        if err != gl::NO_ERROR {
            panic!("GL error: 0x{:x} ({})", err, match err {
                gl::INVALID_ENUM => "INVALID_ENUM",
                gl::INVALID_VALUE => "INVALID_VALUE",
                gl::INVALID_OPERATION => "INVALID_OPERATION",
                gl::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
                gl::OUT_OF_MEMORY => "OUT_OF_MEMORY",
                gl::STACK_UNDERFLOW => "STACK_UNDERFLOW",
                gl::STACK_OVERFLOW => "STACK_OVERFLOW",
                _ => "Unknown"
            });
        }
    }
}

#[cfg(not(debug_assertions))]
fn ck() {}

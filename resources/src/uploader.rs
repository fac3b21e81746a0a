// compositor/resources/src/uploader.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Synchronous sub-rectangle texture uploads, with throughput tracking.
//!
//! Uploads that replace a whole texture are timed with a query. Until a query resolves, its
//! upload counts as *blocking*: the scheduler uses that count together with the measured
//! throughput to decide how many uploads it can afford per frame.

use crate::resource::{rect_contains_rect, rect_is_empty};
use compositor_gpu::{Device, DeviceCapabilities, QueryTarget, TextureFormat};
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::Vector2I;
use std::collections::VecDeque;

const UPLOAD_HISTORY_SIZE_MAX: usize = 1000;
const UPLOAD_HISTORY_SIZE_INITIAL: usize = 100;
const DEFAULT_ESTIMATED_TEXTURES_PER_SECOND: f64 = 48.0 * 60.0;
const MIN_UPLOAD_MICROSECONDS: u32 = 1;
const MAX_UPLOAD_MICROSECONDS: u32 = 15000;

struct PendingQuery<Q> {
    query: Q,
    non_blocking: bool,
}

pub struct TextureUploader<D> where D: Device {
    pending_queries: VecDeque<PendingQuery<D::Query>>,
    available_queries: Vec<D::Query>,
    // Kept sorted so that the median is a lookup.
    textures_per_second_history: Vec<f64>,
    scratch: Vec<u8>,
    flush_period: u32,
    use_shallow_flush: bool,
    uploads_since_flush: u32,
}

impl<D> TextureUploader<D> where D: Device {
    pub fn new(flush_period: u32, use_shallow_flush: bool) -> TextureUploader<D> {
        TextureUploader {
            pending_queries: VecDeque::new(),
            available_queries: vec![],
            textures_per_second_history: vec![DEFAULT_ESTIMATED_TEXTURES_PER_SECOND;
                                              UPLOAD_HISTORY_SIZE_INITIAL],
            scratch: vec![],
            flush_period,
            use_shallow_flush,
            uploads_since_flush: 0,
        }
    }

    /// Uploads `source_rect` of `image`, which covers `image_rect`, to `dest_offset` in the
    /// texture.
    pub fn upload(&mut self,
                  device: &D,
                  texture: &D::Texture,
                  format: TextureFormat,
                  texture_size: Vector2I,
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

        let dest_rect = RectI::new(dest_offset, source_rect.size());
        let is_full_upload = dest_offset == Vector2I::default() &&
            source_rect.size() == texture_size;
        if is_full_upload {
            self.begin_query(device);
        }

        self.upload_with_tex_sub_image(device,
                                       texture,
                                       format,
                                       image,
                                       image_rect,
                                       source_rect,
                                       dest_rect);

        if is_full_upload {
            device.end_query(QueryTarget::CommandsIssued);
        }

        self.uploads_since_flush += 1;
        if self.uploads_since_flush >= self.flush_period {
            self.flush(device);
        }
    }

    fn upload_with_tex_sub_image(&mut self,
                                 device: &D,
                                 texture: &D::Texture,
                                 format: TextureFormat,
                                 image: &[u8],
                                 image_rect: RectI,
                                 source_rect: RectI,
                                 dest_rect: RectI) {
        let bytes_per_pixel = format.bytes_per_pixel();
        let offset = source_rect.origin() - image_rect.origin();
        let image_stride = image_rect.size().x() as usize * bytes_per_pixel;
        let row_length = source_rect.size().x() as usize * bytes_per_pixel;
        let rows = source_rect.size().y() as usize;
        let start = offset.y() as usize * image_stride + offset.x() as usize * bytes_per_pixel;

        // Rows are contiguous in the image, so it can be uploaded in place.
        if row_length == image_stride {
            let end = start + row_length * rows;
            assert!(image.len() >= end, "image data is smaller than its rect");
            device.upload_to_texture(texture, format, dest_rect, &image[start..end]);
            return;
        }

        assert!(image.len() >= start + image_stride * (rows - 1) + row_length,
                "image data is smaller than its rect");
        self.scratch.clear();
        for row in 0..rows {
            let row_start = start + row * image_stride;
            self.scratch.extend_from_slice(&image[row_start..(row_start + row_length)]);
        }
        device.upload_to_texture(texture, format, dest_rect, &self.scratch);
    }

    fn begin_query(&mut self, device: &D) {
        let query = match self.available_queries.pop() {
            Some(query) => query,
            None => device.create_query(),
        };
        device.begin_query(&query, QueryTarget::CommandsIssued);
        self.pending_queries.push_back(PendingQuery { query, non_blocking: false });
    }

    /// Issues a shallow flush if any uploads happened since the last one.
    pub fn flush(&mut self, device: &D) {
        if self.uploads_since_flush == 0 {
            return;
        }
        if self.use_shallow_flush &&
                device.capabilities().contains(DeviceCapabilities::SHALLOW_FLUSH) {
            device.shallow_flush();
        }
        self.uploads_since_flush = 0;
    }

    /// The number of full uploads whose queries haven't resolved, minus those marked
    /// non-blocking.
    pub fn num_blocking_uploads(&mut self, device: &D) -> usize {
        self.process_queries(device);
        self.pending_queries.iter().filter(|pending| !pending.non_blocking).count()
    }

    pub fn mark_pending_uploads_as_non_blocking(&mut self) {
        for pending_query in &mut self.pending_queries {
            pending_query.non_blocking = true;
        }
    }

    /// The median of the recorded upload throughput samples.
    pub fn estimated_textures_per_second(&mut self, device: &D) -> f64 {
        self.process_queries(device);
        self.textures_per_second_history[self.textures_per_second_history.len() / 2]
    }

    /// Deletes the queries that are kept around for reuse.
    pub fn release_cached_data(&mut self, device: &D) {
        self.process_queries(device);
        for query in self.available_queries.drain(..) {
            device.delete_query(query);
        }
    }

    /// Deletes every query, resolved or not.
    pub(crate) fn destroy(&mut self, device: &D) {
        for pending_query in self.pending_queries.drain(..) {
            device.delete_query(pending_query.query);
        }
        for query in self.available_queries.drain(..) {
            device.delete_query(query);
        }
    }

    fn process_queries(&mut self, device: &D) {
        loop {
            match self.pending_queries.front() {
                Some(pending_query) if device.query_is_available(&pending_query.query) => {}
                _ => break,
            }
            let pending_query = match self.pending_queries.pop_front() {
                Some(pending_query) => pending_query,
                None => break,
            };
            let microseconds = device.query_result(&pending_query.query);
            self.record_upload_time(microseconds);
            self.available_queries.push(pending_query.query);
        }
    }

    fn record_upload_time(&mut self, microseconds: u32) {
        let microseconds = microseconds.max(MIN_UPLOAD_MICROSECONDS).min(MAX_UPLOAD_MICROSECONDS);
        let textures_per_second = 1.0 / (microseconds as f64 * 1e-6);

        // Drop the extremes so the history stays bounded without skewing the median.
        let history = &mut self.textures_per_second_history;
        if history.len() >= UPLOAD_HISTORY_SIZE_MAX {
            history.remove(0);
            history.pop();
        }

        let index = history.iter()
                           .position(|&sample| sample > textures_per_second)
                           .unwrap_or(history.len());
        history.insert(index, textures_per_second);
        trace!("upload took {}us, {} textures/s", microseconds, textures_per_second);
    }

    #[cfg(test)]
    pub(crate) fn history_len(&self) -> usize {
        self.textures_per_second_history.len()
    }
}

#[cfg(test)]
mod test {
    use super::{TextureUploader, DEFAULT_ESTIMATED_TEXTURES_PER_SECOND};
    use compositor_gpu::fake::{FakeDevice, FakeShareGroup};
    use compositor_gpu::{Device, DeviceCapabilities, TextureFormat};
    use pathfinder_geometry::rect::RectI;
    use pathfinder_geometry::vector::Vector2I;
    use quickcheck;

    fn luminance_texture(device: &FakeDevice, size: Vector2I) -> u32 {
        let texture = device.create_texture();
        device.allocate_texture(&texture, TextureFormat::Luminance8, size);
        texture
    }

    #[test]
    fn test_sub_rect_uses_scratch_rows() {
        let device = FakeDevice::new();
        let texture = luminance_texture(&device, Vector2I::splat(4));
        let mut uploader = TextureUploader::new(4, true);

        // 3x2 image at (0, 0). Upload the right 2x2 block to (1, 1).
        let image = [1, 2, 3, 4, 5, 6];
        uploader.upload(&device,
                        &texture,
                        TextureFormat::Luminance8,
                        Vector2I::splat(4),
                        &image,
                        RectI::new(Vector2I::default(), Vector2I::new(3, 2)),
                        RectI::new(Vector2I::new(1, 0), Vector2I::splat(2)),
                        Vector2I::new(1, 1));

        let pixels = device.texture(texture).unwrap().pixels;
        assert_eq!(&pixels[4..8], &[0, 2, 3, 0]);
        assert_eq!(&pixels[8..12], &[0, 5, 6, 0]);
        assert_eq!(uploader.num_blocking_uploads(&device), 0);
    }

    #[test]
    fn test_full_upload_is_blocking_until_query_resolves() {
        let device = FakeDevice::new();
        device.set_queries_available(false);
        let texture = luminance_texture(&device, Vector2I::splat(2));
        let mut uploader = TextureUploader::new(4, true);

        let rect = RectI::new(Vector2I::default(), Vector2I::splat(2));
        for _ in 0..2 {
            uploader.upload(&device,
                            &texture,
                            TextureFormat::Luminance8,
                            Vector2I::splat(2),
                            &[9; 4],
                            rect,
                            rect,
                            Vector2I::default());
        }
        assert_eq!(uploader.num_blocking_uploads(&device), 2);
        uploader.mark_pending_uploads_as_non_blocking();
        assert_eq!(uploader.num_blocking_uploads(&device), 0);

        device.set_queries_available(true);
        uploader.num_blocking_uploads(&device);
        assert_eq!(uploader.history_len(), 102);

        uploader.release_cached_data(&device);
        assert_eq!(device.query_count(), 0);
    }

    #[test]
    fn test_median_follows_measured_uploads() {
        let device = FakeDevice::new();
        let texture = luminance_texture(&device, Vector2I::splat(1));
        let mut uploader = TextureUploader::new(4, true);
        assert_eq!(uploader.estimated_textures_per_second(&device),
                   DEFAULT_ESTIMATED_TEXTURES_PER_SECOND);

        // 100us per upload is 10,000 textures per second, well above the seeded samples.
        device.set_query_result(100);
        let rect = RectI::new(Vector2I::default(), Vector2I::splat(1));
        for _ in 0..101 {
            uploader.upload(&device,
                            &texture,
                            TextureFormat::Luminance8,
                            Vector2I::splat(1),
                            &[0],
                            rect,
                            rect,
                            Vector2I::default());
        }
        assert_eq!(uploader.estimated_textures_per_second(&device), 1.0 / (100.0 * 1e-6));
    }

    #[test]
    fn test_upload_times_are_clamped() {
        let mut uploader: TextureUploader<FakeDevice> = TextureUploader::new(4, true);
        for _ in 0..200 {
            uploader.record_upload_time(0);
        }
        // 1us is the fastest upload that is recorded.
        assert_eq!(*uploader.textures_per_second_history.last().unwrap(), 1.0 / (1.0 * 1e-6));
    }

    #[test]
    fn test_shallow_flush_period() {
        let device = FakeDevice::new();
        let texture = luminance_texture(&device, Vector2I::splat(4));
        let mut uploader = TextureUploader::new(3, true);

        let rect = RectI::new(Vector2I::default(), Vector2I::splat(1));
        for _ in 0..7 {
            uploader.upload(&device,
                            &texture,
                            TextureFormat::Luminance8,
                            Vector2I::splat(4),
                            &[0],
                            rect,
                            rect,
                            Vector2I::default());
        }
        assert_eq!(device.shallow_flush_count(), 2);
        uploader.flush(&device);
        assert_eq!(device.shallow_flush_count(), 3);
        uploader.flush(&device);
        assert_eq!(device.shallow_flush_count(), 3);
    }

    #[test]
    fn test_no_shallow_flush_without_capability() {
        let device = FakeDevice::with_capabilities(FakeShareGroup::new(),
                                                   DeviceCapabilities::TEXTURE_STORAGE);
        let texture = luminance_texture(&device, Vector2I::splat(4));
        let mut uploader = TextureUploader::new(1, true);
        let rect = RectI::new(Vector2I::default(), Vector2I::splat(1));
        uploader.upload(&device,
                        &texture,
                        TextureFormat::Luminance8,
                        Vector2I::splat(4),
                        &[0],
                        rect,
                        rect,
                        Vector2I::default());
        assert_eq!(device.shallow_flush_count(), 0);
    }

    #[test]
    fn test_history_stays_sorted_and_bounded() {
        quickcheck::quickcheck(prop_history_sorted_and_bounded as fn(Vec<u32>) -> bool);

        fn prop_history_sorted_and_bounded(mut samples: Vec<u32>) -> bool {
            // Long enough to reach the cap now and then.
            while samples.len() < 950 && !samples.is_empty() {
                let copy = samples.clone();
                samples.extend(copy);
            }

            let mut uploader: TextureUploader<FakeDevice> = TextureUploader::new(4, true);
            for &sample in &samples {
                uploader.record_upload_time(sample);
            }
            let history = &uploader.textures_per_second_history;
            history.len() <= 1000 && history.windows(2).all(|pair| pair[0] <= pair[1])
        }
    }
}

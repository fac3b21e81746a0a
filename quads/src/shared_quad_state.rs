// compositor/quads/src/shared_quad_state.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::transform2d::Transform2F;

/// Geometry, clip and opacity shared by the quads of one draw batch.
///
/// Nothing is validated. In particular `opacity` isn't clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SharedQuadState {
    pub content_to_target_transform: Transform2F,
    pub visible_content_rect: RectI,
    pub clipped_rect_in_target: RectI,
    pub clip_rect: RectI,
    pub is_clipped: bool,
    pub opacity: f32,
}

/// The index of a shared quad state within its render pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SharedQuadStateId(pub u32);

impl SharedQuadState {
    #[inline]
    pub fn new() -> SharedQuadState {
        SharedQuadState {
            content_to_target_transform: Transform2F::default(),
            visible_content_rect: RectI::default(),
            clipped_rect_in_target: RectI::default(),
            clip_rect: RectI::default(),
            is_clipped: false,
            opacity: 1.0,
        }
    }

    pub fn set_all(&mut self,
                   content_to_target_transform: Transform2F,
                   visible_content_rect: RectI,
                   clipped_rect_in_target: RectI,
                   clip_rect: RectI,
                   is_clipped: bool,
                   opacity: f32) {
        self.content_to_target_transform = content_to_target_transform;
        self.visible_content_rect = visible_content_rect;
        self.clipped_rect_in_target = clipped_rect_in_target;
        self.clip_rect = clip_rect;
        self.is_clipped = is_clipped;
        self.opacity = opacity;
    }

    #[inline]
    pub fn copy(&self) -> SharedQuadState {
        *self
    }
}

impl Default for SharedQuadState {
    #[inline]
    fn default() -> SharedQuadState {
        SharedQuadState::new()
    }
}

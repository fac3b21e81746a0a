// compositor/quads/src/draw_quad/stream_video.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::{material_mismatch, DrawQuad, DrawQuadKind, Material};
use crate::shared_quad_state::SharedQuadStateId;
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::transform3d::Transform4F;

/// A frame of a video stream delivered as an external texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamVideoDrawQuad {
    pub texture_id: u32,
    /// Applied to texture coordinates before sampling.
    pub matrix: Transform4F,
}

impl StreamVideoDrawQuad {
    pub fn new(shared_quad_state: SharedQuadStateId,
               rect: RectI,
               opaque_rect: RectI,
               texture_id: u32,
               matrix: Transform4F)
               -> DrawQuad {
        StreamVideoDrawQuad::new_all(shared_quad_state,
                                     rect,
                                     opaque_rect,
                                     rect,
                                     false,
                                     texture_id,
                                     matrix)
    }

    pub fn new_all(shared_quad_state: SharedQuadStateId,
                   rect: RectI,
                   opaque_rect: RectI,
                   visible_rect: RectI,
                   needs_blending: bool,
                   texture_id: u32,
                   matrix: Transform4F)
                   -> DrawQuad {
        DrawQuad::new_all(shared_quad_state,
                          rect,
                          opaque_rect,
                          visible_rect,
                          needs_blending,
                          DrawQuadKind::StreamVideoContent(StreamVideoDrawQuad {
                              texture_id,
                              matrix,
                          }))
    }

    pub fn material_cast(quad: &DrawQuad) -> &StreamVideoDrawQuad {
        match quad.kind {
            DrawQuadKind::StreamVideoContent(ref stream_video) => stream_video,
            _ => material_mismatch(Material::StreamVideoContent, quad),
        }
    }
}

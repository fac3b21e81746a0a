// compositor/quads/src/draw_quad/yuv_video.rs
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
use compositor_gpu::TextureFormat;
use compositor_resources::ResourceId;
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::{Vector2F, Vector2I};

/// One plane of a planar video frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePlane {
    pub resource_id: ResourceId,
    pub size: Vector2I,
    pub format: TextureFormat,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YUVVideoDrawQuad {
    /// Maps quad texture coordinates into the used part of the plane textures.
    pub tex_scale: Vector2F,
    pub y_plane: FramePlane,
    pub u_plane: FramePlane,
    pub v_plane: FramePlane,
}

impl YUVVideoDrawQuad {
    pub fn new(shared_quad_state: SharedQuadStateId,
               rect: RectI,
               opaque_rect: RectI,
               tex_scale: Vector2F,
               y_plane: FramePlane,
               u_plane: FramePlane,
               v_plane: FramePlane)
               -> DrawQuad {
        YUVVideoDrawQuad::new_all(shared_quad_state,
                                  rect,
                                  opaque_rect,
                                  rect,
                                  false,
                                  tex_scale,
                                  y_plane,
                                  u_plane,
                                  v_plane)
    }

    pub fn new_all(shared_quad_state: SharedQuadStateId,
                   rect: RectI,
                   opaque_rect: RectI,
                   visible_rect: RectI,
                   needs_blending: bool,
                   tex_scale: Vector2F,
                   y_plane: FramePlane,
                   u_plane: FramePlane,
                   v_plane: FramePlane)
                   -> DrawQuad {
        let yuv_video = YUVVideoDrawQuad { tex_scale, y_plane, u_plane, v_plane };
        DrawQuad::new_all(shared_quad_state,
                          rect,
                          opaque_rect,
                          visible_rect,
                          needs_blending,
                          DrawQuadKind::YUVVideoContent(yuv_video))
    }

    pub fn material_cast(quad: &DrawQuad) -> &YUVVideoDrawQuad {
        match quad.kind {
            DrawQuadKind::YUVVideoContent(ref yuv_video) => yuv_video,
            _ => material_mismatch(Material::YUVVideoContent, quad),
        }
    }

    #[inline]
    pub fn planes(&self) -> [&FramePlane; 3] {
        [&self.y_plane, &self.u_plane, &self.v_plane]
    }
}

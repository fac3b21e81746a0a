// compositor/quads/src/draw_quad/texture.rs
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
use compositor_resources::ResourceId;
use pathfinder_geometry::rect::{RectF, RectI};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureDrawQuad {
    pub resource_id: ResourceId,
    pub premultiplied_alpha: bool,
    pub uv_rect: RectF,
    /// Opacity at the bottom left, top left, top right and bottom right corners, in that order.
    pub vertex_opacity: [f32; 4],
    pub flipped: bool,
}

impl TextureDrawQuad {
    /// Blends whenever any corner is translucent.
    pub fn new(shared_quad_state: SharedQuadStateId,
               rect: RectI,
               opaque_rect: RectI,
               resource_id: ResourceId,
               premultiplied_alpha: bool,
               uv_rect: RectF,
               vertex_opacity: [f32; 4],
               flipped: bool)
               -> DrawQuad {
        let needs_blending = vertex_opacity.iter().any(|&opacity| opacity != 1.0);
        TextureDrawQuad::new_all(shared_quad_state,
                                 rect,
                                 opaque_rect,
                                 rect,
                                 needs_blending,
                                 resource_id,
                                 premultiplied_alpha,
                                 uv_rect,
                                 vertex_opacity,
                                 flipped)
    }

    pub fn new_all(shared_quad_state: SharedQuadStateId,
                   rect: RectI,
                   opaque_rect: RectI,
                   visible_rect: RectI,
                   needs_blending: bool,
                   resource_id: ResourceId,
                   premultiplied_alpha: bool,
                   uv_rect: RectF,
                   vertex_opacity: [f32; 4],
                   flipped: bool)
                   -> DrawQuad {
        let texture = TextureDrawQuad {
            resource_id,
            premultiplied_alpha,
            uv_rect,
            vertex_opacity,
            flipped,
        };
        DrawQuad::new_all(shared_quad_state,
                          rect,
                          opaque_rect,
                          visible_rect,
                          needs_blending,
                          DrawQuadKind::TextureContent(texture))
    }

    pub fn material_cast(quad: &DrawQuad) -> &TextureDrawQuad {
        match quad.kind {
            DrawQuadKind::TextureContent(ref texture) => texture,
            _ => material_mismatch(Material::TextureContent, quad),
        }
    }
}

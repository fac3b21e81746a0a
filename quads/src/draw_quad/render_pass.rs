// compositor/quads/src/draw_quad/render_pass.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::{material_mismatch, DrawQuad, DrawQuadKind, Material};
use crate::filters::FilterOperations;
use crate::render_pass::RenderPassId;
use crate::shared_quad_state::SharedQuadStateId;
use compositor_resources::ResourceId;
use pathfinder_geometry::rect::{RectF, RectI};

/// Draws the output of another render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPassDrawQuad {
    pub render_pass_id: RenderPassId,
    pub is_replica: bool,
    pub mask_resource_id: Option<ResourceId>,
    pub contents_changed_since_last_frame: RectI,
    pub mask_uv_rect: RectF,
    pub filters: FilterOperations,
    pub background_filters: FilterOperations,
}

impl RenderPassDrawQuad {
    pub fn new(shared_quad_state: SharedQuadStateId, rect: RectI, render_pass: RenderPassDrawQuad)
               -> DrawQuad {
        RenderPassDrawQuad::new_all(shared_quad_state,
                                    rect,
                                    RectI::default(),
                                    rect,
                                    false,
                                    render_pass)
    }

    pub fn new_all(shared_quad_state: SharedQuadStateId,
                   rect: RectI,
                   opaque_rect: RectI,
                   visible_rect: RectI,
                   needs_blending: bool,
                   render_pass: RenderPassDrawQuad)
                   -> DrawQuad {
        DrawQuad::new_all(shared_quad_state,
                          rect,
                          opaque_rect,
                          visible_rect,
                          needs_blending,
                          DrawQuadKind::RenderPass(render_pass))
    }

    pub fn material_cast(quad: &DrawQuad) -> &RenderPassDrawQuad {
        match quad.kind {
            DrawQuadKind::RenderPass(ref render_pass) => render_pass,
            _ => material_mismatch(Material::RenderPass, quad),
        }
    }

    /// Like `DrawQuad::copy`, but also retargets the quad at another pass.
    pub fn copy_with_render_pass_id(quad: &DrawQuad,
                                    shared_quad_state: SharedQuadStateId,
                                    render_pass_id: RenderPassId)
                                    -> DrawQuad {
        let mut copy = quad.copy(shared_quad_state);
        match copy.kind {
            DrawQuadKind::RenderPass(ref mut render_pass) => {
                render_pass.render_pass_id = render_pass_id
            }
            _ => material_mismatch(Material::RenderPass, quad),
        }
        copy
    }
}

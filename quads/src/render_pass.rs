// compositor/quads/src/render_pass.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::draw_quad::DrawQuad;
use crate::filters::FilterOperations;
use crate::shared_quad_state::{SharedQuadState, SharedQuadStateId};
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::transform2d::Transform2F;
use std::slice;

/// Identifies a render pass by the layer that owns it and its index within that layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RenderPassId {
    pub layer_id: i32,
    pub index: i32,
}

impl RenderPassId {
    #[inline]
    pub fn new(layer_id: i32, index: i32) -> RenderPassId {
        RenderPassId { layer_id, index }
    }
}

/// A list of quads drawn into one target, together with the shared quad states they use.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderPass {
    pub id: RenderPassId,
    pub output_rect: RectI,
    pub damage_rect: RectI,
    pub transform_to_root_target: Transform2F,
    pub has_transparent_background: bool,
    pub has_occlusion_from_outside_target_surface: bool,
    pub filters: FilterOperations,
    pub background_filters: FilterOperations,
    shared_quad_state_list: Vec<SharedQuadState>,
    quad_list: Vec<DrawQuad>,
}

impl RenderPass {
    #[inline]
    pub fn new() -> RenderPass {
        RenderPass { has_transparent_background: true, ..RenderPass::default() }
    }

    pub fn set_new(&mut self,
                   id: RenderPassId,
                   output_rect: RectI,
                   damage_rect: RectI,
                   transform_to_root_target: Transform2F) {
        debug_assert!(self.quad_list.is_empty() && self.shared_quad_state_list.is_empty());
        self.id = id;
        self.output_rect = output_rect;
        self.damage_rect = damage_rect;
        self.transform_to_root_target = transform_to_root_target;
    }

    pub fn set_all(&mut self,
                   id: RenderPassId,
                   output_rect: RectI,
                   damage_rect: RectI,
                   transform_to_root_target: Transform2F,
                   has_transparent_background: bool,
                   has_occlusion_from_outside_target_surface: bool,
                   filters: FilterOperations,
                   background_filters: FilterOperations) {
        self.set_new(id, output_rect, damage_rect, transform_to_root_target);
        self.has_transparent_background = has_transparent_background;
        self.has_occlusion_from_outside_target_surface =
            has_occlusion_from_outside_target_surface;
        self.filters = filters;
        self.background_filters = background_filters;
    }

    /// Copies everything but the quads and shared quad states, giving the copy a new id.
    pub fn copy(&self, id: RenderPassId) -> RenderPass {
        RenderPass {
            id,
            output_rect: self.output_rect,
            damage_rect: self.damage_rect,
            transform_to_root_target: self.transform_to_root_target,
            has_transparent_background: self.has_transparent_background,
            has_occlusion_from_outside_target_surface:
                self.has_occlusion_from_outside_target_surface,
            filters: self.filters.clone(),
            background_filters: self.background_filters.clone(),
            shared_quad_state_list: vec![],
            quad_list: vec![],
        }
    }

    pub fn append_shared_quad_state(&mut self, state: SharedQuadState) -> SharedQuadStateId {
        let id = SharedQuadStateId(self.shared_quad_state_list.len() as u32);
        self.shared_quad_state_list.push(state);
        id
    }

    pub fn append_quad(&mut self, quad: DrawQuad) {
        assert!((quad.shared_quad_state.0 as usize) < self.shared_quad_state_list.len(),
                "{:?} quad refers to {:?}, which isn't in render pass {:?}",
                quad.material(),
                quad.shared_quad_state,
                self.id);
        self.quad_list.push(quad);
    }

    pub fn shared_quad_state(&self, id: SharedQuadStateId) -> &SharedQuadState {
        &self.shared_quad_state_list[id.0 as usize]
    }

    #[inline]
    pub fn shared_quad_states(&self) -> slice::Iter<SharedQuadState> {
        self.shared_quad_state_list.iter()
    }

    #[inline]
    pub fn quads(&self) -> slice::Iter<DrawQuad> {
        self.quad_list.iter()
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.quad_list.len()
    }
}

// compositor/quads/src/draw_quad/tile.rs
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
use pathfinder_geometry::vector::Vector2I;

/// One tile of a tiled layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileDrawQuad {
    pub resource_id: ResourceId,
    pub tex_coord_rect: RectF,
    pub texture_size: Vector2I,
    /// Whether the red and blue channels of the texture are swapped.
    pub swizzle_contents: bool,
    pub left_edge_aa: bool,
    pub top_edge_aa: bool,
    pub right_edge_aa: bool,
    pub bottom_edge_aa: bool,
}

impl TileDrawQuad {
    pub fn new(shared_quad_state: SharedQuadStateId,
               rect: RectI,
               opaque_rect: RectI,
               tile: TileDrawQuad)
               -> DrawQuad {
        TileDrawQuad::new_all(shared_quad_state, rect, opaque_rect, rect, false, tile)
    }

    pub fn new_all(shared_quad_state: SharedQuadStateId,
                   rect: RectI,
                   opaque_rect: RectI,
                   visible_rect: RectI,
                   needs_blending: bool,
                   tile: TileDrawQuad)
                   -> DrawQuad {
        DrawQuad::new_all(shared_quad_state,
                          rect,
                          opaque_rect,
                          visible_rect,
                          needs_blending,
                          DrawQuadKind::TiledContent(tile))
    }

    pub fn material_cast(quad: &DrawQuad) -> &TileDrawQuad {
        match quad.kind {
            DrawQuadKind::TiledContent(ref tile) => tile,
            _ => material_mismatch(Material::TiledContent, quad),
        }
    }

    #[inline]
    pub fn is_antialiased(&self) -> bool {
        self.left_edge_aa || self.top_edge_aa || self.right_edge_aa || self.bottom_edge_aa
    }
}

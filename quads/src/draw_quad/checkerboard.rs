// compositor/quads/src/draw_quad/checkerboard.rs
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
use pathfinder_color::ColorU;
use pathfinder_geometry::rect::RectI;

/// Placeholder content drawn where a tile hasn't been rasterized yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckerboardDrawQuad {
    pub color: ColorU,
}

impl CheckerboardDrawQuad {
    pub fn new(shared_quad_state: SharedQuadStateId, rect: RectI, color: ColorU) -> DrawQuad {
        let opaque_rect = if color.a == 255 { rect } else { RectI::default() };
        CheckerboardDrawQuad::new_all(shared_quad_state, rect, opaque_rect, rect, false, color)
    }

    pub fn new_all(shared_quad_state: SharedQuadStateId,
                   rect: RectI,
                   opaque_rect: RectI,
                   visible_rect: RectI,
                   needs_blending: bool,
                   color: ColorU)
                   -> DrawQuad {
        DrawQuad::new_all(shared_quad_state,
                          rect,
                          opaque_rect,
                          visible_rect,
                          needs_blending,
                          DrawQuadKind::Checkerboard(CheckerboardDrawQuad { color }))
    }

    pub fn material_cast(quad: &DrawQuad) -> &CheckerboardDrawQuad {
        match quad.kind {
            DrawQuadKind::Checkerboard(ref checkerboard) => checkerboard,
            _ => material_mismatch(Material::Checkerboard, quad),
        }
    }
}

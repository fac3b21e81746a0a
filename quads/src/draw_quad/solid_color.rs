// compositor/quads/src/draw_quad/solid_color.rs
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

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolidColorDrawQuad {
    pub color: ColorU,
}

impl SolidColorDrawQuad {
    /// The quad is opaque exactly when `color` is.
    pub fn new(shared_quad_state: SharedQuadStateId, rect: RectI, color: ColorU) -> DrawQuad {
        let opaque_rect = if color.a == 255 { rect } else { RectI::default() };
        SolidColorDrawQuad::new_all(shared_quad_state, rect, opaque_rect, rect, false, color)
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
                          DrawQuadKind::SolidColor(SolidColorDrawQuad { color }))
    }

    pub fn material_cast(quad: &DrawQuad) -> &SolidColorDrawQuad {
        match quad.kind {
            DrawQuadKind::SolidColor(ref solid_color) => solid_color,
            _ => material_mismatch(Material::SolidColor, quad),
        }
    }
}

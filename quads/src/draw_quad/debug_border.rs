// compositor/quads/src/draw_quad/debug_border.rs
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

/// An outline drawn around layers and tiles when debugging is on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugBorderDrawQuad {
    pub color: ColorU,
    /// Line width in device pixels.
    pub width: i32,
}

impl DebugBorderDrawQuad {
    pub fn new(shared_quad_state: SharedQuadStateId, rect: RectI, color: ColorU, width: i32)
               -> DrawQuad {
        let needs_blending = color.a < 255;
        DebugBorderDrawQuad::new_all(shared_quad_state,
                                     rect,
                                     RectI::default(),
                                     rect,
                                     needs_blending,
                                     color,
                                     width)
    }

    pub fn new_all(shared_quad_state: SharedQuadStateId,
                   rect: RectI,
                   opaque_rect: RectI,
                   visible_rect: RectI,
                   needs_blending: bool,
                   color: ColorU,
                   width: i32)
                   -> DrawQuad {
        DrawQuad::new_all(shared_quad_state,
                          rect,
                          opaque_rect,
                          visible_rect,
                          needs_blending,
                          DrawQuadKind::DebugBorder(DebugBorderDrawQuad { color, width }))
    }

    pub fn material_cast(quad: &DrawQuad) -> &DebugBorderDrawQuad {
        match quad.kind {
            DrawQuadKind::DebugBorder(ref debug_border) => debug_border,
            _ => material_mismatch(Material::DebugBorder, quad),
        }
    }
}

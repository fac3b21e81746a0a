// compositor/quads/src/draw_quad/io_surface.rs
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
use pathfinder_geometry::vector::Vector2I;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IOSurfaceOrientation {
    Flipped,
    Unflipped,
}

impl Default for IOSurfaceOrientation {
    #[inline]
    fn default() -> IOSurfaceOrientation {
        IOSurfaceOrientation::Flipped
    }
}

/// Content backed by a platform surface that the compositor samples through a texture it
/// doesn't manage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IOSurfaceDrawQuad {
    pub io_surface_size: Vector2I,
    pub io_surface_texture_id: u32,
    pub orientation: IOSurfaceOrientation,
}

impl IOSurfaceDrawQuad {
    pub fn new(shared_quad_state: SharedQuadStateId,
               rect: RectI,
               opaque_rect: RectI,
               io_surface_size: Vector2I,
               io_surface_texture_id: u32,
               orientation: IOSurfaceOrientation)
               -> DrawQuad {
        IOSurfaceDrawQuad::new_all(shared_quad_state,
                                   rect,
                                   opaque_rect,
                                   rect,
                                   false,
                                   io_surface_size,
                                   io_surface_texture_id,
                                   orientation)
    }

    pub fn new_all(shared_quad_state: SharedQuadStateId,
                   rect: RectI,
                   opaque_rect: RectI,
                   visible_rect: RectI,
                   needs_blending: bool,
                   io_surface_size: Vector2I,
                   io_surface_texture_id: u32,
                   orientation: IOSurfaceOrientation)
                   -> DrawQuad {
        let io_surface = IOSurfaceDrawQuad { io_surface_size, io_surface_texture_id, orientation };
        DrawQuad::new_all(shared_quad_state,
                          rect,
                          opaque_rect,
                          visible_rect,
                          needs_blending,
                          DrawQuadKind::IOSurfaceContent(io_surface))
    }

    pub fn material_cast(quad: &DrawQuad) -> &IOSurfaceDrawQuad {
        match quad.kind {
            DrawQuadKind::IOSurfaceContent(ref io_surface) => io_surface,
            _ => material_mismatch(Material::IOSurfaceContent, quad),
        }
    }
}

// compositor/quads/src/draw_quad/mod.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Draw quads.
//!
//! Every quad carries the same geometry (`rect`, `opaque_rect`, `visible_rect`), a blending
//! hint, and a reference to the shared quad state it is drawn with. The material-specific data
//! lives in `DrawQuadKind`.
//!
//! Each material type offers two constructors. `new` derives the opaque rect and the blending
//! hint from the material data; `new_all` takes every common field verbatim.

use crate::shared_quad_state::{SharedQuadState, SharedQuadStateId};
use pathfinder_geometry::rect::RectI;

pub use self::checkerboard::CheckerboardDrawQuad;
pub use self::debug_border::DebugBorderDrawQuad;
pub use self::io_surface::{IOSurfaceDrawQuad, IOSurfaceOrientation};
pub use self::render_pass::RenderPassDrawQuad;
pub use self::solid_color::SolidColorDrawQuad;
pub use self::stream_video::StreamVideoDrawQuad;
pub use self::texture::TextureDrawQuad;
pub use self::tile::TileDrawQuad;
pub use self::yuv_video::{FramePlane, YUVVideoDrawQuad};

mod checkerboard;
mod debug_border;
mod io_surface;
mod render_pass;
mod solid_color;
mod stream_video;
mod texture;
mod tile;
mod yuv_video;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Material {
    Checkerboard,
    DebugBorder,
    IOSurfaceContent,
    RenderPass,
    SolidColor,
    StreamVideoContent,
    TextureContent,
    TiledContent,
    YUVVideoContent,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawQuadKind {
    Checkerboard(CheckerboardDrawQuad),
    DebugBorder(DebugBorderDrawQuad),
    IOSurfaceContent(IOSurfaceDrawQuad),
    RenderPass(RenderPassDrawQuad),
    SolidColor(SolidColorDrawQuad),
    StreamVideoContent(StreamVideoDrawQuad),
    TextureContent(TextureDrawQuad),
    TiledContent(TileDrawQuad),
    YUVVideoContent(YUVVideoDrawQuad),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawQuad {
    pub rect: RectI,
    /// The part of `rect` that is known to be fully opaque. May be empty.
    pub opaque_rect: RectI,
    pub visible_rect: RectI,
    pub needs_blending: bool,
    pub shared_quad_state: SharedQuadStateId,
    pub kind: DrawQuadKind,
}

impl DrawQuad {
    pub(crate) fn new_all(shared_quad_state: SharedQuadStateId,
                          rect: RectI,
                          opaque_rect: RectI,
                          visible_rect: RectI,
                          needs_blending: bool,
                          kind: DrawQuadKind)
                          -> DrawQuad {
        DrawQuad { rect, opaque_rect, visible_rect, needs_blending, shared_quad_state, kind }
    }

    pub fn material(&self) -> Material {
        match self.kind {
            DrawQuadKind::Checkerboard(_) => Material::Checkerboard,
            DrawQuadKind::DebugBorder(_) => Material::DebugBorder,
            DrawQuadKind::IOSurfaceContent(_) => Material::IOSurfaceContent,
            DrawQuadKind::RenderPass(_) => Material::RenderPass,
            DrawQuadKind::SolidColor(_) => Material::SolidColor,
            DrawQuadKind::StreamVideoContent(_) => Material::StreamVideoContent,
            DrawQuadKind::TextureContent(_) => Material::TextureContent,
            DrawQuadKind::TiledContent(_) => Material::TiledContent,
            DrawQuadKind::YUVVideoContent(_) => Material::YUVVideoContent,
        }
    }

    /// Duplicates this quad, pointing the duplicate at `shared_quad_state`.
    pub fn copy(&self, shared_quad_state: SharedQuadStateId) -> DrawQuad {
        DrawQuad { shared_quad_state, ..self.clone() }
    }

    #[inline]
    pub fn is_debug_quad(&self) -> bool {
        self.material() == Material::DebugBorder
    }

    #[inline]
    pub fn opacity(&self, shared_quad_state: &SharedQuadState) -> f32 {
        shared_quad_state.opacity
    }

    pub fn should_draw_with_blending(&self, shared_quad_state: &SharedQuadState) -> bool {
        if self.needs_blending || self.opacity(shared_quad_state) < 1.0 {
            return true;
        }
        if rect_is_empty(self.visible_rect) {
            return false;
        }
        !rect_contains_rect(self.opaque_rect, self.visible_rect)
    }
}

#[inline]
pub(crate) fn rect_contains_rect(outer: RectI, inner: RectI) -> bool {
    inner.min_x() >= outer.min_x() && inner.min_y() >= outer.min_y() &&
        inner.max_x() <= outer.max_x() && inner.max_y() <= outer.max_y()
}

#[inline]
pub(crate) fn rect_is_empty(rect: RectI) -> bool {
    rect.size().x() <= 0 || rect.size().y() <= 0
}

fn material_mismatch(expected: Material, quad: &DrawQuad) -> ! {
    panic!("expected a {:?} quad but found a {:?} quad", expected, quad.material())
}

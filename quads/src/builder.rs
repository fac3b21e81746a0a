// compositor/quads/src/builder.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fills a render pass with one quad of every material, backed by real resources.

use crate::draw_quad::{CheckerboardDrawQuad, DebugBorderDrawQuad, FramePlane, IOSurfaceDrawQuad};
use crate::draw_quad::{IOSurfaceOrientation, RenderPassDrawQuad, SolidColorDrawQuad};
use crate::draw_quad::{StreamVideoDrawQuad, TextureDrawQuad, TileDrawQuad, YUVVideoDrawQuad};
use crate::filters::FilterOperations;
use crate::render_pass::{RenderPass, RenderPassId};
use crate::shared_quad_state::SharedQuadState;
use compositor_gpu::{Device, TextureFormat, TextureUsageHint};
use compositor_resources::{ResourceId, ResourceProvider, ResourceType};
use pathfinder_color::ColorU;
use pathfinder_geometry::rect::{RectF, RectI};
use pathfinder_geometry::transform3d::Transform4F;
use pathfinder_geometry::vector::{Vector2F, Vector2I};

const RESOURCE_SIZE: i32 = 45;

/// Appends a shared quad state covering the pass's output rect, then one quad of each material
/// drawn with it. `child_pass` is the pass the render pass quad draws.
///
/// The video and surface quads sample `external_texture`. The provider wraps it but never deletes
/// it, so the caller still owns it and must delete it once the pass is no longer drawn.
///
/// Returns every resource created along the way, in creation order. The last one is the wrapper
/// around `external_texture`.
pub fn append_one_of_every_quad_type<D>(pass: &mut RenderPass,
                                        provider: &mut ResourceProvider<D>,
                                        child_pass: RenderPassId,
                                        external_texture: D::Texture)
                                        -> Vec<ResourceId>
                                        where D: Device {
    let rect = pass.output_rect;
    let opaque_rect = RectI::new(rect.origin() + Vector2I::splat(10),
                                 rect.size() - Vector2I::splat(20));
    let resource_size = Vector2I::splat(RESOURCE_SIZE);

    let mut resources = vec![];
    let mut create_resource = |provider: &mut ResourceProvider<D>, format| {
        let id = provider.create_resource(resource_size, format, TextureUsageHint::Any);
        resources.push(id);
        id
    };

    let texture_resource = create_resource(provider, TextureFormat::RGBA8);
    let tile_resource = create_resource(provider, TextureFormat::RGBA8);
    let mask_resource = create_resource(provider, TextureFormat::RGBA8);

    // Planes are single-channel on the GPU. Bitmaps only come in RGBA.
    let plane_format = match provider.default_resource_type() {
        ResourceType::GLTexture => TextureFormat::Luminance8,
        ResourceType::Bitmap => TextureFormat::RGBA8,
    };
    let y_plane = create_resource(provider, plane_format);
    let u_plane = create_resource(provider, plane_format);
    let v_plane = create_resource(provider, plane_format);

    let external_texture_name = provider.device().texture_name(&external_texture);
    let external_resource = provider.create_resource_from_external_texture(external_texture);
    resources.push(external_resource);

    let state = pass.append_shared_quad_state(SharedQuadState {
        visible_content_rect: rect,
        clipped_rect_in_target: rect,
        clip_rect: rect,
        ..SharedQuadState::new()
    });

    pass.append_quad(CheckerboardDrawQuad::new(state, rect, ColorU::new(128, 128, 128, 255)));
    pass.append_quad(DebugBorderDrawQuad::new(state, rect, ColorU::new(255, 0, 0, 255), 1));
    pass.append_quad(IOSurfaceDrawQuad::new(state,
                                            rect,
                                            opaque_rect,
                                            Vector2I::new(50, 50),
                                            external_texture_name,
                                            IOSurfaceOrientation::Flipped));
    pass.append_quad(RenderPassDrawQuad::new(state, rect, RenderPassDrawQuad {
        render_pass_id: child_pass,
        is_replica: false,
        mask_resource_id: Some(mask_resource),
        contents_changed_since_last_frame: rect,
        mask_uv_rect: RectF::new(Vector2F::default(), Vector2F::splat(1.0)),
        filters: FilterOperations::new(),
        background_filters: FilterOperations::new(),
    }));
    pass.append_quad(SolidColorDrawQuad::new(state, rect, ColorU::new(0, 0, 255, 255)));
    pass.append_quad(StreamVideoDrawQuad::new(state,
                                              rect,
                                              opaque_rect,
                                              external_texture_name,
                                              Transform4F::default()));
    pass.append_quad(TextureDrawQuad::new(state,
                                          rect,
                                          opaque_rect,
                                          texture_resource,
                                          false,
                                          RectF::new(Vector2F::default(), Vector2F::splat(1.0)),
                                          [1.0; 4],
                                          false));
    pass.append_quad(TileDrawQuad::new(state, rect, opaque_rect, TileDrawQuad {
        resource_id: tile_resource,
        tex_coord_rect: RectF::new(Vector2F::default(), Vector2F::splat(RESOURCE_SIZE as f32)),
        texture_size: resource_size,
        swizzle_contents: false,
        left_edge_aa: false,
        top_edge_aa: false,
        right_edge_aa: false,
        bottom_edge_aa: false,
    }));

    let plane = |resource_id| {
        FramePlane { resource_id, size: resource_size, format: plane_format }
    };
    pass.append_quad(YUVVideoDrawQuad::new(state,
                                           rect,
                                           opaque_rect,
                                           Vector2F::splat(1.0),
                                           plane(y_plane),
                                           plane(u_plane),
                                           plane(v_plane)));

    debug!("appended {} quads to render pass {:?}", pass.quad_count(), pass.id);
    resources
}

// compositor/quads/src/tests/builder.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::builder;
use crate::draw_quad::{IOSurfaceDrawQuad, Material, StreamVideoDrawQuad, YUVVideoDrawQuad};
use crate::render_pass::{RenderPass, RenderPassId};
use compositor_gpu::fake::FakeDevice;
use compositor_gpu::{Device, TextureFormat};
use compositor_resources::{ResourceProvider, ResourceProviderOptions};
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::transform2d::Transform2F;
use pathfinder_geometry::vector::Vector2I;

fn create_pass() -> RenderPass {
    let mut pass = RenderPass::new();
    pass.set_new(RenderPassId::new(1, 1),
                 RectI::new(Vector2I::default(), Vector2I::new(100, 100)),
                 RectI::new(Vector2I::default(), Vector2I::new(100, 100)),
                 Transform2F::default());
    pass
}

#[test]
fn test_one_of_every_material() {
    let mut provider = ResourceProvider::new(FakeDevice::new(),
                                             ResourceProviderOptions::default()).unwrap();
    let mut pass = create_pass();
    let external_texture = provider.device().create_texture();
    let resources = builder::append_one_of_every_quad_type(&mut pass,
                                                           &mut provider,
                                                           RenderPassId::new(2, 1),
                                                           external_texture);

    let materials: Vec<_> = pass.quads().map(|quad| quad.material()).collect();
    assert_eq!(materials, vec![
        Material::Checkerboard,
        Material::DebugBorder,
        Material::IOSurfaceContent,
        Material::RenderPass,
        Material::SolidColor,
        Material::StreamVideoContent,
        Material::TextureContent,
        Material::TiledContent,
        Material::YUVVideoContent,
    ]);
    assert_eq!(pass.shared_quad_states().count(), 1);
    assert!(pass.quads().all(|quad| quad.rect == pass.output_rect));

    assert_eq!(resources.len(), 7);
    assert_eq!(provider.num_resources(), 7);
    for &id in &resources {
        assert!(!provider.in_use_by_consumer(id));
    }

    let yuv_video = YUVVideoDrawQuad::material_cast(pass.quads().nth(8).unwrap());
    assert!(yuv_video.planes().iter().all(|plane| plane.format == TextureFormat::Luminance8));
    assert!(yuv_video.planes().iter().all(|plane| resources.contains(&plane.resource_id)));
}

#[test]
fn test_external_texture_is_shared_by_video_quads() {
    let mut provider = ResourceProvider::new(FakeDevice::new(),
                                             ResourceProviderOptions::default()).unwrap();
    let mut pass = create_pass();
    let external_texture = provider.device().create_texture();
    let resources = builder::append_one_of_every_quad_type(&mut pass,
                                                           &mut provider,
                                                           RenderPassId::new(2, 1),
                                                           external_texture);

    let external = *resources.last().unwrap();
    assert!(provider.resource(external).is_external());
    let texture_name = *provider.resource(external).gl_texture().unwrap();
    assert_eq!(texture_name, external_texture);

    let io_surface = IOSurfaceDrawQuad::material_cast(pass.quads().nth(2).unwrap());
    let stream_video = StreamVideoDrawQuad::material_cast(pass.quads().nth(5).unwrap());
    assert_eq!(io_surface.io_surface_texture_id, texture_name);
    assert_eq!(stream_video.texture_id, texture_name);

    // Deleting the wrapper leaves the texture alone.
    provider.delete_resource(external);
    assert!(provider.device().texture(texture_name).is_some());
}

#[test]
fn test_software_provider_uses_rgba_planes() {
    let mut provider = ResourceProvider::new(FakeDevice::new(),
                                             ResourceProviderOptions::software()).unwrap();
    let mut pass = create_pass();
    let external_texture = provider.device().create_texture();
    builder::append_one_of_every_quad_type(&mut pass,
                                           &mut provider,
                                           RenderPassId::new(2, 1),
                                           external_texture);

    let yuv_video = YUVVideoDrawQuad::material_cast(pass.quads().nth(8).unwrap());
    assert!(yuv_video.planes().iter().all(|plane| plane.format == TextureFormat::RGBA8));
    assert_eq!(pass.quad_count(), 9);
}

#[test]
fn test_caller_keeps_ownership_of_the_external_texture() {
    let mut provider = ResourceProvider::new(FakeDevice::new(),
                                             ResourceProviderOptions::default()).unwrap();
    let mut pass = create_pass();
    let external_texture = provider.device().create_texture();
    let resources = builder::append_one_of_every_quad_type(&mut pass,
                                                           &mut provider,
                                                           RenderPassId::new(2, 1),
                                                           external_texture);

    for id in resources {
        provider.delete_resource(id);
    }
    assert_eq!(provider.num_resources(), 0);
    assert_eq!(provider.device().texture_count(), 1);
    assert!(provider.device().texture(external_texture).is_some());

    provider.device().delete_texture(external_texture);
    assert_eq!(provider.device().texture_count(), 0);
}

// compositor/quads/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The primitives the compositor draws.
//!
//! A `RenderPass` owns a list of `SharedQuadState`s and a list of `DrawQuad`s. Each quad names
//! the state it is drawn with by index into the pass's list, so many quads can share one
//! transform, clip and opacity.

#[macro_use]
extern crate log;
#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod builder;
pub mod draw_quad;
pub mod filters;
pub mod render_pass;
pub mod shared_quad_state;

pub use crate::draw_quad::{DrawQuad, DrawQuadKind, Material};
pub use crate::render_pass::{RenderPass, RenderPassId};
pub use crate::shared_quad_state::{SharedQuadState, SharedQuadStateId};

#[cfg(test)]
mod tests;

// compositor/gl/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An OpenGL backend for the compositor's GPU context abstraction.
//!
//! Plain OpenGL has no notion of mailboxes or cross-context sync points, so this backend
//! emulates them within a GL share group: every context that needs to exchange textures must
//! be created in the same share group and be given the same `ShareGroup`. Mailboxes then name
//! texture objects that all of those contexts can see, and sync points are fence objects.
//!
//! The embedder owns the GL contexts themselves. The GL function pointers must have been loaded
//! with `gl::load_with`, and the right context must be current on the calling thread, before
//! any method is called.

#[macro_use]
extern crate log;

pub mod device;
pub mod share_group;

pub use crate::device::{GLBuffer, GLDevice, GLQuery, GLTexture};
pub use crate::share_group::ShareGroup;

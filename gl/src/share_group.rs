// compositor/gl/src/share_group.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Mailbox and sync point bookkeeping for a set of GL contexts that share objects.

use compositor_gpu::{Mailbox, SyncPoint};
use fxhash::FxHashMap;
use gl::types::{GLsync, GLuint};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// Marks mailbox names minted by this backend.
const MAILBOX_TAG: u8 = 0x67;

pub struct ShareGroup {
    next_mailbox: Cell<u64>,
    next_sync_point: Cell<u32>,
    mailboxes: RefCell<FxHashMap<Mailbox, GLuint>>,
    // Handles that refer to each texture name. A name is only deleted when the count drops to
    // zero, since producing and consuming a mailbox makes two handles share one name.
    texture_references: RefCell<FxHashMap<GLuint, u32>>,
    fences: RefCell<FxHashMap<u32, GLsync>>,
}

impl ShareGroup {
    pub fn new() -> Rc<ShareGroup> {
        Rc::new(ShareGroup {
            next_mailbox: Cell::new(0),
            next_sync_point: Cell::new(0),
            mailboxes: RefCell::new(FxHashMap::default()),
            texture_references: RefCell::new(FxHashMap::default()),
            fences: RefCell::new(FxHashMap::default()),
        })
    }

    pub(crate) fn generate_mailbox(&self) -> Mailbox {
        let serial = self.next_mailbox.get() + 1;
        self.next_mailbox.set(serial);
        let mut mailbox = Mailbox::zero();
        mailbox.name[0..8].copy_from_slice(&serial.to_le_bytes());
        mailbox.name[8] = MAILBOX_TAG;
        mailbox
    }

    pub(crate) fn produce(&self, mailbox: &Mailbox, texture: GLuint) {
        self.mailboxes.borrow_mut().insert(*mailbox, texture);
    }

    pub(crate) fn lookup(&self, mailbox: &Mailbox) -> Option<GLuint> {
        self.mailboxes.borrow().get(mailbox).cloned()
    }

    pub(crate) fn retain_texture(&self, texture: GLuint) {
        *self.texture_references.borrow_mut().entry(texture).or_insert(0) += 1;
    }

    /// Returns true if the last handle to the name went away.
    pub(crate) fn release_texture(&self, texture: GLuint) -> bool {
        let mut references = self.texture_references.borrow_mut();
        let last = match references.get_mut(&texture) {
            Some(count) => {
                *count -= 1;
                *count == 0
            }
            // Not created through this share group, so it isn't ours to delete.
            None => return false,
        };
        if last {
            references.remove(&texture);
            self.mailboxes.borrow_mut().retain(|_, name| *name != texture);
        }
        last
    }

    pub(crate) fn insert_fence(&self, fence: GLsync) -> SyncPoint {
        let sync_point = self.next_sync_point.get() + 1;
        self.next_sync_point.set(sync_point);
        self.fences.borrow_mut().insert(sync_point, fence);
        SyncPoint(sync_point)
    }

    pub(crate) fn take_fence(&self, sync_point: SyncPoint) -> Option<GLsync> {
        self.fences.borrow_mut().remove(&sync_point.0)
    }
}

impl Drop for ShareGroup {
    fn drop(&mut self) {
        for (_, fence) in self.fences.borrow_mut().drain() {
            unsafe {
                gl::DeleteSync(fence);
            }
        }
    }
}

// compositor/resources/src/transfer.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Records that hand GPU resources between compositor instances.

use crate::resource::ResourceId;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use compositor_gpu::{Mailbox, SyncPoint, TextureFilter, TextureFormat, MAILBOX_NAME_LENGTH};
use pathfinder_geometry::vector::Vector2I;
use std::io::{self, Error as IOError, ErrorKind, Read, Write};

/// A resource as seen by the receiving side. The id is in the sender's namespace when sent to
/// a parent and in the child's namespace when sent to a child.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransferableResource {
    pub id: ResourceId,
    pub format: TextureFormat,
    pub filter: TextureFilter,
    pub size: Vector2I,
    pub mailbox: Mailbox,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransferableResourceList {
    /// Must be waited on before any of the mailboxes are consumed.
    pub sync_point: Option<SyncPoint>,
    pub resources: Vec<TransferableResource>,
}

impl TransferableResourceList {
    #[inline]
    pub fn new() -> TransferableResourceList {
        TransferableResourceList::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn write<W>(&self, writer: &mut W) -> io::Result<()> where W: Write {
        writer.write_u32::<LittleEndian>(self.sync_point.map_or(0, |sync_point| sync_point.0))?;
        writer.write_u32::<LittleEndian>(self.resources.len() as u32)?;
        for resource in &self.resources {
            writer.write_u32::<LittleEndian>(resource.id.0)?;
            writer.write_u32::<LittleEndian>(format_to_code(resource.format))?;
            writer.write_u32::<LittleEndian>(filter_to_code(resource.filter))?;
            writer.write_i32::<LittleEndian>(resource.size.x())?;
            writer.write_i32::<LittleEndian>(resource.size.y())?;
            writer.write_all(&resource.mailbox.name)?;
        }
        Ok(())
    }

    pub fn read<R>(reader: &mut R) -> io::Result<TransferableResourceList> where R: Read {
        let sync_point = match reader.read_u32::<LittleEndian>()? {
            0 => None,
            sync_point => Some(SyncPoint(sync_point)),
        };

        let count = reader.read_u32::<LittleEndian>()?;
        let mut resources = vec![];
        for _ in 0..count {
            let id = match reader.read_u32::<LittleEndian>()? {
                0 => return Err(invalid_data("zero resource id")),
                id => ResourceId(id),
            };
            let format = format_from_code(reader.read_u32::<LittleEndian>()?)?;
            let filter = filter_from_code(reader.read_u32::<LittleEndian>()?)?;
            let width = reader.read_i32::<LittleEndian>()?;
            let height = reader.read_i32::<LittleEndian>()?;
            let mut name = [0; MAILBOX_NAME_LENGTH];
            reader.read_exact(&mut name)?;
            resources.push(TransferableResource {
                id,
                format,
                filter,
                size: Vector2I::new(width, height),
                mailbox: Mailbox::from_name(name),
            });
        }

        Ok(TransferableResourceList { sync_point, resources })
    }
}

fn invalid_data(message: &str) -> IOError {
    IOError::new(ErrorKind::InvalidData, message.to_owned())
}

fn format_to_code(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::RGBA8 => 0,
        TextureFormat::BGRA8 => 1,
        TextureFormat::Luminance8 => 2,
    }
}

fn format_from_code(code: u32) -> io::Result<TextureFormat> {
    match code {
        0 => Ok(TextureFormat::RGBA8),
        1 => Ok(TextureFormat::BGRA8),
        2 => Ok(TextureFormat::Luminance8),
        _ => Err(invalid_data("unknown texture format")),
    }
}

fn filter_to_code(filter: TextureFilter) -> u32 {
    match filter {
        TextureFilter::Nearest => 0,
        TextureFilter::Linear => 1,
    }
}

fn filter_from_code(code: u32) -> io::Result<TextureFilter> {
    match code {
        0 => Ok(TextureFilter::Nearest),
        1 => Ok(TextureFilter::Linear),
        _ => Err(invalid_data("unknown texture filter")),
    }
}

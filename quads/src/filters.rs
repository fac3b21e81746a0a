// compositor/quads/src/filters.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CSS-style filter chains applied to render pass contents.

use pathfinder_color::ColorU;
use pathfinder_geometry::vector::Vector2I;
use std::slice;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterOperation {
    Grayscale(f32),
    Sepia(f32),
    Saturate(f32),
    /// Degrees.
    HueRotate(f32),
    Invert(f32),
    Brightness(f32),
    Contrast(f32),
    Opacity(f32),
    Blur(f32),
    DropShadow { offset: Vector2I, std_deviation: f32, color: ColorU },
    /// A 4x5 row-major matrix applied to unpremultiplied RGBA.
    ColorMatrix([f32; 20]),
    Zoom { amount: f32, inset: i32 },
}

impl FilterOperation {
    /// True if the output at a pixel depends on other pixels.
    pub fn moves_pixels(&self) -> bool {
        match *self {
            FilterOperation::Blur(_) |
            FilterOperation::DropShadow { .. } |
            FilterOperation::Zoom { .. } => true,
            _ => false,
        }
    }

    pub fn affects_opacity(&self) -> bool {
        match *self {
            FilterOperation::Opacity(amount) => amount != 1.0,
            FilterOperation::Blur(_) | FilterOperation::DropShadow { .. } => true,
            FilterOperation::ColorMatrix(ref matrix) => {
                // Anything but an identity alpha row can change alpha.
                matrix[15] != 0.0 || matrix[16] != 0.0 || matrix[17] != 0.0 ||
                    matrix[18] != 1.0 || matrix[19] != 0.0
            }
            _ => false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterOperations {
    operations: Vec<FilterOperation>,
}

impl FilterOperations {
    #[inline]
    pub fn new() -> FilterOperations {
        FilterOperations::default()
    }

    #[inline]
    pub fn append(&mut self, operation: FilterOperation) {
        self.operations.push(operation)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.operations.clear()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<FilterOperation> {
        self.operations.iter()
    }

    pub fn has_filter_that_moves_pixels(&self) -> bool {
        self.operations.iter().any(FilterOperation::moves_pixels)
    }

    pub fn has_filter_that_affects_opacity(&self) -> bool {
        self.operations.iter().any(FilterOperation::affects_opacity)
    }
}

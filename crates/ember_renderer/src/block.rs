//! Image partitioning into independently rendered blocks.

use std::fmt;

/// A rectangle of image pixels. Used both for the render region and for the
/// blocks it is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// X coordinate of the top-left corner
    pub x: u32,
    /// Y coordinate of the top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// The whole of a `width` x `height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the region lies entirely inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x
            .checked_add(self.width)
            .is_some_and(|right| right <= width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|bottom| bottom <= height)
    }

    fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// One unit of render work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub area: Region,
    /// Position in the render order; also feeds the block's random seed
    pub index: usize,
}

/// Default block edge in pixels.
pub const DEFAULT_BLOCK_SIZE: u32 = 32;

/// Split `region` into square blocks of `block_size` pixels, clipping the
/// last column and row to fit, then order them centre-out.
pub fn generate_blocks(region: Region, block_size: u32) -> Vec<Block> {
    let block_size = block_size.max(1);
    let mut blocks = Vec::new();

    let mut y = 0;
    while y < region.height {
        let mut x = 0;
        while x < region.width {
            let bw = block_size.min(region.width - x);
            let bh = block_size.min(region.height - y);
            blocks.push(Block {
                area: Region::new(region.x + x, region.y + y, bw, bh),
                index: blocks.len(),
            });
            x += block_size;
        }
        y += block_size;
    }

    sort_spiral(&mut blocks, region);

    for (i, block) in blocks.iter_mut().enumerate() {
        block.index = i;
    }

    blocks
}

/// Order blocks by distance from the region centre.
fn sort_spiral(blocks: &mut [Block], region: Region) {
    let (cx, cy) = region.center();
    let distance = |block: &Block| {
        let (x, y) = block.area.center();
        (x - cx).powi(2) + (y - cy).powi(2)
    };

    // Stable, so equidistant blocks stay in row-major order
    blocks.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

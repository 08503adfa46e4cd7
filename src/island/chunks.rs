//! Tracks which visibility chunks of an island image have been synthesized.

use crate::math::{PixelRect, Quad};

/// One bit per chunk, row-major.
#[derive(Clone, Debug)]
pub struct ChunkBitmap {
    cols: u32,
    rows: u32,
    chunk_size: u32,
    words: Vec<u64>,
}

impl ChunkBitmap {
    /// Bitmap covering a `width` x `height` image, nothing rendered.
    pub fn new(width: u32, height: u32, chunk_size: u32) -> Self {
        let cols = width.div_ceil(chunk_size);
        let rows = height.div_ceil(chunk_size);
        let bits = (cols * rows) as usize;
        Self {
            cols,
            rows,
            chunk_size,
            words: vec![0; bits.div_ceil(64)],
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn reset(&mut self) {
        self.words.fill(0);
    }

    pub fn is_rendered(&self, cx: u32, cy: u32) -> bool {
        if cx >= self.cols || cy >= self.rows {
            return false;
        }
        let bit = (cy * self.cols + cx) as usize;
        self.words[bit / 64] & (1 << (bit % 64)) != 0
    }

    /// Mark a chunk rendered. Returns true if it was not marked before.
    pub fn mark(&mut self, cx: u32, cy: u32) -> bool {
        if cx >= self.cols || cy >= self.rows {
            return false;
        }
        let bit = (cy * self.cols + cx) as usize;
        let mask = 1u64 << (bit % 64);
        let fresh = self.words[bit / 64] & mask == 0;
        self.words[bit / 64] |= mask;
        fresh
    }

    pub fn rendered_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Chunks overlapping a local pixel-space rect, clamped to the chunk grid.
    ///
    /// Rects arriving here have been wrap-translated by the terrain and may sit
    /// partly (or wholly) outside the image; only in-grid chunks are returned.
    pub fn chunks_overlapping(&self, rect: &Quad) -> Vec<(u32, u32)> {
        let size = self.chunk_size as f32;
        let span = |lo: f32, hi: f32, limit: u32| -> (u32, u32) {
            let lo = (lo / size).floor().clamp(0.0, limit as f32) as u32;
            let hi = (hi / size).ceil().clamp(0.0, limit as f32) as u32;
            (lo, hi)
        };
        let (x0, x1) = span(rect.min.x, rect.max.x, self.cols);
        let (y0, y1) = span(rect.min.y, rect.max.y, self.rows);

        let mut out = Vec::new();
        for cy in y0..y1 {
            for cx in x0..x1 {
                out.push((cx, cy));
            }
        }
        out
    }

    /// Pixel rect of a chunk, clamped to the image.
    pub fn chunk_rect(&self, cx: u32, cy: u32, width: u32, height: u32) -> PixelRect {
        PixelRect::new(
            cx * self.chunk_size,
            cy * self.chunk_size,
            (cx + 1) * self.chunk_size,
            (cy + 1) * self.chunk_size,
        )
        .clamped(width, height)
    }
}

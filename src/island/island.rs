//! Island - one destructible, lazily rendered terrain region.
//!
//! State is split across three locks so the main thread is never blocked
//! behind synthesis for long:
//! - `model`: cell grid + CPU pixel buffer (shared with the worker)
//! - `pending`: rects synthesized but not yet uploaded (worker pushes, main drains)
//! - `visual`: texture, chunk bitmap, wrap offset (main thread only)
//!
//! Lock order is visual -> model -> pending.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::chunks::ChunkBitmap;
use super::grid::{CellGrid, CellRange};
use super::pixels::PixelBuffer;
use super::synth::{synthesize, SynthParams};
use super::texture::{IslandTexture, TextureBackend};
use crate::core::types::Vec2;
use crate::generation::config::TerrainConfig;
use crate::generation::noise_bank::NoiseBank;
use crate::generation::placement::IslandSpec;
use crate::generation::shape::{generate_cells, IslandShape};
use crate::math::{PixelRect, Quad};
use crate::streaming::{AsyncLoader, LoadTask};

/// Stable arena index of an island within its terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IslandId(pub u32);

impl IslandId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One destructible unit: an island and a flat cell index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkAddress {
    pub island: IslandId,
    pub flat_index: usize,
}

/// Identifies one residency of an island. Synthesis work requested during a
/// residency is discarded if the island has since been unloaded or reloaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionTicket {
    pub island: IslandId,
    pub epoch: u32,
}

/// Drawable placement of a loaded island, in the caller's (unwrapped) frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IslandSprite {
    pub island: IslandId,
    pub origin: Vec2,
    pub size: Vec2,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct IslandModel {
    cells: Option<CellGrid>,
    pixels: Option<PixelBuffer>,
    /// Bumped on every load
    epoch: u32,
}

struct VisualState {
    texture: Option<Box<dyn IslandTexture>>,
    chunks: ChunkBitmap,
    offset: Vec2,
}

pub struct Island {
    id: IslandId,
    bounds: Quad,
    grid_width: u32,
    grid_height: u32,
    cell_size: u32,
    chunk_margin: u32,
    shape: IslandShape,
    base_health: f32,
    noise: Arc<NoiseBank>,
    params: SynthParams,
    version: AtomicU64,
    model: Mutex<IslandModel>,
    pending: Mutex<Vec<PixelRect>>,
    visual: Mutex<VisualState>,
}

impl Island {
    /// Place an island. The grid is not generated until [`Island::init`] runs.
    pub fn new(id: IslandId, spec: &IslandSpec, config: &TerrainConfig, noise: Arc<NoiseBank>) -> Self {
        let bounds = spec.bounds(config.cell_size);
        let (width, height) = (spec.grid_width * config.cell_size, spec.grid_height * config.cell_size);
        Self {
            id,
            bounds,
            grid_width: spec.grid_width,
            grid_height: spec.grid_height,
            cell_size: config.cell_size,
            chunk_margin: config.chunk_margin,
            shape: spec.shape,
            base_health: config.base_health,
            noise,
            params: SynthParams::from_config(config),
            version: AtomicU64::new(0),
            model: Mutex::new(IslandModel {
                cells: None,
                pixels: None,
                epoch: 0,
            }),
            pending: Mutex::new(Vec::new()),
            visual: Mutex::new(VisualState {
                texture: None,
                chunks: ChunkBitmap::new(width, height, config.chunk_size),
                offset: Vec2::ZERO,
            }),
        }
    }

    pub fn id(&self) -> IslandId {
        self.id
    }

    /// World-space bounds inside the field.
    pub fn bounds(&self) -> &Quad {
        &self.bounds
    }

    pub fn grid_size(&self) -> (u32, u32) {
        (self.grid_width, self.grid_height)
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Image size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.grid_width * self.cell_size, self.grid_height * self.cell_size)
    }

    /// Incremented once per init and once per damage call.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn is_initialized(&self) -> bool {
        lock(&self.model).cells.is_some()
    }

    pub fn is_loaded(&self) -> bool {
        lock(&self.model).pixels.is_some()
    }

    fn local_quad(&self) -> Quad {
        let (w, h) = self.pixel_size();
        Quad::new(Vec2::ZERO, Vec2::new(w as f32, h as f32))
    }

    fn cells_to_pixels(&self, range: CellRange) -> PixelRect {
        PixelRect::new(
            range.x0 * self.cell_size,
            range.y0 * self.cell_size,
            range.x1 * self.cell_size,
            range.y1 * self.cell_size,
        )
    }

    /// Generate the occupancy grid. Runs on the worker; later calls are no-ops.
    pub fn init(&self) {
        if self.is_initialized() {
            return;
        }
        let grid = generate_cells(
            &self.noise,
            self.shape,
            &self.bounds,
            self.grid_width,
            self.grid_height,
            self.cell_size as f32,
            self.base_health,
        );
        let active = grid.active_count();

        let mut model = lock(&self.model);
        if model.cells.is_some() {
            return;
        }
        model.cells = Some(grid);
        self.version.fetch_add(1, Ordering::AcqRel);
        log::trace!("Island {} initialized, {} active cells", self.id.0, active);
    }

    fn synthesize_locked(&self, model: &mut IslandModel, rect: PixelRect) {
        let IslandModel { cells, pixels, .. } = model;
        let (Some(grid), Some(buffer)) = (cells.as_ref(), pixels.as_mut()) else {
            return;
        };
        let written = synthesize(grid, buffer, &self.noise, &self.params, rect);
        if !written.is_empty() {
            lock(&self.pending).push(written);
        }
    }

    /// Re-synthesize `rect` of the pixel buffer. No-op unless loaded and initialized.
    pub fn update_area(&self, rect: PixelRect) {
        let mut model = lock(&self.model);
        self.synthesize_locked(&mut model, rect);
    }

    /// Worker entry point for chunk synthesis requested during `ticket`'s residency.
    ///
    /// Returns false if the ticket is stale and nothing was written.
    pub fn synthesize_region(&self, ticket: RegionTicket, rect: PixelRect) -> bool {
        let mut model = lock(&self.model);
        if model.epoch != ticket.epoch || model.pixels.is_none() {
            log::trace!(
                "Island {} dropping stale region (epoch {} != {})",
                self.id.0,
                ticket.epoch,
                model.epoch
            );
            return false;
        }
        self.synthesize_locked(&mut model, rect);
        true
    }

    /// Allocate the pixel buffer and texture. No-op if already loaded.
    pub fn load(&self, backend: &dyn TextureBackend) {
        let mut visual = lock(&self.visual);
        if visual.texture.is_some() {
            return;
        }
        let (w, h) = self.pixel_size();
        {
            let mut model = lock(&self.model);
            model.pixels = Some(PixelBuffer::new(w, h));
            model.epoch = model.epoch.wrapping_add(1);
        }
        visual.texture = Some(backend.create_texture(w, h));
        visual.chunks.reset();
        log::debug!("Island {} loaded ({}x{} px)", self.id.0, w, h);
    }

    /// Free the pixel buffer and texture. Idempotent.
    pub fn unload(&self) {
        let mut visual = lock(&self.visual);
        let was_loaded = visual.texture.take().is_some();
        {
            let mut model = lock(&self.model);
            model.pixels = None;
            lock(&self.pending).clear();
        }
        visual.chunks.reset();
        if was_loaded {
            log::debug!("Island {} unloaded", self.id.0);
        }
    }

    fn drain_pending(&self, visual: &mut VisualState) {
        let regions = std::mem::take(&mut *lock(&self.pending));
        if regions.is_empty() {
            return;
        }
        let Some(texture) = visual.texture.as_mut() else {
            return;
        };
        let model = lock(&self.model);
        let Some(buffer) = model.pixels.as_ref() else {
            return;
        };
        for rect in regions {
            texture.write_region(rect, &buffer.copy_region(rect));
        }
    }

    /// Per-frame visibility update. Main thread only.
    ///
    /// `view` is the camera rect in this island's local pixel space; `offset`
    /// is added to the island's field position to draw it in the camera frame.
    /// Returns whether the island is loaded afterwards.
    pub fn update_visual(
        &self,
        view: &Quad,
        offset: Vec2,
        backend: &dyn TextureBackend,
        loader: &AsyncLoader,
    ) -> bool {
        let visible = view.intersects(&self.local_quad());
        let loaded = lock(&self.visual).texture.is_some();

        match (visible, loaded) {
            (false, false) => return false,
            (false, true) => {
                self.unload();
                return false;
            }
            (true, false) => self.load(backend),
            (true, true) => {}
        }

        let mut visual = lock(&self.visual);
        visual.offset = offset;
        self.drain_pending(&mut visual);

        // Chunks requested before the grid exists would be marked but never filled
        let epoch = {
            let model = lock(&self.model);
            if model.cells.is_none() {
                return true;
            }
            model.epoch
        };

        let (w, h) = self.pixel_size();
        let ticket = RegionTicket { island: self.id, epoch };
        for (cx, cy) in visual.chunks.chunks_overlapping(view) {
            if !visual.chunks.mark(cx, cy) {
                continue;
            }
            let rect = visual.chunks.chunk_rect(cx, cy, w, h).expanded(self.chunk_margin, w, h);
            loader.submit(LoadTask::SynthesizeRegion { ticket, rect });
        }
        true
    }

    /// Damage every active cell whose centre lies in `rect` (local pixel space).
    ///
    /// Returns the number of cells destroyed. Destroyed cells are redrawn
    /// immediately when loaded.
    pub fn damage_area(&self, rect: &Quad, amount: f32) -> usize {
        let mut model = lock(&self.model);
        let Some(grid) = model.cells.as_mut() else {
            return 0;
        };
        let range = grid.range_for(rect, self.cell_size as f32);
        let mut destroyed = 0;
        for y in range.y0..range.y1 {
            for x in range.x0..range.x1 {
                if let Some(cell) = grid.get_mut(x, y) {
                    destroyed += usize::from(cell.damage(amount));
                }
            }
        }
        self.version.fetch_add(1, Ordering::AcqRel);

        if destroyed > 0 && !range.is_empty() && model.pixels.is_some() {
            let dirty = self.cells_to_pixels(range.grown(self.grid_width, self.grid_height));
            self.synthesize_locked(&mut model, dirty);
        }
        destroyed
    }

    /// Damage one cell by flat index. Returns true if it was destroyed.
    pub fn damage_chunk(&self, flat_index: usize, amount: f32) -> bool {
        let mut model = lock(&self.model);
        let Some(grid) = model.cells.as_mut() else {
            return false;
        };
        if flat_index >= grid.len() {
            return false;
        }
        let (x, y) = grid.coords(flat_index);
        let destroyed = grid.cell_mut(flat_index).is_some_and(|c| c.damage(amount));
        self.version.fetch_add(1, Ordering::AcqRel);

        if destroyed && model.pixels.is_some() {
            let range = CellRange { x0: x, y0: y, x1: x + 1, y1: y + 1 };
            let dirty = self.cells_to_pixels(range.grown(self.grid_width, self.grid_height));
            self.synthesize_locked(&mut model, dirty);
        }
        destroyed
    }

    /// Any active cell under `rect` (local pixel space)?
    pub fn check_collision(&self, rect: &Quad) -> bool {
        let model = lock(&self.model);
        let Some(grid) = model.cells.as_ref() else {
            return false;
        };
        let range = grid.range_for(rect, self.cell_size as f32);
        (range.y0..range.y1)
            .any(|y| (range.x0..range.x1).any(|x| grid.get(x, y).is_some_and(|c| c.active)))
    }

    /// Push-out normal for `rect`: the normalized mean offset from overlapping
    /// active cells to the rect centre. `None` if nothing overlaps.
    pub fn collision_normal(&self, rect: &Quad) -> Option<Vec2> {
        let model = lock(&self.model);
        let grid = model.cells.as_ref()?;
        let cs = self.cell_size as f32;
        let range = grid.range_for(rect, cs);
        let centre = rect.center();

        let mut sum = Vec2::ZERO;
        let mut hits = 0u32;
        for y in range.y0..range.y1 {
            for x in range.x0..range.x1 {
                if grid.get(x, y).is_some_and(|c| c.active) {
                    let cell_centre = (Vec2::new(x as f32, y as f32) + 0.5) * cs;
                    sum += centre - cell_centre;
                    hits += 1;
                }
            }
        }
        (hits > 0).then(|| (sum / hits as f32).normalize_or_zero())
    }

    /// Flat index of the active cell under `p` (local pixel space).
    pub fn check_collision_point(&self, p: Vec2) -> Option<usize> {
        let model = lock(&self.model);
        let grid = model.cells.as_ref()?;
        let index = grid.index_at(p, self.cell_size as f32)?;
        grid.cell(index).filter(|c| c.active).map(|_| index)
    }

    /// Run `f` on a copy-free view of the cell grid, if generated.
    pub fn with_cells<R>(&self, f: impl FnOnce(&CellGrid) -> R) -> Option<R> {
        lock(&self.model).cells.as_ref().map(f)
    }

    /// Run `f` on the CPU pixel buffer, if loaded.
    pub fn with_pixels<R>(&self, f: impl FnOnce(&PixelBuffer) -> R) -> Option<R> {
        lock(&self.model).pixels.as_ref().map(f)
    }

    /// Run `f` on the texture, if loaded. Main thread only.
    pub fn with_texture<R>(&self, f: impl FnOnce(&dyn IslandTexture) -> R) -> Option<R> {
        let visual = lock(&self.visual);
        visual.texture.as_deref().map(|texture| f(texture))
    }

    /// Downcast the texture to a concrete backend type.
    pub fn with_texture_as<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let visual = lock(&self.visual);
        let texture = visual.texture.as_deref()?;
        texture.as_any().downcast_ref::<T>().map(f)
    }

    /// Drawable placement, if loaded.
    pub fn sprite(&self) -> Option<IslandSprite> {
        let visual = lock(&self.visual);
        visual.texture.as_ref()?;
        Some(IslandSprite {
            island: self.id,
            origin: self.bounds.min + visual.offset,
            size: self.bounds.size(),
        })
    }

    /// Number of chunks synthesized (or queued) during the current residency.
    pub fn rendered_chunks(&self) -> usize {
        lock(&self.visual).chunks.rendered_count()
    }
}

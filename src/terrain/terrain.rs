//! Terrain - the facade the game layer talks to.
//!
//! Owns every island, the spatial index over the wrapping field, the texture
//! backend and the background loader. All queries are wrapped into the field
//! first, looked up in the index, translated into island-local pixel space and
//! delegated to the islands.

use std::sync::Arc;
use std::time::Duration;

use super::wrap::wrap_queries;
use crate::core::types::Vec2;
use crate::core::{Error, Result};
use crate::generation::config::TerrainConfig;
use crate::generation::noise_bank::NoiseBank;
use crate::generation::placement::{grid_placement, IslandSpec};
use crate::island::{ChunkAddress, CpuTextureBackend, Island, IslandId, IslandSprite, TextureBackend};
use crate::math::{wrap_point, Quad, Segment};
use crate::spatial::QuadTree;
use crate::streaming::{AsyncLoader, LoadTask};

/// First solid hit along a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Fraction of the segment at the hit (0 = start, 1 = end)
    pub fraction: f32,
    /// Hit position in the caller's frame
    pub point: Vec2,
    pub address: ChunkAddress,
}

/// Snapshot of runtime state, for overlays and logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainStats {
    pub islands: usize,
    pub initialized: usize,
    pub loaded: usize,
    pub rendered_chunks: usize,
    pub pending_tasks: usize,
}

pub struct Terrain {
    config: TerrainConfig,
    field: Quad,
    islands: Arc<[Island]>,
    index: QuadTree<IslandId>,
    loaded: Vec<IslandId>,
    backend: Box<dyn TextureBackend>,
    loader: AsyncLoader,
}

impl Terrain {
    /// Build a field with the default placement pattern and CPU textures.
    pub fn new(config: TerrainConfig) -> Result<Self> {
        Self::with_backend(config, Box::new(CpuTextureBackend))
    }

    /// Build a field with the default placement pattern.
    pub fn with_backend(config: TerrainConfig, backend: Box<dyn TextureBackend>) -> Result<Self> {
        config.validate()?;
        config.validate_placement()?;
        let noise = Arc::new(NoiseBank::new(&config));
        let specs = grid_placement(&config);
        Self::with_islands(config, specs, noise, backend)
    }

    /// Build a field from an explicit island list.
    ///
    /// Every island must lie inside `[0, field_size)` on both axes. Grid
    /// generation for each island is queued on the loader immediately.
    pub fn with_islands(
        config: TerrainConfig,
        specs: Vec<IslandSpec>,
        noise: Arc<NoiseBank>,
        backend: Box<dyn TextureBackend>,
    ) -> Result<Self> {
        config.validate()?;
        let field = Quad::new(Vec2::ZERO, Vec2::splat(config.field_size));

        let mut index = QuadTree::new(field, config.index_depth);
        let mut islands = Vec::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            let bounds = spec.bounds(config.cell_size);
            if spec.grid_width == 0 || spec.grid_height == 0 {
                return Err(Error::InvalidConfig(format!("island {} has an empty grid", i)));
            }
            if bounds.min.x < 0.0 || bounds.min.y < 0.0
                || bounds.max.x > field.max.x || bounds.max.y > field.max.y
            {
                return Err(Error::InvalidConfig(format!(
                    "island {} at {:?} lies outside the field",
                    i, bounds
                )));
            }
            let id = IslandId(i as u32);
            index.insert(id, bounds);
            islands.push(Island::new(id, spec, &config, Arc::clone(&noise)));
        }
        let islands: Arc<[Island]> = islands.into();

        let arena = Arc::clone(&islands);
        let loader = AsyncLoader::spawn(move |task| match task {
            LoadTask::InitIsland(id) => {
                if let Some(island) = arena.get(id.index()) {
                    island.init();
                }
            }
            LoadTask::SynthesizeRegion { ticket, rect } => {
                if let Some(island) = arena.get(ticket.island.index()) {
                    island.synthesize_region(ticket, rect);
                }
            }
        })?;
        for island in islands.iter() {
            loader.submit(LoadTask::InitIsland(island.id()));
        }

        log::info!(
            "Terrain built: {} islands over {}x{} field, index depth {} ({} occupied leaves)",
            islands.len(),
            config.field_size,
            config.field_size,
            config.index_depth,
            index.occupied_leaves()
        );

        Ok(Self {
            config,
            field,
            islands,
            index,
            loaded: Vec::new(),
            backend,
            loader,
        })
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// The field quad, `[0, field_size)` on both axes.
    pub fn field(&self) -> &Quad {
        &self.field
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn island(&self, id: IslandId) -> Option<&Island> {
        self.islands.get(id.index())
    }

    /// Islands loaded by the last [`Terrain::update_visual`].
    pub fn loaded_islands(&self) -> &[IslandId] {
        &self.loaded
    }

    /// Islands overlapping `rect` (wrapped), each paired with `rect` in its
    /// local pixel space and its draw offset.
    fn candidates(&self, rect: &Quad) -> Vec<(IslandId, Quad, Vec2)> {
        let mut out: Vec<(IslandId, Quad, Vec2)> = Vec::new();
        for query in wrap_queries(rect, &self.field) {
            for id in self.index.query(&query.area) {
                if out.iter().any(|(seen, ..)| *seen == id) {
                    continue;
                }
                let origin = self.islands[id.index()].bounds().min;
                out.push((id, query.area.translated(-origin), query.offset));
            }
        }
        out
    }

    /// Per-frame streaming update for a camera rect (any position; wrapped).
    ///
    /// Loads islands the camera touches, queues synthesis of newly visible
    /// chunks, uploads finished regions, and unloads every previously loaded
    /// island the camera no longer touches.
    pub fn update_visual(&mut self, camera: &Quad) {
        let visible = self.candidates(camera);

        for id in &self.loaded {
            if !visible.iter().any(|(v, ..)| v == id) {
                self.islands[id.index()].unload();
            }
        }

        let mut loaded = Vec::with_capacity(visible.len());
        for (id, view, offset) in visible {
            let island = &self.islands[id.index()];
            if island.update_visual(&view, offset, self.backend.as_ref(), &self.loader) {
                loaded.push(id);
            }
        }
        self.loaded = loaded;
    }

    /// Damage every cell under `rect`. Returns the number of cells destroyed.
    pub fn damage_area(&self, rect: &Quad, amount: f32) -> usize {
        self.candidates(rect)
            .into_iter()
            .map(|(id, local, _)| self.islands[id.index()].damage_area(&local, amount))
            .sum()
    }

    /// Damage one addressed cell. Returns true if it was destroyed.
    pub fn damage_chunk(&self, address: ChunkAddress, amount: f32) -> bool {
        self.island(address.island)
            .is_some_and(|island| island.damage_chunk(address.flat_index, amount))
    }

    /// Is any active cell under `rect`?
    pub fn check_collision(&self, rect: &Quad) -> bool {
        self.candidates(rect)
            .into_iter()
            .any(|(id, local, _)| self.islands[id.index()].check_collision(&local))
    }

    /// Push-out normal for `rect`, merged across every island it overlaps.
    ///
    /// `None` if nothing is hit; a zero vector if the hits cancel out.
    pub fn collide(&self, rect: &Quad) -> Option<Vec2> {
        let mut sum = Vec2::ZERO;
        let mut hit = false;
        for (id, local, _) in self.candidates(rect) {
            if let Some(normal) = self.islands[id.index()].collision_normal(&local) {
                sum += normal;
                hit = true;
            }
        }
        hit.then(|| sum.normalize_or_zero())
    }

    /// Address of the active cell under `p`, if any.
    pub fn check_collision_point(&self, p: Vec2) -> Option<ChunkAddress> {
        let p = wrap_point(p, &self.field);
        self.index.query_point(p).into_iter().find_map(|id| {
            let island = &self.islands[id.index()];
            island
                .check_collision_point(p - island.bounds().min)
                .map(|flat_index| ChunkAddress { island: id, flat_index })
        })
    }

    /// March from `start` to `end` in `ray_step` increments; first solid cell wins.
    pub fn query_ray(&self, start: Vec2, end: Vec2) -> Option<RayHit> {
        let segment = Segment::new(start, end);
        segment.march(self.config.ray_step).find_map(|(fraction, point)| {
            self.check_collision_point(point)
                .map(|address| RayHit { fraction, point, address })
        })
    }

    /// Damage the first cell hit along the segment.
    pub fn damage_ray(&self, start: Vec2, end: Vec2, amount: f32) -> Option<RayHit> {
        let hit = self.query_ray(start, end)?;
        self.damage_chunk(hit.address, amount);
        Some(hit)
    }

    /// Drawable placements of loaded islands, in the last camera's frame.
    pub fn sprites(&self) -> Vec<IslandSprite> {
        self.loaded
            .iter()
            .filter_map(|id| self.islands[id.index()].sprite())
            .collect()
    }

    /// Block until the loader has drained, or `timeout` elapses.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.loader.wait_idle(timeout)
    }

    pub fn stats(&self) -> TerrainStats {
        TerrainStats {
            islands: self.islands.len(),
            initialized: self.islands.iter().filter(|i| i.is_initialized()).count(),
            loaded: self.islands.iter().filter(|i| i.is_loaded()).count(),
            rendered_chunks: self.loaded.iter().map(|id| self.islands[id.index()].rendered_chunks()).sum(),
            pending_tasks: self.loader.pending(),
        }
    }
}

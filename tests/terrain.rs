//! End-to-end behaviour of the terrain facade: wrapping, streaming and damage.

use std::sync::Arc;
use std::time::Duration;

use atoll::generation::{IslandSpec, NoiseBank, TerrainConfig};
use atoll::island::{CpuTexture, CpuTextureBackend, IslandId};
use atoll::math::Quad;
use atoll::Terrain;
use glam::Vec2;

const WAIT: Duration = Duration::from_secs(10);

fn solid_terrain(config: TerrainConfig, specs: Vec<IslandSpec>) -> Terrain {
    let noise = Arc::new(NoiseBank::without_rock(&config));
    let terrain = Terrain::with_islands(config, specs, noise, Box::new(CpuTextureBackend))
        .expect("terrain should build");
    assert!(terrain.wait_idle(WAIT));
    terrain
}

fn opaque_texels(terrain: &Terrain, id: IslandId) -> usize {
    terrain.islands()[id.index()]
        .with_texture_as::<CpuTexture, _>(|t| t.pixels().iter().filter(|p| p.is_opaque()).count())
        .unwrap_or(0)
}

#[test]
fn collision_is_seen_from_both_sides_of_the_wrap_edge() {
    let config = TerrainConfig {
        field_size: 100.0,
        cell_size: 1,
        chunk_size: 16,
        index_depth: 3,
        ..Default::default()
    };
    let t = solid_terrain(config, vec![IslandSpec::solid(Vec2::new(95.0, 0.0), 4, 10)]);

    assert!(t.check_collision(&Quad::from_coords(-10.0, 0.0, 10.0, 10.0)));
    assert!(t.check_collision(&Quad::from_coords(90.0, 0.0, 100.0, 10.0)));
    assert!(t.check_collision(&Quad::from_coords(190.0, 100.0, 210.0, 110.0)));
    assert!(!t.check_collision(&Quad::from_coords(10.0, 0.0, 50.0, 10.0)));
}

#[test]
fn loaded_set_matches_camera_overlap() {
    let config = TerrainConfig {
        field_size: 512.0,
        cell_size: 4,
        chunk_size: 32,
        index_depth: 4,
        ..Default::default()
    };
    let specs = vec![
        IslandSpec::solid(Vec2::new(0.0, 0.0), 16, 16),
        IslandSpec::solid(Vec2::new(256.0, 0.0), 16, 16),
        IslandSpec::solid(Vec2::new(0.0, 256.0), 16, 16),
        IslandSpec::solid(Vec2::new(256.0, 256.0), 16, 16),
    ];
    let mut t = solid_terrain(config, specs);

    let cameras = [
        Quad::from_coords(0.0, 0.0, 100.0, 100.0),
        Quad::from_coords(200.0, 200.0, 400.0, 400.0),
        Quad::from_coords(-50.0, -50.0, 300.0, 30.0),
        Quad::from_coords(100.0, 100.0, 200.0, 200.0),
    ];
    for camera in &cameras {
        t.update_visual(camera);
        for island in t.islands() {
            let touched = [
                *camera,
                camera.translated(Vec2::new(512.0, 0.0)),
                camera.translated(Vec2::new(0.0, 512.0)),
                camera.translated(Vec2::splat(512.0)),
            ]
            .iter()
            .any(|c| c.intersects(island.bounds()));
            assert_eq!(island.is_loaded(), touched, "island {:?} camera {:?}", island.id(), camera);
        }
    }
}

#[test]
fn destroyed_area_stops_colliding_and_clears_pixels() {
    let config = TerrainConfig {
        field_size: 256.0,
        cell_size: 4,
        chunk_size: 32,
        base_health: 10.0,
        index_depth: 3,
        ..Default::default()
    };
    let mut t = solid_terrain(config, vec![IslandSpec::solid(Vec2::new(64.0, 64.0), 16, 16)]);
    let camera = Quad::from_coords(0.0, 0.0, 256.0, 256.0);
    t.update_visual(&camera);
    assert!(t.wait_idle(WAIT));
    t.update_visual(&camera);

    let hole = Quad::from_coords(80.0, 80.0, 96.0, 96.0);
    assert!(t.check_collision(&hole));
    assert_eq!(t.damage_area(&hole, 4.0), 0);
    assert!(t.check_collision(&hole));
    assert_eq!(t.damage_area(&hole, 6.0), 16);
    assert!(!t.check_collision(&hole));

    // Redraw is synchronous; the texture catches up on the next frame
    let cleared = t.islands()[0]
        .with_pixels(|buffer| !buffer.get(24, 24).is_opaque())
        .unwrap();
    assert!(cleared);
    t.update_visual(&camera);
    let texel = t.islands()[0]
        .with_texture_as::<CpuTexture, _>(|texture| texture.get(24, 24))
        .unwrap();
    assert!(!texel.is_opaque());
}

#[test]
fn same_seed_generates_identical_fields() {
    let config = TerrainConfig {
        seed: 99,
        field_size: 1024.0,
        islands_per_axis: 2,
        cell_size: 4,
        island_cells_min: 16,
        island_cells_max: 32,
        ..Default::default()
    };
    let a = Terrain::new(config.clone()).unwrap();
    let b = Terrain::new(config).unwrap();
    assert!(a.wait_idle(WAIT) && b.wait_idle(WAIT));

    assert_eq!(a.islands().len(), 4);
    for (ia, ib) in a.islands().iter().zip(b.islands()) {
        assert_eq!(ia.bounds(), ib.bounds());
        let ga = ia.with_cells(|g| g.clone()).unwrap();
        let gb = ib.with_cells(|g| g.clone()).unwrap();
        assert_eq!(ga, gb);
    }
}

#[test]
fn streaming_fills_the_whole_visible_island() {
    let config = TerrainConfig {
        field_size: 256.0,
        cell_size: 4,
        chunk_size: 16,
        index_depth: 3,
        ..Default::default()
    };
    let mut t = solid_terrain(config, vec![IslandSpec::solid(Vec2::new(32.0, 32.0), 16, 8)]);
    let camera = Quad::from_coords(0.0, 0.0, 200.0, 200.0);

    t.update_visual(&camera);
    assert_eq!(t.stats().rendered_chunks, 4 * 2);
    assert!(t.wait_idle(WAIT));
    t.update_visual(&camera);

    assert_eq!(opaque_texels(&t, IslandId(0)), 64 * 32);
    let stats = t.stats();
    assert_eq!(stats.loaded, 1);
    assert_eq!(stats.pending_tasks, 0);
}

#[test]
fn camera_straddling_the_field_corner_streams_both_islands() {
    let config = TerrainConfig {
        field_size: 200.0,
        cell_size: 4,
        chunk_size: 16,
        chunk_margin: 0,
        index_depth: 3,
        ..Default::default()
    };
    let specs = vec![
        IslandSpec::solid(Vec2::new(0.0, 0.0), 8, 8),
        IslandSpec::solid(Vec2::new(168.0, 168.0), 8, 8),
    ];
    let mut t = solid_terrain(config, specs);
    let camera = Quad::from_coords(-16.0, -16.0, 16.0, 16.0);

    t.update_visual(&camera);
    assert_eq!(t.loaded_islands().len(), 2);
    assert!(t.wait_idle(WAIT));
    t.update_visual(&camera);

    let near = &t.islands()[0];
    let far = &t.islands()[1];
    assert!(near.with_texture_as::<CpuTexture, _>(|tex| tex.get(0, 0).is_opaque()).unwrap());
    assert!(!near.with_texture_as::<CpuTexture, _>(|tex| tex.get(31, 31).is_opaque()).unwrap());
    assert!(far.with_texture_as::<CpuTexture, _>(|tex| tex.get(31, 31).is_opaque()).unwrap());
    assert!(!far.with_texture_as::<CpuTexture, _>(|tex| tex.get(0, 0).is_opaque()).unwrap());
}

#[test]
fn sprites_are_placed_in_the_camera_frame() {
    let config = TerrainConfig {
        field_size: 200.0,
        cell_size: 4,
        chunk_size: 16,
        index_depth: 3,
        ..Default::default()
    };
    let specs = vec![
        IslandSpec::solid(Vec2::new(0.0, 40.0), 4, 4),
        IslandSpec::solid(Vec2::new(180.0, 40.0), 4, 4),
    ];
    let mut t = solid_terrain(config, specs);

    t.update_visual(&Quad::from_coords(-30.0, 0.0, 30.0, 100.0));
    let mut sprites = t.sprites();
    sprites.sort_by_key(|s| s.island.0);
    assert_eq!(sprites.len(), 2);
    assert_eq!(sprites[0].origin, Vec2::new(0.0, 40.0));
    assert_eq!(sprites[1].origin, Vec2::new(-20.0, 40.0));
    assert_eq!(sprites[1].size, Vec2::splat(16.0));
}

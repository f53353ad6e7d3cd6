//! Unit tests for map geometry: mirroring, footprints and distances.

use arena_server::deck::basic_map;
use arena_server::game::grid::{
    min_footprint_distance, Grid, Position, Side, TILE_BLOCKED, TILE_BRIDGE, TILE_RIVER,
    TILE_WALKABLE,
};

fn arena() -> Grid {
    Grid::new(basic_map())
}

#[test]
fn basic_map_has_expected_shape() {
    let grid = arena();
    assert_eq!(grid.rows(), 35);
    assert_eq!(grid.cols(), 20);

    // The river band splits the halves; bridges sit at fixed columns.
    assert_eq!(grid.tile(17, 0), Some(TILE_RIVER));
    assert_eq!(grid.tile(17, 3), Some(TILE_BRIDGE));
    assert_eq!(grid.tile(17, 16), Some(TILE_BRIDGE));
    assert_eq!(grid.tile(0, 0), Some(TILE_WALKABLE));
    assert_eq!(grid.tile(34, 19), Some(TILE_WALKABLE));
}

#[test]
fn mirror_is_an_involution() {
    let grid = arena();
    for (x, y) in [(0, 0), (2, 8), (17, 10), (34, 19), (7, 3)] {
        let (mx, my) = grid.mirror(x, y);
        assert_eq!(grid.mirror(mx, my), (x, y), "double mirror of ({x},{y})");
    }
    assert_eq!(grid.mirror(2, 8), (32, 11));
}

#[test]
fn footprints_grow_away_from_their_side() {
    let post = Position {
        x: 6,
        y: 3,
        long: 3,
        wide: 3,
    };
    let top = post.tiles(Side::Top);
    assert_eq!(top.len(), 9);
    assert!(top.contains(&(6, 3)));
    assert!(top.contains(&(8, 5)));
    assert!(!top.contains(&(5, 3)));

    let mirrored = Position {
        x: 28,
        y: 16,
        long: 3,
        wide: 3,
    };
    let bottom = mirrored.tiles(Side::Bottom);
    assert!(bottom.contains(&(28, 16)));
    assert!(bottom.contains(&(26, 14)));
    assert!(!bottom.contains(&(29, 16)));
}

#[test]
fn footprint_distance_is_tile_to_tile_minimum() {
    let tower = Position {
        x: 6,
        y: 3,
        long: 3,
        wide: 3,
    };
    // Directly below the tower's last row.
    let adjacent = Position::tile(9, 3);
    let d = min_footprint_distance(&tower, Side::Top, &adjacent, Side::Bottom);
    assert!((d - 1.0).abs() < 1e-9);

    // Diagonal neighbour of the tower's corner tile (8,5).
    let diagonal = Position::tile(9, 6);
    let d = min_footprint_distance(&tower, Side::Top, &diagonal, Side::Bottom);
    assert!((d - std::f64::consts::SQRT_2).abs() < 1e-9);
}

#[test]
fn blocking_and_clearing_a_footprint_round_trips() {
    let mut grid = arena();
    let post = Position {
        x: 2,
        y: 8,
        long: 4,
        wide: 4,
    };
    grid.block_footprint(&post, Side::Top);
    for (x, y) in post.tiles(Side::Top) {
        assert_eq!(grid.tile(x, y), Some(TILE_BLOCKED));
    }
    grid.clear_footprint(&post, Side::Top);
    for (x, y) in post.tiles(Side::Top) {
        assert_eq!(grid.tile(x, y), Some(TILE_WALKABLE));
    }
}

#[test]
fn bottom_view_is_the_map_rotated_half_a_turn() {
    let mut grid = arena();
    // Make the map asymmetric so the rotation is observable.
    let post = Position::tile(1, 2);
    grid.block_footprint(&post, Side::Top);

    let top_view = grid.render(Side::Top);
    let bottom_view = grid.render(Side::Bottom);
    let rows = grid.rows();
    let cols = grid.cols();
    for x in 0..rows {
        for y in 0..cols {
            assert_eq!(
                bottom_view[x][y],
                top_view[rows - 1 - x][cols - 1 - y],
                "mismatch at ({x},{y})"
            );
        }
    }
}

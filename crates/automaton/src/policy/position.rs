//! Searches for a cell to retreat to or to make a stand on.
//!
//! Both searches score every candidate by how many walls surround it and
//! how far away it is, preferring more walls as long as the extra distance
//! stays within a factor of ten. Beyond six walls more cover is not worth
//! any detour.
use super::TurnContext;
use crate::flow::FlowChannel;
use crate::grid::Cell;

const ENOUGH_WALLS: usize = 6;
/// Grid distance from the hostiles' centroid beyond which it stops mattering.
const CROWD_RADIUS: i32 = 20;

#[derive(Debug)]
struct CoverSearch {
    best: Option<Cell>,
    best_walls: usize,
    best_distance: u32,
    ceiling: u32,
}

impl CoverSearch {
    fn new(ctx: &TurnContext<'_>) -> Self {
        Self {
            best: None,
            best_walls: 0,
            best_distance: ctx.unreached(),
            ceiling: ctx.unreached(),
        }
    }

    fn offer(&mut self, cell: Cell, walls: usize, distance: u32) {
        let nearer = walls == self.best_walls && distance < self.best_distance;
        let reach = self.best_distance.saturating_add(1).saturating_mul(10);
        let better_cover =
            walls > self.best_walls.min(ENOUGH_WALLS) && distance < reach.min(self.ceiling);

        if nearer || better_cover {
            self.best = Some(cell);
            self.best_walls = walls;
            self.best_distance = distance;
        }
    }
}

fn wall_count(ctx: &TurnContext<'_>, cell: Cell) -> usize {
    cell.neighbors()
        .filter(|around| ctx.world.is_wall(*around))
        .count()
}

/// Average position of every visible hostile.
fn hostile_centroid(ctx: &TurnContext<'_>) -> Option<Cell> {
    let (mut sum_y, mut sum_x, mut count) = (0i64, 0i64, 0i64);
    for hostile in ctx.world.hostiles().iter().filter(|h| h.visible) {
        sum_y += i64::from(hostile.position.y);
        sum_x += i64::from(hostile.position.x);
        count += 1;
    }

    if count == 0 {
        return None;
    }
    let y = i32::try_from(sum_y / count).ok()?;
    let x = i32::try_from(sum_x / count).ok()?;
    Some(Cell::new(y, x))
}

/// Best-covered known cell to retreat to on the safety field.
///
/// Cells near the centre of the visible hostiles are penalised, linearly
/// from `CROWD_RADIUS` at the centre down to nothing at that distance.
/// Returns `None` only when no known open cell is reachable.
pub fn safety_position(ctx: &TurnContext<'_>) -> Option<Cell> {
    let centroid = hostile_centroid(ctx);
    let mut search = CoverSearch::new(ctx);

    for cell in ctx.world.dimensions().interior() {
        if !ctx.is_known(cell) || ctx.world.terrain(cell).blocks_flow() {
            continue;
        }

        let crowding = centroid.map_or(0, |center| {
            let from_center = center.distance(cell);
            u32::try_from(CROWD_RADIUS - from_center).unwrap_or(0)
        });

        let distance = ctx.distance(FlowChannel::Safety, cell) + crowding;
        search.offer(cell, wall_count(ctx, cell), distance);
    }

    tracing::debug!(best = ?search.best, walls = search.best_walls, "safety position");
    search.best
}

/// Best-covered remembered cell to fight from on the combat field.
///
/// With at most one hostile adjacent there is nothing to gain from moving,
/// so the player's own cell is returned instead.
pub fn fighting_position(ctx: &TurnContext<'_>) -> Option<Cell> {
    let mut search = CoverSearch::new(ctx);

    for cell in ctx.world.dimensions().interior() {
        if !ctx.world.is_marked(cell) || ctx.world.terrain(cell).blocks_flow() {
            continue;
        }
        let distance = ctx.distance(FlowChannel::Combat, cell);
        search.offer(cell, wall_count(ctx, cell), distance);
    }

    let own = ctx.position();
    let adjacent = own
        .neighbors()
        .filter(|around| ctx.world.occupant(*around).is_some())
        .count();

    tracing::debug!(best = ?search.best, walls = search.best_walls, adjacent, "fighting position");

    if adjacent <= 1 {
        return Some(own);
    }
    search.best
}

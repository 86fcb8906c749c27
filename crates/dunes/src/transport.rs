//! Slab transport: erosion, downwind hops, stochastic deposition.
//!
//! Wind blows along increasing `i`. Every height change goes through
//! [`deposit_at`], which lets a slab topple onto a neighbour instead of
//! building a step steeper than [`AVALANCHE_THRESHOLD`].

use rand::Rng;

use crate::grid::Grid;
use crate::params::SimParams;

/// Largest height step a single edit may create against a neighbour.
pub const AVALANCHE_THRESHOLD: i32 = 2;

/// Neighbour scan order used when eroding: the upwind cell first.
const UPWIND_OFFSETS: [(isize, isize); 5] = [(-1, 0), (0, 1), (0, -1), (-1, -1), (-1, 1)];

/// Neighbour scan order used when depositing: the downwind cell first.
const DOWNWIND_OFFSETS: [(isize, isize); 5] = [(1, 0), (0, 1), (0, -1), (1, -1), (1, 1)];

/// Which neighbour table an edit scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upwind,
    Downwind,
}

impl Direction {
    #[must_use]
    pub fn offsets(self) -> &'static [(isize, isize); 5] {
        match self {
            Self::Upwind => &UPWIND_OFFSETS,
            Self::Downwind => &DOWNWIND_OFFSETS,
        }
    }
}

/// Apply `amount` (±1) at `(i, j)`, or at the first neighbour in
/// `direction`'s table against which the edit would exceed the avalanche
/// threshold. Returns the cell that actually changed.
///
/// Grid mass always changes by exactly `amount`.
pub fn deposit_at(
    heights: &mut Grid,
    i: usize,
    j: usize,
    amount: i32,
    direction: Direction,
) -> (usize, usize) {
    let here = heights.get(i, j);
    let (p, q) = direction
        .offsets()
        .iter()
        .map(|&(di, dj)| heights.wrap(i as isize + di, j as isize + dj))
        .find(|&(ni, nj)| amount * (here - heights.get(ni, nj)) > AVALANCHE_THRESHOLD)
        .unwrap_or((i, j));
    heights.add(p, q, amount);
    (p, q)
}

/// What happened to one slab lifted during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopOutcome {
    /// Cell that lost the slab (the source, or an upwind neighbour after toppling).
    pub eroded: (usize, usize),
    /// Last landing cell of the hop loop.
    pub landing: (usize, usize),
    /// Cell that gained the slab (the landing cell, or a neighbour after toppling).
    pub deposited: (usize, usize),
    pub hops: u32,
    /// True when the hop cap ended the flight rather than a deposition draw.
    pub forced: bool,
}

/// Run the transport rule for one cell.
///
/// Empty and shadowed cells are left alone and yield `None`. Otherwise one
/// slab is eroded, then hops `hop_length` cells downwind at a time until it
/// lands in shadow, wins a deposition draw, or reaches `max_hops`.
///
/// A single uniform draw `rd` decides deposition on lit cells: the slab
/// settles when `(bare && rd < prob_deposit_bare) || rd < prob_deposit_sand`.
pub fn transport_slab<R: Rng + ?Sized>(
    heights: &mut Grid,
    shadow: &Grid,
    i: usize,
    j: usize,
    params: &SimParams,
    rng: &mut R,
) -> Option<HopOutcome> {
    if heights.get(i, j) <= 0 || shadow.get(i, j) != 0 {
        return None;
    }

    let eroded = deposit_at(heights, i, j, -1, Direction::Upwind);

    let width = heights.width();
    let step = params.hop_length % width;
    let mut ic = i;
    let mut hops = 0u32;
    loop {
        ic = (ic + step) % width;
        hops = hops.saturating_add(1);

        let settles = shadow.get(ic, j) != 0 || {
            let rd: f32 = rng.random();
            (heights.get(ic, j) == 0 && rd < params.prob_deposit_bare)
                || rd < params.prob_deposit_sand
        };
        let forced = !settles && params.max_hops.is_some_and(|cap| hops >= cap);

        if settles || forced {
            let deposited = deposit_at(heights, ic, j, 1, Direction::Downwind);
            return Some(HopOutcome {
                eroded,
                landing: (ic, j),
                deposited,
                hops,
                forced,
            });
        }
    }
}

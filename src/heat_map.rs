// Heat-diffusion "scent map"
//
// Ghosts inject signed sources into a scalar field which is then smoothed over
// open cells for a few passes. Walls are barriers: a threat on the other side
// of a wall never reaches the sample point, so the field accounts for the maze
// without any explicit path finding.

use crate::config::HeuristicConfig;
use crate::game::GameState;
use crate::grid::Grid;
use crate::types::Position;

/// Real-valued potential per cell, owned by a single evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMap {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl HeatMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        HeatMap {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index_of(&self, pos: Position) -> Option<usize> {
        if pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    /// Field value at `pos`; zero outside the map
    pub fn get(&self, pos: Position) -> f64 {
        self.index_of(pos).map_or(0.0, |idx| self.values[idx])
    }

    /// Adds `amount` at `pos`. Sources stack; out-of-bounds injections are dropped.
    pub fn inject(&mut self, pos: Position, amount: f64) {
        if let Some(idx) = self.index_of(pos) {
            self.values[idx] += amount;
        }
    }

    /// Runs `passes` synchronous smoothing passes
    ///
    /// Every open cell whose magnitude does not exceed `source_threshold` is
    /// replaced by `decay` times the mean of its open orthogonal neighbours,
    /// read from the previous pass. Cells above the threshold are fixed
    /// sources. Wall cells are never written and never contribute. A cell with
    /// no open neighbour keeps its value.
    pub fn diffuse(&mut self, walls: &Grid, passes: usize, decay: f64, source_threshold: f64) {
        let mut previous = self.values.clone();
        for _ in 0..passes {
            previous.copy_from_slice(&self.values);
            for y in 0..self.height {
                for x in 0..self.width {
                    let pos = Position::new(x as i32, y as i32);
                    if walls.is_blocked(pos) {
                        continue;
                    }
                    let idx = y * self.width + x;
                    if previous[idx].abs() > source_threshold {
                        continue;
                    }

                    let mut sum = 0.0;
                    let mut valid = 0usize;
                    for neighbor in pos.neighbors() {
                        if walls.is_blocked(neighbor) {
                            continue;
                        }
                        if let Some(n_idx) = self.index_of(neighbor) {
                            sum += previous[n_idx];
                            valid += 1;
                        }
                    }

                    if valid > 0 {
                        self.values[idx] = (sum / valid as f64) * decay;
                    }
                }
            }
        }
    }
}

/// Diffused ghost field sampled for one candidate Pacman position
#[derive(Debug, Clone, PartialEq)]
pub struct ScentMap {
    pub map: HeatMap,
    /// A non-scared ghost is within `ghost_proximity` of the candidate
    pub threat_nearby: bool,
}

impl ScentMap {
    /// Injects one source per ghost of `state`, relative to `candidate`, then diffuses
    ///
    /// Scared ghosts are targets (positive source). A threatening ghost whose
    /// heading points towards the candidate is a strong negative source; one
    /// heading away or sideways is a mild one.
    pub fn build(state: &GameState, candidate: Position, params: &HeuristicConfig) -> Self {
        let walls = state.walls();
        let mut map = HeatMap::new(walls.width(), walls.height());
        let mut threat_nearby = false;

        for ghost in state.ghost_states() {
            if ghost.is_scared() {
                map.inject(ghost.position, params.scared_ghost_source);
                continue;
            }

            if candidate.manhattan(ghost.position) < params.ghost_proximity {
                threat_nearby = true;
            }

            let intent = ghost.direction.dot(ghost.position.vector_to(candidate));
            let intensity = if intent > 0 {
                params.charging_ghost_source
            } else {
                params.retreating_ghost_source
            };
            map.inject(ghost.position, intensity);
        }

        map.diffuse(
            walls,
            params.diffusion_passes,
            params.decay,
            params.source_threshold,
        );

        ScentMap { map, threat_nearby }
    }

    pub fn value_at(&self, pos: Position) -> f64 {
        self.map.get(pos)
    }
}

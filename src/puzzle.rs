//! Sliding-tile puzzle over a picture.
//!
//! Tiles hold the index of the picture piece they show; the highest value is the
//! empty slot. The board is solved when every position holds its own index.

use crate::error::{MagicError, Result};
use crate::models::ImageData;
use rand::seq::IndexedRandom;
use rand::Rng;

pub const DEFAULT_GRID_SIZE: usize = 3;
pub const SHUFFLE_MOVES: usize = 100;
const MAX_SHUFFLE_ATTEMPTS: usize = 32;
pub const SAMPLE_PICTURE_URL: &str = "https://picsum.photos/600/600";

#[derive(Debug, Clone, PartialEq)]
pub enum PuzzleSource {
    Upload(ImageData),
    Sample(String),
}

impl PuzzleSource {
    pub fn sample() -> Self {
        PuzzleSource::Sample(SAMPLE_PICTURE_URL.to_string())
    }
}

pub fn check_win(tiles: &[usize]) -> bool {
    tiles.iter().enumerate().all(|(i, &v)| i == v)
}

fn grid_pos(index: usize, size: usize) -> (usize, usize) {
    (index / size, index % size)
}

pub fn is_adjacent(a: usize, b: usize, size: usize) -> bool {
    let (ar, ac) = grid_pos(a, size);
    let (br, bc) = grid_pos(b, size);
    ar.abs_diff(br) + ac.abs_diff(bc) == 1
}

/// Positions the empty slot can move to from `empty`.
pub fn neighbors(empty: usize, size: usize) -> Vec<usize> {
    let (row, col) = grid_pos(empty, size);
    let mut moves = Vec::with_capacity(4);
    if row > 0 {
        moves.push(empty - size);
    }
    if row + 1 < size {
        moves.push(empty + size);
    }
    if col > 0 {
        moves.push(empty - 1);
    }
    if col + 1 < size {
        moves.push(empty + 1);
    }
    moves
}

#[derive(Debug, Clone)]
pub struct Puzzle {
    source: PuzzleSource,
    size: usize,
    tiles: Vec<usize>,
    solved: bool,
    moves: usize,
}

impl Puzzle {
    /// A solved board; call [`Puzzle::shuffle`] to start a game.
    pub fn new(source: PuzzleSource, size: usize) -> Result<Self> {
        if size < 2 {
            return Err(MagicError::Validation("Puzzle grid must be at least 2x2".into()));
        }
        Ok(Self {
            source,
            size,
            tiles: (0..size * size).collect(),
            solved: true,
            moves: 0,
        })
    }

    pub fn source(&self) -> &PuzzleSource {
        &self.source
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tiles(&self) -> &[usize] {
        &self.tiles
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn empty_value(&self) -> usize {
        self.size * self.size - 1
    }

    pub fn empty_index(&self) -> usize {
        self.tiles
            .iter()
            .position(|&v| v == self.empty_value())
            .unwrap_or(self.empty_value())
    }

    /// Resets to the identity and walks the empty slot through [`SHUFFLE_MOVES`]
    /// random legal moves, walking again if it lands back on the identity.
    /// Returns the positions the empty slot visited, in order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<usize> {
        let mut path = Vec::new();
        for _ in 0..MAX_SHUFFLE_ATTEMPTS {
            path = self.random_walk(rng);
            if !check_win(&self.tiles) {
                break;
            }
        }

        self.moves = 0;
        self.solved = check_win(&self.tiles);
        log::debug!("Shuffled {}x{} puzzle with {} moves", self.size, self.size, path.len());
        path
    }

    fn random_walk<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<usize> {
        self.tiles = (0..self.size * self.size).collect();
        let mut empty = self.empty_value();
        let mut path = Vec::with_capacity(SHUFFLE_MOVES);

        for _ in 0..SHUFFLE_MOVES {
            let options = neighbors(empty, self.size);
            let Some(&next) = options.choose(rng) else {
                break;
            };
            self.tiles.swap(empty, next);
            empty = next;
            path.push(next);
        }
        path
    }

    /// Slides the tile at `index` into the empty slot if they touch.
    /// Returns whether the board changed. Ignored once solved.
    pub fn handle_tile_click(&mut self, index: usize) -> bool {
        if self.solved || index >= self.tiles.len() {
            return false;
        }
        let empty = self.empty_index();
        if !is_adjacent(index, empty, self.size) {
            return false;
        }
        self.tiles.swap(index, empty);
        self.moves += 1;
        if check_win(&self.tiles) {
            self.solved = true;
            log::info!("🧩 Puzzle solved in {} moves", self.moves);
        }
        true
    }

    /// Background offset, in percent, of the picture piece `value`.
    pub fn tile_offset(&self, value: usize) -> (f32, f32) {
        let (row, col) = grid_pos(value, self.size);
        let step = 100.0 / (self.size - 1) as f32;
        (col as f32 * step, row as f32 * step)
    }

    pub fn render(&self) -> String {
        let empty = self.empty_value();
        self.tiles
            .chunks(self.size)
            .map(|row| {
                row.iter()
                    .map(|&v| if v == empty { " .".to_string() } else { format!("{:>2}", v + 1) })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

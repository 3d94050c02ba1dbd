use super::{require_photo, GenerationStatus, Wizard};
use crate::error::Result;
use crate::puzzle::{Puzzle, PuzzleSource, DEFAULT_GRID_SIZE};
use rand::Rng;

#[derive(Debug, Clone)]
pub enum PuzzleStep {
    Pick,
    Play(Puzzle),
}

/// Fun Zone puzzle: pick a picture, then slide tiles until it is whole again.
#[derive(Debug, Clone)]
pub struct PuzzleGame {
    step: PuzzleStep,
    size: usize,
}

impl Default for PuzzleGame {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleGame {
    pub fn new() -> Self {
        Self {
            step: PuzzleStep::Pick,
            size: DEFAULT_GRID_SIZE,
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn step(&self) -> &PuzzleStep {
        &self.step
    }

    pub fn puzzle(&self) -> Option<&Puzzle> {
        match &self.step {
            PuzzleStep::Play(puzzle) => Some(puzzle),
            PuzzleStep::Pick => None,
        }
    }

    /// Starts a shuffled game. Returns the empty slot's shuffle path.
    pub fn start<R: Rng + ?Sized>(&mut self, source: PuzzleSource, rng: &mut R) -> Result<Vec<usize>> {
        if let PuzzleSource::Upload(image) = &source {
            require_photo(image)?;
        }
        let mut puzzle = Puzzle::new(source, self.size)?;
        let path = puzzle.shuffle(rng);
        self.step = PuzzleStep::Play(puzzle);
        Ok(path)
    }

    /// Reshuffles the current picture. Does nothing before a picture is picked.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Vec<usize>> {
        match &mut self.step {
            PuzzleStep::Play(puzzle) => Some(puzzle.shuffle(rng)),
            PuzzleStep::Pick => None,
        }
    }

    pub fn click(&mut self, index: usize) -> bool {
        match &mut self.step {
            PuzzleStep::Play(puzzle) => puzzle.handle_tile_click(index),
            PuzzleStep::Pick => false,
        }
    }

    pub fn back(&mut self) {
        self.step = PuzzleStep::Pick;
    }
}

impl Wizard for PuzzleGame {
    fn title(&self) -> &'static str {
        "Magic Puzzle"
    }

    fn step_label(&self) -> &'static str {
        match &self.step {
            PuzzleStep::Pick => "pick",
            PuzzleStep::Play(p) if p.is_solved() => "solved",
            PuzzleStep::Play(_) => "play",
        }
    }

    fn status(&self) -> GenerationStatus {
        GenerationStatus::Idle
    }

    fn error(&self) -> Option<&str> {
        None
    }

    fn reset(&mut self) {
        *self = Self::new().with_size(self.size);
    }
}

//! One generation of the population: spawn a bird per genome, step the
//! simulation until every bird is gone or the score target is reached, and
//! hand the scored genomes back.

use anyhow::Result;
use rand::rngs::SmallRng;

use crate::evolve::{EvolutionService, Genome, Network};
use crate::physics::{Bird, FLOOR_Y};
use crate::pipes::{PipeStream, collides};
use crate::sprite::{BIRD_H, Sprites};

/// Shared starting position for every bird in a generation
pub const START_X: f32 = 230.0;
pub const START_Y: f32 = 350.0;

const SURVIVAL_REWARD: f32 = 0.1;
const COLLISION_PENALTY: f32 = 1.0;
const PASS_BONUS: f32 = 5.0;
const JUMP_THRESHOLD: f32 = 0.5;

/// Bird, controller, and genome travel as one record so removal can never
/// desynchronize them.
pub struct Slot {
    pub bird: Bird,
    net: Network,
    pub genome: Genome,
}

pub struct GenerationRun {
    pub slots: Vec<Slot>,
    /// Culled genomes keep their accumulated fitness until generation end
    retired: Vec<Genome>,
    pub pipes: PipeStream,
    pub score: u32,
    score_target: u32,
    rng: SmallRng,
}

impl GenerationRun {
    /// Spawning: fitness reset, one compiled controller and one bird per
    /// genome, one initial pipe. A compile failure aborts the run.
    pub fn new(
        genomes: Vec<Genome>,
        service: &impl EvolutionService,
        score_target: u32,
        mut rng: SmallRng,
    ) -> Result<Self> {
        let mut slots = Vec::with_capacity(genomes.len());
        for mut genome in genomes {
            genome.fitness = 0.0;
            let net = service.compile(&genome)?;
            slots.push(Slot { bird: Bird::new(START_X, START_Y), net, genome });
        }
        Ok(Self {
            slots,
            retired: Vec::new(),
            pipes: PipeStream::new(&mut rng),
            score: 0,
            score_target,
            rng,
        })
    }

    pub fn alive(&self) -> usize {
        self.slots.len()
    }

    pub fn finished(&self) -> bool {
        self.slots.is_empty() || self.score >= self.score_target
    }

    /// Any surviving bird works as the pass/targeting reference; they all
    /// share the same x.
    fn reference_x(&self) -> f32 {
        self.slots.first().map_or(START_X, |slot| slot.bird.x)
    }

    /// Index of the pair currently feeding observations.
    pub fn target_index(&self) -> usize {
        self.pipes.target_index(self.reference_x())
    }

    /// One simulation tick. Returns true when a pair was passed this tick.
    /// A controller failure is fatal: undefined agent behavior would corrupt
    /// the fitness signal for the whole generation.
    pub fn step(&mut self, sprites: &Sprites) -> Result<bool> {
        let target = self.target_index();
        let (gap_top, gap_bottom) = {
            let pipe = &self.pipes.pipes[target];
            (pipe.gap_top, pipe.gap_bottom)
        };

        // physics, survival reward, controller decision
        for slot in &mut self.slots {
            slot.bird.advance();
            slot.genome.fitness += SURVIVAL_REWARD;
            let y = slot.bird.y;
            let obs = [y, (y - gap_top).abs(), (y - gap_bottom).abs()];
            if slot.net.activate(&obs)? > JUMP_THRESHOLD {
                slot.bird.jump();
            }
        }

        let scored = self.pipes.advance(self.reference_x(), &mut self.rng);

        // collision cull, with penalty
        let mut i = 0;
        while i < self.slots.len() {
            let hit = self
                .pipes
                .pipes
                .iter()
                .any(|pipe| collides(&self.slots[i].bird, pipe, sprites));
            if hit {
                let mut slot = self.slots.remove(i);
                slot.genome.fitness -= COLLISION_PENALTY;
                self.retired.push(slot.genome);
            } else {
                i += 1;
            }
        }

        // the whole surviving cohort gets the pass bonus, not just the
        // bird that crossed the pair
        if scored {
            self.score += 1;
            for slot in &mut self.slots {
                slot.genome.fitness += PASS_BONUS;
            }
        }

        // out-of-bounds cull, no penalty
        let mut i = 0;
        while i < self.slots.len() {
            let y = self.slots[i].bird.y;
            if y + BIRD_H as f32 >= FLOOR_Y || y < 0.0 {
                let slot = self.slots.remove(i);
                self.retired.push(slot.genome);
            } else {
                i += 1;
            }
        }

        Ok(scored)
    }

    /// Yields every genome of the generation, culled and surviving alike,
    /// with its final fitness.
    pub fn into_genomes(self) -> Vec<Genome> {
        let mut genomes = self.retired;
        genomes.extend(self.slots.into_iter().map(|slot| slot.genome));
        genomes
    }
}

//! The population-evolution seam. The session only talks to the
//! `EvolutionService` trait, so the bundled clone-best-and-mutate evolver can
//! be swapped for a full NEAT backend without touching the evaluator.

use anyhow::{Result, bail};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;

use crate::config::Config;

pub const INPUTS: usize = 3;

/// Evolvable parameter set plus the fitness accumulator the evaluator writes.
/// Weight layout: per hidden neuron `[bias, w_in0, w_in1, w_in2]`, then the
/// output neuron `[bias, w_h0, .., w_hN]`.
#[derive(Clone, Debug)]
pub struct Genome {
    pub weights: Vec<f32>,
    pub fitness: f32,
}

impl Genome {
    pub fn weight_count(hidden: usize) -> usize {
        hidden * (INPUTS + 1) + hidden + 1
    }
}

/// Controller compiled from a genome: a fixed 3 -> hidden -> 1 feedforward
/// net with tanh activations, output in (-1, 1).
pub struct Network {
    hidden: usize,
    weights: Vec<f32>,
}

impl Network {
    pub fn from_genome(genome: &Genome, hidden: usize) -> Result<Self> {
        let expected = Genome::weight_count(hidden);
        if genome.weights.len() != expected {
            bail!(
                "malformed genome: {} weights, network shape needs {}",
                genome.weights.len(),
                expected
            );
        }
        Ok(Self { hidden, weights: genome.weights.clone() })
    }

    pub fn activate(&self, inputs: &[f32; INPUTS]) -> Result<f32> {
        let mut idx = 0;
        let mut out = self.weights[self.hidden * (INPUTS + 1)];
        for h in 0..self.hidden {
            let mut acc = self.weights[idx];
            idx += 1;
            for input in inputs {
                acc += self.weights[idx] * input;
                idx += 1;
            }
            out += self.weights[self.hidden * (INPUTS + 1) + 1 + h] * acc.tanh();
        }
        let out = out.tanh();
        if !out.is_finite() {
            // corrupt weights would poison the whole generation's fitness
            bail!("controller produced a non-finite output");
        }
        Ok(out)
    }
}

pub trait EvolutionService {
    /// Fresh genomes for generation one.
    fn initial_population(&mut self) -> Vec<Genome>;
    /// Compiles one controller; failure is a fatal configuration error.
    fn compile(&self, genome: &Genome) -> Result<Network>;
    /// Consumes the scored population and produces the next one.
    fn evolve(&mut self, population: Vec<Genome>) -> Vec<Genome>;
}

/// Default evolver: keep the fittest genome as-is, fill the rest of the
/// population with mutated clones of it.
pub struct MutationEvolver {
    pop_size: usize,
    hidden: usize,
    mutation_rate: f64,
    mutation_strength: f32,
    rng: SmallRng,
}

impl MutationEvolver {
    pub fn new(cfg: &Config) -> Self {
        let rng = match cfg.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            pop_size: cfg.population_size,
            hidden: cfg.hidden_neurons,
            mutation_rate: cfg.mutation_rate,
            mutation_strength: cfg.mutation_strength,
            rng,
        }
    }

    fn random_genome(&mut self) -> Genome {
        let n = Genome::weight_count(self.hidden);
        let weights = (0..n).map(|_| self.rng.gen_range(-1.0..1.0)).collect();
        Genome { weights, fitness: 0.0 }
    }

    fn mutate(&mut self, genome: &mut Genome) {
        for w in &mut genome.weights {
            if self.rng.gen_bool(self.mutation_rate) {
                *w += self.rng.gen_range(-self.mutation_strength..self.mutation_strength);
            }
        }
    }
}

impl EvolutionService for MutationEvolver {
    fn initial_population(&mut self) -> Vec<Genome> {
        (0..self.pop_size).map(|_| self.random_genome()).collect()
    }

    fn compile(&self, genome: &Genome) -> Result<Network> {
        Network::from_genome(genome, self.hidden)
    }

    fn evolve(&mut self, mut population: Vec<Genome>) -> Vec<Genome> {
        population.sort_by(|a, b| {
            b.fitness.partial_cmp(&a.fitness).unwrap_or(Ordering::Equal)
        });
        let parent = match population.into_iter().next() {
            Some(best) => best,
            None => self.random_genome(),
        };

        let mut next = Vec::with_capacity(self.pop_size);
        next.push(Genome { weights: parent.weights.clone(), fitness: 0.0 });
        while next.len() < self.pop_size {
            let mut child = Genome { weights: parent.weights.clone(), fitness: 0.0 };
            self.mutate(&mut child);
            next.push(child);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config { population_size: 8, hidden_neurons: 4, seed: Some(42), ..Config::default() }
    }

    #[test]
    fn initial_population_has_configured_size_and_shape() {
        let mut evolver = MutationEvolver::new(&test_config());
        let pop = evolver.initial_population();
        assert_eq!(pop.len(), 8);
        for genome in &pop {
            assert_eq!(genome.weights.len(), Genome::weight_count(4));
            assert_eq!(genome.fitness, 0.0);
        }
    }

    #[test]
    fn compile_rejects_wrong_weight_count() {
        let evolver = MutationEvolver::new(&test_config());
        let genome = Genome { weights: vec![0.0; 3], fitness: 0.0 };
        assert!(evolver.compile(&genome).is_err());
    }

    #[test]
    fn activation_is_bounded_and_zero_for_zero_weights() {
        let genome = Genome { weights: vec![0.0; Genome::weight_count(4)], fitness: 0.0 };
        let net = Network::from_genome(&genome, 4).unwrap();
        let out = net.activate(&[350.0, 120.0, 80.0]).unwrap();
        assert_eq!(out, 0.0);

        let genome = Genome { weights: vec![0.7; Genome::weight_count(4)], fitness: 0.0 };
        let net = Network::from_genome(&genome, 4).unwrap();
        let out = net.activate(&[350.0, 120.0, 80.0]).unwrap();
        assert!(out > -1.0 && out < 1.0);
    }

    #[test]
    fn evolve_preserves_population_size_and_best_weights() {
        let mut evolver = MutationEvolver::new(&test_config());
        let mut pop = evolver.initial_population();
        pop[3].fitness = 99.0;
        let champion = pop[3].weights.clone();

        let next = evolver.evolve(pop);
        assert_eq!(next.len(), 8);
        assert_eq!(next[0].weights, champion);
        assert!(next.iter().all(|g| g.fitness == 0.0));
    }
}

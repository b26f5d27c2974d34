//! Top-level mode state machine wrapping the evaluator. One scheduler drives
//! everything; menu, pause, and summary are modes of the same tick loop, not
//! nested event loops.

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::eval::GenerationRun;
use crate::evolve::{EvolutionService, Genome, MutationEvolver};
use crate::physics::Floor;
use crate::sprite::Sprites;

/// Summary screen lingers this long before the run ends
pub const SUMMARY_DURATION: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Menu,
    Running,
    Paused,
    Summary,
}

pub struct Session {
    pub mode: Mode,
    /// Survives generation boundaries; everything else resets per generation
    pub generation: u32,
    pub floor: Floor,
    pub run: Option<GenerationRun>,
    /// Final score shown on the summary screen
    pub last_score: u32,
    cfg: Config,
    evolver: MutationEvolver,
    pending: Vec<Genome>,
    summary_since: Option<Instant>,
    exit: bool,
    rng: SmallRng,
}

impl Session {
    pub fn new(cfg: Config) -> Self {
        let mut evolver = MutationEvolver::new(&cfg);
        let pending = evolver.initial_population();
        let rng = match cfg.seed {
            // decorrelated from the evolver's stream
            Some(seed) => SmallRng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            None => SmallRng::from_entropy(),
        };
        Self {
            mode: Mode::Menu,
            generation: 0,
            floor: Floor::new(),
            run: None,
            last_score: 0,
            cfg,
            evolver,
            pending,
            summary_since: None,
            exit: false,
            rng,
        }
    }

    /// External start trigger; only meaningful on the menu.
    pub fn start(&mut self) -> Result<()> {
        if self.mode == Mode::Menu {
            self.begin_generation()?;
            self.mode = Mode::Running;
        }
        Ok(())
    }

    /// External pause/resume trigger. Pausing is a full simulation freeze.
    pub fn toggle_pause(&mut self) {
        self.mode = match self.mode {
            Mode::Running => Mode::Paused,
            Mode::Paused => Mode::Running,
            other => other,
        };
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    /// One logical tick. Only Running advances simulation state; Menu and
    /// Summary keep the floor scrolling for looks, Paused does nothing.
    pub fn tick(&mut self, sprites: &Sprites) -> Result<()> {
        match self.mode {
            Mode::Running => {
                if let Some(run) = self.run.as_mut() {
                    run.step(sprites)?;
                    self.floor.advance();
                    if run.finished() {
                        self.finish_generation()?;
                    }
                }
            }
            Mode::Menu => self.floor.advance(),
            Mode::Summary => {
                self.floor.advance();
                if let Some(since) = self.summary_since {
                    if since.elapsed() >= SUMMARY_DURATION {
                        self.exit = true;
                    }
                }
            }
            Mode::Paused => {}
        }
        Ok(())
    }

    fn begin_generation(&mut self) -> Result<()> {
        self.generation += 1;
        let genomes = std::mem::take(&mut self.pending);
        let run_rng = SmallRng::seed_from_u64(self.rng.r#gen());
        self.run = Some(GenerationRun::new(
            genomes,
            &self.evolver,
            self.cfg.score_target,
            run_rng,
        )?);
        self.floor = Floor::new();
        Ok(())
    }

    fn finish_generation(&mut self) -> Result<()> {
        let run = match self.run.take() {
            Some(run) => run,
            None => return Ok(()),
        };
        let score = run.score;
        let genomes = run.into_genomes();
        let best = genomes.iter().map(|g| g.fitness).fold(f32::MIN, f32::max);
        log::info!(
            "generation {}: score {}, best fitness {:.1}",
            self.generation,
            score,
            best
        );

        self.last_score = score;
        if score >= self.cfg.score_target {
            self.mode = Mode::Summary;
            self.summary_since = Some(Instant::now());
        } else if self.generation >= self.cfg.generation_cap {
            log::info!("generation cap {} reached", self.cfg.generation_cap);
            self.exit = true;
        } else {
            self.pending = self.evolver.evolve(genomes);
            self.begin_generation()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_session() -> Session {
        let cfg = Config { population_size: 4, seed: Some(9), ..Config::default() };
        Session::new(cfg)
    }

    #[test]
    fn menu_ticks_do_not_start_a_generation() {
        let sprites = Sprites::new();
        let mut session = small_session();
        for _ in 0..5 {
            session.tick(&sprites).unwrap();
        }
        assert_eq!(session.mode, Mode::Menu);
        assert!(session.run.is_none());
        assert_eq!(session.generation, 0);
    }

    #[test]
    fn start_enters_running_with_a_spawned_generation() {
        let mut session = small_session();
        session.start().unwrap();
        assert_eq!(session.mode, Mode::Running);
        assert_eq!(session.generation, 1);
        assert_eq!(session.run.as_ref().map(|r| r.alive()), Some(4));
    }

    #[test]
    fn pause_freezes_every_piece_of_simulation_state() {
        let sprites = Sprites::new();
        let mut session = small_session();
        session.start().unwrap();
        for _ in 0..3 {
            session.tick(&sprites).unwrap();
        }

        session.toggle_pause();
        assert_eq!(session.mode, Mode::Paused);

        let snapshot = |s: &Session| {
            let run = s.run.as_ref().unwrap();
            let birds: Vec<f32> = run.slots.iter().map(|slot| slot.bird.y).collect();
            let fitness: Vec<f32> = run.slots.iter().map(|slot| slot.genome.fitness).collect();
            let pipes: Vec<f32> = run.pipes.pipes.iter().map(|p| p.x).collect();
            (birds, fitness, pipes, run.score, s.floor.x1)
        };
        let frozen = snapshot(&session);
        for _ in 0..25 {
            session.tick(&sprites).unwrap();
        }
        assert_eq!(snapshot(&session), frozen);

        session.toggle_pause();
        assert_eq!(session.mode, Mode::Running);
        session.tick(&sprites).unwrap();
        assert_ne!(snapshot(&session).0, frozen.0, "resume continues from the frozen state");
    }

    #[test]
    fn pause_trigger_is_ignored_outside_running_and_paused() {
        let mut session = small_session();
        session.toggle_pause();
        assert_eq!(session.mode, Mode::Menu);
    }

    #[test]
    fn failed_generations_roll_into_the_next_until_the_cap() {
        // with the target unreachable every generation ends in extinction,
        // and the next one spawns until the cap trips
        let sprites = Sprites::new();
        let cfg = Config {
            population_size: 3,
            generation_cap: 2,
            score_target: u32::MAX, // extinction is the only way out
            seed: Some(13),
            ..Config::default()
        };
        let mut session = Session::new(cfg);
        session.start().unwrap();

        let mut guard = 0;
        while !session.should_exit() {
            session.tick(&sprites).unwrap();
            guard += 1;
            assert!(guard < 200_000, "run never terminated");
        }
        assert_eq!(session.generation, 2);
        assert_eq!(session.mode, Mode::Running, "cap exit happens without a summary");
    }
}

//! Generation evaluation.
//!
//! Each generation the search hands over `(id, policy)` candidates, every
//! candidate drives one scored episode from the start pose, and the resulting
//! fitness values go back to the search. Episodes are independent and run in
//! parallel against the shared [`World`].

use std::ops::ControlFlow;

use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;
use rayon::prelude::*;

use super::brain::Brain;
use super::episode::{EpisodeStatus, StopSignal, run_episode_until};
use super::params::WorldConfig;
use super::policy::Policy;
use super::world::World;

/// Identifier the search uses to match evaluations with its candidates.
pub type CandidateId = usize;

/// A policy waiting to be evaluated.
#[derive(Debug, Clone)]
pub struct Candidate<P> {
    /// Identifier assigned by the search.
    pub id: CandidateId,
    /// The policy driving the car.
    pub policy: P,
}

/// Result of one candidate's episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Candidate the result belongs to.
    pub id: CandidateId,
    /// Episode fitness.
    pub fitness: i64,
    /// How the episode ended.
    pub status: EpisodeStatus,
    /// Ticks survived.
    pub ticks: u64,
}

/// Fitness statistics of one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSummary {
    /// Zero-based generation index.
    pub generation: usize,
    /// Candidate with the best fitness (first one on ties).
    pub best_id: CandidateId,
    /// Best fitness.
    pub best: i64,
    /// Mean fitness.
    pub mean: f64,
    /// Worst fitness.
    pub worst: i64,
    /// Candidates that crossed the finish line.
    pub finished: usize,
}

impl GenerationSummary {
    /// Summarizes a generation; `None` when there were no evaluations.
    pub fn from_evaluations(generation: usize, evaluations: &[Evaluation]) -> Option<Self> {
        let best = evaluations
            .iter()
            .reduce(|best, e| if e.fitness > best.fitness { e } else { best })?;
        let worst = evaluations.iter().map(|e| e.fitness).min()?;
        let total: i64 = evaluations.iter().map(|e| e.fitness).sum();
        let finished = evaluations
            .iter()
            .filter(|e| e.status == EpisodeStatus::Finished)
            .count();

        Some(Self {
            generation,
            best_id: best.id,
            best: best.fitness,
            mean: total as f64 / evaluations.len() as f64,
            worst,
            finished,
        })
    }
}

/// The evolutionary search driving training.
///
/// Implementations own the candidate policies and everything about how the next
/// generation is derived from the last one.
pub trait Search {
    /// Policy type of the candidates.
    type Policy: Policy + Send;

    /// Candidates to evaluate in `generation`.
    fn candidates(&mut self, generation: usize) -> Vec<Candidate<Self::Policy>>;

    /// Receives the candidates back together with their evaluations, in the same order.
    fn assign(
        &mut self,
        generation: usize,
        candidates: Vec<Candidate<Self::Policy>>,
        evaluations: &[Evaluation],
    );
}

/// Runs one scored episode per candidate, in parallel, from a fresh car each.
///
/// Evaluations come back in candidate order. When `stop` fires, running episodes
/// are abandoned with the fitness they reached.
pub fn evaluate_generation<P, S>(
    world: &World,
    candidates: &mut [Candidate<P>],
    stop: &S,
) -> Vec<Evaluation>
where
    P: Policy + Send,
    S: StopSignal + Sync + ?Sized,
{
    candidates
        .par_iter_mut()
        .map(|candidate| {
            let outcome =
                run_episode_until(world, world.spawn_vehicle(), &mut candidate.policy, stop);
            Evaluation {
                id: candidate.id,
                fitness: outcome.fitness,
                status: outcome.status,
                ticks: outcome.ticks,
            }
        })
        .collect()
}

/// Evaluates one generation of `search` and reports the results back to it.
///
/// Returns `None` when the search produced no candidates.
pub fn run_generation<T, S>(
    world: &World,
    search: &mut T,
    generation: usize,
    stop: &S,
) -> Option<GenerationSummary>
where
    T: Search,
    S: StopSignal + Sync + ?Sized,
{
    let mut candidates = search.candidates(generation);
    let evaluations = evaluate_generation(world, &mut candidates, stop);
    let summary = GenerationSummary::from_evaluations(generation, &evaluations);
    search.assign(generation, candidates, &evaluations);

    if let Some(summary) = &summary {
        log::info!(
            "generation {}: best {} (candidate {}), mean {:.1}, worst {}, finished {}",
            summary.generation,
            summary.best,
            summary.best_id,
            summary.mean,
            summary.worst,
            summary.finished
        );
    }

    summary
}

/// Runs up to `generations` generations, stopping early when `stop` fires.
pub fn train<T, S>(
    world: &World,
    search: &mut T,
    generations: usize,
    stop: &S,
) -> Vec<GenerationSummary>
where
    T: Search,
    S: StopSignal + Sync + ?Sized,
{
    let mut summaries = Vec::with_capacity(generations);
    train_with(world, search, generations, stop, |_, summary| {
        summaries.push(*summary);
        ControlFlow::Continue(())
    });
    summaries
}

/// Like [`train`], handing each summary to `on_generation` along with the search.
///
/// `ControlFlow::Break` from the callback ends training after that generation.
/// Returns the number of generations completed.
pub fn train_with<T, S, F>(
    world: &World,
    search: &mut T,
    generations: usize,
    stop: &S,
    mut on_generation: F,
) -> usize
where
    T: Search,
    S: StopSignal + Sync + ?Sized,
    F: FnMut(&T, &GenerationSummary) -> ControlFlow<()>,
{
    for generation in 0..generations {
        if stop.stop_requested() {
            log::info!("training stopped before generation {}", generation);
            return generation;
        }
        let Some(summary) = run_generation(world, search, generation, stop) else {
            return generation;
        };
        if on_generation(search, &summary).is_break() {
            return generation + 1;
        }
    }

    generations
}

/// Best policy seen so far.
#[derive(Debug, Clone)]
pub struct Champion {
    /// The network.
    pub brain: Brain,
    /// Its fitness.
    pub fitness: i64,
    /// Generation it was found in.
    pub generation: usize,
}

/// Baseline search sampling fresh random networks every generation.
///
/// Keeps the best network seen so far and nothing else; there is no selection,
/// crossover or mutation.
pub struct RandomSearch {
    layer_sizes: Vec<usize>,
    population_size: usize,
    weight_scale: f32,
    rng: StdRng,
    next_id: CandidateId,
    champion: Option<Champion>,
}

impl RandomSearch {
    /// Creates a search from the training configuration.
    pub fn new(config: &WorldConfig) -> Self {
        let seed = config.training.seed.unwrap_or_else(rand::random);
        log::info!("random search seeded with {}", seed);

        Self {
            layer_sizes: config.layer_sizes(),
            population_size: config.training.population_size,
            weight_scale: config.training.weight_scale,
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
            champion: None,
        }
    }

    /// Best network seen so far.
    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }
}

impl Search for RandomSearch {
    type Policy = Brain;

    fn candidates(&mut self, _generation: usize) -> Vec<Candidate<Brain>> {
        (0..self.population_size)
            .map(|_| {
                let id = self.next_id;
                self.next_id += 1;
                Candidate {
                    id,
                    policy: Brain::new_using(&self.layer_sizes, self.weight_scale, &mut self.rng),
                }
            })
            .collect()
    }

    fn assign(
        &mut self,
        generation: usize,
        candidates: Vec<Candidate<Brain>>,
        evaluations: &[Evaluation],
    ) {
        let best = candidates
            .into_iter()
            .zip(evaluations)
            .reduce(|best, next| if next.1.fitness > best.1.fitness { next } else { best });

        if let Some((candidate, evaluation)) = best {
            let improved = self
                .champion
                .as_ref()
                .is_none_or(|champion| evaluation.fitness > champion.fitness);
            if improved {
                log::info!(
                    "new champion from generation {} with fitness {}",
                    generation,
                    evaluation.fitness
                );
                self.champion = Some(Champion {
                    brain: candidate.policy,
                    fitness: evaluation.fitness,
                    generation,
                });
            }
        }
    }
}

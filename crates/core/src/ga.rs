//! Genetic algorithm over gene orderings.
//!
//! The engine searches permutations of a fixed gene list (for box filling,
//! the list of boxes). Every generation runs the same three steps:
//!
//! 1. **Crossover**: every unordered pair of the current population produces
//!    two children with a two-locus order-preserving crossover.
//! 2. **Mutation**: each child position is swapped with its mirror position
//!    with probability `1 / threshold`.
//! 3. **Selection**: parents and children are ranked by fitness (higher is
//!    better, ties keep their previous order) and truncated back to the
//!    population size.
//!
//! The run always lasts exactly [`GaConfig::iterations`] generations; there
//! is no early stopping. Fitness evaluation is delegated to a [`GaProblem`].

use crate::error::{Error, Result};
use rand::prelude::*;
use std::cmp::Ordering;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the genetic algorithm.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GaConfig {
    /// Number of genotypes kept after each selection.
    pub population_size: usize,
    /// Number of generations to run.
    pub iterations: u32,
    /// Per-position mutation probability, in (0, 1].
    ///
    /// Sampled as a uniform draw from `1..=floor(1 / p)` hitting 1.
    pub mutation_probability: f64,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 7,
            iterations: 20,
            mutation_probability: 1.0 / 30.0,
        }
    }
}

impl GaConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the number of generations.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_probability(mut self, probability: f64) -> Self {
        self.mutation_probability = probability;
        self
    }

    /// Integer threshold used by mutation: `floor(1 / mutation_probability)`.
    pub fn mutation_threshold(&self) -> Result<u32> {
        let p = self.mutation_probability;
        if !p.is_finite() || p <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "mutation probability must be in (0, 1], got {}",
                p
            )));
        }
        let threshold = (1.0 / p).floor();
        if threshold < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "mutation probability {} gives a zero mutation threshold",
                p
            )));
        }
        Ok(threshold.min(u32::MAX as f64) as u32)
    }

    /// Checks that the configuration can drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::InvalidConfig(
                "population size must be at least 1".into(),
            ));
        }
        self.mutation_threshold()?;
        Ok(())
    }
}

/// Problem definition plugged into [`GaRunner`].
pub trait GaProblem {
    /// Gene type. Genes are compared by value; duplicates are allowed.
    type Gene: Clone + PartialEq;

    /// The gene list every genotype is a permutation of.
    fn genes(&self) -> &[Self::Gene];

    /// Scores an ordering (higher is better).
    fn evaluate(&self, genes: &[Self::Gene]) -> f64;

    /// Called after each generation's selection.
    fn on_generation(
        &self,
        _generation: u32,
        _best: &Genotype<Self::Gene>,
        _population: &[Genotype<Self::Gene>],
    ) {
    }
}

/// One candidate ordering with its cached fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Genotype<G> {
    genes: Vec<G>,
    fitness: Option<f64>,
}

impl<G: Clone + PartialEq> Genotype<G> {
    /// Creates an unevaluated genotype.
    pub fn new(genes: Vec<G>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    /// Creates a uniformly random permutation of `genes`.
    pub fn random<R: Rng>(genes: &[G], rng: &mut R) -> Self {
        let mut genes = genes.to_vec();
        genes.shuffle(rng);
        Self::new(genes)
    }

    /// The gene order.
    pub fn genes(&self) -> &[G] {
        &self.genes
    }

    /// Consumes the genotype, returning its genes.
    pub fn into_genes(self) -> Vec<G> {
        self.genes
    }

    /// Cached fitness, if evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Stores a fitness value.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns true if there are no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    fn rank_key(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Mirror mutation.
    ///
    /// Every position `i` independently draws from `1..=threshold`; on a 1 it
    /// swaps with `len - 1 - i`. A pair can be swapped twice when both of its
    /// positions trigger. Returns the number of swaps performed.
    pub fn mirror_mutate<R: Rng>(&mut self, threshold: u32, rng: &mut R) -> usize {
        let n = self.genes.len();
        let threshold = threshold.max(1);
        let mut swaps = 0;
        for i in 0..n {
            if rng.gen_range(1..=threshold) == 1 {
                self.genes.swap(i, n - 1 - i);
                swaps += 1;
            }
        }
        if swaps > 0 {
            self.fitness = None;
        }
        swaps
    }
}

/// Returns true if `a` and `b` hold the same genes with the same counts.
pub fn same_multiset<G: PartialEq>(a: &[G], b: &[G]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut unmatched: Vec<&G> = b.iter().collect();
    for gene in a {
        match unmatched.iter().position(|&g| g == gene) {
            Some(pos) => {
                unmatched.swap_remove(pos);
            }
            None => return false,
        }
    }
    true
}

/// Two-locus order-preserving crossover with random loci.
///
/// `locus1` is drawn from `0..len` and `locus2` from `locus1 + 1..=len`.
pub fn order_crossover<G: Clone + PartialEq, R: Rng>(
    a: &[G],
    b: &[G],
    rng: &mut R,
) -> (Vec<G>, Vec<G>) {
    let n = a.len();
    if n == 0 {
        return (Vec::new(), Vec::new());
    }
    let locus1 = rng.gen_range(0..n);
    let locus2 = rng.gen_range(locus1 + 1..=n);
    crossover_at(a, b, locus1, locus2)
}

/// Crossover with fixed loci; positions in `locus1..locus2` are taken from
/// the other parent.
pub fn crossover_at<G: Clone + PartialEq>(
    a: &[G],
    b: &[G],
    locus1: usize,
    locus2: usize,
) -> (Vec<G>, Vec<G>) {
    debug_assert_eq!(a.len(), b.len());
    (
        build_child(a, b, locus1, locus2),
        build_child(b, a, locus1, locus2),
    )
}

/// Builds the child based on `base`, preferring `other` inside the swapped
/// segment. A preferred gene that is no longer available is replaced by the
/// earliest unused gene of `base`.
fn build_child<G: Clone + PartialEq>(
    base: &[G],
    other: &[G],
    locus1: usize,
    locus2: usize,
) -> Vec<G> {
    let mut remaining = base.to_vec();
    let mut child = Vec::with_capacity(base.len());

    for i in 0..base.len() {
        let preferred = if (locus1..locus2).contains(&i) {
            &other[i]
        } else {
            &base[i]
        };
        let pos = remaining
            .iter()
            .position(|g| g == preferred)
            .unwrap_or(0);
        child.push(remaining.remove(pos));
    }

    child
}

/// Produces two children for every unordered pair `(i, j)`, `i < j`.
pub fn crossover_population<G: Clone + PartialEq, R: Rng>(
    population: &[Genotype<G>],
    rng: &mut R,
) -> Vec<Genotype<G>> {
    let n = population.len();
    let mut children = Vec::with_capacity(n * n.saturating_sub(1));
    for i in 0..n {
        for j in i + 1..n {
            let (c1, c2) = order_crossover(population[i].genes(), population[j].genes(), rng);
            children.push(Genotype::new(c1));
            children.push(Genotype::new(c2));
        }
    }
    children
}

/// Stable sort by descending fitness.
fn sort_by_fitness<G>(population: &mut [Genotype<G>]) {
    population.sort_by(|a, b| {
        let (fa, fb) = (
            a.fitness.unwrap_or(f64::NEG_INFINITY),
            b.fitness.unwrap_or(f64::NEG_INFINITY),
        );
        fb.partial_cmp(&fa).unwrap_or(Ordering::Equal)
    });
}

/// Keeps the `size` fittest genotypes of `pool`; equal fitness keeps pool order.
pub fn select<G>(mut pool: Vec<Genotype<G>>, size: usize) -> Vec<Genotype<G>> {
    sort_by_fitness(&mut pool);
    pool.truncate(size);
    pool
}

/// Progress information during GA execution.
#[derive(Debug, Clone)]
pub struct GaProgress {
    /// Generations completed.
    pub generation: u32,
    /// Generations configured.
    pub max_generations: u32,
    /// Best fitness in the current population.
    pub best_fitness: f64,
    /// Average fitness of the current population.
    pub avg_fitness: f64,
    /// Elapsed time since start.
    pub elapsed: Duration,
    /// Whether the algorithm is still running.
    pub running: bool,
}

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<G> {
    /// The fittest genotype of the final population (empty for an empty gene list).
    pub best: Genotype<G>,
    /// Generations run.
    pub generations: u32,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Best fitness of the initial population followed by one entry per generation.
    pub history: Vec<f64>,
    /// Total number of mutation swaps.
    pub mutations: usize,
}

/// Genetic algorithm runner.
pub struct GaRunner<P: GaProblem> {
    config: GaConfig,
    problem: P,
    mutation_threshold: u32,
}

impl<P: GaProblem> GaRunner<P> {
    /// Creates a runner, rejecting unusable configurations.
    pub fn new(config: GaConfig, problem: P) -> Result<Self> {
        config.validate()?;
        let mutation_threshold = config.mutation_threshold()?;
        Ok(Self {
            config,
            problem,
            mutation_threshold,
        })
    }

    /// The configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// The problem being optimized.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Runs the genetic algorithm.
    pub fn run(&self) -> GaResult<P::Gene> {
        self.run_with_rng(&mut thread_rng())
    }

    /// Runs the genetic algorithm with a progress callback.
    pub fn run_with_progress<F>(&self, progress_callback: F) -> GaResult<P::Gene>
    where
        F: Fn(GaProgress),
    {
        self.run_with_rng_and_progress(&mut thread_rng(), Some(progress_callback))
    }

    /// Runs the genetic algorithm with a specific RNG.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> GaResult<P::Gene> {
        self.run_with_rng_and_progress::<R, fn(GaProgress)>(rng, None)
    }

    /// Runs the genetic algorithm with a specific RNG and optional progress callback.
    pub fn run_with_rng_and_progress<R: Rng, F>(
        &self,
        rng: &mut R,
        progress_callback: Option<F>,
    ) -> GaResult<P::Gene>
    where
        F: Fn(GaProgress),
    {
        let start = Instant::now();
        let genes = self.problem.genes();

        if genes.is_empty() {
            log::debug!("GA: empty gene list, nothing to search");
            return GaResult {
                best: Genotype::new(Vec::new()),
                generations: 0,
                elapsed: start.elapsed(),
                history: Vec::new(),
                mutations: 0,
            };
        }

        let size = self.config.population_size;
        let mut population: Vec<Genotype<P::Gene>> =
            (0..size).map(|_| Genotype::random(genes, rng)).collect();
        self.evaluate_all(&mut population);
        sort_by_fitness(&mut population);

        let mut history = Vec::with_capacity(self.config.iterations as usize + 1);
        history.push(population[0].rank_key());
        let mut total_mutations = 0usize;

        for generation in 0..self.config.iterations {
            let mut children = crossover_population(&population, rng);

            let mutations: usize = children
                .iter_mut()
                .map(|child| child.mirror_mutate(self.mutation_threshold, rng))
                .sum();
            total_mutations += mutations;

            self.evaluate_all(&mut children);
            let child_count = children.len();
            population.extend(children);
            population = select(population, size);

            let best_fitness = population[0].rank_key();
            history.push(best_fitness);

            log::debug!(
                "GA Gen {}: best={:.6}, mutations={} among {} children",
                generation,
                best_fitness,
                mutations,
                child_count
            );

            self.problem
                .on_generation(generation, &population[0], &population);

            if let Some(ref callback) = progress_callback {
                callback(self.progress(generation + 1, &population, start, true));
            }
        }

        if let Some(ref callback) = progress_callback {
            callback(self.progress(self.config.iterations, &population, start, false));
        }

        GaResult {
            best: population.swap_remove(0),
            generations: self.config.iterations,
            elapsed: start.elapsed(),
            history,
            mutations: total_mutations,
        }
    }

    fn evaluate_all(&self, genotypes: &mut [Genotype<P::Gene>]) {
        for genotype in genotypes.iter_mut().filter(|g| g.fitness.is_none()) {
            let fitness = self.problem.evaluate(&genotype.genes);
            genotype.set_fitness(fitness);
        }
    }

    fn progress(
        &self,
        generation: u32,
        population: &[Genotype<P::Gene>],
        start: Instant,
        running: bool,
    ) -> GaProgress {
        let avg_fitness = population.iter().map(Genotype::rank_key).sum::<f64>()
            / population.len().max(1) as f64;
        GaProgress {
            generation,
            max_generations: self.config.iterations,
            best_fitness: population[0].rank_key(),
            avg_fitness,
            elapsed: start.elapsed(),
            running,
        }
    }
}

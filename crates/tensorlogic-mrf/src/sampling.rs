//! Gibbs sampling for Markov networks.
//!
//! A run validates its configuration, conditions the network on the
//! evidence, seeds a starting state, discards `burn_in` sweeps and then
//! records one sweep out of every `thinning + 1`.
//!
//! A sweep visits every variable once in network index order and redraws it
//! from its local conditional given the current values of all other
//! variables. Each redraw is written back immediately, so later variables in
//! the same sweep see it. Random numbers are consumed in exactly that order:
//! one `random_range` per variable when seeding, one uniform `f64` per
//! variable per sweep.

use indexmap::IndexMap;
use rayon::prelude::*;
use scirs2_core::ndarray::Array1;
use scirs2_core::random::{thread_rng, Rng, SeedableRng, StdRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{MrfError, Result};
use crate::factor::{Assignment, PotentialFactor};
use crate::network::MarkovNetwork;

const DEFAULT_BURN_IN: usize = 100;

/// Configuration of a Gibbs sampling run.
///
/// Built with the `with_*` methods and read-only afterwards. Deserializing
/// rejects negative `burn_in` or `thinning` with
/// [`MrfError::InvalidArgument`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGibbsSamplerConfig")]
pub struct GibbsSamplerConfig {
    evidence: Assignment,
    burn_in: usize,
    thinning: usize,
    initial_sample: Option<Assignment>,
    seed: Option<u64>,
}

impl Default for GibbsSamplerConfig {
    fn default() -> Self {
        Self {
            evidence: Assignment::new(),
            burn_in: DEFAULT_BURN_IN,
            thinning: 0,
            initial_sample: None,
            seed: None,
        }
    }
}

impl GibbsSamplerConfig {
    /// Configuration with no evidence, default burn-in and no thinning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the evidence.
    pub fn with_evidence(mut self, evidence: Assignment) -> Self {
        self.evidence = evidence;
        self
    }

    /// Add a single observed value to the evidence.
    pub fn with_observation(mut self, variable: &str, value: usize) -> Self {
        self.evidence.insert(variable.to_string(), value);
        self
    }

    /// Number of sweeps discarded before the first recorded sample.
    pub fn with_burn_in(mut self, burn_in: usize) -> Self {
        self.burn_in = burn_in;
        self
    }

    /// Number of sweeps discarded between recorded samples.
    pub fn with_thinning(mut self, thinning: usize) -> Self {
        self.thinning = thinning;
        self
    }

    /// Start the chain from `initial` instead of a uniform random state.
    pub fn with_initial_sample(mut self, initial: Assignment) -> Self {
        self.initial_sample = Some(initial);
        self
    }

    /// Seed used by [`GibbsSampler::run`].
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Observed values the chain is conditioned on.
    pub fn evidence(&self) -> &Assignment {
        &self.evidence
    }

    /// Sweeps discarded before the first recorded sample.
    pub fn burn_in(&self) -> usize {
        self.burn_in
    }

    /// Sweeps discarded between recorded samples.
    pub fn thinning(&self) -> usize {
        self.thinning
    }

    /// Starting state, if one was given.
    pub fn initial_sample(&self) -> Option<&Assignment> {
        self.initial_sample.as_ref()
    }

    /// Seed used by [`GibbsSampler::run`], if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

fn default_burn_in() -> i64 {
    DEFAULT_BURN_IN as i64
}

#[derive(Deserialize)]
struct RawGibbsSamplerConfig {
    #[serde(default)]
    evidence: Assignment,
    #[serde(default = "default_burn_in")]
    burn_in: i64,
    #[serde(default)]
    thinning: i64,
    #[serde(default)]
    initial_sample: Option<Assignment>,
    #[serde(default)]
    seed: Option<u64>,
}

fn non_negative(field: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        MrfError::InvalidArgument(format!("{} must be non-negative, got {}", field, value))
    })
}

impl TryFrom<RawGibbsSamplerConfig> for GibbsSamplerConfig {
    type Error = MrfError;

    fn try_from(raw: RawGibbsSamplerConfig) -> Result<Self> {
        Ok(Self {
            evidence: raw.evidence,
            burn_in: non_negative("burn_in", raw.burn_in)?,
            thinning: non_negative("thinning", raw.thinning)?,
            initial_sample: raw.initial_sample,
            seed: raw.seed,
        })
    }
}

/// Recorded samples: one column per variable, one row per kept sample.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleTable {
    columns: IndexMap<String, Vec<usize>>,
}

impl SampleTable {
    /// Empty table with the given columns.
    pub fn new<'a>(variables: impl IntoIterator<Item = &'a str>) -> Self {
        Self::with_capacity(variables, 0)
    }

    fn with_capacity<'a>(variables: impl IntoIterator<Item = &'a str>, rows: usize) -> Self {
        Self {
            columns: variables
                .into_iter()
                .map(|name| (name.to_string(), Vec::with_capacity(rows)))
                .collect(),
        }
    }

    /// Append a value to a column.
    pub fn push(&mut self, variable: &str, value: usize) -> Result<()> {
        self.columns
            .get_mut(variable)
            .ok_or_else(|| MrfError::UnknownVariable(variable.to_string()))?
            .push(value);
        Ok(())
    }

    /// Number of complete rows. A table without columns has none.
    pub fn num_rows(&self) -> usize {
        self.columns.values().map(Vec::len).min().unwrap_or(0)
    }

    /// Number of recorded variables.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether no complete row has been recorded.
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Column names in network index order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Values drawn for `variable`, in draw order.
    pub fn column(&self, variable: &str) -> Option<&[usize]> {
        self.columns.get(variable).map(Vec::as_slice)
    }

    /// The `index`-th recorded sample.
    pub fn row(&self, index: usize) -> Option<Assignment> {
        if index >= self.num_rows() {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|(name, values)| (name.clone(), values[index]))
                .collect(),
        )
    }

    /// All recorded samples in draw order.
    pub fn rows(&self) -> impl Iterator<Item = Assignment> + '_ {
        (0..self.num_rows()).filter_map(move |index| self.row(index))
    }

    /// Empirical distribution of one variable.
    pub fn empirical_marginal(&self, variable: &str, cardinality: usize) -> Result<Array1<f64>> {
        let values = self
            .column(variable)
            .ok_or_else(|| MrfError::UnknownVariable(variable.to_string()))?;
        let rows = self.num_rows();
        if rows == 0 {
            return Err(MrfError::InvalidArgument(
                "no samples recorded".to_string(),
            ));
        }

        let mut counts = Array1::<f64>::zeros(cardinality);
        for &value in &values[..rows] {
            if value >= cardinality {
                return Err(MrfError::ValueOutOfRange {
                    variable: variable.to_string(),
                    value,
                    cardinality,
                });
            }
            counts[value] += 1.0;
        }

        Ok(counts / rows as f64)
    }

    /// Empirical joint distribution over a subset of columns, keyed by the
    /// values of `variables` in the given order.
    pub fn frequencies(&self, variables: &[&str]) -> Result<HashMap<Vec<usize>, f64>> {
        let columns = variables
            .iter()
            .map(|name| {
                self.column(name)
                    .ok_or_else(|| MrfError::UnknownVariable(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = self.num_rows();
        let mut counts: HashMap<Vec<usize>, usize> = HashMap::new();
        for row in 0..rows {
            let key = columns.iter().map(|column| column[row]).collect();
            *counts.entry(key).or_insert(0) += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(key, count)| (key, count as f64 / rows as f64))
            .collect())
    }
}

/// Gibbs sampler bound to a configuration.
#[derive(Clone, Debug, Default)]
pub struct GibbsSampler {
    config: GibbsSamplerConfig,
}

impl GibbsSampler {
    /// Create a sampler with the given configuration.
    pub fn new(config: GibbsSamplerConfig) -> Self {
        Self { config }
    }

    /// Configuration used for every run.
    pub fn config(&self) -> &GibbsSamplerConfig {
        &self.config
    }

    /// Run one chain. The RNG is seeded from the configuration when a seed
    /// is set and from the thread RNG otherwise.
    pub fn run<F: PotentialFactor>(
        &self,
        network: &MarkovNetwork<F>,
        nsamples: usize,
    ) -> Result<SampleTable> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut thread_rng()),
        };
        gibbs_sample(network, nsamples, &self.config, &mut rng)
    }

    /// Run one independent chain per seed in parallel.
    ///
    /// Validation and evidence reduction happen once; chains share the
    /// reduced network and own their state. Tables come back in seed order.
    pub fn run_chains<F>(
        &self,
        network: &MarkovNetwork<F>,
        nsamples: usize,
        seeds: &[u64],
    ) -> Result<Vec<SampleTable>>
    where
        F: PotentialFactor + Send + Sync,
    {
        let reduced = prepare(network, nsamples, &self.config)?;
        log::debug!(
            "running {} Gibbs chains over {} variables",
            seeds.len(),
            reduced.num_variables()
        );

        seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                run_chain(&reduced, nsamples, &self.config, &mut rng)
            })
            .collect()
    }
}

/// Draw `nsamples` samples from `network` conditioned on the configured
/// evidence.
///
/// Evidence variables do not appear in the output; every other variable has
/// one column with exactly `nsamples` rows. When the evidence covers every
/// variable nothing is left to sample and the table has no columns, so
/// [`SampleTable::num_rows`] is zero.
pub fn gibbs_sample<F, R>(
    network: &MarkovNetwork<F>,
    nsamples: usize,
    config: &GibbsSamplerConfig,
    rng: &mut R,
) -> Result<SampleTable>
where
    F: PotentialFactor,
    R: Rng,
{
    let reduced = prepare(network, nsamples, config)?;
    run_chain(&reduced, nsamples, config, rng)
}

/// Validate the run parameters and reduce the network on the evidence.
fn prepare<F: PotentialFactor>(
    network: &MarkovNetwork<F>,
    nsamples: usize,
    config: &GibbsSamplerConfig,
) -> Result<MarkovNetwork<F>> {
    if nsamples < 1 {
        return Err(MrfError::InvalidArgument(format!(
            "nsamples must be at least 1, got {}",
            nsamples
        )));
    }
    if let Some(initial) = config.initial_sample() {
        validate_initial_sample(network, initial, config.evidence())?;
    }
    network.reduce(config.evidence())
}

/// Missing variables are reported first, then disagreements with the
/// evidence, then values outside a domain.
fn validate_initial_sample<F: PotentialFactor>(
    network: &MarkovNetwork<F>,
    initial: &Assignment,
    evidence: &Assignment,
) -> Result<()> {
    if let Some(name) = network.variable_names().find(|name| !initial.contains_key(*name)) {
        return Err(MrfError::MissingVariable(name.to_string()));
    }

    let mut observed: Vec<(&String, &usize)> = evidence.iter().collect();
    observed.sort();
    for (name, &expected) in observed {
        if let Some(&initial_value) = initial.get(name) {
            if initial_value != expected {
                return Err(MrfError::InconsistentAssignment {
                    variable: name.clone(),
                    evidence: expected,
                    initial: initial_value,
                });
            }
        }
    }

    for name in network.variable_names() {
        let value = initial[name];
        let cardinality = network.cardinality(name)?;
        if value >= cardinality {
            return Err(MrfError::ValueOutOfRange {
                variable: name.to_string(),
                value,
                cardinality,
            });
        }
    }

    Ok(())
}

fn run_chain<F, R>(
    reduced: &MarkovNetwork<F>,
    nsamples: usize,
    config: &GibbsSamplerConfig,
    rng: &mut R,
) -> Result<SampleTable>
where
    F: PotentialFactor,
    R: Rng,
{
    let mut current = match config.initial_sample() {
        Some(initial) => reduced
            .variable_names()
            .map(|name| {
                initial
                    .get(name)
                    .map(|&value| (name.to_string(), value))
                    .ok_or_else(|| MrfError::MissingVariable(name.to_string()))
            })
            .collect::<Result<Assignment>>()?,
        None => random_assignment(reduced, rng)?,
    };

    log::debug!(
        "Gibbs run: {} variables, burn_in={}, thinning={}, nsamples={}",
        reduced.num_variables(),
        config.burn_in(),
        config.thinning(),
        nsamples
    );

    for _ in 0..config.burn_in() {
        sweep(reduced, &mut current, rng, None)?;
    }

    let mut table = SampleTable::with_capacity(reduced.variable_names(), nsamples);
    for _ in 0..nsamples {
        for _ in 0..config.thinning() {
            sweep(reduced, &mut current, rng, None)?;
        }
        sweep(reduced, &mut current, rng, Some(&mut table))?;
    }

    log::debug!("Gibbs run finished: {} samples", table.num_rows());
    Ok(table)
}

/// Draw every variable uniformly from its domain, in index order.
///
/// The result need not have positive probability under the model.
pub fn random_assignment<F, R>(network: &MarkovNetwork<F>, rng: &mut R) -> Result<Assignment>
where
    F: PotentialFactor,
    R: Rng,
{
    network
        .variable_names()
        .map(|name| {
            let cardinality = network.cardinality(name)?;
            if cardinality == 0 {
                return Err(MrfError::DegenerateDistribution(name.to_string()));
            }
            Ok((name.to_string(), rng.random_range(0..cardinality)))
        })
        .collect()
}

/// One full single-site update pass over `network`.
///
/// `assignment` must hold a value for every network variable. When `table`
/// is given, each drawn value is appended to its variable's column.
pub fn sweep<F, R>(
    network: &MarkovNetwork<F>,
    assignment: &mut Assignment,
    rng: &mut R,
    mut table: Option<&mut SampleTable>,
) -> Result<()>
where
    F: PotentialFactor,
    R: Rng,
{
    log::trace!("sweep over {} variables", network.num_variables());
    for name in network.variable_names() {
        let value = resample_variable(network, name, assignment, rng)?;
        if let Some(table) = table.as_deref_mut() {
            table.push(name, value)?;
        }
    }
    Ok(())
}

fn resample_variable<F, R>(
    network: &MarkovNetwork<F>,
    name: &str,
    assignment: &mut Assignment,
    rng: &mut R,
) -> Result<usize>
where
    F: PotentialFactor,
    R: Rng,
{
    // With `name` removed the assignment is exactly the conditioning set.
    let previous = assignment.remove(name);
    let drawn = local_weights(network, name, assignment)
        .and_then(|weights| draw_categorical(name, &weights, rng));

    match drawn {
        Ok(value) => {
            assignment.insert(name.to_string(), value);
            Ok(value)
        }
        Err(err) => {
            if let Some(previous) = previous {
                assignment.insert(name.to_string(), previous);
            }
            Err(err)
        }
    }
}

/// Unnormalized conditional of `name`: the product of every factor that
/// mentions it, conditioned on `others`.
fn local_weights<F: PotentialFactor>(
    network: &MarkovNetwork<F>,
    name: &str,
    others: &Assignment,
) -> Result<Vec<f64>> {
    let cardinality = network.cardinality(name)?;
    let mut combined: Option<F> = None;

    for &index in network.factor_indices(name)? {
        let factor = network.factor(index).ok_or_else(|| {
            MrfError::InvalidArgument(format!("factor index {} out of range", index))
        })?;
        let conditioned = factor.condition(others)?;
        combined = Some(match combined {
            Some(acc) => acc.combine(&conditioned)?,
            None => conditioned,
        });
    }

    let combined = combined.ok_or_else(|| MrfError::DegenerateDistribution(name.to_string()))?;
    if let Some(unassigned) = combined.scope().iter().find(|var| var.as_str() != name) {
        return Err(MrfError::MissingVariable(unassigned.clone()));
    }

    let table = combined.table();
    if table.len() != cardinality {
        return Err(MrfError::DimensionMismatch {
            expected: vec![cardinality],
            got: table.shape().to_vec(),
        });
    }
    Ok(table.iter().copied().collect())
}

/// Draw an index with probability proportional to `weights`.
fn draw_categorical<R: Rng>(name: &str, weights: &[f64], rng: &mut R) -> Result<usize> {
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(MrfError::DegenerateDistribution(name.to_string()));
    }

    let u: f64 = rng.random();
    let mut cumulative = 0.0;
    for (idx, &weight) in weights.iter().enumerate() {
        cumulative += weight / total;
        if u < cumulative {
            return Ok(idx);
        }
    }

    // Rounding can leave `cumulative` just below `u`.
    Ok(weights
        .iter()
        .rposition(|&weight| weight > 0.0)
        .unwrap_or(weights.len() - 1))
}

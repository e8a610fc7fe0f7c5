//! Markov random fields over discrete variables.
//!
//! This crate represents an undirected probabilistic graphical model as a
//! set of factors plus the graph they induce, and answers queries on it:
//!
//! - **Structure**: neighbors, Markov blanket and edge tests
//! - **Independence**: conditional independence by graph separation
//! - **Evidence**: exact conditioning of every factor on observed values
//! - **Sampling**: single-site Gibbs sampling with burn-in and thinning
//!
//! # Architecture
//!
//! ```text
//! Factors → MarkovNetwork → reduce(evidence) → MarkovNetwork → Gibbs sweeps → SampleTable
//!                ↓
//!         is_independent
//! ```
//!
//! # Example
//!
//! ```
//! use scirs2_core::random::{SeedableRng, StdRng};
//! use tensorlogic_mrf::{gibbs_sample, DenseFactor, GibbsSamplerConfig, MarkovNetwork};
//!
//! let ab = DenseFactor::from_shape_vec("ab", &["a", "b"], &[2, 2], vec![1.0; 4]).unwrap();
//! let bc = DenseFactor::from_shape_vec("bc", &["b", "c"], &[2, 2], vec![1.0; 4]).unwrap();
//! let network = MarkovNetwork::new(vec![ab, bc]).unwrap();
//!
//! assert!(network.is_independent(&["a"], &["c"], &["b"]).unwrap());
//!
//! let config = GibbsSamplerConfig::new().with_observation("b", 1).with_burn_in(10);
//! let mut rng = StdRng::seed_from_u64(0);
//! let samples = gibbs_sample(&network, 25, &config, &mut rng).unwrap();
//! assert_eq!(samples.num_rows(), 25);
//! assert!(samples.column("b").is_none());
//! ```

mod error;
mod evidence;
mod factor;
mod graph;
mod independence;
mod network;
mod sampling;

pub use error::{MrfError, Result};
pub use factor::{Assignment, DenseFactor, PotentialFactor};
pub use graph::UndirectedGraph;
pub use network::{MarkovNetwork, MarkovNetworkBuilder};
pub use sampling::{
    gibbs_sample, random_assignment, sweep, GibbsSampler, GibbsSamplerConfig, SampleTable,
};

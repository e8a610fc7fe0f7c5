//! Evidence reduction.

use std::sync::Arc;

use crate::error::Result;
use crate::factor::{Assignment, PotentialFactor};
use crate::network::MarkovNetwork;

impl<F: PotentialFactor> MarkovNetwork<F> {
    /// Condition every factor on `evidence` and rebuild the network.
    ///
    /// Evidence keys outside a factor's scope are ignored for that factor,
    /// and keys that appear in no scope at all are ignored entirely. Factors
    /// untouched by the evidence are shared with `self`, not copied.
    pub fn reduce(&self, evidence: &Assignment) -> Result<MarkovNetwork<F>> {
        let mut reduced = Vec::with_capacity(self.num_factors());

        for factor in self.factors() {
            let local: Assignment = factor
                .scope()
                .iter()
                .filter_map(|var| evidence.get(var).map(|&value| (var.clone(), value)))
                .collect();

            if local.is_empty() {
                reduced.push(Arc::clone(factor));
            } else {
                reduced.push(Arc::new(factor.condition(&local)?));
            }
        }

        let network = MarkovNetwork::from_shared(reduced)?;
        log::debug!(
            "reduced network on {} evidence entries: {} -> {} variables",
            evidence.len(),
            self.num_variables(),
            network.num_variables()
        );
        Ok(network)
    }
}

//! Integration tests for tensorlogic-mrf

use approx::assert_abs_diff_eq;
use scirs2_core::ndarray::{Array, ArrayD, IxDyn};
use scirs2_core::random::{SeedableRng, StdRng};
use tensorlogic_mrf::*;

fn factor(name: &str, vars: &[&str], shape: &[usize], values: Vec<f64>) -> DenseFactor {
    DenseFactor::from_shape_vec(name, vars, shape, values).unwrap()
}

/// A - B - C with pairwise factors
fn chain() -> MarkovNetwork {
    MarkovNetwork::new(vec![
        factor("prior_a", &["A"], &[2], vec![1.0, 2.0]),
        factor("ab", &["A", "B"], &[2, 2], vec![3.0, 1.0, 1.0, 3.0]),
        factor("bc", &["B", "C"], &[2, 2], vec![2.0, 1.0, 1.0, 2.0]),
    ])
    .unwrap()
}

#[test]
fn test_two_variable_uniform_scenario() {
    let network = MarkovNetwork::new(vec![DenseFactor::ones(
        "ab".to_string(),
        vec!["A".to_string(), "B".to_string()],
        2,
    )])
    .unwrap();

    // The single factor puts A and B on one edge.
    assert!(!network.is_independent(&["A"], &["B"], &[]).unwrap());
    assert!(network.has_edge("A", "B"));

    let config = GibbsSamplerConfig::new().with_burn_in(50).with_thinning(0);
    let mut rng = StdRng::seed_from_u64(2024);
    let small = gibbs_sample(&network, 100, &config, &mut rng).unwrap();
    assert_eq!(small.num_rows(), 100);

    let mut rng = StdRng::seed_from_u64(2025);
    let samples = gibbs_sample(&network, 4000, &config, &mut rng).unwrap();
    let joint = samples.frequencies(&["A", "B"]).unwrap();
    assert_eq!(joint.len(), 4);
    for a in 0..2 {
        for b in 0..2 {
            assert_abs_diff_eq!(joint[&vec![a, b]], 0.25, epsilon = 0.04);
        }
    }
}

#[test]
fn test_chain_scenario() {
    let network = chain();

    assert!(network.is_independent(&["A"], &["C"], &["B"]).unwrap());
    assert!(network.is_independent(&["C"], &["A"], &["B"]).unwrap());
    assert!(!network.is_independent(&["A"], &["C"], &[]).unwrap());

    assert_eq!(network.markov_blanket("B").unwrap(), vec!["A", "C"]);
    assert_eq!(network.neighbors("A").unwrap(), vec!["B"]);
    assert!(!network.has_edge("A", "C"));
}

#[test]
fn test_structural_queries_after_reduction() {
    let reduced = chain().reduce(&[("B".to_string(), 0)].into()).unwrap();

    assert_eq!(reduced.variable_names().collect::<Vec<_>>(), vec!["A", "C"]);
    assert!(reduced.neighbors("A").unwrap().is_empty());
    assert!(reduced.is_independent(&["A"], &["C"], &[]).unwrap());
    assert!(matches!(
        reduced.neighbors("B"),
        Err(MrfError::UnknownVariable(_))
    ));
}

#[test]
fn test_gibbs_matches_exact_conditional() {
    let network = chain();
    let evidence: Assignment = [("C".to_string(), 1)].into();

    // Exact P(A | C = 1)
    let mut exact = network
        .joint_distribution()
        .unwrap()
        .condition(&evidence)
        .unwrap()
        .marginalize_out("B")
        .unwrap();
    exact.normalize();

    let config = GibbsSamplerConfig::new()
        .with_evidence(evidence)
        .with_burn_in(200)
        .with_thinning(1);
    let mut rng = StdRng::seed_from_u64(99);
    let samples = gibbs_sample(&network, 20_000, &config, &mut rng).unwrap();

    assert!(samples.column("C").is_none());
    let estimate = samples.empirical_marginal("A", 2).unwrap();
    assert_abs_diff_eq!(estimate[0], exact.values()[[0]], epsilon = 0.03);
    assert_abs_diff_eq!(estimate[1], exact.values()[[1]], epsilon = 0.03);
}

#[test]
fn test_evidence_never_contradicted() {
    let network = chain();
    let config = GibbsSamplerConfig::new()
        .with_observation("A", 1)
        .with_burn_in(10);
    let mut rng = StdRng::seed_from_u64(5);
    let samples = gibbs_sample(&network, 200, &config, &mut rng).unwrap();

    assert_eq!(samples.variables().collect::<Vec<_>>(), vec!["B", "C"]);
    for mut row in samples.rows() {
        row.insert("A".to_string(), 1);
        for f in network.factors() {
            assert!(f.value(&row).unwrap() > 0.0);
        }
    }
}

#[test]
fn test_initial_sample_with_evidence() {
    let network = chain();
    let initial: Assignment = [
        ("A".to_string(), 0),
        ("B".to_string(), 1),
        ("C".to_string(), 1),
    ]
    .into();

    let config = GibbsSamplerConfig::new()
        .with_observation("C", 1)
        .with_initial_sample(initial.clone())
        .with_burn_in(0);
    let mut rng = StdRng::seed_from_u64(1);
    let samples = gibbs_sample(&network, 3, &config, &mut rng).unwrap();
    assert_eq!(samples.num_columns(), 2);

    let conflicting = GibbsSamplerConfig::new()
        .with_observation("C", 0)
        .with_initial_sample(initial);
    assert!(matches!(
        gibbs_sample(&network, 3, &conflicting, &mut rng),
        Err(MrfError::InconsistentAssignment { .. })
    ));
}

#[test]
fn test_parallel_chains_match_sequential_runs() {
    let network = chain();
    let config = GibbsSamplerConfig::new().with_burn_in(20).with_thinning(2);
    let sampler = GibbsSampler::new(config.clone());

    let seeds = [1, 2, 3, 4];
    let chains = sampler.run_chains(&network, 30, &seeds).unwrap();
    assert_eq!(chains.len(), seeds.len());

    for (&seed, table) in seeds.iter().zip(&chains) {
        let mut rng = StdRng::seed_from_u64(seed);
        let sequential = gibbs_sample(&network, 30, &config, &mut rng).unwrap();
        assert_eq!(&sequential, table);
    }

    assert!(matches!(
        sampler.run_chains(&network, 0, &seeds),
        Err(MrfError::InvalidArgument(_))
    ));
}

#[test]
fn test_manual_sweeps() {
    let network = chain();
    let mut rng = StdRng::seed_from_u64(8);
    let mut state = random_assignment(&network, &mut rng).unwrap();
    let mut table = SampleTable::new(network.variable_names());

    for _ in 0..5 {
        sweep(&network, &mut state, &mut rng, Some(&mut table)).unwrap();
    }
    assert_eq!(table.num_rows(), 5);
    assert_eq!(table.row(4).unwrap(), state);
}

#[test]
fn test_builder_network_sampling() {
    let mut builder = MarkovNetworkBuilder::new();
    builder
        .add_unary_potential("x", Array::from_vec(vec![1.0, 1.0, 1.0]).into_dyn())
        .unwrap()
        .add_pairwise_potential("x", "y", ArrayD::ones(IxDyn(&[3, 2])))
        .unwrap();
    let network = builder.build().unwrap();

    let sampler = GibbsSampler::new(GibbsSamplerConfig::new().with_seed(17).with_burn_in(5));
    let samples = sampler.run(&network, 40).unwrap();

    assert!(samples.column("x").unwrap().iter().all(|&v| v < 3));
    assert!(samples.column("y").unwrap().iter().all(|&v| v < 2));
}

#[test]
fn test_sample_table_serialization() {
    let mut table = SampleTable::new(["x"]);
    table.push("x", 1).unwrap();

    let json = serde_json::to_string(&table).unwrap();
    let restored: SampleTable = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, table);
}

use neuronet::network;
use neuronet::{Activator, Error, Logging, Network, Sample, Samples, State, Trainer};

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::NamedTempFile;

fn xor_samples() -> Samples {
    vec![
        Sample::new(vec![0.0, 0.0], vec![0.0]),
        Sample::new(vec![1.0, 0.0], vec![1.0]),
        Sample::new(vec![0.0, 1.0], vec![1.0]),
        Sample::new(vec![1.0, 1.0], vec![0.0]),
    ]
    .into()
}

#[test]
fn trained_network_survives_save_and_load() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut net = Network::multilayer(&[2, 3, 1]).unwrap();
    net.set_activator(Activator::Sigmoid);
    net.init_random(&mut rng);
    Trainer::new(&mut net)
        .epochs(200)
        .logging(Logging::Silent)
        .train(&mut xor_samples(), &mut rng)
        .unwrap();

    let file = NamedTempFile::new().unwrap();
    net.export().save(file.path()).unwrap();
    let mut loaded = network::load(file.path()).unwrap();

    assert_eq!(loaded.export(), net.export());
    for _ in 0..10 {
        let input = [rng.gen::<f64>(), rng.gen::<f64>()];
        let expected = net.solve(&input).unwrap().to_vec();
        assert_eq!(loaded.solve(&input).unwrap(), &expected[..]);
    }
}

#[test]
fn perceptron_survives_save_and_load() {
    let mut net = Network::perceptron(2).unwrap();
    net.init_const(0.5);
    let mut samples: Samples = vec![
        Sample::new(vec![0.0, 0.0], vec![0.0]),
        Sample::new(vec![1.0, 0.0], vec![0.0]),
        Sample::new(vec![0.0, 1.0], vec![0.0]),
        Sample::new(vec![1.0, 1.0], vec![1.0]),
    ]
    .into();
    let result = net
        .train(&mut samples, 100, 0.0, &mut StdRng::seed_from_u64(8))
        .unwrap();
    assert!(result.converged);

    let file = NamedTempFile::new().unwrap();
    net.export().save(file.path()).unwrap();
    let mut loaded = network::load(file.path()).unwrap();
    for sample in samples.iter() {
        let output = loaded.solve(&sample.input).unwrap();
        assert_abs_diff_eq!(output[0], sample.target[0]);
    }
}

#[test]
fn load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = network::load(dir.path().join("missing.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn load_garbage() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"not json").unwrap();
    assert!(matches!(State::load(file.path()), Err(Error::Json(_))));
    assert!(matches!(network::import(b"[]"), Err(Error::Json(_))));
}

use formica_lib::app::Simulation;
use formica_lib::model::config::SimConfig;
use formica_lib::model::Vec2;

fn config(seed: u64) -> SimConfig {
    let mut config = SimConfig::default();
    config.world.seed = Some(seed);
    config.world.width = 120.0;
    config.world.height = 120.0;
    config.world.subdivisions = 12;
    config.scenario.piles = 12;
    config.scenario.pile_distance = 20.0;
    config
}

fn snapshot(sim: &Simulation) -> Vec<(String, Vec2, f64)> {
    sim.world()
        .iter()
        .map(|(_, e)| (e.name.clone(), e.transform.position, e.transform.rotation()))
        .collect()
}

#[test]
fn test_same_seed_same_trajectory() {
    let mut a = Simulation::from_config(&config(12345)).unwrap();
    let mut b = Simulation::from_config(&config(12345)).unwrap();
    let ra = a.run(150).unwrap();
    let rb = b.run(150).unwrap();

    assert_eq!(snapshot(&a), snapshot(&b), "Entity states should match");
    assert_eq!(ra.ticks, rb.ticks);
    assert_eq!(ra.population, rb.population);
    assert_eq!(ra.stockpile, rb.stockpile);
    assert_eq!(ra.pheromones, rb.pheromones);
    assert_eq!(ra.fingerprint, rb.fingerprint);
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = Simulation::from_config(&config(1)).unwrap();
    let mut b = Simulation::from_config(&config(2)).unwrap();
    a.run(20).unwrap();
    b.run(20).unwrap();
    assert_ne!(snapshot(&a), snapshot(&b));
}

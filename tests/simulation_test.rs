use formica_lib::app::Simulation;
use formica_lib::model::config::SimConfig;

const SMALL: &str = r#"
[world]
width = 60.0
height = 60.0
subdivisions = 6
seed = 77

[colony]
initial_stockpile = 50
spawn_cost = 10
initial_members = 5

[scenario]
piles = 6
pile_distance = 12.0
obstacles = 2
"#;

#[test]
fn test_toml_scenario_runs_to_completion() {
    let config = SimConfig::from_toml(SMALL).unwrap();
    assert_eq!(config.world.seed, Some(77));
    // Unspecified sections keep their defaults.
    assert_eq!(config.agent, SimConfig::default().agent);

    let mut sim = Simulation::from_config(&config).unwrap().with_report_every(0);
    let report = sim.run(200).unwrap();
    assert_eq!(report.seed, 77);
    assert!(report.spawned >= 5);
    assert!(report.ticks <= 200);
    assert!(chrono::DateTime::parse_from_rfc3339(&report.started_at).is_ok());

    let json = serde_json::to_string(&report).unwrap();
    let back: formica_lib::app::RunReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}

#[test]
fn test_invalid_config_is_rejected() {
    let err = SimConfig::from_toml("[world]\nwidth = -1.0\n").unwrap_err();
    assert!(err.to_string().contains("width"));
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let config = SimConfig::load("does/not/exist.toml").unwrap();
    assert_eq!(config, SimConfig::default());
}

use serde::{Deserialize, Serialize};

/// Summary of a finished (or interrupted) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// RFC 3339 timestamp of the run start.
    pub started_at: String,
    pub fingerprint: String,
    pub seed: u64,
    pub ticks: u64,
    /// Agents alive at the end of the run.
    pub population: usize,
    /// Members ever spawned by the nest.
    pub spawned: usize,
    pub deaths: u64,
    pub stockpile: u64,
    pub piles_remaining: usize,
    pub pheromones: usize,
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Whether the colony died out.
    #[must_use]
    pub fn is_extinct(&self) -> bool {
        self.population == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_field_names() {
        let report = RunReport {
            started_at: "2026-01-01T00:00:00+00:00".into(),
            fingerprint: "abc".into(),
            seed: 3,
            ticks: 10,
            population: 0,
            spawned: 4,
            deaths: 4,
            stockpile: 0,
            piles_remaining: 2,
            pheromones: 7,
            elapsed_ms: 1,
        };
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["piles_remaining"], 2);
        assert_eq!(json["deaths"], 4);
        assert!(report.is_extinct());
    }
}

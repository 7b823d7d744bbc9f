// src/provenance/mod.rs

//! Hash-linked log of benchmark runs: which configuration went in and which
//! solution came out, so a comparison table can be traced back to its inputs.

use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use sha2::{Sha256, Digest};

use crate::harness::BenchmarkRecord;
use crate::{SolverConfig, SolverError, SolverResult};

/// Represents a single solver run in the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub timestamp: DateTime<Utc>,
    pub algorithm: String,
    pub config_hash: String,
    pub solution_hash: String,
    pub software_version: String,
    pub previous_record_hash: Option<String>,
    pub metadata: serde_json::Value,
}

impl ProvenanceRecord {
    /// Hash of the serialized record, used as the link to its successor.
    pub fn calculate_record_hash(&self) -> Result<String, SolverError> {
        let serialized = serde_json::to_string(self).map_err(|e| SolverError::ProvenanceFailed(e.to_string()))?;
        Ok(calculate_hash(serialized.as_bytes()))
    }
}

/// Calculates the SHA256 hash of a byte slice.
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Hashes the solution grid by its raw little-endian node values.
fn solution_hash(result: &SolverResult) -> String {
    let mut hasher = Sha256::new();
    for v in result.solution.iter() {
        hasher.update(v.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Manages the chain of ProvenanceRecords.
#[derive(Debug, Default)]
pub struct ProvenanceChain {
    records: Vec<ProvenanceRecord>,
}

impl ProvenanceChain {
    pub fn new() -> Self {
        ProvenanceChain { records: Vec::new() }
    }

    /// Appends one benchmarked solve, linked to the previous record.
    pub fn record_run(
        &mut self,
        config: &SolverConfig,
        run: &BenchmarkRecord,
        result: &SolverResult,
    ) -> Result<(), SolverError> {
        let config_json = serde_json::to_string(config).map_err(|e| SolverError::ProvenanceFailed(e.to_string()))?;
        let previous_record_hash = match self.records.last() {
            Some(r) => Some(r.calculate_record_hash()?),
            None => None,
        };
        self.records.push(ProvenanceRecord {
            timestamp: Utc::now(),
            algorithm: run.algorithm.clone(),
            config_hash: calculate_hash(config_json.as_bytes()),
            solution_hash: solution_hash(result),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            previous_record_hash,
            metadata: serde_json::json!({
                "iterations": run.iterations,
                "converged": run.converged,
                "time_secs": run.time_secs,
            }),
        });
        Ok(())
    }

    pub fn records(&self) -> &[ProvenanceRecord] {
        &self.records
    }

    /// Checks that every record points at the hash of its predecessor.
    pub fn verify(&self) -> Result<bool, SolverError> {
        if let Some(first) = self.records.first() {
            if first.previous_record_hash.is_some() {
                return Ok(false);
            }
        }
        for pair in self.records.windows(2) {
            let expected = pair[0].calculate_record_hash()?;
            if pair[1].previous_record_hash.as_deref() != Some(expected.as_str()) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn to_json(&self) -> Result<String, SolverError> {
        serde_json::to_string_pretty(&self.records)
            .map_err(|e| SolverError::ProvenanceFailed(format!("Failed to serialize provenance chain: {}", e)))
    }

    pub fn from_json(json_str: &str) -> Result<Self, SolverError> {
        let records = serde_json::from_str(json_str)
            .map_err(|e| SolverError::ProvenanceFailed(format!("Failed to deserialize provenance chain: {}", e)))?;
        Ok(ProvenanceChain { records })
    }

    /// Drains all records from the chain, leaving it empty.
    pub fn drain_records(&mut self) -> Vec<ProvenanceRecord> {
        std::mem::take(&mut self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel;

    fn run(name: &str, iterations: usize) -> (BenchmarkRecord, SolverResult) {
        let record = BenchmarkRecord {
            algorithm: name.to_string(),
            iterations,
            converged: true,
            time_secs: 1e-3,
        };
        let mut solution = kernel::zero_grid(2);
        solution[[1, 1]] = iterations as f64;
        (record, SolverResult { solution, iterations, converged: true })
    }

    #[test]
    fn test_provenance_chain_linking() {
        let mut chain = ProvenanceChain::new();
        let config = SolverConfig::default().with_n(2);

        for (name, iters) in [("Jacobi", 40), ("GaussSeidel", 22), ("SOR", 9)] {
            let (record, result) = run(name, iters);
            chain.record_run(&config, &record, &result).unwrap();
        }

        let records = chain.records();
        assert_eq!(records.len(), 3);
        assert!(records[0].previous_record_hash.is_none());
        assert_eq!(records[1].previous_record_hash, Some(records[0].calculate_record_hash().unwrap()));
        assert_eq!(records[2].previous_record_hash, Some(records[1].calculate_record_hash().unwrap()));
        assert_eq!(records[0].config_hash, records[2].config_hash);
        assert_ne!(records[0].solution_hash, records[1].solution_hash);
        assert_eq!(records[2].metadata["iterations"], 9);
        assert!(chain.verify().unwrap());
    }

    #[test]
    fn test_tampering_breaks_verification() {
        let mut chain = ProvenanceChain::new();
        let config = SolverConfig::default();
        for (name, iters) in [("BlockJacobi", 30), ("BlockSOR", 12)] {
            let (record, result) = run(name, iters);
            chain.record_run(&config, &record, &result).unwrap();
        }
        chain.records[0].metadata = serde_json::json!({"iterations": 1});
        assert!(!chain.verify().unwrap());
    }

    #[test]
    fn test_provenance_chain_serialization() {
        let mut chain = ProvenanceChain::new();
        let (record, result) = run("ConjugateGradient", 5);
        chain.record_run(&SolverConfig::default(), &record, &result).unwrap();

        let json_output = chain.to_json().unwrap();
        let restored = ProvenanceChain::from_json(&json_output).unwrap();

        assert_eq!(restored.records().len(), 1);
        assert_eq!(restored.records()[0].algorithm, "ConjugateGradient");
        assert_eq!(restored.records()[0].solution_hash, chain.records()[0].solution_hash);
        assert!(restored.verify().unwrap());

        assert_eq!(chain.drain_records().len(), 1);
        assert!(chain.records().is_empty());
    }
}

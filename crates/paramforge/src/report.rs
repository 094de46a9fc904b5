//! Human-readable summary of one compression run.

use std::fmt;

use paramforge_core::{CostScore, Decision, Method};
use paramforge_protocol::SyncLatency;

/// What a compression run did, and what it will cost at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionReport {
    /// Synced bits before compression.
    pub original_cost: u32,
    /// Synced bits after compression.
    pub final_cost: u32,
    /// Platform budget.
    pub max_cost: u32,
    /// Protocol used; `None` when nothing was compressed.
    pub method: Option<Method>,
    pub number_slots: usize,
    pub bool_slots: usize,
    pub batch_count: usize,
    pub index_bits: u32,
    /// Number of variables taken off direct sync.
    pub compressed_count: usize,
    pub latency: SyncLatency,
    pub score: CostScore,
    /// Whether the decision was replayed from an alignment record.
    pub from_alignment: bool,
    pub warnings: Vec<String>,
}

impl CompressionReport {
    pub(crate) fn new(
        decision: &Decision,
        original_cost: u32,
        max_cost: u32,
        latency: SyncLatency,
        warnings: Vec<String>,
    ) -> Self {
        let compressed = !decision.is_empty();
        Self {
            original_cost,
            final_cost: decision.final_cost(original_cost),
            max_cost,
            method: compressed.then_some(decision.method),
            number_slots: decision.number_slots,
            bool_slots: decision.bool_slots,
            batch_count: decision.batch_count(),
            index_bits: decision.index_bit_count(),
            compressed_count: decision.compressed.len(),
            latency,
            score: decision.score(original_cost, max_cost),
            from_alignment: false,
            warnings,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.final_cost <= self.max_cost
    }

    pub fn is_compressed(&self) -> bool {
        self.method.is_some()
    }
}

impl fmt::Display for CompressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Synced bits: {} -> {} of {}",
            self.original_cost, self.final_cost, self.max_cost
        )?;

        match self.method {
            None => writeln!(f, "No compression needed")?,
            Some(method) => {
                writeln!(f, "Method: {}", method)?;
                if self.from_alignment {
                    writeln!(f, "Layout replayed from platform alignment record")?;
                }
                writeln!(
                    f,
                    "Compressed {} parameters into {} batches of {} number / {} bool slots ({} index bits)",
                    self.compressed_count,
                    self.batch_count,
                    self.number_slots,
                    self.bool_slots,
                    self.index_bits
                )?;
                writeln!(
                    f,
                    "Sync delay: {:.2}s to {:.2}s",
                    self.latency.min_secs, self.latency.max_secs
                )?;
            }
        }

        if !self.is_feasible() {
            writeln!(
                f,
                "Over budget by {} bits",
                self.final_cost - self.max_cost
            )?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "  - {}", warning)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use paramforge_core::SyncedVariable;

    use super::*;

    fn decision() -> Decision {
        let compressed = (0..6)
            .map(|i| SyncedVariable::bool(format!("b{i}")))
            .collect();
        Decision::new(compressed, Method::Modern).with_slots(0, 2)
    }

    #[test]
    fn test_fields_follow_decision() {
        let latency = SyncLatency {
            min_secs: 0.3,
            max_secs: 0.6,
        };
        let report = CompressionReport::new(&decision(), 40, 38, latency, Vec::new());

        assert_eq!(report.final_cost, 38);
        assert_eq!(report.batch_count, 3);
        assert_eq!(report.index_bits, 2);
        assert_eq!(report.compressed_count, 6);
        assert_eq!(report.method, Some(Method::Modern));
        assert!(report.is_feasible());
        assert!(report.score.is_feasible());
    }

    #[test]
    fn test_display_compressed() {
        let latency = SyncLatency {
            min_secs: 0.3,
            max_secs: 0.6,
        };
        let report = CompressionReport::new(
            &decision(),
            40,
            38,
            latency,
            vec!["Unused: a".to_string()],
        );
        let text = report.to_string();

        assert!(text.contains("Synced bits: 40 -> 38 of 38"));
        assert!(text.contains("Method: modern"));
        assert!(text.contains("3 batches of 0 number / 2 bool slots"));
        assert!(text.contains("Sync delay: 0.30s to 0.60s"));
        assert!(text.contains("  - Unused: a"));
        assert!(!text.contains("Over budget"));
    }

    #[test]
    fn test_display_untouched() {
        let report = CompressionReport::new(
            &Decision::empty(),
            10,
            256,
            SyncLatency::default(),
            Vec::new(),
        );
        let text = report.to_string();

        assert!(report.method.is_none());
        assert!(text.contains("No compression needed"));
        assert!(!text.contains("Warnings"));
    }

    #[test]
    fn test_display_over_budget() {
        let report = CompressionReport::new(
            &decision(),
            40,
            30,
            SyncLatency::default(),
            Vec::new(),
        );

        assert!(!report.is_feasible());
        assert!(report.to_string().contains("Over budget by 8 bits"));
    }
}

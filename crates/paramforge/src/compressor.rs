//! The orchestrator: decide, compile, apply, report.
//!
//! Logging levels:
//! - **INFO**: Decision source and the applied result
//! - **WARN**: Over-budget results applied under a lenient failure policy

use paramforge_config::{CompressorConfig, FailurePolicy};
use paramforge_core::error::Result;
use paramforge_core::{
    Decision, Diagnostics, ParamForgeError, SyncedVariable, UsageMap, VariableTable,
};
use paramforge_protocol::{compile, CompiledProtocol, ProtocolContext, SyncLatency};
use paramforge_solver::{diagnose, Solver};
use tracing::{info, warn};

use crate::alignment::{AlignmentRecord, TOOL_VERSION};
use crate::policy::ConfirmPrompt;
use crate::report::CompressionReport;

/// Everything one compression run produced.
#[derive(Debug)]
pub struct CompressionOutcome {
    pub report: CompressionReport,
    /// The decision that was applied.
    pub decision: Decision,
    /// The generated protocol; `None` when nothing was compressed.
    pub protocol: Option<CompiledProtocol>,
    /// Alignment record for this build, when an avatar id was given.
    pub alignment: Option<AlignmentRecord>,
}

/// Compresses a variable table in place.
///
/// # Examples
///
/// ```
/// use paramforge::ParameterCompressor;
/// use paramforge_config::CompressorConfig;
/// use paramforge_core::{ControlKind, SyncedVariable, UsageMap, VariableTable, VariableUsage};
///
/// let mut table = VariableTable::new();
/// let mut usage = UsageMap::new();
/// for i in 0..40 {
///     let name = format!("toggle{i}");
///     table.push(SyncedVariable::bool(name.clone())).unwrap();
///     usage.insert(name, VariableUsage::new().with_control(ControlKind::Toggle));
/// }
///
/// let compressor = ParameterCompressor::new(CompressorConfig::new().with_max_cost(32));
/// let outcome = compressor.compress(&mut table, &usage).unwrap();
///
/// assert!(outcome.report.is_feasible());
/// assert_eq!(table.total_cost(), outcome.report.final_cost);
/// ```
pub struct ParameterCompressor {
    config: CompressorConfig,
    prompt: Option<Box<dyn ConfirmPrompt>>,
    alignment: Option<AlignmentRecord>,
    avatar_id: Option<String>,
}

impl ParameterCompressor {
    pub fn new(config: CompressorConfig) -> Self {
        Self {
            config,
            prompt: None,
            alignment: None,
            avatar_id: None,
        }
    }

    /// Sets the prompt consulted under [`FailurePolicy::Ask`].
    pub fn with_prompt(mut self, prompt: impl ConfirmPrompt + 'static) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    /// Replays `record` instead of solving. Requires an avatar id.
    pub fn with_alignment(mut self, record: AlignmentRecord) -> Self {
        self.alignment = Some(record);
        self
    }

    /// Identifies the avatar, so the outcome carries an alignment record.
    pub fn with_avatar_id(mut self, avatar_id: impl Into<String>) -> Self {
        self.avatar_id = Some(avatar_id.into());
        self
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Runs the whole pipeline against `table`.
    ///
    /// The table is only modified once every check has passed; on error it
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// - [`ParamForgeError::Config`] for an invalid configuration, an
    ///   alignment record without an avatar id, or the ask policy without
    ///   a prompt.
    /// - [`ParamForgeError::AlignmentVersion`] / [`ParamForgeError::AlignmentMismatch`]
    ///   when the alignment record does not fit this table.
    /// - [`ParamForgeError::Infeasible`] when nothing fits the budget and
    ///   the policy is `fail`.
    /// - [`ParamForgeError::Declined`] when the prompt refuses.
    /// - [`ParamForgeError::Internal`] when generated names collide with the
    ///   table or the protocol cannot be built.
    pub fn compress(
        &self,
        table: &mut VariableTable,
        usage: &UsageMap,
    ) -> Result<CompressionOutcome> {
        self.config
            .validate()
            .map_err(|e| ParamForgeError::Config(e.to_string()))?;

        let original_cost = table.total_cost();
        let max_cost = self.config.max_cost;
        let (decision, diagnostics) = self.decide(table, usage)?;
        let ctx = ProtocolContext::from_config(&self.config);
        let latency = SyncLatency::estimate(&decision, &ctx);

        let mut report = CompressionReport::new(
            &decision,
            original_cost,
            max_cost,
            latency,
            diagnostics.warnings(),
        );
        report.from_alignment = self.alignment.is_some();

        if !report.is_feasible() {
            self.apply_failure_policy(&report, diagnostics)?;
        }

        check_batched(&decision)?;
        let protocol = if decision.is_empty() {
            None
        } else {
            Some(compile(&decision, &ctx)?)
        };
        if let Some(protocol) = &protocol {
            check_applicable(table, &decision, protocol)?;
        }

        let alignment = self
            .avatar_id
            .as_ref()
            .map(|id| AlignmentRecord::from_decision(id.clone(), table, &decision));

        if let Some(protocol) = &protocol {
            apply(table, &decision, protocol)?;
        }

        info!(
            event = "compress_applied",
            method = %decision.method,
            batches = decision.batch_count(),
            cost = table.total_cost(),
            max_cost,
        );

        Ok(CompressionOutcome {
            report,
            decision,
            protocol,
            alignment,
        })
    }

    fn decide(
        &self,
        table: &VariableTable,
        usage: &UsageMap,
    ) -> Result<(Decision, Diagnostics)> {
        match &self.alignment {
            Some(record) => {
                let avatar_id = self.avatar_id.as_deref().ok_or_else(|| {
                    ParamForgeError::Config(
                        "an alignment record was supplied without an avatar id".to_string(),
                    )
                })?;
                let decision = record.to_decision(avatar_id, table, TOOL_VERSION)?;
                info!(
                    event = "alignment_replayed",
                    method = %decision.method,
                    batches = decision.batch_count(),
                );
                Ok((decision, diagnose(table, usage)))
            }
            None => {
                let result = Solver::from_config(&self.config).solve(table, usage);
                Ok((result.decision, result.diagnostics))
            }
        }
    }

    fn apply_failure_policy(
        &self,
        report: &CompressionReport,
        diagnostics: Diagnostics,
    ) -> Result<()> {
        match self.config.failure_policy {
            FailurePolicy::Fail => Err(ParamForgeError::Infeasible {
                current_cost: report.original_cost,
                best_cost: report.final_cost,
                max_cost: report.max_cost,
                diagnostics,
            }),
            FailurePolicy::Ask => {
                let prompt = self.prompt.as_ref().ok_or_else(|| {
                    ParamForgeError::Config(
                        "failure_policy is 'ask' but no prompt was supplied".to_string(),
                    )
                })?;
                if prompt.confirm(report) {
                    warn!(
                        cost = report.final_cost,
                        max_cost = report.max_cost,
                        "Applying over-budget compression after confirmation"
                    );
                    Ok(())
                } else {
                    Err(ParamForgeError::Declined)
                }
            }
            FailurePolicy::BestEffort => {
                warn!(
                    cost = report.final_cost,
                    max_cost = report.max_cost,
                    "Applying best compression found, still over budget"
                );
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for ParameterCompressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterCompressor")
            .field("config", &self.config)
            .field("prompt", &self.prompt.is_some())
            .field("alignment", &self.alignment)
            .field("avatar_id", &self.avatar_id)
            .finish()
    }
}

fn check_batched(decision: &Decision) -> Result<()> {
    if decision.slots_match_compressed() {
        return Ok(());
    }
    Err(ParamForgeError::Internal(format!(
        "{} number / {} bool slots cannot carry the {} compressed variables",
        decision.number_slots,
        decision.bool_slots,
        decision.compressed.len()
    )))
}

fn check_applicable(
    table: &VariableTable,
    decision: &Decision,
    protocol: &CompiledProtocol,
) -> Result<()> {
    if let Some(missing) = decision.compressed.iter().find(|v| !table.contains(&v.name)) {
        return Err(ParamForgeError::Internal(format!(
            "compressed variable '{}' is not in the table",
            missing.name
        )));
    }
    for parameter in protocol.graph.generated_parameters() {
        if table.contains(&parameter.name) {
            return Err(ParamForgeError::Internal(format!(
                "generated parameter '{}' collides with an existing variable",
                parameter.name
            )));
        }
    }
    Ok(())
}

fn apply(table: &mut VariableTable, decision: &Decision, protocol: &CompiledProtocol) -> Result<()> {
    for variable in &decision.compressed {
        table.set_network_synced(&variable.name, false);
    }

    for parameter in protocol.graph.generated_parameters() {
        let mut variable = SyncedVariable::new(parameter.name.clone(), parameter.value_type)
            .with_default(parameter.default_value);
        if !parameter.synced {
            variable = variable.unsynced();
        }
        table.push(variable)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "compressor_tests.rs"]
mod tests;

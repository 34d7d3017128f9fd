//! The fixed-point SSA optimization pipeline (§4.4).

pub mod block_merge;
pub mod branch_fold;
pub mod const_fold;
pub mod copy_prop;
pub mod dce;
pub mod phi_simplify;
pub mod unreachable;

use crate::ir::Cfg;

/// Which of the seven passes participate in [`optimize_ssa`]'s fixed-point
/// loop. All on by default; tests isolate a single law (§8 "Optimization
/// laws") by turning the rest off, mirroring the teacher's
/// `CompilerConfig::new().with_builtin(..)` builder style.
#[derive(Debug, Clone, Copy)]
pub struct OptimizerConfig {
    pub copy_prop: bool,
    pub const_fold: bool,
    pub branch_fold: bool,
    pub unreachable: bool,
    pub phi_simplify: bool,
    pub dce: bool,
    pub block_merge: bool,
    /// Safety valve against a pass pair that oscillates instead of
    /// converging; the loop gives up and returns rather than spinning.
    pub max_rounds: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            copy_prop: true,
            const_fold: true,
            branch_fold: true,
            unreachable: true,
            phi_simplify: true,
            dce: true,
            block_merge: true,
            max_rounds: 1000,
        }
    }
}

impl OptimizerConfig {
    pub fn new() -> Self {
        OptimizerConfig::default()
    }

    pub fn with_copy_prop(mut self, enabled: bool) -> Self {
        self.copy_prop = enabled;
        self
    }

    pub fn with_const_fold(mut self, enabled: bool) -> Self {
        self.const_fold = enabled;
        self
    }

    pub fn with_branch_fold(mut self, enabled: bool) -> Self {
        self.branch_fold = enabled;
        self
    }

    pub fn with_unreachable(mut self, enabled: bool) -> Self {
        self.unreachable = enabled;
        self
    }

    pub fn with_phi_simplify(mut self, enabled: bool) -> Self {
        self.phi_simplify = enabled;
        self
    }

    pub fn with_dce(mut self, enabled: bool) -> Self {
        self.dce = enabled;
        self
    }

    pub fn with_block_merge(mut self, enabled: bool) -> Self {
        self.block_merge = enabled;
        self
    }
}

/// Runs the seven passes enabled by `config` to a fixed point: repeats the
/// full round while any pass reports a change, stopping as soon as a round
/// changes nothing (§4.4's "repeat until no pass makes progress").
pub fn optimize_ssa(cfg: &mut Cfg, config: &OptimizerConfig) {
    for round in 0..config.max_rounds {
        let mut changed = false;

        if config.copy_prop {
            changed |= copy_prop::run(cfg);
        }
        if config.const_fold {
            changed |= const_fold::run(cfg);
        }
        if config.branch_fold {
            changed |= branch_fold::run(cfg);
        }
        if config.unreachable {
            changed |= unreachable::run(cfg);
        }
        if config.phi_simplify {
            changed |= phi_simplify::run(cfg);
        }
        if config.dce {
            changed |= dce::run(cfg);
        }
        if config.block_merge {
            changed |= block_merge::run(cfg);
        }

        tracing::debug!(round, changed, "optimizer round complete");
        if !changed {
            return;
        }
    }
    tracing::warn!(
        max_rounds = config.max_rounds,
        "optimizer gave up without reaching a fixed point"
    );
}

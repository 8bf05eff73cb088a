use crate::config::*;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::rank_table::{RankTable, RANK_TABLE_LEN};
use log::debug;
use rust_decimal::{Decimal, MathematicalOps};
use std::sync::Arc;

/// The tunable parts of the scoring: the shape of the rank table, the way a
/// rank lands in it, the decay over the years and the value of unknown contest types.
pub trait CoefficientPolicy: Send + Sync {
    fn rank_table(&self) -> Result<RankTable, TableError> {
        Ok(RankTable::standard())
    }

    /// Position in the rank table of an already clamped rank, `1 <= rank <= total`.
    ///
    /// The best rank always lands on the first entry.
    fn rank_index(&self, rank: i64, total: i64) -> usize {
        let last = (RANK_TABLE_LEN - 1) as i64;
        (last * (rank - 1) / total) as usize
    }

    /// Must be positive and strictly increasing with the year, as far as
    /// decimals allow. `None` when the value is too large to be represented.
    fn decay_coefficient(&self, year: i32) -> Option<Decimal>;

    fn unknown_type_coefficient(&self) -> Decimal {
        Decimal::ZERO
    }
}

/// Exponential growth of `decay_ratio` per year, equal to 1 at `anchor_year`.
///
/// `decay_ratio` must be greater than 1.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct StandardPolicy {
    pub decay_ratio: Decimal,
    pub anchor_year: i32,
}

impl StandardPolicy {
    pub const DEFAULT: StandardPolicy = StandardPolicy {
        // 1.25
        decay_ratio: Decimal::from_parts(125, 0, 0, false, 2),
        anchor_year: 2000,
    };
}

impl Default for StandardPolicy {
    fn default() -> Self {
        StandardPolicy::DEFAULT
    }
}

/// The smallest positive decimal.
pub const DECIMAL_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 28);

impl CoefficientPolicy for StandardPolicy {
    fn decay_coefficient(&self, year: i32) -> Option<Decimal> {
        let exponent = i64::from(year) - i64::from(self.anchor_year);
        if exponent >= 0 {
            return self.decay_ratio.checked_powu(exponent.unsigned_abs());
        }
        // Below the anchor the value shrinks towards zero but stays positive.
        let inverse = self
            .decay_ratio
            .checked_powu(exponent.unsigned_abs())
            .and_then(|d| Decimal::ONE.checked_div(d))
            .unwrap_or(Decimal::ZERO);
        if inverse.is_zero() {
            debug!("decay_coefficient: underflow for year {}", year);
            Some(DECIMAL_EPSILON)
        } else {
            Some(inverse)
        }
    }
}

/// Produces the three multiplicative coefficients of a contest result.
///
/// The engine never combines them; this is left to the caller.
pub struct CoefficientEngine {
    policy: Box<dyn CoefficientPolicy>,
    table: Arc<RankTable>,
    types: TypeCoefficients,
    sink: Arc<dyn DiagnosticSink>,
}

impl CoefficientEngine {
    pub fn new(
        policy: Box<dyn CoefficientPolicy>,
        types: TypeCoefficients,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<CoefficientEngine, TableError> {
        let table = Arc::new(policy.rank_table()?);
        debug!(
            "CoefficientEngine::new: {} contest types, rank coefficients {} -> {}",
            types.len(),
            table.max(),
            table.min()
        );
        Ok(CoefficientEngine {
            policy,
            table,
            types,
            sink,
        })
    }

    /// The coefficient earned for finishing at `rank` out of `total`.
    ///
    /// Precondition: `total >= 1`. A rank outside of `[1, total]` is clamped and
    /// reported, naming the contestant if given.
    pub fn rank_coefficient(&self, rank: i64, total: i64, name: Option<&str>) -> Decimal {
        debug_assert!(total >= 1, "rank_coefficient: total must be positive");
        if !(1..=total).contains(&rank) {
            self.sink.report(Diagnostic::RankOutOfRange {
                rank,
                total,
                name: name.map(|s| s.to_string()),
            });
        }
        let clamped = rank.min(total).max(1);
        let index = self.policy.rank_index(clamped, total).min(RANK_TABLE_LEN - 1);
        self.table.values()[index]
    }

    /// The coefficient of a contest type. Unknown types are reported and count for nothing.
    pub fn contest_type_coefficient(&self, kind: &str, name: Option<&str>) -> Decimal {
        match self.types.get(kind) {
            Some(c) => *c,
            None => {
                self.sink.report(Diagnostic::UnknownContestType {
                    kind: kind.to_string(),
                    name: name.map(|s| s.to_string()),
                });
                self.policy.unknown_type_coefficient()
            }
        }
    }

    /// The weight of a contest held in `year`. Years too far in the future
    /// saturate to the largest decimal and are reported.
    pub fn decay_coefficient(&self, year: i32) -> Decimal {
        match self.policy.decay_coefficient(year) {
            Some(d) => d,
            None => {
                self.sink.report(Diagnostic::DecayOverflow { year });
                Decimal::MAX
            }
        }
    }

    pub fn table(&self) -> &RankTable {
        &self.table
    }
}

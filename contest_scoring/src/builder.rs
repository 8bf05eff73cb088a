pub use crate::config::*;

use crate::coefficient::{CoefficientEngine, CoefficientPolicy, StandardPolicy};
use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::enrollment::{enrollment_candidates, weighted_mode};
use crate::grade::{GradeEncoder, SpecialGradeCache};
use crate::names::NameMatcher;
use log::info;
use snafu::{OptionExt, ResultExt};
use std::sync::Arc;

/// A builder for assembling a [Scorer] out of the externally loaded tables.
///
/// ```
/// use contest_scoring::builder::Builder;
/// use contest_scoring::*;
/// # use contest_scoring::BuildError;
///
/// let scorer = Builder::new()
///     .grade_tokens(GradeTokens {
///         initial: 16,
///         elements: vec![("初".to_string(), -1), ("一".to_string(), 1)],
///     })
///     .type_coefficients(TypeCoefficients::new())
///     .build()?;
///
/// assert_eq!(scorer.grades().encode("初一"), Ok(GradeMask(1 << 16)));
///
/// # Ok::<(), BuildError>(())
/// ```
pub struct Builder {
    pub(crate) _grade_tokens: Option<GradeTokens>,
    pub(crate) _special_grades: Vec<(String, GradeMask)>,
    pub(crate) _types: Option<TypeCoefficients>,
    pub(crate) _surnames: SurnameTable,
    pub(crate) _policy: Box<dyn CoefficientPolicy>,
    pub(crate) _sink: Arc<dyn DiagnosticSink>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _grade_tokens: None,
            _special_grades: Vec::new(),
            _types: None,
            _surnames: SurnameTable::new(),
            _policy: Box::new(StandardPolicy::DEFAULT),
            _sink: Arc::new(LogSink),
        }
    }

    pub fn grade_tokens(self, tokens: GradeTokens) -> Builder {
        Builder {
            _grade_tokens: Some(tokens),
            ..self
        }
    }

    /// Irregular grade labels and their precomputed masks.
    pub fn special_grades(self, labels: &[(String, GradeMask)]) -> Builder {
        Builder {
            _special_grades: labels.to_vec(),
            ..self
        }
    }

    pub fn type_coefficients(self, types: TypeCoefficients) -> Builder {
        Builder {
            _types: Some(types),
            ..self
        }
    }

    pub fn surnames(self, surnames: SurnameTable) -> Builder {
        Builder {
            _surnames: surnames,
            ..self
        }
    }

    pub fn policy(self, policy: Box<dyn CoefficientPolicy>) -> Builder {
        Builder {
            _policy: policy,
            ..self
        }
    }

    /// Where the non-fatal diagnostics go. Defaults to the log.
    pub fn sink(self, sink: Arc<dyn DiagnosticSink>) -> Builder {
        Builder {
            _sink: sink,
            ..self
        }
    }

    pub fn build(self) -> Result<Scorer, BuildError> {
        let tokens = self._grade_tokens.context(MissingGradeTokensSnafu {})?;
        let types = self._types.context(MissingTypeCoefficientsSnafu {})?;
        info!(
            "Building scorer: {} grade tokens, {} special grades, {} contest types, {} surnames",
            tokens.elements.len(),
            self._special_grades.len(),
            types.len(),
            self._surnames.len()
        );
        let cache = Arc::new(SpecialGradeCache::seeded(self._special_grades));
        let coefficients =
            CoefficientEngine::new(self._policy, types, self._sink).context(InvalidTableSnafu {})?;
        Ok(Scorer {
            grades: GradeEncoder::new(tokens, cache),
            coefficients,
            names: NameMatcher::new(self._surnames),
        })
    }
}

/// All the engines needed to evaluate award records.
pub struct Scorer {
    grades: GradeEncoder,
    coefficients: CoefficientEngine,
    names: NameMatcher,
}

impl Scorer {
    pub fn grades(&self) -> &GradeEncoder {
        &self.grades
    }

    pub fn coefficients(&self) -> &CoefficientEngine {
        &self.coefficients
    }

    pub fn names(&self) -> &NameMatcher {
        &self.names
    }

    /// Evaluates one award record of the given contest.
    ///
    /// An unreadable grade label fails this record only.
    pub fn evaluate(
        &self,
        contest: &Contest,
        record: &AwardRecord,
    ) -> Result<RecordEvaluation, GradeError> {
        let grades = self.grades.encode(&record.grade)?;
        let name = Some(record.name.as_str());
        Ok(RecordEvaluation {
            grades,
            enrollment: enrollment_candidates(contest.school_year(), grades),
            rank_coefficient: self
                .coefficients
                .rank_coefficient(record.rank, record.total, name),
            type_coefficient: self.coefficients.contest_type_coefficient(&contest.kind, name),
            decay_coefficient: self.coefficients.decay_coefficient(contest.year),
        })
    }

    /// The best guesses for the enrollment year of a contestant, given all of
    /// their evaluated records. Ties are all returned.
    pub fn enrollment_year<'a, I>(&self, evaluations: I) -> Vec<i32>
    where
        I: IntoIterator<Item = &'a RecordEvaluation>,
    {
        weighted_mode(evaluations.into_iter().map(|e| &e.enrollment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, Diagnostic};
    use rust_decimal::{Decimal, MathematicalOps};

    fn tokens() -> GradeTokens {
        GradeTokens {
            initial: 16,
            elements: vec![
                ("初".to_string(), -1),
                ("高".to_string(), 2),
                ("一".to_string(), 1),
                ("二".to_string(), 2),
                ("三".to_string(), 3),
            ],
        }
    }

    fn types() -> TypeCoefficients {
        let mut types = TypeCoefficients::new();
        types.insert("NOIP提高".to_string(), Decimal::new(8, 1));
        types
    }

    fn record(contest: &str, grade: &str, rank: i64, total: i64) -> AwardRecord {
        AwardRecord {
            contest: contest.to_string(),
            name: "张三".to_string(),
            grade: grade.to_string(),
            rank,
            total,
        }
    }

    #[test]
    fn missing_tables() {
        assert_eq!(
            Builder::new().type_coefficients(types()).build().err(),
            Some(BuildError::MissingGradeTokens {})
        );
        assert_eq!(
            Builder::new().grade_tokens(tokens()).build().err(),
            Some(BuildError::MissingTypeCoefficients {})
        );
    }

    #[test]
    fn evaluate_record() {
        let _ = env_logger::builder().is_test(true).try_init();
        let sink = Arc::new(CollectingSink::new());
        let scorer = Builder::new()
            .grade_tokens(tokens())
            .type_coefficients(types())
            .sink(sink.clone())
            .build()
            .unwrap();
        let contest = Contest::new("NOIP2021", "NOIP提高", 2021);
        let ev = scorer
            .evaluate(&contest, &record("NOIP2021", "初二", 1, 100))
            .unwrap();
        assert_eq!(ev.grades, GradeMask(1 << 17));
        assert_eq!(ev.enrollment.years(), vec![2021]);
        assert_eq!(ev.rank_coefficient, Decimal::from(100));
        assert_eq!(ev.type_coefficient, Decimal::new(8, 1));
        assert_eq!(ev.decay_coefficient, Decimal::new(125, 2).powi(21));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn evaluate_reports_and_fails_per_record() {
        let sink = Arc::new(CollectingSink::new());
        let scorer = Builder::new()
            .grade_tokens(tokens())
            .type_coefficients(types())
            .sink(sink.clone())
            .build()
            .unwrap();
        let contest = Contest::new("X2020", "mystery", 2020);
        let ev = scorer
            .evaluate(&contest, &record("X2020", "高一", 0, 10))
            .unwrap();
        assert_eq!(ev.type_coefficient, Decimal::ZERO);
        let seen = sink.take();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], Diagnostic::RankOutOfRange { rank: 0, .. }));
        assert!(matches!(seen[1], Diagnostic::UnknownContestType { .. }));

        assert!(matches!(
            scorer.evaluate(&contest, &record("X2020", "大一", 1, 10)),
            Err(GradeError::UnknownGrade { .. })
        ));
    }

    #[test]
    fn enrollment_year_across_contests() {
        let scorer = Builder::new()
            .grade_tokens(tokens())
            .special_grades(&[("小学/无".to_string(), GradeMask::PRIMARY_OR_NONE)])
            .type_coefficients(types())
            .build()
            .unwrap();
        let c2020 = Contest::new("A2020", "NOIP提高", 2020);
        let c2021 = Contest::new("A2021", "NOIP提高", 2021).with_school_year(2020);
        let c2022 = Contest::new("A2022", "NOIP提高", 2022).with_school_year(2021);
        let mut evs = vec![
            // 2021
            scorer.evaluate(&c2020, &record("A2020", "初一", 5, 10)).unwrap(),
            // 2020
            scorer.evaluate(&c2021, &record("A2021", "初二", 5, 10)).unwrap(),
        ];
        assert_eq!(scorer.enrollment_year(&evs), vec![2020, 2021]);

        // 2020 again
        evs.push(scorer.evaluate(&c2022, &record("A2022", "初三", 5, 10)).unwrap());
        assert_eq!(scorer.enrollment_year(&evs), vec![2020]);

        let primary = scorer
            .evaluate(&c2020, &record("A2020", "小学/无", 5, 10))
            .unwrap();
        assert_eq!(primary.grades, GradeMask::PRIMARY_OR_NONE);
        assert_eq!(primary.enrollment.len(), 16);
    }
}

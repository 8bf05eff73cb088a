use log::{debug, info, warn};

use contest_scoring::builder::{Builder, Scorer};
use contest_scoring::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;

use crate::score::config_reader::*;

#[derive(Debug, Snafu)]
pub enum ScoreError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Expected an integer for {key}"))]
    ParsingJsonNumber { key: String },
    #[snafu(display("Invalid coefficient {value:?} for contest type {kind}"))]
    ParsingDecimal {
        source: rust_decimal::Error,
        kind: String,
        value: String,
    },
    #[snafu(display("Could not assemble the scorer"))]
    Building { source: BuildError },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ScoreResult<T> = Result<T, ScoreError>;

fn decimal_js(d: Decimal) -> JSValue {
    json!(d.normalize().to_string())
}

struct Evaluated {
    record: AwardRecord,
    evaluation: RecordEvaluation,
    score: Decimal,
}

fn record_to_json(scorer: &Scorer, ev: &Evaluated) -> JSValue {
    json!({
        "contest": ev.record.contest,
        "name": ev.record.name,
        "initials": scorer.names().romanized_initials(&ev.record.name),
        "grade": ev.record.grade,
        "rankCoefficient": decimal_js(ev.evaluation.rank_coefficient),
        "typeCoefficient": decimal_js(ev.evaluation.type_coefficient),
        "decayCoefficient": decimal_js(ev.evaluation.decay_coefficient),
        "score": decimal_js(ev.score),
    })
}

// Contestants in order of first appearance, with their inferred enrollment years.
fn contestants_to_json(scorer: &Scorer, evaluated: &[Evaluated]) -> Vec<JSValue> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_name: HashMap<&str, Vec<&RecordEvaluation>> = HashMap::new();
    for ev in evaluated.iter() {
        let name = ev.record.name.as_str();
        if !by_name.contains_key(name) {
            order.push(name);
        }
        by_name.entry(name).or_default().push(&ev.evaluation);
    }
    let mut l: Vec<JSValue> = Vec::new();
    for name in order {
        let evaluations = by_name.get(name).cloned().unwrap_or_default();
        let enrollment = scorer.enrollment_year(evaluations);
        if enrollment.len() > 1 {
            info!(
                "Ambiguous enrollment year for {}: {:?}",
                name, enrollment
            );
        }
        l.push(json!({
            "name": name,
            "initials": scorer.names().romanized_initials(name),
            "enrollment": enrollment,
            "records": by_name.get(name).map(|v| v.len()).unwrap_or(0),
        }));
    }
    l
}

// Distinct names sharing the same initials, which the matching layer may want to look at.
fn similar_names_to_json(scorer: &Scorer, evaluated: &[Evaluated]) -> Vec<JSValue> {
    let mut names: Vec<&str> = evaluated.iter().map(|ev| ev.record.name.as_str()).collect();
    names.sort();
    names.dedup();
    let initials: Vec<String> = names
        .iter()
        .map(|n| scorer.names().romanized_initials(n))
        .collect();
    let mut l: Vec<JSValue> = Vec::new();
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            if initials[i] == initials[j] {
                l.push(json!({
                    "names": [names[i], names[j]],
                    "initials": initials[i],
                    "similarity": similarity(names[i], names[j]),
                }));
            }
        }
    }
    l
}

// Scores a single record. The error message describes why the record is skipped.
fn evaluate_record(
    scorer: &Scorer,
    contests: &HashMap<String, Contest>,
    record: &AwardRecord,
) -> Result<Evaluated, String> {
    let contest = contests
        .get(&record.contest)
        .ok_or_else(|| format!("Unknown contest {:?}", record.contest))?;
    if record.total < 1 {
        return Err(format!("Invalid number of participants {}", record.total));
    }
    let evaluation = scorer.evaluate(contest, record).map_err(|e| e.to_string())?;
    let score = evaluation
        .rank_coefficient
        .checked_mul(evaluation.type_coefficient)
        .and_then(|x| x.checked_mul(evaluation.decay_coefficient))
        .ok_or_else(|| "Score overflow".to_string())?;
    debug!("evaluate_record: {:?} -> {}", record, score);
    Ok(Evaluated {
        record: record.clone(),
        evaluation,
        score,
    })
}

/// Reads all the data files named by the configuration and computes the summary.
pub fn score_files(config_path: &str) -> ScoreResult<JSValue> {
    let config_p = Path::new(config_path);
    let config: ScoreConfig = read_json(config_p)?;
    info!("config: {:?}", config);
    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    let data_path = |name: &str| -> PathBuf { root_p.join(name) };

    let grades: GradesFile = read_json(&data_path(&config.grades))?;
    let scoring: JSMap<String, JSValue> = read_json(&data_path(&config.scoring))?;
    let surnames: HashMap<String, Initials> = match &config.surnames {
        Some(p) => read_json(&data_path(p))?,
        None => HashMap::new(),
    };
    let contest_defs: Vec<ContestDef> = read_json(&data_path(&config.contests))?;
    let record_defs: Vec<RecordDef> = read_json(&data_path(&config.records))?;

    let sink = Arc::new(CollectingSink::new());
    let scorer = Builder::new()
        .grade_tokens(grades.grade_tokens()?)
        .special_grades(&grades.special_grades()?)
        .type_coefficients(type_coefficients(&scoring)?)
        .surnames(surname_table(surnames))
        .sink(sink.clone())
        .build()
        .context(BuildingSnafu {})?;

    let contests: HashMap<String, Contest> = contest_defs
        .iter()
        .map(|c| (c.id.clone(), c.to_contest()))
        .collect();
    info!(
        "Processing {} records over {} contests",
        record_defs.len(),
        contests.len()
    );

    let mut evaluated: Vec<Evaluated> = Vec::new();
    let mut errors: Vec<JSValue> = Vec::new();
    for rd in record_defs.iter() {
        let record = rd.to_record();
        match evaluate_record(&scorer, &contests, &record) {
            Ok(ev) => evaluated.push(ev),
            Err(message) => {
                warn!(
                    "Skipping record of {} in {}: {}",
                    record.name, record.contest, message
                );
                errors.push(json!({
                    "contest": record.contest,
                    "name": record.name,
                    "error": message,
                }));
            }
        }
    }

    let records_js: Vec<JSValue> = evaluated
        .iter()
        .map(|ev| record_to_json(&scorer, ev))
        .collect();
    let diagnostics: Vec<String> = sink.take().iter().map(|d| d.to_string()).collect();
    Ok(json!({
        "records": records_js,
        "contestants": contestants_to_json(&scorer, &evaluated),
        "similarNames": similar_names_to_json(&scorer, &evaluated),
        "diagnostics": diagnostics,
        "errors": errors,
    }))
}

pub fn run_scoring(
    config_path: String,
    out: Option<String>,
    check_summary_path: Option<String>,
) -> ScoreResult<()> {
    let summary_js = score_files(config_path.as_str())?;
    let pretty_js_stats =
        serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {
            path: config_path.clone(),
        })?;

    match out.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_stats),
        Some(p) => {
            info!("Writing summary to {:?}", p);
            fs::write(p, pretty_js_stats.as_bytes()).context(WritingJsonSnafu { path: p })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p.clone())?;
        let pretty_js_summary_ref = serde_json::to_string_pretty(&summary_ref)
            .context(ParsingJsonSnafu { path: summary_p })?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between computed summary and reference summary")
        }
    }

    Ok(())
}

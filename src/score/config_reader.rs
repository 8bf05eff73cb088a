use crate::score::*;

use contest_scoring::{
    AwardRecord, Contest, GradeMask, GradeTokens, SurnameTable, TypeCoefficients,
};
use log::debug;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub grades: String,
    pub scoring: String,
    pub surnames: Option<String>,
    pub contests: String,
    pub records: String,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GradesFile {
    pub initial: i32,
    // The order of the tokens matters: the first matching token wins.
    pub element: JSMap<String, JSValue>,
    #[serde(default)]
    pub special: JSMap<String, JSValue>,
}

impl GradesFile {
    pub fn grade_tokens(&self) -> ScoreResult<GradeTokens> {
        let mut elements: Vec<(String, i32)> = Vec::new();
        for (token, delta) in self.element.iter() {
            elements.push((token.clone(), read_js_i32(delta, token)?));
        }
        Ok(GradeTokens {
            initial: self.initial,
            elements,
        })
    }

    pub fn special_grades(&self) -> ScoreResult<Vec<(String, GradeMask)>> {
        let mut res: Vec<(String, GradeMask)> = Vec::new();
        for (label, mask) in self.special.iter() {
            let m = mask
                .as_u64()
                .and_then(|x| u32::try_from(x).ok())
                .context(ParsingJsonNumberSnafu { key: label })?;
            res.push((label.clone(), GradeMask(m)));
        }
        Ok(res)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ContestDef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub year: i32,
    #[serde(rename = "schoolYear")]
    pub school_year: Option<i32>,
}

impl ContestDef {
    pub fn to_contest(&self) -> Contest {
        let contest = Contest::new(&self.id, &self.kind, self.year);
        match self.school_year {
            Some(y) => contest.with_school_year(y),
            None => contest,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RecordDef {
    pub contest: String,
    pub name: String,
    pub grade: String,
    pub rank: i64,
    pub total: i64,
}

impl RecordDef {
    pub fn to_record(&self) -> AwardRecord {
        AwardRecord {
            contest: self.contest.clone(),
            name: self.name.clone(),
            grade: self.grade.clone(),
            rank: self.rank,
            total: self.total,
        }
    }
}

/// Initials of a surname, either spelled as one string or as a list.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Initials {
    Joined(String),
    Split(Vec<String>),
}

pub fn surname_table(surnames: HashMap<String, Initials>) -> SurnameTable {
    surnames
        .into_iter()
        .map(|(surname, initials)| {
            let joined = match initials {
                Initials::Joined(s) => s,
                Initials::Split(l) => l.concat(),
            };
            (surname, joined)
        })
        .collect()
}

/// Coefficients may be written as strings (exact) or as JSON numbers.
pub fn type_coefficients(scoring: &JSMap<String, JSValue>) -> ScoreResult<TypeCoefficients> {
    let mut res = TypeCoefficients::new();
    for (kind, value) in scoring.iter() {
        let text = match value {
            JSValue::String(s) => s.clone(),
            JSValue::Number(n) => n.to_string(),
            _ => None.context(ParsingJsonNumberSnafu { key: kind })?,
        };
        let coefficient = Decimal::from_str(text.trim()).context(ParsingDecimalSnafu {
            kind: kind.clone(),
            value: text.clone(),
        })?;
        res.insert(kind.clone(), coefficient);
    }
    Ok(res)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> ScoreResult<T> {
    let p = path.display().to_string();
    debug!("read_json: reading {:?}", p);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: p.clone() })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: p })
}

pub fn read_summary(path: String) -> ScoreResult<JSValue> {
    read_json(Path::new(path.as_str()))
}

fn read_js_i32(x: &JSValue, key: &str) -> ScoreResult<i32> {
    match x {
        JSValue::Number(n) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .context(ParsingJsonNumberSnafu { key }),
        JSValue::String(s) => s.parse::<i32>().ok().context(ParsingJsonNumberSnafu { key }),
        _ => None.context(ParsingJsonNumberSnafu { key }),
    }
}

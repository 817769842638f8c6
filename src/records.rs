use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// One row of the `covid_19_india.csv` dataset.
///
/// Extra source columns (`Sno`, `Time`, the per-nationality counts) are
/// ignored during deserialization. The source promises
/// `cured + deaths <= confirmed` but this is not enforced here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaseRecord {
    #[serde(rename = "State/UnionTerritory")]
    pub region: String,
    #[serde(rename = "Date", with = "day_first_date")]
    pub date: NaiveDate,
    #[serde(rename = "Cured")]
    pub cured: u64,
    #[serde(rename = "Deaths")]
    pub deaths: u64,
    #[serde(rename = "Confirmed")]
    pub confirmed: u64,
}

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path} contains no case records")]
    Empty { path: PathBuf },
}

/// The raw record set. Loaded once per process, then reused read-only by
/// every aggregation step.
#[derive(Debug)]
pub struct Dataset {
    path: PathBuf,
    records: Vec<CaseRecord>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let file = File::open(path).map_err(|source| DataLoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut rdr = csv::Reader::from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for row in rdr.deserialize() {
            let record: CaseRecord = row.map_err(|source| DataLoadError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
            records.push(record);
        }
        if records.is_empty() {
            return Err(DataLoadError::Empty {
                path: path.to_path_buf(),
            });
        }

        info!(rows = records.len(), "loaded case records from {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }
}

/// Drops every record whose region label carries the `*` marker the source
/// uses for provisional rows; they would double-count a region under two
/// labels.
pub fn without_flagged(records: &[CaseRecord]) -> Vec<CaseRecord> {
    records
        .iter()
        .filter(|r| !r.region.contains('*'))
        .cloned()
        .collect()
}

/// Sorted distinct region labels: the valid values for the region selector.
pub fn region_labels(records: &[CaseRecord]) -> Vec<String> {
    let mut labels: Vec<String> = records.iter().map(|r| r.region.clone()).collect();
    labels.sort();
    labels.dedup();
    labels
}

mod day_first_date {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer};

    // Kaggle exports of the dataset switched date formats over time; all of
    // them are day-first except the ISO one, which is unambiguous.
    const FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y", "%Y-%m-%d"];

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognised day-first date: {s}")))
    }
}

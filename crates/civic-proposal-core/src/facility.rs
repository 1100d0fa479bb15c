//! Facility registry: process-wide name → description table used as prompt context.
//!
//! The table is built from the built-in entries plus an optional TOML file and published through
//! an [`ArcSwap`]. `refresh` builds a fresh table and swaps it in one store; readers that already
//! loaded a snapshot keep using it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::error::{FacilityFileError, ModelError};
use crate::fallback::or_template;
use crate::model_client::TextGenerator;
use crate::prompts::facility_context_prompt;

/// Context used when neither the table nor the model can describe a location.
pub const GENERIC_CONTEXT: &str = "일반적인 공공시설";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityInfo {
    pub kind: String,
    pub description: String,
}

pub type FacilityTable = BTreeMap<String, FacilityInfo>;

const BUILTIN_FACILITIES: &[(&str, &str, &str)] = &[
    (
        "태산패밀리파크",
        "가족공원",
        "물놀이장, 조각공원, 야외공연장 등을 갖춘 김포시의 대표적인 가족 공원",
    ),
    (
        "무지개 뜨는 언덕",
        "공설봉안당",
        "김포시의 공설봉안당으로 추모와 사색을 위한 실내 시설",
    ),
    (
        "김포시청",
        "행정시설",
        "김포시의 행정 중심지로 시민 서비스를 제공하는 공공 건물",
    ),
    (
        "시민회관",
        "문화시설",
        "김포시의 문화행사와 시민활동을 위한 공공시설",
    ),
    (
        "사우광장",
        "광장",
        "김포시의 중심가에 위치한 시민들의 휴식과 문화활동 공간",
    ),
    (
        "생활체육관",
        "체육시설",
        "김포시민들의 체육활동과 건강관리를 위한 종합체육시설",
    ),
    (
        "도서관",
        "도서관",
        "김포시민들의 독서와 학습을 위한 공공도서관",
    ),
];

/// On-disk shape:
///
/// ```toml
/// [facilities."장기도서관"]
/// kind = "도서관"
/// description = "장기동 주민을 위한 공공도서관"
/// ```
#[derive(Debug, Default, Deserialize)]
struct FacilityFile {
    #[serde(default)]
    facilities: FacilityTable,
}

pub fn builtin_table() -> FacilityTable {
    BUILTIN_FACILITIES
        .iter()
        .map(|(name, kind, description)| {
            (
                name.to_string(),
                FacilityInfo {
                    kind: kind.to_string(),
                    description: description.to_string(),
                },
            )
        })
        .collect()
}

fn read_facility_file(path: &Path) -> Result<FacilityTable, FacilityFileError> {
    let text = std::fs::read_to_string(path)?;
    let file: FacilityFile = toml::from_str(&text)?;
    Ok(file.facilities)
}

/// Built-in entries, extended and overridden by the file when it loads.
fn load_table(source: Option<&Path>) -> FacilityTable {
    let mut table = builtin_table();
    if let Some(path) = source {
        match read_facility_file(path) {
            Ok(extra) => {
                tracing::info!(path = %path.display(), entries = extra.len(), "facility file loaded");
                table.extend(extra);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "keeping built-in facilities");
            }
        }
    }
    table
}

pub struct FacilityRegistry {
    table: ArcSwap<FacilityTable>,
    source: Option<PathBuf>,
}

impl FacilityRegistry {
    /// Populate from the built-in entries and, when given, the TOML file at `source`.
    pub fn new(source: Option<PathBuf>) -> Self {
        let table = load_table(source.as_deref());
        tracing::info!(count = table.len(), "facility registry populated");
        Self {
            table: ArcSwap::new(Arc::new(table)),
            source,
        }
    }

    pub fn builtin() -> Self {
        Self::new(None)
    }

    /// The current table. Stays valid across later refreshes.
    pub fn snapshot(&self) -> Arc<FacilityTable> {
        self.table.load_full()
    }

    pub fn len(&self) -> usize {
        self.table.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuild from the configured sources and publish atomically. Returns the new entry count.
    pub fn refresh(&self) -> usize {
        let table = load_table(self.source.as_deref());
        let count = table.len();
        self.table.store(Arc::new(table));
        tracing::info!(count, "facility registry refreshed");
        count
    }

    /// Exact name first, then bidirectional substring match. An empty query never matches.
    pub fn find(&self, location: &str) -> Option<(String, FacilityInfo)> {
        let query = location.trim();
        if query.is_empty() {
            return None;
        }
        let table = self.table.load();
        if let Some(info) = table.get(query) {
            return Some((query.to_string(), info.clone()));
        }
        table
            .iter()
            .find(|(name, _)| query.contains(name.as_str()) || name.contains(query))
            .map(|(name, info)| (name.clone(), info.clone()))
    }

    /// One-sentence description of `location`: table hit, else one model call, else
    /// [`GENERIC_CONTEXT`]. Model answers are not cached.
    pub async fn context_for(
        &self,
        location: &str,
        generator: Option<&dyn TextGenerator>,
    ) -> String {
        if let Some((_, info)) = self.find(location) {
            return info.description;
        }
        let described = or_template(
            "facility_context",
            async {
                let generator = generator.ok_or(ModelError::Unavailable)?;
                let reply = generator.generate(&facility_context_prompt(location)).await?;
                Ok::<_, ModelError>(reply.trim().trim_matches('"').trim().to_string())
            },
            || GENERIC_CONTEXT.to_string(),
        )
        .await;
        if described.is_empty() {
            GENERIC_CONTEXT.to_string()
        } else {
            described
        }
    }
}

impl Default for FacilityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

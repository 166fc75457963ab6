use crate::domain::model::{OwnershipSummary, TaxRecord};
use crate::utils::error::{EnrichError, Result};
use regex::Regex;
use std::sync::LazyLock;

static OWNER_WITH_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?)(?:,\s*(LLC|INC|CORP(?:ORATION)?|LTD|LIMITED))\b(?:,\s*)?(.*)$")
        .expect("valid owner regex")
});
static CORPORATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bCORPORATION\b").expect("valid regex"));
static LIMITED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bLIMITED\b").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerIdentity {
    pub name: String,
    pub mailing_address: String,
}

/// 從 "Owner Info" 欄位拆出標準化的業主名稱與郵寄地址
pub fn normalize_owner(owner_info: &str) -> OwnerIdentity {
    let (name, mailing_address) = match OWNER_WITH_ENTITY.captures(owner_info.trim()) {
        Some(caps) => {
            let base = caps.get(1).map_or("", |m| m.as_str()).trim();
            let suffix = caps.get(2).map_or("", |m| m.as_str()).to_uppercase();
            let rest = caps.get(3).map_or("", |m| m.as_str());
            (
                format!("{} {}", base, suffix),
                rest.trim().trim_start_matches(',').trim().to_string(),
            )
        }
        None => match owner_info.split_once(',') {
            Some((name, rest)) => (name.trim().to_string(), rest.trim().to_string()),
            None => (owner_info.trim().to_string(), String::new()),
        },
    };

    let name = name
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let name = CORPORATION.replace_all(&name, "CORP");
    let name = LIMITED.replace_all(&name, "LTD").into_owned();

    OwnerIdentity {
        name,
        mailing_address,
    }
}

/// 讀取匯出的稅籍歷史 CSV（需含 Year 與 Owner Info 欄位）
pub fn read_tax_history(data: &[u8]) -> Result<Vec<TaxRecord>> {
    let mut reader = csv::Reader::from_reader(data);
    let headers = reader.headers()?.clone();

    let missing: Vec<String> = ["Year", "Owner Info"]
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EnrichError::FormatError { missing });
    }

    reader
        .deserialize()
        .map(|row| row.map_err(EnrichError::from))
        .collect()
}

fn parse_year(record: &TaxRecord) -> Result<i32> {
    record
        .year
        .trim()
        .parse::<i32>()
        .map_err(|e| EnrichError::ProcessingError {
            message: format!("invalid tax year '{}': {}", record.year, e),
        })
}

/// Derive the current owner's tenure from a most-recent-first tax history.
///
/// Returns `Ok(None)` for an empty history.
pub fn analyze_ownership(history: &[TaxRecord]) -> Result<Option<OwnershipSummary>> {
    let Some(latest) = history.first() else {
        return Ok(None);
    };

    let current = normalize_owner(&latest.owner_info);
    let current_year = parse_year(latest)?;

    let mut ownership_start_year = current_year;
    for record in history {
        if normalize_owner(&record.owner_info).name != current.name {
            break;
        }
        ownership_start_year = parse_year(record)?;
    }

    let years_owned = current_year
        .checked_sub(ownership_start_year)
        .and_then(|span| span.checked_add(1))
        .ok_or_else(|| EnrichError::ProcessingError {
            message: format!(
                "tax years {}..{} are out of range",
                ownership_start_year, current_year
            ),
        })?;

    Ok(Some(OwnershipSummary {
        owner: current.name,
        mailing_address: current.mailing_address,
        ownership_start_year,
        current_year,
        years_owned,
    }))
}

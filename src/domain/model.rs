use serde::{Deserialize, Serialize};

pub const REQUIRED_COLUMNS: [&str; 4] = ["address", "city", "state", "zip_code"];

/// One row of the input CSV. `columns` holds every input value in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub position: usize,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub columns: Vec<String>,
}

impl InputRecord {
    pub fn query(&self) -> LookupQuery {
        LookupQuery {
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupQuery {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl LookupQuery {
    pub fn search_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address, self.city, self.state, self.zip_code
        )
    }
}

/// Ordered key/value attributes returned by a lookup.
///
/// Re-inserting a key replaces its value but keeps its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn extend_prefixed<'a, I>(&mut self, prefix: &str, pairs: I)
    where
        I: IntoIterator<Item = &'a (String, String)>,
    {
        for (key, value) in pairs {
            self.insert(format!("{}{}", prefix, key), value.clone());
        }
    }

    pub fn merge(&mut self, other: &Attributes) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Attributes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

#[derive(Debug, Clone)]
pub struct EnrichedRecord {
    pub input: InputRecord,
    pub attributes: Attributes,
    pub lookup_error: Option<String>,
}

impl EnrichedRecord {
    pub fn is_failed(&self) -> bool {
        self.lookup_error.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub records: Vec<InputRecord>,
}

#[derive(Debug, Clone)]
pub struct EnrichmentResult {
    pub headers: Vec<String>,
    pub attribute_columns: Vec<String>,
    pub records: Vec<EnrichedRecord>,
}

impl EnrichmentResult {
    pub fn failed_lookups(&self) -> usize {
        self.records.iter().filter(|r| r.is_failed()).count()
    }
}

/// One row of a property's tax list history, most recent year first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRecord {
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Owner Info")]
    pub owner_info: String,
    #[serde(rename = "Land/Imp/Tot", default)]
    pub land_improvement_total: String,
    #[serde(rename = "Exemption", default)]
    pub exemption: String,
    #[serde(rename = "Assessed", default)]
    pub assessed: String,
}

impl TaxRecord {
    pub fn to_attributes(&self) -> Attributes {
        [
            ("tax_Year", &self.year),
            ("tax_Owner Info", &self.owner_info),
            ("tax_Land/Imp/Tot", &self.land_improvement_total),
            ("tax_Exemption", &self.exemption),
            ("tax_Assessed", &self.assessed),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.clone()))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipSummary {
    pub owner: String,
    pub mailing_address: String,
    pub ownership_start_year: i32,
    pub current_year: i32,
    pub years_owned: i32,
}

impl OwnershipSummary {
    pub fn to_attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("ownership_owner", self.owner.clone());
        attributes.insert("ownership_mailing_address", self.mailing_address.clone());
        attributes.insert(
            "ownership_start_year",
            self.ownership_start_year.to_string(),
        );
        attributes.insert("ownership_current_year", self.current_year.to_string());
        attributes.insert("ownership_years_owned", self.years_owned.to_string());
        attributes
    }
}

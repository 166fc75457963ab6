//! HTML parsing for the county property records portal.
//!
//! Everything here is synchronous and returns owned data, so no `scraper::Html`
//! is held across an `.await`.

use crate::domain::model::TaxRecord;
use crate::utils::error::LookupError;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

pub const NO_MATCH_MARKER: &str = "No matching property record found";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static HIDDEN_INPUT: LazyLock<Selector> = LazyLock::new(|| selector(r#"input[type="hidden"]"#));
static MUNICIPALITY_SELECT: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"select[id$="ddlMunicp1"]"#));
static ADDRESS_INPUT: LazyLock<Selector> = LazyLock::new(|| selector(r#"input[id$="txtAddress"]"#));
static SEARCH_BUTTON: LazyLock<Selector> = LazyLock::new(|| selector(r#"input[id$="btnSearch1"]"#));
static OPTION: LazyLock<Selector> = LazyLock::new(|| selector("option"));

static DETAILS_TABLE: LazyLock<Selector> =
    LazyLock::new(|| selector("#ctl00_ContentPlaceHolder1_PrimPropInfo_gvDtls"));
static DETAILS_TABLE_FALLBACK: LazyLock<Selector> = LazyLock::new(|| selector(".propertyDetails"));
static OWNERSHIP_TABLE: LazyLock<Selector> = LazyLock::new(|| selector(".ownershipInfo"));
static METADATA_TABLE: LazyLock<Selector> = LazyLock::new(|| selector(".metadata"));
static PROPERTY_ID: LazyLock<Selector> =
    LazyLock::new(|| selector("#ctl00_ContentPlaceHolder1_hdnPID"));

static TAX_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("#gvwMod4"));
static TAX_ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr.itemstyle, tr.altitemstyle"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn required_name(
    document: &Html,
    selector: &Selector,
    what: &str,
) -> Result<(String, Option<String>), LookupError> {
    let element = document
        .select(selector)
        .next()
        .ok_or_else(|| LookupError::Malformed(format!("search form has no {}", what)))?;
    let name = element
        .value()
        .attr("name")
        .ok_or_else(|| LookupError::Malformed(format!("{} has no name attribute", what)))?;
    Ok((
        name.to_string(),
        element.value().attr("value").map(str::to_string),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MunicipalityOption {
    pub value: String,
    pub label: String,
}

/// The "By Address" search form, with the ASP.NET state fields it must echo back.
#[derive(Debug, Clone)]
pub struct SearchForm {
    hidden_fields: Vec<(String, String)>,
    municipality_field: String,
    municipalities: Vec<MunicipalityOption>,
    address_field: String,
    button: (String, String),
}

impl SearchForm {
    pub fn parse(html: &str) -> Result<Self, LookupError> {
        let document = Html::parse_document(html);

        let hidden_fields = document
            .select(&HIDDEN_INPUT)
            .filter_map(|input| {
                let name = input.value().attr("name")?;
                let value = input.value().attr("value").unwrap_or_default();
                Some((name.to_string(), value.to_string()))
            })
            .collect();

        let select = document
            .select(&MUNICIPALITY_SELECT)
            .next()
            .ok_or_else(|| LookupError::Malformed("search form has no municipality list".into()))?;
        let municipality_field = select
            .value()
            .attr("name")
            .ok_or_else(|| LookupError::Malformed("municipality list has no name".into()))?
            .to_string();
        let municipalities = select
            .select(&OPTION)
            .map(|option| {
                let label = element_text(option);
                let value = option
                    .value()
                    .attr("value")
                    .map(str::to_string)
                    .unwrap_or_else(|| label.clone());
                MunicipalityOption { value, label }
            })
            .collect();

        let (address_field, _) = required_name(&document, &ADDRESS_INPUT, "address input")?;
        let (button_name, button_value) =
            required_name(&document, &SEARCH_BUTTON, "search button")?;

        Ok(Self {
            hidden_fields,
            municipality_field,
            municipalities,
            address_field,
            button: (button_name, button_value.unwrap_or_else(|| "Search".to_string())),
        })
    }

    pub fn municipalities(&self) -> &[MunicipalityOption] {
        &self.municipalities
    }

    pub fn find_municipality(&self, name: &str) -> Option<&MunicipalityOption> {
        let wanted = name.trim();
        self.municipalities
            .iter()
            .find(|option| option.label.eq_ignore_ascii_case(wanted))
    }

    /// Form fields for a search; fails when the municipality is not offered.
    pub fn fill(
        &self,
        street_address: &str,
        municipality: &str,
    ) -> Result<Vec<(String, String)>, LookupError> {
        let option = self
            .find_municipality(municipality)
            .ok_or_else(|| LookupError::UnknownMunicipality(municipality.to_string()))?;

        let mut fields = self.hidden_fields.clone();
        fields.push((self.municipality_field.clone(), option.value.clone()));
        fields.push((self.address_field.clone(), street_address.to_string()));
        fields.push(self.button.clone());
        Ok(fields)
    }
}

/// Key/value tables scraped from a property details page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyPage {
    pub details: Vec<(String, String)>,
    pub ownership: Vec<(String, String)>,
    pub metadata: Vec<(String, String)>,
    pub property_id: Option<String>,
}

fn key_value_rows(table: ElementRef<'_>) -> Vec<(String, String)> {
    table
        .select(&ROW)
        .filter_map(|row| {
            let cells: Vec<ElementRef> = row.select(&CELL).collect();
            if cells.len() < 2 {
                return None;
            }
            let key = element_text(cells[0]);
            if key.is_empty() {
                return None;
            }
            Some((key, element_text(cells[1])))
        })
        .collect()
}

fn optional_table(document: &Html, selector: &Selector) -> Vec<(String, String)> {
    document
        .select(selector)
        .next()
        .map(key_value_rows)
        .unwrap_or_default()
}

pub fn parse_property_page(html: &str) -> Result<PropertyPage, LookupError> {
    if html.contains(NO_MATCH_MARKER) {
        return Err(LookupError::NoMatch);
    }

    let document = Html::parse_document(html);

    let details_table = document
        .select(&DETAILS_TABLE)
        .next()
        .or_else(|| {
            tracing::debug!("Details table not found by id, falling back to .propertyDetails");
            document.select(&DETAILS_TABLE_FALLBACK).next()
        })
        .ok_or_else(|| {
            LookupError::Malformed("results page has no property details table".to_string())
        })?;

    let property_id = document
        .select(&PROPERTY_ID)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    Ok(PropertyPage {
        details: key_value_rows(details_table),
        ownership: optional_table(&document, &OWNERSHIP_TABLE),
        metadata: optional_table(&document, &METADATA_TABLE),
        property_id,
    })
}

/// Rows of the tax list history table (first page only).
pub fn parse_tax_history(html: &str) -> Result<Vec<TaxRecord>, LookupError> {
    let document = Html::parse_document(html);
    let table = document
        .select(&TAX_TABLE)
        .next()
        .ok_or_else(|| LookupError::Malformed("tax list history table not found".to_string()))?;

    let records = table
        .select(&TAX_ROW)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&CELL).map(element_text).collect();
            if cells.len() < 5 {
                return None;
            }
            Some(TaxRecord {
                year: cells[0].clone(),
                owner_info: cells[1].clone(),
                land_improvement_total: cells[2].clone(),
                exemption: cells[3].clone(),
                assessed: cells[4].clone(),
            })
        })
        .collect();

    Ok(records)
}

//! Lookup adapter for the Monmouth County OPRS property records portal.

pub mod page;

use crate::config::SourceSettings;
use crate::core::address::{expand_street_suffixes, title_case};
use crate::core::ownership::analyze_ownership;
use crate::domain::model::{Attributes, LookupQuery, TaxRecord};
use crate::domain::ports::PropertyLookup;
use crate::utils::error::{EnrichError, LookupError, Result};
use async_trait::async_trait;
use page::{parse_property_page, parse_tax_history, PropertyPage, SearchForm};
use reqwest::Client;
use url::Url;

const SEARCH_PAGE: &str = "Default.aspx";
const TAX_HISTORY_PAGE: &str = "ShowMod4.aspx";

pub struct OprsClient {
    client: Client,
    base_url: Url,
    settings: SourceSettings,
}

impl OprsClient {
    pub fn new(settings: SourceSettings) -> Result<Self> {
        let base_url = parse_base_url(&settings.base_url)?;

        // ASP.NET 表單需要 session cookie
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            settings,
        })
    }

    fn page_url(&self, page: &str) -> std::result::Result<Url, LookupError> {
        self.base_url
            .join(page)
            .map_err(|e| LookupError::Malformed(format!("invalid page url '{}': {}", page, e)))
    }

    async fn read_body(response: reqwest::Response) -> std::result::Result<String, LookupError> {
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response.text().await?)
    }

    async fn fetch_page(&self, url: Url) -> std::result::Result<String, LookupError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::read_body(response).await
    }

    async fn search(&self, query: &LookupQuery) -> std::result::Result<PropertyPage, LookupError> {
        let street_address = if self.settings.expand_street_suffixes {
            expand_street_suffixes(&query.address)
        } else {
            query.address.clone()
        };
        let municipality = title_case(&query.city);
        tracing::debug!(
            "Searching {} in municipality {}",
            street_address,
            municipality
        );

        let search_url = self.page_url(SEARCH_PAGE)?;
        let search_html = self.fetch_page(search_url.clone()).await?;
        let fields = SearchForm::parse(&search_html)?.fill(&street_address, &municipality)?;

        tracing::debug!("POST {} ({} form fields)", search_url, fields.len());
        let response = self.client.post(search_url).form(&fields).send().await?;
        let results_html = Self::read_body(response).await?;

        parse_property_page(&results_html)
    }

    async fn tax_history(
        &self,
        property_id: &str,
    ) -> std::result::Result<Vec<TaxRecord>, LookupError> {
        let mut url = self.page_url(TAX_HISTORY_PAGE)?;
        url.query_pairs_mut().append_pair("p", property_id);
        let html = self.fetch_page(url).await?;
        parse_tax_history(&html)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    // Url::join 需要結尾的 '/' 才會保留最後一段路徑
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|e| EnrichError::InvalidConfigValueError {
        field: "source.base_url".to_string(),
        value: raw.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

fn history_attributes(history: &[TaxRecord]) -> Attributes {
    let mut attributes = Attributes::new();
    let Some(latest) = history.first() else {
        return attributes;
    };

    attributes.merge(&latest.to_attributes());

    match analyze_ownership(history) {
        Ok(Some(summary)) => {
            attributes.merge(&summary.to_attributes());
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Skipping ownership analysis: {}", e),
    }

    attributes
}

#[async_trait]
impl PropertyLookup for OprsClient {
    async fn lookup(&self, query: &LookupQuery) -> std::result::Result<Attributes, LookupError> {
        let page = self.search(query).await?;

        let mut attributes = Attributes::new();
        attributes.extend_prefixed("property_", &page.details);
        attributes.extend_prefixed("owner_", &page.ownership);
        attributes.extend_prefixed("meta_", &page.metadata);

        if self.settings.include_tax_history {
            match page.property_id.as_deref() {
                Some(property_id) => match self.tax_history(property_id).await {
                    Ok(history) => {
                        tracing::debug!(
                            "Extracted {} tax history rows for property {}",
                            history.len(),
                            property_id
                        );
                        attributes.merge(&history_attributes(&history));
                    }
                    // 稅籍歷史失敗時仍保留物業資料
                    Err(e) => tracing::warn!(
                        "Tax list history unavailable for property {}: {}",
                        property_id,
                        e
                    ),
                },
                None => tracing::debug!("Results page has no property id, skipping tax history"),
            }
        }

        Ok(attributes)
    }
}

use anyhow::{bail, Context};
use getset::Getters;
use log::trace;
use reqwest::{header, redirect, StatusCode};
use url::Url;

use crate::{config::ScanConfig, encoding, record::EventId};

/// A page that was confirmed to exist and was downloaded.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct Page {
    link: Url,
    html: String,
}
impl Page {
    pub fn new(link: Url, html: String) -> Self {
        Self { link, html }
    }
}

#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Returns `Ok(None)` if there is no page for `id`.
    async fn fetch(&self, id: EventId) -> anyhow::Result<Option<Page>>;
}

pub struct DocsClient {
    lookup: reqwest::Client,
    retrieve: reqwest::Client,
    base_url: String,
}

impl DocsClient {
    pub fn new(config: &ScanConfig) -> anyhow::Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).with_context(|| format!("Invalid base URL: {base_url:?}"))?;
        // A redirect means the requested page itself does not exist.
        let lookup = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;
        let retrieve = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self {
            lookup,
            retrieve,
            base_url,
        })
    }

    pub fn page_url(&self, id: EventId) -> anyhow::Result<Url> {
        Ok(Url::parse(&format!("{}/event-{id}", self.base_url))?)
    }

    async fn exists(&self, url: &Url) -> anyhow::Result<bool> {
        let response = self.lookup.head(url.clone()).send().await?;
        trace!("HEAD {url} => {}", response.status());
        Ok(response.status() == StatusCode::OK)
    }

    async fn download(&self, url: &Url) -> anyhow::Result<String> {
        let response = self.retrieve.get(url.clone()).send().await?;
        if !response.status().is_success() {
            bail!(
                "Unexpected error code: server returned {:?}",
                response.status()
            );
        }
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|x| x.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?;
        Ok(encoding::decode(&body, content_type.as_deref()))
    }
}

impl PageSource for DocsClient {
    async fn fetch(&self, id: EventId) -> anyhow::Result<Option<Page>> {
        let link = self.page_url(id)?;
        if !self
            .exists(&link)
            .await
            .with_context(|| format!("While probing {link}"))?
        {
            return Ok(None);
        }
        let html = self
            .download(&link)
            .await
            .with_context(|| format!("While downloading {link}"))?;
        Ok(Some(Page { link, html }))
    }
}

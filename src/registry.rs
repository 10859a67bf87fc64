/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

//! Thin authenticated client for the EDINET v2 listing/download endpoints and
//! the static code-list archive. Non-2xx responses come back as
//! [`IngestError::UnexpectedStatus`] so ingestion loops can skip the unit of
//! work and continue.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use log::info;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::{IngestError, Result};

/// The registry's closed set of downloadable packages per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    /// Kind 1: the primary (XBRL) package.
    Package,
    /// Kind 2: rendered PDF.
    Pdf,
    /// Kind 3: attachments.
    Attachment,
    /// Kind 4: English documents.
    English,
    /// Kind 5: the CSV export package.
    Csv,
}

impl DownloadKind {
    pub fn type_code(self) -> u8 {
        match self {
            DownloadKind::Package => 1,
            DownloadKind::Pdf => 2,
            DownloadKind::Attachment => 3,
            DownloadKind::English => 4,
            DownloadKind::Csv => 5,
        }
    }

    /// Extension of the materialized file.
    pub fn extension(self) -> &'static str {
        match self {
            DownloadKind::Pdf => ".pdf",
            _ => ".zip",
        }
    }
}

pub struct RegistryClient {
    http: Client,
    base_url: String,
    subscription_key: String,
    download_dir: PathBuf,
    code_list_url: String,
}

impl RegistryClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(RegistryClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            subscription_key: config.subscription_key.clone(),
            download_dir: config.download_dir.clone(),
            code_list_url: config.code_list_url.clone(),
        })
    }

    /// One day's filing listing. `doc_info_type` 2 requests full metadata.
    pub fn list_filings(&self, date: NaiveDate, doc_info_type: u8) -> Result<Value> {
        let url = format!("{}/documents.json", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("date", date.format("%Y-%m-%d").to_string()),
                ("type", doc_info_type.to_string()),
                ("Subscription-Key", self.subscription_key.clone()),
            ])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus {
                status: status.as_u16(),
                context: format!("listing for {date}"),
            });
        }
        Ok(resp.json()?)
    }

    /// Download one document package and materialize it under the download
    /// dir as `{edinetCode}_{docID}{ext}`. Returns the local path.
    pub fn download_document(
        &self,
        doc_id: &str,
        edinet_code: &str,
        kind: DownloadKind,
    ) -> Result<PathBuf> {
        info!("download_document doc_id={doc_id} kind={}", kind.type_code());
        let url = format!("{}/documents/{}", self.base_url, doc_id);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("type", kind.type_code().to_string()),
                ("Subscription-Key", self.subscription_key.clone()),
            ])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus {
                status: status.as_u16(),
                context: format!("document {doc_id}"),
            });
        }

        fs::create_dir_all(&self.download_dir)?;
        let path = self
            .download_dir
            .join(format!("{edinet_code}_{doc_id}{}", kind.extension()));
        let bytes = resp.bytes()?;
        let mut file = File::create(&path)?;
        file.write_all(&bytes)?;
        Ok(path)
    }

    /// The static EDINET code-list ZIP (the universe of known filers).
    pub fn fetch_code_list(&self) -> Result<Vec<u8>> {
        let resp = self.http.get(&self.code_list_url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus {
                status: status.as_u16(),
                context: "code list".to_string(),
            });
        }
        Ok(resp.bytes()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_kind_codes_and_extensions() {
        assert_eq!(DownloadKind::Package.type_code(), 1);
        assert_eq!(DownloadKind::Csv.type_code(), 5);
        assert_eq!(DownloadKind::Csv.extension(), ".zip");
        assert_eq!(DownloadKind::Pdf.extension(), ".pdf");
    }
}

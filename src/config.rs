/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

use std::env;
use std::path::PathBuf;

use crate::error::{IngestError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.edinet-fsa.go.jp/api/v2";
pub const DEFAULT_CODE_LIST_URL: &str =
    "https://disclosure2dl.edinet-fsa.go.jp/searchdocument/codelist/Edinetcode.zip";

/// Runtime settings, read once at startup. `.env` loading (dotenvy) happens in
/// the binary before this is constructed.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub subscription_key: String,
    pub db_path: String,
    pub download_dir: PathBuf,
    pub code_list_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let subscription_key = env::var("EDINET_SUBSCRIPTION_KEY")
            .map_err(|_| IngestError::Config("EDINET_SUBSCRIPTION_KEY is not set".into()))?;
        let db_path = env::var("EDINET_DB")
            .map_err(|_| IngestError::Config("EDINET_DB is not set".into()))?;
        let base_url =
            env::var("EDINET_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let download_dir = env::var("EDINET_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/downloads"));
        let code_list_url =
            env::var("EDINET_CODE_LIST_URL").unwrap_or_else(|_| DEFAULT_CODE_LIST_URL.to_string());

        Ok(Config {
            base_url,
            subscription_key,
            db_path,
            download_dir,
            code_list_url,
        })
    }
}

//! アプリケーション設定ファイルの管理
//!
//! 検索期間・取得件数・送信元一覧を order_mail_config.json で管理する。
//! アクセストークンはこのファイルに保存しない（環境変数かコマンドライン引数で渡す）。

use crate::gmail::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::logic::sync_logic::{default_senders, is_valid_simple_email, SenderQuery};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "order_mail_config.json";

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub sync: SyncConfig,
    #[serde(default = "default_senders")]
    pub senders: Vec<SenderQuery>,
}

/// 同期（Gmail）設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// 開始日を省略したときに遡る月数
    pub lookback_months: u32,
    pub max_results_per_query: u32,
    pub fetch_concurrency: usize,
    pub request_timeout_secs: u64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            lookback_months: 2,
            max_results_per_query: 500,
            fetch_concurrency: 4,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            api_base_url: default_api_base_url(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            senders: default_senders(),
        }
    }
}

impl AppConfig {
    /// 設定値の妥当性チェック
    pub fn validate(&self) -> Result<(), String> {
        if self.sync.max_results_per_query == 0 {
            return Err("sync.max_results_per_query must be greater than 0".to_string());
        }
        if self.sync.fetch_concurrency == 0 {
            return Err("sync.fetch_concurrency must be greater than 0".to_string());
        }
        if self.sync.request_timeout_secs == 0 {
            return Err("sync.request_timeout_secs must be greater than 0".to_string());
        }
        if let Some(sender) = self
            .senders
            .iter()
            .find(|s| !is_valid_simple_email(&s.address))
        {
            return Err(format!("Invalid sender address: {}", sender.address));
        }
        Ok(())
    }
}

/// 設定を読み込む。ファイルが存在しない場合はデフォルトを返し、保存する。
pub fn load(config_dir: &Path) -> Result<AppConfig, String> {
    let path = config_dir.join(CONFIG_FILENAME);

    let config = if path.exists() {
        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        serde_json::from_str(&contents).map_err(|e| format!("Invalid config JSON: {e}"))?
    } else {
        log::info!("Config file not found, writing defaults to {}", path.display());
        let config = AppConfig::default();
        save(config_dir, &config)?;
        config
    };

    config.validate()?;
    Ok(config)
}

/// 設定を保存する。
pub fn save(config_dir: &Path, config: &AppConfig) -> Result<(), String> {
    fs::create_dir_all(config_dir).map_err(|e| format!("Failed to create config dir: {e}"))?;

    let path = config_dir.join(CONFIG_FILENAME);
    let contents = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {e}"))?;

    fs::write(&path, contents).map_err(|e| format!("Failed to write config file: {e}"))
}

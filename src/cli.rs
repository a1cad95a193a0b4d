//! コマンドライン実行
//!
//! 設定読み込み → 検索期間の決定 → Gmail から取得 → 抽出 → 既存一覧とのマージ
//! までを行い、統合後の注文一覧を JSON で返す。

use crate::config;
use crate::gmail::{
    fetch_orders, FetchOptions, GmailClient, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::gmail_client::GmailClientTrait;
use crate::logic::order_logic::{filter_orders, merge_orders, summarize_spending, SpendingTotals};
use crate::logic::sync_logic::{resolve_search_window, today_in_india};
use crate::parsers::{OrderRecord, Platform};
use chrono::NaiveDate;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "bitebill")]
#[command(about = "Extract Swiggy and Zomato food orders from Gmail receipts")]
pub struct Cli {
    /// Gmail API の OAuth アクセストークン（gmail.readonly スコープ）
    #[arg(long, env = "GMAIL_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// 検索開始日 (YYYY-MM-DD)
    #[arg(long)]
    pub after: Option<NaiveDate>,

    /// 検索終了日 (YYYY-MM-DD, 含む)
    #[arg(long)]
    pub before: Option<NaiveDate>,

    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,

    /// 既存の注文一覧 JSON。指定すると取得結果をマージして出力する
    #[arg(long)]
    pub existing: Option<PathBuf>,

    #[arg(long, help = "Print per-platform spending totals for the window to stderr")]
    pub summary: bool,

    /// --summary の集計対象を1プラットフォームに絞る (swiggy / zomato)
    #[arg(long, requires = "summary")]
    pub platform: Option<Platform>,
}

/// 既存の注文一覧 JSON を読み込む
pub fn load_orders(path: &Path) -> Result<Vec<OrderRecord>, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read orders file: {e}"))?;
    serde_json::from_str(&contents).map_err(|e| format!("Invalid orders JSON: {e}"))
}

/// CLI を実行し、出力する JSON 文字列を返す
pub async fn run(cli: &Cli) -> Result<String, String> {
    let app_config = config::load(&cli.config_dir)?;
    let client = build_client(&cli.access_token, &app_config.sync)?;
    run_with_client(cli, &app_config, &client, today_in_india()).await
}

/// 設定に応じて Gmail クライアントを作る
///
/// 接続先・タイムアウトが既定値なら本番用の `GmailClient::new` を使う。
pub fn build_client(access_token: &str, sync: &config::SyncConfig) -> Result<GmailClient, String> {
    let is_default = sync.api_base_url.trim_end_matches('/') == DEFAULT_API_BASE_URL
        && sync.request_timeout_secs == DEFAULT_REQUEST_TIMEOUT_SECS;
    if is_default {
        return GmailClient::new(access_token);
    }

    log::info!("Using custom Gmail API settings");
    GmailClient::with_base_url(
        access_token,
        &sync.api_base_url,
        Duration::from_secs(sync.request_timeout_secs),
    )
}

/// --summary で表示する1行
pub fn format_summary(
    added_count: usize,
    platform: Option<Platform>,
    totals: &SpendingTotals,
) -> String {
    let scope = platform.map_or_else(|| "All platforms".to_string(), |p| p.to_string());
    format!(
        "{added_count} new order(s). {scope}: {} order(s), {:.2} INR (Swiggy: {} / {:.2} INR, Zomato: {} / {:.2} INR)",
        totals.order_count(),
        totals.grand_total(),
        totals.swiggy_count,
        totals.swiggy_total,
        totals.zomato_count,
        totals.zomato_total
    )
}

/// クライアントと基準日を外から渡せる run（テスト用）
pub async fn run_with_client<C: GmailClientTrait + ?Sized>(
    cli: &Cli,
    app_config: &config::AppConfig,
    client: &C,
    today: NaiveDate,
) -> Result<String, String> {
    let window = resolve_search_window(
        cli.after,
        cli.before,
        today,
        app_config.sync.lookback_months,
    )?;
    log::info!("Search window: {} .. {}", window.after, window.before);

    let existing = match &cli.existing {
        Some(path) if path.exists() => load_orders(path)?,
        Some(path) => {
            log::info!("Orders file {} not found, starting empty", path.display());
            Vec::new()
        }
        None => Vec::new(),
    };

    let options = FetchOptions {
        max_results_per_query: app_config.sync.max_results_per_query,
        concurrency: app_config.sync.fetch_concurrency,
    };
    let fetched = fetch_orders(client, &app_config.senders, &window, &options).await;
    log::info!("Extracted {} order(s)", fetched.len());

    let merged = merge_orders(existing, fetched);

    if cli.summary {
        let in_window = filter_orders(
            &merged.orders,
            Some(window.after),
            Some(window.before),
            cli.platform,
        );
        let totals = summarize_spending(in_window);
        eprintln!("{}", format_summary(merged.added_count, cli.platform, &totals));
    }

    serde_json::to_string_pretty(&merged.orders)
        .map_err(|e| format!("Failed to serialize orders: {e}"))
}

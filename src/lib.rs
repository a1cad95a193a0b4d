//! Gmail の注文確認メールから Swiggy / Zomato の注文を取り出すライブラリ
//!
//! - `parsers`: メール1通 → 注文レコードの純粋な抽出エンジン
//! - `gmail`: Gmail REST API からの取得
//! - `logic`: 検索クエリ組み立て・注文一覧の統合などの純粋関数
//! - `config` / `cli`: 設定ファイルとコマンドライン実行

use std::io::Write;

pub mod cli;
pub mod config;
pub mod gmail;
pub mod gmail_client;
pub mod logic;
pub mod parsers;

pub use parsers::{extract_orders, parse_order_email, OrderRecord, Platform};

/// ロガーを初期化する
///
/// リリースビルドでは Warn 以上、デバッグビルドでは Info 以上を出力する。
/// RUST_LOG が設定されていればそちらを優先する。
pub fn init_logger() {
    #[cfg(debug_assertions)]
    let default_level = log::LevelFilter::Info;
    #[cfg(not(debug_assertions))]
    let default_level = log::LevelFilter::Warn;

    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format(|buf, record| {
            // タイムスタンプは IST
            writeln!(
                buf,
                "[{} {:5} {}] {}",
                chrono::Utc::now()
                    .with_timezone(&chrono_tz::Asia::Kolkata)
                    .format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

//! Gmail 検索関連のビジネスロジック
//!
//! このモジュールは検索クエリ・検索期間の組み立てに関する純粋関数を提供します。
//! Gmail API へのアクセスは持たないためテストが容易です。

use crate::parsers::Platform;
use chrono::{Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 検索対象の送信元アドレスとそのプラットフォーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderQuery {
    pub address: String,
    pub platform: Platform,
}

impl SenderQuery {
    pub fn new(address: &str, platform: Platform) -> Self {
        Self {
            address: address.to_string(),
            platform,
        }
    }
}

/// 既知の注文メール送信元
pub fn default_senders() -> Vec<SenderQuery> {
    vec![
        SenderQuery::new("noreply@swiggy.in", Platform::Swiggy),
        SenderQuery::new("no-reply@zomato.com", Platform::Zomato),
        SenderQuery::new("orders@swiggy.in", Platform::Swiggy),
        SenderQuery::new("order@zomato.com", Platform::Zomato),
    ]
}

/// 検索期間（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub after: NaiveDate,
    pub before: NaiveDate,
}

impl SearchWindow {
    /// 開始日が終了日より後ならエラー
    pub fn new(after: NaiveDate, before: NaiveDate) -> Result<Self, String> {
        if after > before {
            return Err(format!(
                "Invalid search window: start date {after} is after end date {before}"
            ));
        }
        Ok(Self { after, before })
    }

    /// today から months ヶ月前〜today の期間
    pub fn last_months(today: NaiveDate, months: u32) -> Self {
        let after = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        Self {
            after,
            before: today,
        }
    }
}

/// インド標準時での今日の日付
pub fn today_in_india() -> NaiveDate {
    Utc::now()
        .with_timezone(&chrono_tz::Asia::Kolkata)
        .date_naive()
}

/// 指定があればその日付を、なければ「lookback_months ヶ月前〜今日」を使って検索期間を決める
///
/// # Arguments
/// * `after` - 開始日（None なら終了日から lookback_months ヶ月前）
/// * `before` - 終了日（None なら today）
/// * `today` - 基準日
/// * `lookback_months` - 開始日省略時に遡る月数
pub fn resolve_search_window(
    after: Option<NaiveDate>,
    before: Option<NaiveDate>,
    today: NaiveDate,
    lookback_months: u32,
) -> Result<SearchWindow, String> {
    let before = before.unwrap_or(today);
    let after = match after {
        Some(date) => date,
        None => SearchWindow::last_months(before, lookback_months).after,
    };
    SearchWindow::new(after, before)
}

/// Gmail検索クエリを構築する
///
/// # Arguments
/// * `sender` - 検索対象の送信元
/// * `window` - 検索期間（両端を含む）
///
/// # Returns
/// Gmailの検索クエリ文字列。Gmail の `before:` は指定日を含まないため終了日の翌日を指定する
///
/// # Examples
/// ```
/// use bitebill_lib::logic::sync_logic::{build_search_query, SearchWindow, SenderQuery};
/// use bitebill_lib::parsers::Platform;
/// use chrono::NaiveDate;
///
/// let window = SearchWindow::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
/// )
/// .unwrap();
/// let query = build_search_query(&SenderQuery::new("noreply@swiggy.in", Platform::Swiggy), &window);
/// assert_eq!(query, "from:noreply@swiggy.in after:2024/01/01 before:2024/03/01");
/// ```
pub fn build_search_query(sender: &SenderQuery, window: &SearchWindow) -> String {
    let before_exclusive = window
        .before
        .checked_add_days(Days::new(1))
        .unwrap_or(window.before);
    format!(
        "from:{} after:{} before:{}",
        sender.address,
        window.after.format("%Y/%m/%d"),
        before_exclusive.format("%Y/%m/%d")
    )
}

/// 最低限の形式チェックを行うシンプルなメールアドレスバリデーション
/// - '@'で分割して2要素のみ
/// - ローカル部・ドメイン部がともに非空
/// - 空白文字を含まない
pub fn is_valid_simple_email(email: &str) -> bool {
    let trimmed = email.trim();
    let mut parts = trimmed.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && !local.contains(char::is_whitespace)
        && !domain.contains(char::is_whitespace)
}

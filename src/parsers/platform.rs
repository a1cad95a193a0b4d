//! 送信元からデリバリープラットフォームを判定する

use super::Platform;

/// From ヘッダーの値からプラットフォームを判定する
///
/// 大文字小文字を無視して "swiggy" → "zomato" の順に部分一致で判定する。
/// 両方を含む場合は Swiggy を返す。
pub fn detect_platform(from_address: &str) -> Option<Platform> {
    let from_lower = from_address.to_lowercase();
    if from_lower.contains("swiggy") {
        Some(Platform::Swiggy)
    } else if from_lower.contains("zomato") {
        Some(Platform::Zomato)
    } else {
        None
    }
}

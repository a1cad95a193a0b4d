//! MIME パートツリーを1つのテキストに平坦化する
//!
//! text/plain と text/html を区別せずに連結する（金額・商品名パターンの取りこぼしを減らすため）。
//! 本文の内容そのものはログに出さず、長さのみを出力する。

use crate::gmail::MessagePart;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// パディング有無どちらも受け付ける base64url エンジン
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// パートツリー全体を平坦化したテキストを返す
///
/// ルートパートにインラインデータがあればそれだけをデコードして返す。
/// なければ子パートを文書順に再帰的にたどり、各パート自身のデータ → 子パートの順で連結する。
pub fn flatten_body(payload: &MessagePart) -> String {
    if let Some(data) = payload.encoded_data() {
        return decode_part_data(data, payload.mime_type.as_deref()).unwrap_or_default();
    }

    let mut text = String::new();
    append_parts(&payload.parts, &mut text);
    log::debug!("Flattened body: {} chars", text.len());
    text
}

fn append_parts(parts: &[MessagePart], text: &mut String) {
    for part in parts {
        if let Some(data) = part.encoded_data() {
            if let Some(decoded) = decode_part_data(data, part.mime_type.as_deref()) {
                text.push_str(&decoded);
            }
        }
        if !part.parts.is_empty() {
            append_parts(&part.parts, text);
        }
    }
}

/// base64（標準 / URL-safe、パディング有無、改行混じりのいずれも可）をデコードしてテキスト化する
///
/// デコードできない場合は None（そのパートは何も寄与しない）。
pub fn decode_part_data(data: &str, mime_type: Option<&str>) -> Option<String> {
    // 標準アルファベットは URL-safe に寄せてから一括でデコードする
    let normalized: String = data
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    match URL_SAFE_LENIENT.decode(normalized.as_bytes()) {
        Ok(bytes) => Some(decode_text(&bytes, mime_type)),
        Err(e) => {
            log::warn!(
                "Base64 decode failed: {:?}, input length: {}",
                e,
                data.len()
            );
            None
        }
    }
}

/// バイト列を文字列にデコードする
///
/// mime_type に認識できる charset が指定されていればそれを使い、なければ UTF-8。
/// 不正シーケンスは置換文字にして部分的な結果を返す。
fn decode_text(bytes: &[u8], mime_type: Option<&str>) -> String {
    let encoding = mime_type
        .and_then(charset_label)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);

    let (decoded, _, had_replacements) = encoding.decode(bytes);
    if had_replacements {
        log::warn!(
            "{} decode had replacement chars; returning partial content",
            encoding.name()
        );
    }
    decoded.into_owned()
}

/// "text/html; charset=\"ISO-8859-1\"" から charset ラベルを取り出す
fn charset_label(mime_type: &str) -> Option<String> {
    mime_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

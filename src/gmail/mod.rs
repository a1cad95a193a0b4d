//! Gmail関連モジュール

pub mod client;
pub mod message;
pub mod order_fetch;

pub use client::{GmailClient, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use message::{Header, MessageBody, MessagePart, RawMessage};
pub use order_fetch::{fetch_all_message_ids, fetch_order_emails, fetch_orders, FetchOptions};

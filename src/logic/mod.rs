//! 外部依存を持たないビジネスロジック

pub mod order_logic;
pub mod sync_logic;

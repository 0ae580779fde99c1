//! App - 構築と設定
//!
//! # 主要コンポーネント
//! - **ObservableBuilder**: Observable の構築（Fail-fast 検証）
//! - **ObservableConfig**: 宣言的な observable element / observer の設定
//! - **HandlerTable**: 設定から参照される名前付き handler
//! - **ObserverCounts**: observer の集計ビュー

pub mod builder;
pub mod config;
pub mod status;

pub use self::builder::ObservableBuilder;
pub use self::config::{HandlerTable, ObservableConfig, ObserverConfig};
pub use self::status::ObserverCounts;

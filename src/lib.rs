//! UnReDO AI画像生成スタジオ（CLI）
//!
//! 状態管理は unredo_common、ここではファイル読み込み・API呼び出し・保存を扱う

pub mod backend;
pub mod cli;
pub mod config;
pub mod decode;
pub mod download;
pub mod error;
pub mod session;

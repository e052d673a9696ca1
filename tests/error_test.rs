//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use std::path::Path;
use tempfile::tempdir;
use unredo_studio::decode::decode_file;
use unredo_studio::error::StudioError;

/// 存在しないファイルを添付した場合
#[tokio::test]
async fn test_decode_nonexistent_file() {
    let result = decode_file(Path::new("/nonexistent/path/12345.png")).await;

    let err = result.unwrap_err();
    assert!(matches!(err, StudioError::FileNotFound(_)));
}

/// 画像でないファイルを添付した場合
#[tokio::test]
async fn test_decode_non_image_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();

    let err = decode_file(&path).await.unwrap_err();
    assert!(matches!(err, StudioError::Decode(_)));
}

/// StudioErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        StudioError::Config("テスト設定エラー".to_string()),
        StudioError::FileNotFound("test.png".to_string()),
        StudioError::Decode("壊れた画像".to_string()),
        StudioError::ApiCall("API呼び出し失敗".to_string()),
        StudioError::ApiParse("画像なし".to_string()),
        StudioError::Download("保存失敗".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = format!("{}", StudioError::MissingApiKey);

    assert!(display.contains("APIキー"));
    assert!(display.contains("unredo config"));
    assert!(display.contains("GEMINI_API_KEY"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: StudioError = io_err.into();

    assert!(matches!(err, StudioError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: StudioError = json_err.into();

    assert!(matches!(err, StudioError::JsonParse(_)));
}

/// common::Errorは透過的に表示される
#[test]
fn test_core_error_transparent() {
    let core_err = unredo_common::Error::EmptyPrompt;
    let expected = core_err.to_string();
    let err: StudioError = core_err.into();

    assert!(matches!(err, StudioError::Core(_)));
    assert_eq!(err.to_string(), expected);
}

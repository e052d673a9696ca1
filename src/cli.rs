use clap::{Parser, Subcommand};
use std::path::PathBuf;
use unredo_common::{AspectRatio, ImageResolution};

#[derive(Parser)]
#[command(name = "unredo")]
#[command(about = "UnReDO AI画像生成スタジオ", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を生成して保存
    Generate {
        /// メインプロンプト（省略時は対話入力）
        prompt: Option<String>,

        /// 背景・環境の説明
        #[arg(short, long)]
        env: Option<String>,

        /// 画像に入れる見出しテキスト
        #[arg(long)]
        headline: Option<String>,

        /// モデルID（デフォルト: 設定ファイルの値）
        #[arg(short, long)]
        model: Option<String>,

        /// 解像度 (1K/2K/4K)
        #[arg(short, long)]
        resolution: Option<ImageResolution>,

        /// アスペクト比 (16:9/9:16)
        #[arg(short, long)]
        aspect: Option<AspectRatio>,

        /// スタイルプリセット名
        #[arg(short, long)]
        style: Option<String>,

        /// 生成枚数 (1-4)
        #[arg(short = 'n', long, default_value = "1")]
        count: u8,

        /// 俳優画像（path または path=表情）
        #[arg(long)]
        actor: Vec<ActorArg>,

        /// 参照画像（1枚目: サムネイル、2枚目: ロゴ）
        #[arg(long)]
        reference: Vec<PathBuf>,

        /// 保存先ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 失敗したジョブを確認せずに終了
        #[arg(long)]
        no_retry: bool,
    },

    /// 設定を表示・変更
    Config {
        /// APIキーを保存
        #[arg(long)]
        set_api_key: Option<String>,

        /// 使用するモデルを保存
        #[arg(long)]
        set_model: Option<String>,

        /// 保存先ディレクトリを保存
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },

    /// モデルとスタイルプリセットの一覧
    Catalog,
}

/// `--actor path[=emotion]`
#[derive(Clone, Debug, PartialEq)]
pub struct ActorArg {
    pub path: PathBuf,
    pub emotion: Option<String>,
}

impl std::str::FromStr for ActorArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, emotion) = match s.rsplit_once('=') {
            Some((path, emotion)) => (path, Some(emotion.trim())),
            None => (s, None),
        };
        let path = path.trim();
        if path.is_empty() {
            return Err(format!("Invalid actor: {}. Use path or path=emotion", s));
        }
        Ok(ActorArg {
            path: PathBuf::from(path),
            emotion: emotion.filter(|e| !e.is_empty()).map(str::to_string),
        })
    }
}

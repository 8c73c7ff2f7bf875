//! # lc0-training
//!
//! Leela Chess の自己対局学習データ（V1 テキスト / V2・V3 バイナリ）の読み書き。
//!
//! ## モジュール構成
//!
//! - `plane`: 8x8 平面の16進表現と上下反転
//! - `history`: 履歴8手分のスナップショット組み立てと検証
//! - `flip`: old flip / new flip の視点補正
//! - `scalars`: キャスリング権・手番・50手ルール
//! - `outputs`: 方策確率と勝敗
//! - `record`: V1 テキストのレコードと復号済みレコード
//! - `binary`: V2/V3 バイナリのレコード
//! - `format`: 形式の判別
//! - `render`: 盤面図
//! - `transcode`: 変換と書き出し先
//! - `tensor`: 学習器向けの入力平面
//! - `io`: gzip 対応の入出力
//! - `config`: 変換設定
//! - `batch`: 複数ファイルの一括変換
//!

// 盤面表現
pub mod flip;
pub mod history;
pub mod plane;

// レコード
pub mod binary;
pub mod outputs;
pub mod record;
pub mod scalars;

// 変換
pub mod format;
pub mod render;
pub mod tensor;
pub mod transcode;

// 入出力・実行
pub mod batch;
pub mod config;
pub mod error;
pub mod io;

pub use batch::{BatchDriver, BatchSummary, FileReport};
pub use binary::BinaryRecord;
pub use config::{ConvertConfig, ErrorPolicy};
pub use error::{CodecError, ConsistencyError, FileError, FormatError, RecordError};
pub use format::DataFormat;
pub use record::{TextRecord, TrainingRecord};
pub use render::HistoryView;
pub use transcode::{BinarySink, ConsoleSink, RecordSink};

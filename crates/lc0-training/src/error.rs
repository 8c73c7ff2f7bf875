//! 学習データ変換のエラー型
//!
//! - `FormatError`: 文字列・バイト列として読めない（16進でない、数値でない、長さ違い）
//! - `ConsistencyError`: 読めるが内容が矛盾している（駒の重複、千日手フラグ異常、行数不一致）
//! - `CodecError`: 上記2つと I/O エラーをまとめた上位エラー
//! - `FileError`: 1ファイルの処理を打ち切ったときのエラー（ファイル名付き）

use std::path::PathBuf;

use crate::history::PieceClass;

/// 書式エラー
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// 平面の16進文字列が16文字でない
    #[error("plane must be 16 hex characters, got {len}: {text:?}")]
    PlaneLength { len: usize, text: String },

    /// 平面の16進文字列に16進以外の文字が含まれる
    #[error("plane is not valid hexadecimal: {text:?}")]
    PlaneHex { text: String },

    /// スカラー行が整数として読めない
    #[error("scalar field {field} is not numeric: {text:?}")]
    NonNumericScalar { field: &'static str, text: String },

    /// 0/1 フラグの値が範囲外
    #[error("scalar field {field} must be 0 or 1, got {value}")]
    FlagOutOfRange { field: &'static str, value: i64 },

    /// 1バイトに収まらないスカラー値
    #[error("scalar field {field} out of range 0..=255: {value}")]
    ScalarOutOfRange { field: &'static str, value: i64 },

    /// 方策確率の個数が合わない
    #[error("policy must have {expected} probabilities, got {actual}")]
    PolicyLength { expected: usize, actual: usize },

    /// 方策確率が浮動小数として読めない
    #[error("policy entry {index} is not a number: {text:?}")]
    PolicyValue { index: usize, text: String },

    /// 勝敗行が -1/0/1 でない
    #[error("game result must be -1, 0 or 1: {text:?}")]
    GameResult { text: String },

    /// バイナリレコードの長さ不足
    #[error("binary record needs {expected} bytes, got {actual}")]
    BinaryLength { expected: usize, actual: usize },

    /// 扱えないバージョンタグ
    #[error("unsupported training data version {0}")]
    UnsupportedVersion(i32),

    /// 先頭がバージョンタグでも16進平面でもない
    #[error("stream is neither a known binary version nor V1 text")]
    UnknownFormat,
}

/// 整合性エラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    /// 同じマスを2種類の駒が占有している
    #[error("snapshot {snapshot}: square {square} claimed by both {first:?} and {second:?}")]
    PieceOverlap {
        snapshot: usize,
        square: usize,
        first: PieceClass,
        second: PieceClass,
    },

    /// 1つ目の千日手平面が全0でも全1でもない
    #[error("snapshot {snapshot}: repetition plane must be all zeros or all ones, got {mask:016x}")]
    IllegalRepetition { snapshot: usize, mask: u64 },

    /// 2つ目の千日手平面が0でない（2回目の繰り返しは既に引き分け）
    #[error("snapshot {snapshot}: second repetition plane must be zero, got {mask:016x}")]
    RepeatedTwice { snapshot: usize, mask: u64 },

    /// 行数がレコード長の倍数でない
    #[error("line count {lines} is not a multiple of the record length {record_lines}")]
    RecordLength { lines: usize, record_lines: usize },

    /// バイト数がバイナリレコード長の倍数でない
    #[error("byte count {bytes} is not a multiple of the record size {record_size}")]
    BinaryStreamLength { bytes: usize, record_size: usize },
}

/// 変換処理全体のエラー
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// レコード番号付きのエラー
#[derive(thiserror::Error, Debug)]
#[error("record {record}: {source}")]
pub struct RecordError {
    pub record: usize,
    #[source]
    pub source: CodecError,
}

impl RecordError {
    pub fn new(record: usize, source: impl Into<CodecError>) -> Self {
        Self {
            record,
            source: source.into(),
        }
    }
}

/// ファイル単位のエラー
#[derive(thiserror::Error, Debug)]
pub enum FileError {
    /// 開けない・読めない
    #[error("{}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// ファイル全体として不正（形式不明、長さ不一致）
    #[error("{}: {source}", .path.display())]
    Stream { path: PathBuf, source: CodecError },

    /// 不正なレコードで打ち切った
    #[error("{}: {source}", .path.display())]
    Record { path: PathBuf, source: RecordError },
}

pub type CodecResult<T> = Result<T, CodecError>;

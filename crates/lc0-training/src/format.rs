//! 学習データ形式の判別
//!
//! | 版 | 先頭4バイト | 内容 |
//! |----|------------|------|
//! | 1  | （なし）    | テキスト、old flip |
//! | 2  | `02 00 00 00` | バイナリ、old flip |
//! | 3  | `03 00 00 00` | バイナリ、new flip |
//!
//! `01 00 00 00` は過去に誤って書かれたことがあるタグで、不正として扱う。
//!
//! V1 は版タグを持たず16進文字から始まるため、判別は「既知のバイナリ版タグでなく、
//! 先頭行が16進16桁として読める」ことによる推定でしかない。16進として読める
//! バイト列を版タグに採用すると衝突しうる。

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FormatError;
use crate::flip::FlipConvention;
use crate::plane::decode_plane;

/// 誤って書かれた版タグ
pub const VERSION1: i32 = 1;
/// バイナリ old flip
pub const VERSION2: i32 = 2;
/// バイナリ new flip
pub const VERSION3: i32 = 3;

/// 版タグのバイト数
pub const VERSION_SIZE: usize = 4;

/// 学習データの形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    TextV1,
    BinaryV2,
    BinaryV3,
}

impl DataFormat {
    /// 履歴の視点規約
    pub const fn convention(self) -> FlipConvention {
        match self {
            DataFormat::TextV1 | DataFormat::BinaryV2 => FlipConvention::Old,
            DataFormat::BinaryV3 => FlipConvention::New,
        }
    }

    pub const fn is_binary(self) -> bool {
        !matches!(self, DataFormat::TextV1)
    }

    /// 表示名
    pub const fn name(self) -> &'static str {
        match self {
            DataFormat::TextV1 => "v1-text",
            DataFormat::BinaryV2 => "v2-binary",
            DataFormat::BinaryV3 => "v3-binary",
        }
    }
}

/// 版タグから形式を決める
pub fn format_for_version(version: i32) -> Result<DataFormat, FormatError> {
    match version {
        VERSION2 => Ok(DataFormat::BinaryV2),
        VERSION3 => Ok(DataFormat::BinaryV3),
        other => Err(FormatError::UnsupportedVersion(other)),
    }
}

/// ストリーム先頭から形式を推定する
///
/// 空のストリームは0レコードのテキストとみなす。
pub fn sniff(head: &[u8]) -> Result<DataFormat, FormatError> {
    if head.is_empty() {
        return Ok(DataFormat::TextV1);
    }
    if head.len() >= VERSION_SIZE {
        let version = LittleEndian::read_i32(&head[..VERSION_SIZE]);
        match version {
            VERSION1 | VERSION2 | VERSION3 => return format_for_version(version),
            _ => {}
        }
    }
    let first_line = head.split(|&b| b == b'\n').next().unwrap_or_default();
    match std::str::from_utf8(first_line) {
        Ok(line) if decode_plane(line.trim()).is_ok() => Ok(DataFormat::TextV1),
        _ => Err(FormatError::UnknownFormat),
    }
}

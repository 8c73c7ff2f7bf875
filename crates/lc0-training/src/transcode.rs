//! レコードの変換と書き出し
//!
//! - 確認表示: 盤面図（[`render::describe`]）
//! - V1→V3 テキスト: 補正済みの並びの平面行 + スカラー・教師信号の行
//! - V3 バイナリ: [`BinaryRecord`] の8604バイト
//!
//! 書き出し先は [`RecordSink`] で差し替える。

use std::io::{self, Write};

use crate::binary::BinaryRecord;
use crate::error::{CodecResult, FormatError};
use crate::plane::encode_plane;
use crate::record::{DATA_ITEM_LINES, TrainingRecord};
use crate::render::{self, HistoryView};

/// 補正済みの並びでテキスト121行にする
///
/// スナップショット順に us 6枚、them 6枚、千日手2枚。続けてスカラー7行と教師信号2行。
pub fn convert_text(record: &TrainingRecord) -> Vec<String> {
    let mut out = Vec::with_capacity(DATA_ITEM_LINES);
    for snap in &record.history {
        out.extend(snap.planes().iter().map(|&m| encode_plane(m)));
    }
    out.extend(record.tail_lines());
    out
}

/// V3 バイナリにする
pub fn pack_v3(record: &TrainingRecord) -> Result<Vec<u8>, FormatError> {
    BinaryRecord::pack_v3(record)?.to_bytes()
}

/// 復号済みレコードの書き出し先
pub trait RecordSink {
    /// レコードを1件書き出す（`index` はファイル内のレコード番号）
    fn emit(&mut self, index: usize, record: &TrainingRecord) -> CodecResult<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// 標準出力向け（確認表示・テキスト変換）
pub struct ConsoleSink<W: Write> {
    writer: W,
    describe: Option<HistoryView>,
    convert: bool,
}

impl<W: Write> ConsoleSink<W> {
    /// `describe` が `Some` なら盤面図、`convert` なら変換後の行を書く
    pub fn new(writer: W, describe: Option<HistoryView>, convert: bool) -> Self {
        Self {
            writer,
            describe,
            convert,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for ConsoleSink<W> {
    fn emit(&mut self, index: usize, record: &TrainingRecord) -> CodecResult<()> {
        if let Some(view) = self.describe {
            writeln!(self.writer, "{}", render::describe(record, index, view))?;
        }
        if self.convert {
            for line in convert_text(record) {
                writeln!(self.writer, "{line}")?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// V3 バイナリの書き出し先
pub struct BinarySink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> BinarySink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// 書き出したレコード数
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for BinarySink<W> {
    fn emit(&mut self, _index: usize, record: &TrainingRecord) -> CodecResult<()> {
        // 詰め終えてから書くので、途中で失敗したレコードは出力に残らない
        let bytes = pack_v3(record)?;
        self.writer.write_all(&bytes)?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

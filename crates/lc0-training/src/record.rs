//! 学習レコード
//!
//! # V1 テキスト形式（121行/レコード）
//!
//! | 行          | 内容 |
//! |-------------|------|
//! | 0..112      | 履歴8手 × 14平面（16進16桁） |
//! | 112..119    | スカラー7項目 |
//! | 119         | 方策確率（1924個） |
//! | 120         | 勝敗 |
//!
//! ファイルはレコードを区切りなしで連結したもので、行数は121の倍数でなければならない。

use crate::error::{CodecError, ConsistencyError, FormatError};
use crate::flip::{FlipConvention, SnapshotLayout};
use crate::history::{HIST_PLANES, History, Snapshot, assemble_history, history_planes};
use crate::outputs::{NUM_OUTPUTS, format_policy_line, parse_policy_line, parse_result_line};
use crate::plane::{PLANE_EMPTY, decode_plane};
use crate::scalars::{NUM_REALS, ScalarBlock, parse_scalar_lines};

/// 1レコードの行数（121）
pub const DATA_ITEM_LINES: usize = HIST_PLANES + NUM_REALS + NUM_OUTPUTS;

/// 平面・スカラー以外の行の開始位置
const POLICY_LINE: usize = HIST_PLANES + NUM_REALS;
const RESULT_LINE: usize = POLICY_LINE + 1;

/// V1 テキスト形式の1レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    lines: Vec<String>,
}

impl TextRecord {
    /// 行数を検証して作る
    pub fn new(lines: Vec<String>) -> Result<Self, ConsistencyError> {
        if lines.len() != DATA_ITEM_LINES {
            return Err(ConsistencyError::RecordLength {
                lines: lines.len(),
                record_lines: DATA_ITEM_LINES,
            });
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 平面の112行
    pub fn plane_lines(&self) -> &[String] {
        &self.lines[..HIST_PLANES]
    }

    /// スカラーの7行
    pub fn scalar_lines(&self) -> &[String] {
        &self.lines[HIST_PLANES..POLICY_LINE]
    }

    /// スカラー以降の9行（スカラー・方策・勝敗）
    pub fn tail_lines(&self) -> &[String] {
        &self.lines[HIST_PLANES..]
    }

    pub fn policy_line(&self) -> &str {
        &self.lines[POLICY_LINE]
    }

    pub fn result_line(&self) -> &str {
        &self.lines[RESULT_LINE]
    }

    /// 112平面を格納順のまま復号する
    pub fn decode_planes(&self) -> Result<[u64; HIST_PLANES], FormatError> {
        let mut planes = [PLANE_EMPTY; HIST_PLANES];
        for (dst, line) in planes.iter_mut().zip(self.plane_lines()) {
            *dst = decode_plane(line.trim())?;
        }
        Ok(planes)
    }

    /// レコード全体を復号する
    ///
    /// 方策・勝敗の行はここでは解釈せず、行のまま保持する。
    pub fn decode(&self, convention: FlipConvention) -> Result<TrainingRecord, CodecError> {
        let planes = self.decode_planes()?;
        let history = assemble_history(&planes, convention)?;
        let scalars = parse_scalar_lines(self.scalar_lines())?;
        Ok(TrainingRecord {
            history,
            scalars,
            convention,
            source: RecordSource::Text {
                tail: self.tail_lines().to_vec(),
            },
        })
    }
}

/// 行の列をレコードに分割する
///
/// 行数が `DATA_ITEM_LINES` の倍数でなければファイル全体を不正とする。
pub fn split_records(lines: Vec<String>) -> Result<Vec<TextRecord>, ConsistencyError> {
    if lines.len() % DATA_ITEM_LINES != 0 {
        return Err(ConsistencyError::RecordLength {
            lines: lines.len(),
            record_lines: DATA_ITEM_LINES,
        });
    }
    let mut records = Vec::with_capacity(lines.len() / DATA_ITEM_LINES);
    let mut iter = lines.into_iter();
    loop {
        let chunk: Vec<String> = iter.by_ref().take(DATA_ITEM_LINES).collect();
        if chunk.is_empty() {
            break;
        }
        records.push(TextRecord { lines: chunk });
    }
    Ok(records)
}

/// 復号元ごとの付随データ
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSource {
    /// V1 テキスト: スカラー・方策・勝敗の9行をそのまま保持
    Text { tail: Vec<String> },
    /// V2/V3 バイナリ
    Binary { probabilities: Vec<f32>, result: i8 },
}

/// 復号済みの1局面
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    /// 手番側視点に補正済みの履歴
    pub history: History,
    pub scalars: ScalarBlock,
    /// 復号元の視点規約
    pub convention: FlipConvention,
    pub source: RecordSource,
}

impl TrainingRecord {
    /// 補正済みの112平面
    pub fn planes(&self) -> [u64; HIST_PLANES] {
        history_planes(&self.history)
    }

    /// 格納されていたときの並びの履歴
    ///
    /// 視点補正は対合なので、同じ変換をもう一度かければ格納時の並びに戻る。
    pub fn stored_history(&self) -> History {
        let mut out = self.history;
        for (h, snap) in out.iter_mut().enumerate() {
            let layout = SnapshotLayout::for_snapshot(h, self.convention);
            *snap = Snapshot::from_planes(&layout.apply(&snap.planes()));
        }
        out
    }

    /// スカラー以降の9行
    ///
    /// テキスト由来ならそのまま、バイナリ由来なら書き起こす。
    pub fn tail_lines(&self) -> Vec<String> {
        match &self.source {
            RecordSource::Text { tail } => tail.clone(),
            RecordSource::Binary {
                probabilities,
                result,
            } => {
                let mut tail: Vec<String> = self.scalars.to_lines().into();
                tail.push(format_policy_line(probabilities));
                tail.push(result.to_string());
                tail
            }
        }
    }

    /// 方策確率
    pub fn probabilities(&self) -> Result<Vec<f32>, FormatError> {
        match &self.source {
            RecordSource::Text { tail } => {
                parse_policy_line(tail.get(NUM_REALS).map(String::as_str).unwrap_or(""))
            }
            RecordSource::Binary { probabilities, .. } => Ok(probabilities.clone()),
        }
    }

    /// 勝敗（手番側から見て）
    pub fn result(&self) -> Result<i8, FormatError> {
        match &self.source {
            RecordSource::Text { tail } => {
                parse_result_line(tail.get(NUM_REALS + 1).map(String::as_str).unwrap_or(""))
            }
            RecordSource::Binary { result, .. } => Ok(*result),
        }
    }
}

//! V2/V3 バイナリレコード
//!
//! # データ形式（8604バイト/レコード、リトルエンディアン）
//!
//! | オフセット | サイズ | 内容 |
//! |-----------|--------|------|
//! | 0         | 4      | 版 (i32: 2 または 3) |
//! | 4         | 7696   | 方策確率 1924 × f32 |
//! | 7700      | 896    | 入力平面 112 × u64 |
//! | 8596      | 1      | us_ooo (u8) |
//! | 8597      | 1      | us_oo (u8) |
//! | 8598      | 1      | them_ooo (u8) |
//! | 8599      | 1      | them_oo (u8) |
//! | 8600      | 1      | 手番 (u8: 1=黒) |
//! | 8601      | 1      | 50手ルールカウンタ (u8) |
//! | 8602      | 1      | 手数 (u8) |
//! | 8603      | 1      | 勝敗 (i8: 1=勝ち, 0=引分, -1=負け) |
//!
//! 平面は64bitマスクをそのままリトルエンディアンで書くので、
//! バイト `r` が段 `r`、その中のビット `f` が筋 `f` になる。
//! V2 と V3 は配置が同じで、平面の視点規約だけが異なる。

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{CodecError, FormatError};
use crate::format::{DataFormat, VERSION_SIZE, VERSION2, VERSION3, format_for_version};
use crate::history::{HIST_PLANES, assemble_history};
use crate::outputs::NUM_POLICY;
use crate::plane::PLANE_EMPTY;
use crate::record::{RecordSource, TrainingRecord};
use crate::scalars::{NUM_REALS, ScalarBlock};

const PROBS_OFFSET: usize = VERSION_SIZE;
const PROBS_SIZE: usize = NUM_POLICY * 4;
const PLANES_OFFSET: usize = PROBS_OFFSET + PROBS_SIZE;
const PLANES_SIZE: usize = HIST_PLANES * 8;
const SCALARS_OFFSET: usize = PLANES_OFFSET + PLANES_SIZE;
const RESULT_OFFSET: usize = SCALARS_OFFSET + NUM_REALS;

/// バイナリ1レコード
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryRecord {
    /// 形式（版タグ）
    pub format: DataFormat,
    /// 方策確率（`NUM_POLICY` 個）
    pub probabilities: Vec<f32>,
    /// 入力平面（格納順）
    pub planes: [u64; HIST_PLANES],
    pub scalars: ScalarBlock,
    /// 勝敗
    pub result: i8,
}

impl BinaryRecord {
    /// サイズ (バイト)
    pub const SIZE: usize = RESULT_OFFSET + 1;

    /// バイト列から読み込む
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < Self::SIZE {
            return Err(FormatError::BinaryLength {
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }

        let version = LittleEndian::read_i32(&bytes[..VERSION_SIZE]);
        let format = format_for_version(version)?;

        let mut probabilities = vec![0f32; NUM_POLICY];
        LittleEndian::read_f32_into(&bytes[PROBS_OFFSET..PLANES_OFFSET], &mut probabilities);

        let mut planes = [PLANE_EMPTY; HIST_PLANES];
        LittleEndian::read_u64_into(&bytes[PLANES_OFFSET..SCALARS_OFFSET], &mut planes);

        let mut scalar_bytes = [0u8; NUM_REALS];
        scalar_bytes.copy_from_slice(&bytes[SCALARS_OFFSET..RESULT_OFFSET]);
        let scalars = ScalarBlock::from_bytes(&scalar_bytes)?;

        let result = bytes[RESULT_OFFSET] as i8;
        if !(-1..=1).contains(&result) {
            return Err(FormatError::GameResult {
                text: result.to_string(),
            });
        }

        Ok(Self {
            format,
            probabilities,
            planes,
            scalars,
            result,
        })
    }

    /// バイト列にシリアライズ
    ///
    /// 手数が1バイトに収まらない場合は `ScalarOutOfRange`。
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let scalar_bytes = self.scalars.to_bytes()?;
        let mut bytes = vec![0u8; Self::SIZE];
        let version = match self.format {
            DataFormat::BinaryV2 => VERSION2,
            _ => VERSION3,
        };
        LittleEndian::write_i32(&mut bytes[..VERSION_SIZE], version);
        // 個数が足りない分は0のまま
        let n = self.probabilities.len().min(NUM_POLICY);
        LittleEndian::write_f32_into(
            &self.probabilities[..n],
            &mut bytes[PROBS_OFFSET..PROBS_OFFSET + n * 4],
        );
        LittleEndian::write_u64_into(&self.planes, &mut bytes[PLANES_OFFSET..SCALARS_OFFSET]);
        bytes[SCALARS_OFFSET..RESULT_OFFSET].copy_from_slice(&scalar_bytes);
        bytes[RESULT_OFFSET] = self.result as u8;
        Ok(bytes)
    }

    /// 履歴を組み立てて復号する
    pub fn decode(&self) -> Result<TrainingRecord, CodecError> {
        let convention = self.format.convention();
        let history = assemble_history(&self.planes, convention)?;
        Ok(TrainingRecord {
            history,
            scalars: self.scalars,
            convention,
            source: RecordSource::Binary {
                probabilities: self.probabilities.clone(),
                result: self.result,
            },
        })
    }

    /// 復号済みレコードを V3 形式に詰める
    ///
    /// 平面は補正済み（new flip）の並びで書く。
    /// テキスト由来の手数はここで初めて 0..=255 に収まるか確かめる。
    pub fn pack_v3(record: &TrainingRecord) -> Result<Self, FormatError> {
        record.scalars.to_bytes()?;
        let probabilities = record.probabilities()?;
        if probabilities.len() != NUM_POLICY {
            return Err(FormatError::PolicyLength {
                expected: NUM_POLICY,
                actual: probabilities.len(),
            });
        }
        Ok(Self {
            format: DataFormat::BinaryV3,
            probabilities,
            planes: record.planes(),
            scalars: record.scalars,
            result: record.result()?,
        })
    }
}

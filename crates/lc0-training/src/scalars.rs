//! 盤面以外のスカラー項目（キャスリング権・手番・50手ルール・手数）

use crate::error::FormatError;
use crate::history::HIST_PLANES;

/// スカラー行の数
pub const NUM_REALS: usize = 7;

/// 50手ルールカウンタの上限（1バイトに収める）
pub const RULE50_MAX: i64 = u8::MAX as i64;

/// スカラー行の項目名（行順）
pub const SCALAR_FIELDS: [&str; NUM_REALS] = [
    "us_ooo",
    "us_oo",
    "them_ooo",
    "them_oo",
    "us_black",
    "rule50_count",
    "move_count",
];

/// スカラー項目一式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScalarBlock {
    /// 手番側のクイーンサイドキャスリング権
    pub us_ooo: bool,
    /// 手番側のキングサイドキャスリング権
    pub us_oo: bool,
    /// 相手側のクイーンサイドキャスリング権
    pub them_ooo: bool,
    /// 相手側のキングサイドキャスリング権
    pub them_oo: bool,
    /// 手番が黒か
    pub us_black: bool,
    /// 50手ルールカウンタ（0..=255 に丸め済み）
    pub rule50_count: u8,
    /// 手数（現行データでは未使用）
    ///
    /// テキストの値をそのまま持つ。0..=255 に収まるかはバイナリに詰めるときだけ確かめる。
    pub move_count: i64,
}

impl ScalarBlock {
    /// バイナリ形式の並び（us_ooo, us_oo, them_ooo, them_oo, stm, rule50, move_count）
    ///
    /// 手数が1バイトに収まらなければ `ScalarOutOfRange`。丸めはしない。
    pub fn to_bytes(&self) -> Result<[u8; NUM_REALS], FormatError> {
        let move_count =
            u8::try_from(self.move_count).map_err(|_| FormatError::ScalarOutOfRange {
                field: SCALAR_FIELDS[6],
                value: self.move_count,
            })?;
        Ok([
            u8::from(self.us_ooo),
            u8::from(self.us_oo),
            u8::from(self.them_ooo),
            u8::from(self.them_oo),
            u8::from(self.us_black),
            self.rule50_count,
            move_count,
        ])
    }

    /// バイナリ形式から読む
    ///
    /// フラグは0/1以外を拒否する。
    pub fn from_bytes(bytes: &[u8; NUM_REALS]) -> Result<Self, FormatError> {
        let flag = |i: usize| match bytes[i] {
            0 => Ok(false),
            1 => Ok(true),
            v => Err(FormatError::FlagOutOfRange {
                field: SCALAR_FIELDS[i],
                value: i64::from(v),
            }),
        };
        Ok(Self {
            us_ooo: flag(0)?,
            us_oo: flag(1)?,
            them_ooo: flag(2)?,
            them_oo: flag(3)?,
            us_black: flag(4)?,
            rule50_count: bytes[5],
            move_count: i64::from(bytes[6]),
        })
    }

    /// テキスト形式の7行
    pub fn to_lines(&self) -> [String; NUM_REALS] {
        let flag = |b: bool| u8::from(b).to_string();
        [
            flag(self.us_ooo),
            flag(self.us_oo),
            flag(self.them_ooo),
            flag(self.them_oo),
            flag(self.us_black),
            self.rule50_count.to_string(),
            self.move_count.to_string(),
        ]
    }
}

fn parse_int(field: &'static str, text: &str) -> Result<i64, FormatError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| FormatError::NonNumericScalar {
            field,
            text: text.to_string(),
        })
}

fn parse_flag(field: &'static str, text: &str) -> Result<bool, FormatError> {
    match parse_int(field, text)? {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(FormatError::FlagOutOfRange { field, value }),
    }
}

/// スカラー7行を読む
///
/// `lines` はスカラー行だけを渡す。50手ルールカウンタのみ 0..=255 に丸め、
/// 手数は整数でありさえすればそのまま受け取る。
pub fn parse_scalar_lines<S: AsRef<str>>(lines: &[S]) -> Result<ScalarBlock, FormatError> {
    let line = |i: usize| lines.get(i).map(|s| s.as_ref()).unwrap_or("");
    let rule50 = parse_int(SCALAR_FIELDS[5], line(5))?;
    let move_count = parse_int(SCALAR_FIELDS[6], line(6))?;

    Ok(ScalarBlock {
        us_ooo: parse_flag(SCALAR_FIELDS[0], line(0))?,
        us_oo: parse_flag(SCALAR_FIELDS[1], line(1))?,
        them_ooo: parse_flag(SCALAR_FIELDS[2], line(2))?,
        them_oo: parse_flag(SCALAR_FIELDS[3], line(3))?,
        us_black: parse_flag(SCALAR_FIELDS[4], line(4))?,
        rule50_count: rule50.clamp(0, RULE50_MAX) as u8,
        move_count,
    })
}

/// レコード全体の行からスカラー項目を取り出す
///
/// 平面領域（112行）の直後の7行を読む。
pub fn extract_scalars<S: AsRef<str>>(record_lines: &[S]) -> Result<ScalarBlock, FormatError> {
    let end = (HIST_PLANES + NUM_REALS).min(record_lines.len());
    let start = HIST_PLANES.min(end);
    parse_scalar_lines(&record_lines[start..end])
}

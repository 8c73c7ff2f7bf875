//! 履歴の視点補正（old flip → new flip）
//!
//! V1/V2 の書き出し側は1手ごとに視点を入れ替えながら、盤の向きを直していなかった。
//! そのため奇数番目のスナップショットは us/them の平面群が入れ替わり、かつ上下が逆になっている。
//!
//! - 偶数スナップショット: 正規配置のまま読む
//! - 奇数スナップショット: us/them のオフセット群を入れ替え、全平面を上下反転して読む
//!
//! V3 は補正済み（new flip）なので常に正規配置で読む。

use crate::error::FormatError;
use crate::history::{NUM_PLANES, PlaneLayout};
use crate::plane::{decode_plane, encode_plane, mirror_vertical};

/// 履歴の視点規約
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipConvention {
    /// 奇数スナップショットが反転したまま（V1 テキスト、V2 バイナリ）
    Old,
    /// 全スナップショットが手番側視点（V3 バイナリ）
    New,
}

/// スナップショット1つ分の読み出し方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotLayout {
    pub offsets: PlaneLayout,
    /// 全平面を上下反転するか
    pub mirror: bool,
}

impl SnapshotLayout {
    /// 格納順のまま読む
    pub const IDENTITY: SnapshotLayout = SnapshotLayout {
        offsets: PlaneLayout::CANONICAL,
        mirror: false,
    };

    /// スナップショット `snapshot` の読み出し方
    pub const fn for_snapshot(snapshot: usize, convention: FlipConvention) -> SnapshotLayout {
        match convention {
            FlipConvention::Old if snapshot % 2 == 1 => SnapshotLayout {
                offsets: PlaneLayout::CANONICAL.swapped(),
                mirror: true,
            },
            _ => Self::IDENTITY,
        }
    }

    /// 格納された14平面を正規配置の14平面に並べ替える
    pub fn apply(&self, raw: &[u64; NUM_PLANES]) -> [u64; NUM_PLANES] {
        let src = self.source_offsets();
        let mut out = [0u64; NUM_PLANES];
        for (dst, &offset) in out.iter_mut().zip(src.iter()) {
            let mask = raw[offset];
            *dst = if self.mirror { mirror_vertical(mask) } else { mask };
        }
        out
    }

    /// 出力の各位置がどの格納オフセットから来るか
    pub fn source_offsets(&self) -> [usize; NUM_PLANES] {
        let mut src = [0usize; NUM_PLANES];
        src[..6].copy_from_slice(&self.offsets.us);
        src[6..12].copy_from_slice(&self.offsets.them);
        src[12..].copy_from_slice(&self.offsets.repetitions);
        src
    }
}

/// テキストの14行を補正済みの並びに変換する
///
/// 出力は小文字の16進文字列。
pub fn normalize_plane_lines(
    snapshot: usize,
    lines: &[&str],
    convention: FlipConvention,
) -> Result<Vec<String>, FormatError> {
    let mut raw = [0u64; NUM_PLANES];
    for (dst, line) in raw.iter_mut().zip(lines.iter()) {
        *dst = decode_plane(line.trim())?;
    }
    let layout = SnapshotLayout::for_snapshot(snapshot, convention);
    Ok(layout.apply(&raw).iter().map(|&m| encode_plane(m)).collect())
}

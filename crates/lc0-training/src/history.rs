//! 履歴スナップショットの組み立て
//!
//! 1レコードは `NUM_HIST` 手分の盤面（スナップショット）を持ち、各スナップショットは
//! `NUM_PLANES` 枚の平面で表される。
//!
//! | オフセット | 内容 |
//! |-----------|------|
//! | 0..=5     | 手番側（us）の P N B R Q K |
//! | 6..=11    | 相手側（them）の p n b r q k |
//! | 12        | 千日手フラグ（1回繰り返し） |
//! | 13        | 千日手フラグ（2回繰り返し、常に0） |
//!
//! 読み出し位置と上下反転の有無は [`SnapshotLayout`](crate::flip::SnapshotLayout) が決める。

use crate::error::ConsistencyError;
use crate::flip::{FlipConvention, SnapshotLayout};
use crate::plane::{PLANE_EMPTY, PLANE_FULL, is_set};

/// 履歴の手数
pub const NUM_HIST: usize = 8;

/// 1スナップショットあたりの平面数
pub const NUM_PLANES: usize = 14;

/// 駒種の数
pub const NUM_PIECE_TYPES: usize = 6;

/// 履歴全体の平面数（112）
pub const HIST_PLANES: usize = NUM_HIST * NUM_PLANES;

/// 手番からみた陣営
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// 手番側
    Us,
    /// 相手側
    Them,
}

/// 駒種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceType {
    /// 平面の並び順
    pub const ALL: [PieceType; NUM_PIECE_TYPES] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 大文字の駒記号
    pub const fn symbol(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }
}

/// 陣営付きの駒種（平面1枚に対応）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceClass {
    pub side: Side,
    pub piece: PieceType,
}

impl PieceClass {
    pub const fn new(side: Side, piece: PieceType) -> Self {
        Self { side, piece }
    }

    /// 盤面図の文字（us は大文字、them は小文字）
    pub const fn symbol(self) -> char {
        let c = self.piece.symbol();
        match self.side {
            Side::Us => c,
            Side::Them => c.to_ascii_lowercase(),
        }
    }

    /// 正規配置での平面オフセット
    pub const fn canonical_offset(self) -> usize {
        match self.side {
            Side::Us => self.piece.index(),
            Side::Them => NUM_PIECE_TYPES + self.piece.index(),
        }
    }

    /// 正規配置の順に12種を並べる
    pub fn all() -> impl Iterator<Item = PieceClass> {
        [Side::Us, Side::Them]
            .into_iter()
            .flat_map(|side| PieceType::ALL.into_iter().map(move |p| PieceClass::new(side, p)))
    }
}

/// スナップショット内の平面オフセット表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    /// 手番側 P N B R Q K のオフセット
    pub us: [usize; NUM_PIECE_TYPES],
    /// 相手側 p n b r q k のオフセット
    pub them: [usize; NUM_PIECE_TYPES],
    /// 千日手フラグ2枚のオフセット
    pub repetitions: [usize; 2],
}

impl PlaneLayout {
    /// 正規配置（us が先）
    pub const CANONICAL: PlaneLayout = PlaneLayout {
        us: [0, 1, 2, 3, 4, 5],
        them: [6, 7, 8, 9, 10, 11],
        repetitions: [12, 13],
    };

    /// us/them のオフセット群を入れ替えた配置
    pub const fn swapped(self) -> PlaneLayout {
        PlaneLayout {
            us: self.them,
            them: self.us,
            repetitions: self.repetitions,
        }
    }

    /// 駒種の平面オフセット
    pub const fn offset(&self, class: PieceClass) -> usize {
        match class.side {
            Side::Us => self.us[class.piece.index()],
            Side::Them => self.them[class.piece.index()],
        }
    }
}

/// 1手分の盤面（手番側視点に正規化済み）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub us: [u64; NUM_PIECE_TYPES],
    pub them: [u64; NUM_PIECE_TYPES],
    pub repetitions: [u64; 2],
}

/// 1レコード分の履歴（index 0 が現局面）
pub type History = [Snapshot; NUM_HIST];

impl Snapshot {
    /// 駒種の平面
    #[inline]
    pub fn plane(&self, class: PieceClass) -> u64 {
        match class.side {
            Side::Us => self.us[class.piece.index()],
            Side::Them => self.them[class.piece.index()],
        }
    }

    /// 繰り返し回数（0 または 1）
    #[inline]
    pub fn repetition_count(&self) -> u8 {
        u8::from(self.repetitions[0] != PLANE_EMPTY)
    }

    /// マスにある駒
    pub fn piece_at(&self, rank: usize, file: usize) -> Option<PieceClass> {
        PieceClass::all().find(|&c| is_set(self.plane(c), rank, file))
    }

    /// 正規配置の14平面から作る（検証なし）
    pub fn from_planes(planes: &[u64; NUM_PLANES]) -> Snapshot {
        let mut snap = Snapshot::default();
        snap.us.copy_from_slice(&planes[..NUM_PIECE_TYPES]);
        snap.them.copy_from_slice(&planes[NUM_PIECE_TYPES..2 * NUM_PIECE_TYPES]);
        snap.repetitions.copy_from_slice(&planes[2 * NUM_PIECE_TYPES..]);
        snap
    }

    /// 正規配置順の14平面
    pub fn planes(&self) -> [u64; NUM_PLANES] {
        let mut out = [PLANE_EMPTY; NUM_PLANES];
        out[..NUM_PIECE_TYPES].copy_from_slice(&self.us);
        out[NUM_PIECE_TYPES..2 * NUM_PIECE_TYPES].copy_from_slice(&self.them);
        out[2 * NUM_PIECE_TYPES..].copy_from_slice(&self.repetitions);
        out
    }
}

/// 1スナップショットを組み立てる
///
/// `raw` はスナップショットの `NUM_PLANES` 枚の平面（格納順のまま）。
/// 駒の重複と千日手フラグを検証する。
pub fn assemble_snapshot(
    snapshot: usize,
    raw: &[u64; NUM_PLANES],
    layout: SnapshotLayout,
) -> Result<Snapshot, ConsistencyError> {
    let planes = layout.apply(raw);

    let mut snap = Snapshot::default();
    let mut owners: Vec<(PieceClass, u64)> = Vec::with_capacity(2 * NUM_PIECE_TYPES);
    let mut occupied = PLANE_EMPTY;
    for class in PieceClass::all() {
        let mask = planes[class.canonical_offset()];
        let clash = occupied & mask;
        if clash != 0 {
            let square = clash.trailing_zeros() as usize;
            let first = owners
                .iter()
                .find(|(_, m)| m & (1u64 << square) != 0)
                .map(|(c, _)| *c)
                .unwrap_or(class);
            return Err(ConsistencyError::PieceOverlap {
                snapshot,
                square,
                first,
                second: class,
            });
        }
        occupied |= mask;
        owners.push((class, mask));
        match class.side {
            Side::Us => snap.us[class.piece.index()] = mask,
            Side::Them => snap.them[class.piece.index()] = mask,
        }
    }

    let (rep1, rep2) = (planes[2 * NUM_PIECE_TYPES], planes[2 * NUM_PIECE_TYPES + 1]);
    if rep1 != PLANE_EMPTY && rep1 != PLANE_FULL {
        return Err(ConsistencyError::IllegalRepetition {
            snapshot,
            mask: rep1,
        });
    }
    if rep2 != PLANE_EMPTY {
        return Err(ConsistencyError::RepeatedTwice {
            snapshot,
            mask: rep2,
        });
    }
    snap.repetitions = [rep1, rep2];
    Ok(snap)
}

/// 112平面から履歴全体を組み立てる
pub fn assemble_history(
    planes: &[u64; HIST_PLANES],
    convention: FlipConvention,
) -> Result<History, ConsistencyError> {
    let mut history = [Snapshot::default(); NUM_HIST];
    for (h, snap) in history.iter_mut().enumerate() {
        let mut raw = [PLANE_EMPTY; NUM_PLANES];
        raw.copy_from_slice(&planes[h * NUM_PLANES..(h + 1) * NUM_PLANES]);
        *snap = assemble_snapshot(h, &raw, SnapshotLayout::for_snapshot(h, convention))?;
    }
    Ok(history)
}

/// 履歴を正規配置の112平面に戻す
pub fn history_planes(history: &History) -> [u64; HIST_PLANES] {
    let mut out = [PLANE_EMPTY; HIST_PLANES];
    for (h, snap) in history.iter().enumerate() {
        out[h * NUM_PLANES..(h + 1) * NUM_PLANES].copy_from_slice(&snap.planes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::square_bit;

    fn canonical() -> SnapshotLayout {
        SnapshotLayout::for_snapshot(0, FlipConvention::New)
    }

    #[test]
    fn test_piece_class_symbols_and_offsets() {
        let classes: Vec<char> = PieceClass::all().map(|c| c.symbol()).collect();
        assert_eq!(classes.iter().collect::<String>(), "PNBRQKpnbrqk");
        for (i, class) in PieceClass::all().enumerate() {
            assert_eq!(class.canonical_offset(), i);
            assert_eq!(PlaneLayout::CANONICAL.offset(class), i);
        }
    }

    #[test]
    fn test_swapped_layout() {
        let swapped = PlaneLayout::CANONICAL.swapped();
        assert_eq!(swapped.us, [6, 7, 8, 9, 10, 11]);
        assert_eq!(swapped.them, [0, 1, 2, 3, 4, 5]);
        assert_eq!(swapped.repetitions, [12, 13]);
        assert_eq!(swapped.swapped(), PlaneLayout::CANONICAL);
    }

    #[test]
    fn test_assemble_snapshot_reads_planes() {
        let mut raw = [PLANE_EMPTY; NUM_PLANES];
        raw[1] = square_bit(0, 1); // N
        raw[11] = square_bit(7, 4); // k
        raw[12] = PLANE_FULL;
        let snap = assemble_snapshot(0, &raw, canonical()).unwrap();
        assert_eq!(snap.us[PieceType::Knight.index()], square_bit(0, 1));
        assert_eq!(snap.them[PieceType::King.index()], square_bit(7, 4));
        assert_eq!(snap.repetition_count(), 1);
        assert_eq!(
            snap.piece_at(0, 1),
            Some(PieceClass::new(Side::Us, PieceType::Knight))
        );
        assert_eq!(snap.piece_at(3, 3), None);
        assert_eq!(snap.planes(), raw);
    }

    #[test]
    fn test_assemble_snapshot_rejects_overlap() {
        let mut raw = [PLANE_EMPTY; NUM_PLANES];
        raw[0] = square_bit(1, 3);
        raw[9] = square_bit(1, 3) | square_bit(6, 6);
        let err = assemble_snapshot(4, &raw, canonical()).unwrap_err();
        assert_eq!(
            err,
            ConsistencyError::PieceOverlap {
                snapshot: 4,
                square: 11,
                first: PieceClass::new(Side::Us, PieceType::Pawn),
                second: PieceClass::new(Side::Them, PieceType::Rook),
            }
        );
    }

    #[test]
    fn test_assemble_snapshot_repetition_masks() {
        let mut raw = [PLANE_EMPTY; NUM_PLANES];
        raw[12] = 0x00ff;
        assert!(matches!(
            assemble_snapshot(2, &raw, canonical()),
            Err(ConsistencyError::IllegalRepetition {
                snapshot: 2,
                mask: 0x00ff
            })
        ));

        raw[12] = PLANE_EMPTY;
        raw[13] = PLANE_FULL;
        assert!(matches!(
            assemble_snapshot(5, &raw, canonical()),
            Err(ConsistencyError::RepeatedTwice { snapshot: 5, .. })
        ));

        raw[13] = PLANE_EMPTY;
        let snap = assemble_snapshot(5, &raw, canonical()).unwrap();
        assert_eq!(snap.repetition_count(), 0);
    }

    #[test]
    fn test_assemble_history_round_trips_canonical_planes() {
        let mut planes = [PLANE_EMPTY; HIST_PLANES];
        for h in 0..NUM_HIST {
            planes[h * NUM_PLANES + 5] = square_bit(0, h); // K
            planes[h * NUM_PLANES + 11] = square_bit(7, h); // k
        }
        let history = assemble_history(&planes, FlipConvention::New).unwrap();
        assert_eq!(history_planes(&history), planes);
    }

    use crate::plane::NUM_SQUARES;
    use proptest::prelude::*;

    /// 各マスの持ち主（0..12 が駒の平面、12 は空き）と千日手フラグから作る112平面
    fn arb_history_planes() -> impl Strategy<Value = [u64; HIST_PLANES]> {
        let snapshot = (prop::collection::vec(0usize..=12, NUM_SQUARES), any::<bool>());
        prop::collection::vec(snapshot, NUM_HIST).prop_map(|snapshots| {
            let mut planes = [PLANE_EMPTY; HIST_PLANES];
            for (h, (owners, repeated)) in snapshots.iter().enumerate() {
                for (sq, &owner) in owners.iter().enumerate() {
                    if owner < 2 * NUM_PIECE_TYPES {
                        planes[h * NUM_PLANES + owner] |= 1u64 << sq;
                    }
                }
                if *repeated {
                    planes[h * NUM_PLANES + 2 * NUM_PIECE_TYPES] = PLANE_FULL;
                }
            }
            planes
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn prop_history_planes_round_trip(planes in arb_history_planes()) {
            let history = assemble_history(&planes, FlipConvention::New).unwrap();
            prop_assert_eq!(history_planes(&history), planes);
        }

        #[test]
        fn prop_old_flip_restores_stored_planes(planes in arb_history_planes()) {
            let history = assemble_history(&planes, FlipConvention::Old).unwrap();
            for (h, snap) in history.iter().enumerate() {
                let stored = &planes[h * NUM_PLANES..(h + 1) * NUM_PLANES];
                // 入れ替えと上下反転はどちらも2回で元に戻る
                let layout = SnapshotLayout::for_snapshot(h, FlipConvention::Old);
                prop_assert_eq!(&layout.apply(&snap.planes())[..], stored);
            }
        }
    }
}

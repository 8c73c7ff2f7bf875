//! 学習器向けの入力平面
//!
//! 履歴の112平面を 0/1 のバイト列に展開し、スカラーは全マス同じ値の平面にする。

use crate::history::HIST_PLANES;
use crate::plane::{BOARD_SIZE, NUM_SQUARES, is_set};
use crate::record::TrainingRecord;

/// 入力平面の総数（履歴112 + スカラー5 + rule50 + 0平面 + 1平面）
pub const INPUT_PLANES: usize = HIST_PLANES + 8;

/// 値 `v` で埋めた64バイトの平面（`v` = 0..=255）
pub const FLAT_PLANES: [[u8; NUM_SQUARES]; 256] = build_flat_planes();

const fn build_flat_planes() -> [[u8; NUM_SQUARES]; 256] {
    let mut t = [[0u8; NUM_SQUARES]; 256];
    let mut v = 0;
    while v < 256 {
        t[v] = [v as u8; NUM_SQUARES];
        v += 1;
    }
    t
}

/// マスクを 0/1 のバイト列に展開する（添字 = 段*8 + 筋）
#[inline]
pub fn expand_plane(mask: u64) -> [u8; NUM_SQUARES] {
    std::array::from_fn(|sq| u8::from(is_set(mask, sq / BOARD_SIZE, sq % BOARD_SIZE)))
}

#[inline]
fn flat(v: u8) -> [u8; NUM_SQUARES] {
    FLAT_PLANES[v as usize]
}

/// 補正済みレコードを入力平面の列にする
pub fn input_planes(record: &TrainingRecord) -> Vec<[u8; NUM_SQUARES]> {
    let sc = &record.scalars;
    let mut out = Vec::with_capacity(INPUT_PLANES);
    out.extend(record.planes().iter().map(|&m| expand_plane(m)));
    out.extend(
        [sc.us_ooo, sc.us_oo, sc.them_ooo, sc.them_oo, sc.us_black].map(|b| flat(u8::from(b))),
    );
    out.push(flat(sc.rule50_count));
    out.push(flat(0));
    out.push(flat(1));
    out
}

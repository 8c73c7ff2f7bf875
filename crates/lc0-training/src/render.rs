//! 盤面図による確認表示
//!
//! 履歴8手を横に並べて表示する。`.` は空きマス、大文字は手番側、小文字は相手側。
//!
//! ```text
//! ply 1 move 1 (not part of training data)
//! us = White
//! rule50_count 0 us_ooo us_oo them_ooo them_oo 1 1 1 1
//! ....K... ....K... ...
//! PPPPPPPP PPPPPPPP ...
//! ```

use std::fmt::Write as _;

use crate::history::{History, Snapshot};
use crate::plane::BOARD_SIZE;
use crate::record::TrainingRecord;

/// 表示する履歴の並び
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryView {
    /// 手番側視点に補正した並び
    #[default]
    Corrected,
    /// ファイルに格納されていた並び
    Stored,
}

/// 1手分の盤面を8行の文字列にする
pub fn board_rows(snap: &Snapshot) -> [String; BOARD_SIZE] {
    std::array::from_fn(|rank| {
        (0..BOARD_SIZE)
            .map(|file| snap.piece_at(rank, file).map_or('.', |c| c.symbol()))
            .collect()
    })
}

/// 履歴を横に並べた盤面図
pub fn describe_history(history: &History) -> String {
    let rows: Vec<[String; BOARD_SIZE]> = history.iter().map(board_rows).collect();
    let mut s = String::new();
    for rank in 0..BOARD_SIZE {
        for board in &rows {
            s.push_str(&board[rank]);
            s.push(' ');
        }
        s.push('\n');
    }
    for snap in history {
        let _ = write!(s, "{:<8} ", format!("reps {}", snap.repetition_count()));
    }
    s.push('\n');
    s
}

/// レコード1件の確認表示
///
/// `ply` はファイル内のレコード番号（0始まり）。手数はデータに含まれないので参考値。
pub fn describe(record: &TrainingRecord, ply: usize, view: HistoryView) -> String {
    let mut s = String::new();
    let _ = writeln!(
        s,
        "ply {} move {} (not part of training data)",
        ply + 1,
        (ply + 2) / 2
    );
    let _ = writeln!(s, "us = {}", if record.scalars.us_black { "Black" } else { "White" });
    let sc = &record.scalars;
    let _ = writeln!(
        s,
        "rule50_count {} us_ooo us_oo them_ooo them_oo {} {} {} {}",
        sc.rule50_count,
        u8::from(sc.us_ooo),
        u8::from(sc.us_oo),
        u8::from(sc.them_ooo),
        u8::from(sc.them_oo)
    );
    let history = match view {
        HistoryView::Corrected => record.history,
        HistoryView::Stored => record.stored_history(),
    };
    s.push_str(&describe_history(&history));
    s
}

//! 変換設定

use std::path::PathBuf;

use crate::render::HistoryView;

/// 不正なレコードに出会ったときの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// そのファイルの残りを打ち切る（それまでのレコードは出力済み）
    #[default]
    AbortFile,
    /// そのレコードだけ飛ばして続ける
    SkipRecord,
}

/// 変換設定
///
/// コマンドライン引数から組み立て、[`crate::batch::BatchDriver`] に渡す。
#[derive(Debug, Clone, Default)]
pub struct ConvertConfig {
    /// 盤面図を標準出力に書くか
    pub describe: bool,
    /// 補正済みのテキスト行を標準出力に書くか
    pub convert_text: bool,
    /// V3 バイナリの出力先（`.gz` なら gzip、`-` なら標準出力）
    pub output: Option<PathBuf>,
    /// 盤面図で見せる履歴の並び
    pub history_view: HistoryView,
    /// 不正なレコードの扱い
    pub error_policy: ErrorPolicy,
    /// レコード復号の並列数（1以下なら逐次）
    pub jobs: usize,
}

impl ConvertConfig {
    /// 出力が1つでも選ばれているか
    pub fn has_output(&self) -> bool {
        self.describe || self.convert_text || self.output.is_some()
    }

    /// 標準出力を使う出力が複数あるか
    pub fn stdout_conflict(&self) -> bool {
        let binary_to_stdout = self.output.as_deref().is_some_and(|p| p.as_os_str() == "-");
        binary_to_stdout && (self.describe || self.convert_text)
    }

    pub fn parallel(&self) -> bool {
        self.jobs > 1
    }
}

//! 学習データ V3 変換ツール
//!
//! V1 テキスト・V2 バイナリの学習データを読み、old flip の履歴を補正して
//! V3 形式で書き出す。入力の形式と gzip 圧縮は自動判別する。
//!
//! # 使用例
//!
//! ```bash
//! # 盤面図で中身を確認
//! cargo run -p tools --release --bin convert_to_v3 -- --describe data/training.1234.gz
//!
//! # V3 バイナリに変換（.gz なら圧縮）
//! cargo run -p tools --release --bin convert_to_v3 -- \
//!   --output out/training.v3.gz --jobs 4 "data/*.gz"
//! ```

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use glob::glob;

use lc0_training::io::open_writer;
use lc0_training::{
    BatchDriver, BinarySink, ConsoleSink, ConvertConfig, ErrorPolicy, HistoryView, RecordSink,
};

#[derive(Parser, Debug)]
#[command(name = "convert_to_v3")]
#[command(about = "Leela Chess の学習データを V3 形式に変換する")]
struct Cli {
    /// 入力ファイル（glob パターン可）
    #[arg(required = true)]
    files: Vec<String>,

    /// 盤面図を標準出力に表示
    #[arg(long, default_value_t = false)]
    describe: bool,

    /// 補正済みのテキスト行を標準出力に表示
    #[arg(long, default_value_t = false)]
    convert: bool,

    /// V3 バイナリの出力先（.gz なら gzip、- なら標準出力）
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 盤面図を補正前（格納時）の並びで表示
    #[arg(long, default_value_t = false)]
    raw_history: bool,

    /// 不正なレコードだけ飛ばして続行（既定はそのファイルを打ち切る）
    #[arg(long, default_value_t = false)]
    skip_bad_records: bool,

    /// レコード復号の並列数
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// デバッグログを表示
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> ConvertConfig {
        ConvertConfig {
            describe: self.describe,
            convert_text: self.convert,
            output: self.output.clone(),
            history_view: if self.raw_history {
                HistoryView::Stored
            } else {
                HistoryView::Corrected
            },
            error_policy: if self.skip_bad_records {
                ErrorPolicy::SkipRecord
            } else {
                ErrorPolicy::AbortFile
            },
            jobs: self.jobs,
        }
    }
}

/// 入力パターンを glob で展開する
///
/// 何にも一致しないパターンはそのままパスとして残し、読み込み時のエラーにする。
fn expand_input_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = PathBuf::from(pattern);
        if path.is_file() {
            files.push(path);
            continue;
        }

        let mut matches: Vec<PathBuf> = glob(pattern)
            .with_context(|| format!("Invalid glob pattern: {pattern}"))?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            log::warn!("no files match {pattern}");
            files.push(path);
            continue;
        }
        matches.sort();
        files.extend(matches);
    }
    Ok(files)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    let config = cli.to_config();
    if !config.has_output() {
        log::warn!("no output selected (use --describe, --convert or --output)");
        return Ok(());
    }
    if config.stdout_conflict() {
        bail!("--output - cannot be combined with --describe or --convert");
    }

    let files = expand_input_patterns(&cli.files)?;

    let mut console = (config.describe || config.convert_text).then(|| {
        let view = config.describe.then_some(config.history_view);
        ConsoleSink::new(BufWriter::new(io::stdout().lock()), view, config.convert_text)
    });
    let mut binary = match &config.output {
        Some(path) => Some(BinarySink::new(
            open_writer(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => None,
    };

    let summary = {
        let mut sinks: Vec<&mut dyn RecordSink> = Vec::new();
        if let Some(sink) = console.as_mut() {
            sinks.push(sink);
        }
        if let Some(sink) = binary.as_mut() {
            sinks.push(sink);
        }
        let mut driver = BatchDriver::new(&config, sinks);
        driver.run(&files).context("Failed to write output")?
    };

    if let (Some(sink), Some(path)) = (binary, &config.output) {
        let written = sink.written();
        sink.into_inner()
            .close()
            .with_context(|| format!("Failed to finish {}", path.display()))?;
        log::info!("wrote {written} records to {}", path.display());
    }
    drop(console);

    log::info!(
        "{} files, {} records, {} skipped",
        summary.files.len(),
        summary.emitted(),
        summary.skipped()
    );
    if summary.failed_files() > 0 {
        for report in summary.files.iter().filter(|r| r.failed()) {
            log::error!("failed: {}", report.path.display());
        }
        std::process::exit(1);
    }
    Ok(())
}

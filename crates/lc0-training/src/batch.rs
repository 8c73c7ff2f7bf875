//! 複数ファイルの一括変換
//!
//! 1ファイルずつ読み込み、形式を判別してレコードに分け、復号したものを
//! 登録された [`RecordSink`] へ入力順に渡す。
//!
//! - 開けないファイル・形式不明・長さ不一致のファイルは丸ごと失敗として次へ進む
//! - 不正なレコードは [`ErrorPolicy`] に従って打ち切るか飛ばす
//! - 出力先への書き込みエラーは全体を止める

use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::binary::BinaryRecord;
use crate::config::{ConvertConfig, ErrorPolicy};
use crate::error::{CodecError, ConsistencyError, FileError, FormatError, RecordError};
use crate::format::{DataFormat, sniff};
use crate::io::read_all;
use crate::outputs::NUM_POLICY;
use crate::record::{TextRecord, TrainingRecord, split_records};
use crate::transcode::RecordSink;

/// 復号前のレコード
enum RawRecord<'a> {
    Text(TextRecord),
    Binary(&'a [u8]),
}

impl RawRecord<'_> {
    fn decode(&self, format: DataFormat) -> Result<TrainingRecord, CodecError> {
        let record = match self {
            RawRecord::Text(text) => text.decode(format.convention())?,
            RawRecord::Binary(bytes) => BinaryRecord::from_bytes(bytes)?.decode()?,
        };
        check_outputs(&record)?;
        Ok(record)
    }
}

/// 方策・勝敗が読めるか確かめる
///
/// テキスト出力では行をそのまま写すが、壊れたレコードは出さない。
fn check_outputs(record: &TrainingRecord) -> Result<(), FormatError> {
    let probabilities = record.probabilities()?;
    if probabilities.len() != NUM_POLICY {
        return Err(FormatError::PolicyLength {
            expected: NUM_POLICY,
            actual: probabilities.len(),
        });
    }
    record.result()?;
    Ok(())
}

/// ストリームをレコードに分ける
fn split_stream(bytes: &[u8], format: DataFormat) -> Result<Vec<RawRecord<'_>>, CodecError> {
    match format {
        DataFormat::TextV1 => {
            let text = String::from_utf8_lossy(bytes);
            let lines: Vec<String> = text.lines().map(str::to_string).collect();
            Ok(split_records(lines)?.into_iter().map(RawRecord::Text).collect())
        }
        DataFormat::BinaryV2 | DataFormat::BinaryV3 => {
            if bytes.len() % BinaryRecord::SIZE != 0 {
                return Err(ConsistencyError::BinaryStreamLength {
                    bytes: bytes.len(),
                    record_size: BinaryRecord::SIZE,
                }
                .into());
            }
            Ok(bytes.chunks_exact(BinaryRecord::SIZE).map(RawRecord::Binary).collect())
        }
    }
}

/// 1ファイルの処理結果
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    /// 判別できた形式
    pub format: Option<DataFormat>,
    /// ファイル内のレコード数
    pub records: usize,
    /// 出力したレコード数
    pub emitted: usize,
    /// 飛ばしたレコード
    pub skipped: Vec<RecordError>,
    /// 途中で打ち切った場合のエラー
    pub error: Option<FileError>,
}

impl FileReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            format: None,
            records: 0,
            emitted: 0,
            skipped: Vec::new(),
            error: None,
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// 全ファイルの処理結果
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub files: Vec<FileReport>,
}

impl BatchSummary {
    /// 失敗したファイル数
    pub fn failed_files(&self) -> usize {
        self.files.iter().filter(|f| f.failed()).count()
    }

    pub fn emitted(&self) -> usize {
        self.files.iter().map(|f| f.emitted).sum()
    }

    pub fn skipped(&self) -> usize {
        self.files.iter().map(|f| f.skipped.len()).sum()
    }
}

/// 一括変換の実行器
pub struct BatchDriver<'a> {
    config: &'a ConvertConfig,
    sinks: Vec<&'a mut dyn RecordSink>,
    pool: Option<rayon::ThreadPool>,
}

impl<'a> BatchDriver<'a> {
    pub fn new(config: &'a ConvertConfig, sinks: Vec<&'a mut dyn RecordSink>) -> Self {
        let pool = if config.parallel() {
            match rayon::ThreadPoolBuilder::new().num_threads(config.jobs).build() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("failed to build thread pool, decoding sequentially: {e}");
                    None
                }
            }
        } else {
            None
        };
        Self {
            config,
            sinks,
            pool,
        }
    }

    /// 全ファイルを順に処理する
    ///
    /// 出力先への書き込みに失敗したときだけ `Err` を返す。
    pub fn run<P: AsRef<Path>>(&mut self, paths: &[P]) -> io::Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        for path in paths {
            let report = self.process_file(path.as_ref())?;
            summary.files.push(report);
        }
        for sink in self.sinks.iter_mut() {
            sink.flush()?;
        }
        log::debug!(
            "{} files, {} records emitted, {} skipped, {} files failed",
            summary.files.len(),
            summary.emitted(),
            summary.skipped(),
            summary.failed_files()
        );
        Ok(summary)
    }

    /// 1ファイルを処理する
    pub fn process_file(&mut self, path: &Path) -> io::Result<FileReport> {
        let mut report = FileReport::new(path);
        log::info!("{}", path.display());

        let bytes = match read_all(path) {
            Ok(bytes) => bytes,
            Err(source) => {
                let err = FileError::Read {
                    path: path.to_path_buf(),
                    source,
                };
                log::error!("{err}");
                report.error = Some(err);
                return Ok(report);
            }
        };

        let split = sniff(&bytes)
            .map_err(CodecError::from)
            .and_then(|format| Ok((format, split_stream(&bytes, format)?)));
        let (format, items) = match split {
            Ok(v) => v,
            Err(source) => {
                let err = FileError::Stream {
                    path: path.to_path_buf(),
                    source,
                };
                log::error!("{err}");
                report.error = Some(err);
                return Ok(report);
            }
        };
        report.format = Some(format);
        report.records = items.len();
        log::debug!("{}: {} records ({})", path.display(), items.len(), format.name());

        let decoded = self.decode_all(&items, format);
        for (index, result) in decoded.into_iter().enumerate() {
            let failure = match result {
                Ok(record) => match self.emit(index, &record) {
                    Ok(()) => {
                        report.emitted += 1;
                        continue;
                    }
                    Err(CodecError::Io(e)) => return Err(e),
                    Err(e) => e,
                },
                Err(e) => e,
            };
            let err = RecordError::new(index, failure);
            match self.config.error_policy {
                ErrorPolicy::AbortFile => {
                    log::error!("{}: {err}", path.display());
                    report.error = Some(FileError::Record {
                        path: path.to_path_buf(),
                        source: err,
                    });
                    break;
                }
                ErrorPolicy::SkipRecord => {
                    log::warn!("{}: skipped {err}", path.display());
                    report.skipped.push(err);
                }
            }
        }

        log::debug!(
            "{}: emitted {}/{} records",
            path.display(),
            report.emitted,
            report.records
        );
        Ok(report)
    }

    fn decode_all(
        &self,
        items: &[RawRecord<'_>],
        format: DataFormat,
    ) -> Vec<Result<TrainingRecord, CodecError>> {
        match &self.pool {
            // collect は入力順を保つ
            Some(pool) => pool.install(|| items.par_iter().map(|r| r.decode(format)).collect()),
            None => items.iter().map(|r| r.decode(format)).collect(),
        }
    }

    fn emit(&mut self, index: usize, record: &TrainingRecord) -> Result<(), CodecError> {
        for sink in self.sinks.iter_mut() {
            sink.emit(index, record)?;
        }
        Ok(())
    }
}

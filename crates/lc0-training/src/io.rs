//! ファイルI/O（gzip対応）
//!
//! 入力は先頭2バイトのマジック（`1f 8b`）で gzip を判別する。拡張子は見ない。
//! 出力は拡張子 `.gz` なら gzip、`-` なら標準出力。

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

const READER_BUF_CAP: usize = 128 * 1024; // 128 KiB

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// 入力の圧縮形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCompression {
    Plain,
    Gzip,
}

/// 先頭バイトから圧縮形式を判別する
pub fn sniff_compression(head: &[u8]) -> InputCompression {
    if head.starts_with(&GZIP_MAGIC) {
        InputCompression::Gzip
    } else {
        InputCompression::Plain
    }
}

/// 入力を開く（`-` は標準入力）
///
/// 連結された gzip メンバーも続けて展開する。
pub fn open_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let p = path.as_ref();
    let raw: Box<dyn Read> = if p.to_string_lossy() == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(File::open(p)?)
    };
    let mut buffered = BufReader::with_capacity(READER_BUF_CAP, raw);
    // fill_buf は消費しないので、覗いたバイトは後段の読み込みにも残る
    let kind = sniff_compression(buffered.fill_buf()?);
    match kind {
        InputCompression::Gzip => Ok(Box::new(BufReader::with_capacity(
            READER_BUF_CAP,
            MultiGzDecoder::new(buffered),
        ))),
        InputCompression::Plain => Ok(Box::new(buffered)),
    }
}

/// 展開済みの内容を全部読む
pub fn read_all<P: AsRef<Path>>(path: P) -> io::Result<Vec<u8>> {
    let mut reader = open_reader(path)?;
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

/// 圧縮出力の終端処理のエラーも返せる書き出し先
#[must_use = "call .close() to propagate compression/IO errors"]
pub enum Writer {
    Plain(BufWriter<File>),
    Stdout(io::Stdout),
    Gz(GzEncoder<BufWriter<File>>),
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Writer::Plain(f) => f.write(buf),
            Writer::Stdout(s) => s.write(buf),
            Writer::Gz(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Writer::Plain(f) => f.flush(),
            Writer::Stdout(s) => s.flush(),
            Writer::Gz(e) => e.flush(),
        }
    }
}

impl Writer {
    /// ストリームを閉じる（gzip はトレーラまで書く）
    pub fn close(self) -> io::Result<()> {
        match self {
            Writer::Plain(mut f) => f.flush(),
            Writer::Stdout(mut s) => s.flush(),
            Writer::Gz(e) => e.finish()?.flush(),
        }
    }
}

/// 出力を開く
pub fn open_writer<P: AsRef<Path>>(path: P) -> io::Result<Writer> {
    let p = path.as_ref();
    if p.to_string_lossy() == "-" {
        return Ok(Writer::Stdout(io::stdout()));
    }
    let f = BufWriter::new(File::create(p)?);
    let ext = p
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if ext == "gz" {
        return Ok(Writer::Gz(GzEncoder::new(f, Compression::default())));
    }
    Ok(Writer::Plain(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_compression() {
        assert_eq!(sniff_compression(&[0x1f, 0x8b, 0x08]), InputCompression::Gzip);
        assert_eq!(sniff_compression(b"0000"), InputCompression::Plain);
        assert_eq!(sniff_compression(&[0x1f]), InputCompression::Plain);
        assert_eq!(sniff_compression(&[]), InputCompression::Plain);
    }

    #[test]
    fn test_plain_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let mut w = open_writer(&path).unwrap();
        w.write_all(b"hello\nworld\n").unwrap();
        w.close().unwrap();
        assert_eq!(read_all(&path).unwrap(), b"hello\nworld\n");
    }

    #[test]
    fn test_gzip_detected_by_magic_not_extension() {
        let dir = tempdir().unwrap();
        let gz = dir.path().join("a.gz");
        let mut w = open_writer(&gz).unwrap();
        assert!(matches!(w, Writer::Gz(_)));
        w.write_all(b"payload").unwrap();
        w.close().unwrap();

        let raw = std::fs::read(&gz).unwrap();
        assert!(raw.starts_with(&GZIP_MAGIC));
        // 拡張子なしにしても展開される
        let renamed = dir.path().join("chunk");
        std::fs::write(&renamed, &raw).unwrap();
        assert_eq!(read_all(&renamed).unwrap(), b"payload");
    }

    #[test]
    fn test_concatenated_gzip_members() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.gz");
        let mut bytes = Vec::new();
        for part in [b"first\n".as_slice(), b"second\n".as_slice()] {
            let mut enc = GzEncoder::new(Vec::new(), Compression::fast());
            enc.write_all(part).unwrap();
            bytes.extend(enc.finish().unwrap());
        }
        std::fs::write(&path, bytes).unwrap();
        assert_eq!(read_all(&path).unwrap(), b"first\nsecond\n");
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();
        assert!(read_all(&path).unwrap().is_empty());
    }
}

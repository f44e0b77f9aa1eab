use crate::models::log_entry::{LogEntry, LOG_HEADER};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 日志写入失败会终止整次运行
#[derive(Debug, Error)]
pub enum LogWriteError {
    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to append to log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// 追加写入的 CSV 发送日志. 每行单独打开文件、追加、刷新, 不改写已有内容.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件不存在或为空时写入表头
    pub fn ensure_header(&self) -> Result<(), LogWriteError> {
        self.open_and_write(|_| Ok(()))
    }

    pub fn append(&self, entry: &LogEntry) -> Result<(), LogWriteError> {
        self.open_and_write(|writer| writer.write_record(entry.to_record()))
    }

    fn open_and_write<F>(&self, write_rows: F) -> Result<(), LogWriteError>
    where
        F: FnOnce(&mut csv::Writer<std::fs::File>) -> csv::Result<()>,
    {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.open_err(source))?;
        let is_empty = file.metadata().map_err(|source| self.open_err(source))?.len() == 0;
        if !is_empty {
            terminate_last_line(&mut file).map_err(|source| self.open_err(source))?;
        }

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        write_rows_with_header(&mut writer, is_empty, write_rows).map_err(|source| LogWriteError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn open_err(&self, source: io::Error) -> LogWriteError {
        LogWriteError::Open {
            path: self.path.clone(),
            source,
        }
    }
}

/// 已有内容不以换行结尾时补一个换行, 新行不会接在最后一行后面
fn terminate_last_line(file: &mut File) -> io::Result<()> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        // append 模式下写入总在文件末尾
        file.write_all(b"\n")?;
    }
    Ok(())
}

fn write_rows_with_header<W, F>(writer: &mut csv::Writer<W>, write_header: bool, write_rows: F) -> csv::Result<()>
where
    W: io::Write,
    F: FnOnce(&mut csv::Writer<W>) -> csv::Result<()>,
{
    if write_header {
        writer.write_record(LOG_HEADER)?;
    }
    write_rows(writer)?;
    writer.flush()?;
    Ok(())
}

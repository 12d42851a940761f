//! The queue file: one 33-byte record per UUID (`[+-][32 hex]`), followed
//! by a line terminator that is not itself part of the record. Owned
//! exclusively by the dispatcher — append on enqueue, in-place patch on
//! successful delivery, full sequential scan on every tick.

use std::future::Future;
use std::path::{Path, PathBuf};

use std::io::SeekFrom;

use tokio::fs::OpenOptions;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::error::{Error, Result};

const RECORD_LEN: usize = 33;
const PENDING: u8 = b'-';
const DONE: u8 = b'+';

pub struct Queue {
    path: PathBuf,
}

impl Queue {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a new pending record for `uuid`.
    pub async fn append(&self, uuid: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}{uuid}\n", PENDING as char).as_bytes())
            .await?;
        Ok(())
    }

    /// Sequentially scan every record. For each still-pending one, await
    /// `deliver(uuid)`; if it resolves `Ok(true)`, patch the status byte
    /// to `+` in place before moving on. `deliver` returning `Err` stops
    /// the scan and propagates, same as a malformed record. A missing
    /// queue file is a no-op — nothing has been enqueued yet.
    pub async fn scan_pending<F, Fut>(&self, mut deliver: F) -> Result<()>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let mut file = match OpenOptions::new().read(true).write(true).open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut offset: u64 = 0;
        loop {
            file.seek(SeekFrom::Start(offset)).await?;

            let mut record = [0u8; RECORD_LEN];
            if file.read_exact(&mut record).await.is_err() {
                break; // EOF or truncated trailing record: stop the scan here
            }
            let mut consumed = RECORD_LEN as u64;
            consumed += skip_terminator(&mut file).await?;

            let status = record[0];
            if status != PENDING && status != DONE {
                return Err(Error::MalformedQueueRecord(offset));
            }
            let uuid = String::from_utf8_lossy(&record[1..]).into_owned();

            if status == PENDING && deliver(uuid).await? {
                file.seek(SeekFrom::Start(offset)).await?;
                file.write_all(&[DONE]).await?;
            }

            offset += consumed;
        }
        Ok(())
    }
}

/// Consume the line terminator after a record (`\n` or `\r\n`), returning
/// how many bytes were consumed. Tolerates a record with no terminator at
/// all (end of file right after the last record).
async fn skip_terminator(file: &mut tokio::fs::File) -> Result<u64> {
    let mut byte = [0u8; 1];
    if file.read_exact(&mut byte).await.is_err() {
        return Ok(0);
    }
    if byte[0] == b'\r' {
        let mut lf = [0u8; 1];
        if file.read_exact(&mut lf).await.is_ok() {
            return Ok(2);
        }
        return Ok(1);
    }
    Ok(1)
}

//! Disk side of a download.
//!
//! [`FileSink`] creates the destination directory and file and writes the
//! incoming chunks in order.
//!
//! # Examples
//!
//! ```rust,no_run
//! use haul::sink::FileSink;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), haul::Error> {
//! let mut sink = FileSink::create(Path::new("downloads"), "file.bin").await?;
//! sink.write(b"first chunk").await?;
//! let path = sink.finish().await?;
//! # Ok(())
//! # }
//! ```

mod file;

pub(crate) use file::remove_partial;
pub use file::FileSink;

//! Feed parsing
//!
//! Adapts the fetched HTTP body into a lazy, forward-only stream of CSV
//! records. Quoting rules (embedded commas, newlines, doubled quotes) are
//! handled by `csv-async`; the reader is flexible about ragged row lengths
//! because the feed is known to contain short rows, and the mapper treats
//! missing cells as empty. Structural parse failures surface through the
//! record stream as [`csv_async::Error`] and abort the run as
//! [`crate::IngestError::MalformedCsv`].

use futures::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

/// One raw CSV line, no semantic meaning attached.
pub type RawRecord = csv_async::StringRecord;

/// Build a CSV reader with the feed's dialect over any byte source.
pub fn csv_reader<R>(input: R) -> csv_async::AsyncReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    csv_async::AsyncReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .create_reader(input)
}

/// Wrap the response body stream into a CSV reader without buffering the
/// whole payload.
pub fn feed_reader(
    response: reqwest::Response,
) -> csv_async::AsyncReader<impl AsyncRead + Unpin + Send> {
    let body = response.bytes_stream().map_err(std::io::Error::other);
    csv_reader(StreamReader::new(body))
}

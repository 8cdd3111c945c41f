use std::{
    io,
    marker::PhantomData,
    pin::Pin,
    task::{ready, Context, Poll},
};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::{
    io::{AsyncBufRead, AsyncWriteExt, BufReader},
    net::tcp::{OwnedReadHalf, OwnedWriteHalf},
};
use tokio_stream::Stream;

pub const NEW_LINE: &[u8; 2] = b"\r\n";

/// Longest line accepted from the peer, the line terminator excluded
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Failure while moving a message over the TCP stream
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying stream could not be read or written, the connection is unusable
    #[error("could not read or write the tcp stream")]
    Io(#[from] io::Error),
    /// A single line could not be encoded or decoded, the connection itself is still fine
    #[error("could not encode or decode the message: {0}")]
    Codec(#[from] serde_json::Error),
    /// A single line went over the limit and was dropped, the connection itself is still fine
    #[error("line is longer than {max} bytes")]
    LineTooLong { max: usize },
}

impl TransportError {
    /// Only the line the error was raised for is lost, the following lines are still readable
    pub fn is_malformed_line(&self) -> bool {
        matches!(
            self,
            TransportError::Codec(_) | TransportError::LineTooLong { .. }
        )
    }
}

/// Writes messages of type `T` to the backing stream, one JSON document per line
pub struct JsonLineWriter<T> {
    writer: OwnedWriteHalf,
    _message: PhantomData<fn(&T)>,
}

impl<T: Serialize> JsonLineWriter<T> {
    pub fn new(writer: OwnedWriteHalf) -> Self {
        Self {
            writer,
            _message: PhantomData,
        }
    }

    /// Send a message to the backing [tokio::net::TcpStream]
    ///
    /// # Cancel Safety
    ///
    /// This method is not cancellation safe. If it is used as the event
    /// in a [tokio::select!] statement and some other branch completes first,
    /// the message may have been partially written and the peer will read
    /// a corrupted line.
    pub async fn write(&mut self, message: &T) -> Result<(), TransportError> {
        let mut serialized_bytes = serde_json::to_vec(message)?;
        serialized_bytes.extend_from_slice(NEW_LINE);

        self.writer.write_all(serialized_bytes.as_slice()).await?;

        Ok(())
    }
}

/// Bytes of the line being read, capped at [MAX_LINE_LEN]
#[derive(Debug, Default)]
struct LineBuffer {
    bytes: Vec<u8>,
    /// The current line went over the limit, the rest of it is dropped
    is_discarding: bool,
}

impl LineBuffer {
    fn is_empty(&self) -> bool {
        self.bytes.is_empty() && !self.is_discarding
    }

    fn push(&mut self, chunk: &[u8]) {
        if self.is_discarding {
            return;
        }

        self.bytes.extend_from_slice(chunk);

        if self.bytes.len() > MAX_LINE_LEN + NEW_LINE.len() {
            self.bytes = Vec::new();
            self.is_discarding = true;
        }
    }

    /// Hands out the finished line without its terminator and starts a new one
    fn take(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut line = std::mem::take(&mut self.bytes);

        if std::mem::take(&mut self.is_discarding) {
            return Err(TransportError::LineTooLong { max: MAX_LINE_LEN });
        }

        if line.ends_with(b"\n") {
            line.pop();
        }
        if line.ends_with(b"\r") {
            line.pop();
        }

        Ok(line)
    }
}

fn decode<T: DeserializeOwned>(line: Result<Vec<u8>, TransportError>) -> Result<T, TransportError> {
    // bytes are decoded as is, so invalid UTF-8 is a codec error of this line only
    Ok(serde_json::from_slice::<T>(&line?)?)
}

/// Stream of messages of type `T` decoded from the read half of a TCP stream, one per line.
///
/// A line that can not be decoded or is longer than [MAX_LINE_LEN] yields an error
/// item for that line only, the following lines are still produced.
///
/// # Cancel Safety
///
/// The partially read line is kept between polls, so the stream can be used
/// in [tokio::select!] without the risk of missing messages.
pub struct JsonLineReader<T> {
    reader: BufReader<OwnedReadHalf>,
    line: LineBuffer,
    _message: PhantomData<fn() -> T>,
}

impl<T> JsonLineReader<T> {
    pub fn new(reader: OwnedReadHalf) -> Self {
        Self {
            reader: BufReader::new(reader),
            line: LineBuffer::default(),
            _message: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Stream for JsonLineReader<T> {
    type Item = Result<T, TransportError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            let available = match ready!(Pin::new(&mut this.reader).poll_fill_buf(cx)) {
                Ok(available) => available,
                Err(err) => return Poll::Ready(Some(Err(err.into()))),
            };

            // the peer closed the stream, a last line without terminator still counts
            if available.is_empty() {
                if this.line.is_empty() {
                    return Poll::Ready(None);
                }

                return Poll::Ready(Some(decode(this.line.take())));
            }

            let (chunk_len, has_line_end) = match available.iter().position(|b| *b == b'\n') {
                Some(idx) => (idx + 1, true),
                None => (available.len(), false),
            };
            this.line.push(&available[..chunk_len]);
            Pin::new(&mut this.reader).consume(chunk_len);

            if has_line_end {
                return Poll::Ready(Some(decode(this.line.take())));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::{TcpListener, TcpStream};
    use tokio_stream::StreamExt;

    use super::*;

    /// Writes `bytes` from one end of a local TCP connection and reads lines on the other
    async fn reader_for(bytes: Vec<u8>) -> JsonLineReader<serde_json::Value> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(&bytes).await.unwrap();
        });

        let (stream, _) = listener.accept().await.unwrap();
        let (reader, _writer) = stream.into_split();

        JsonLineReader::new(reader)
    }

    #[tokio::test]
    async fn test_invalid_utf8_only_spoils_its_line() {
        let mut bytes = b"{\"name\":\"".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b"\"}\r\n{\"name\":\"standup\"}\r\n");
        let mut reader = reader_for(bytes).await;

        assert!(matches!(
            reader.next().await,
            Some(Err(TransportError::Codec(_)))
        ));
        assert_eq!(
            reader.next().await.unwrap().unwrap(),
            serde_json::json!({ "name": "standup" })
        );
        assert!(reader.next().await.is_none());
    }

    #[tokio::test]
    async fn test_too_long_line_is_dropped() {
        let mut bytes = vec![b'a'; MAX_LINE_LEN * 3];
        bytes.extend_from_slice(b"\r\n{\"name\":\"standup\"}\r\n");
        let mut reader = reader_for(bytes).await;

        assert!(matches!(
            reader.next().await,
            Some(Err(TransportError::LineTooLong { max: MAX_LINE_LEN }))
        ));
        assert_eq!(
            reader.next().await.unwrap().unwrap(),
            serde_json::json!({ "name": "standup" })
        );
    }

    #[tokio::test]
    async fn test_last_line_without_terminator() {
        let mut reader = reader_for(b"{\"a\":1}\n{\"b\":2}".to_vec()).await;

        assert_eq!(
            reader.next().await.unwrap().unwrap(),
            serde_json::json!({ "a": 1 })
        );
        assert_eq!(
            reader.next().await.unwrap().unwrap(),
            serde_json::json!({ "b": 2 })
        );
        assert!(reader.next().await.is_none());
    }

    #[test]
    fn test_malformed_line_errors() {
        assert!(TransportError::LineTooLong { max: MAX_LINE_LEN }.is_malformed_line());
        assert!(!TransportError::Io(io::ErrorKind::BrokenPipe.into()).is_malformed_line());
    }
}

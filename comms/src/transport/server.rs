use tokio::net::TcpStream;

use crate::{command, reply};

use super::common::{JsonLineReader, JsonLineWriter};

/// [CommandStream] is a stream of [crate::command::StoreCommand]s sent by the client
///
/// An error item for which [super::TransportError::is_malformed_line] holds only spoils
/// the line it was read from, the stream keeps producing the following commands.
///
/// # Cancel Safety
///
/// This stream is cancel-safe, meaning that it can be used in [tokio::select!]
/// without the risk of missing commands.
pub type CommandStream = JsonLineReader<command::StoreCommand>;

/// [ReplyWriter] writes [crate::reply::Reply]s to the client
pub type ReplyWriter = JsonLineWriter<reply::Reply>;

/// Splits a TCP stream into a stream of commands and a reply writer.
///
/// # Arguments
///
/// - `stream` - A [TcpStream] to split
pub fn split_tcp_stream(stream: TcpStream) -> (CommandStream, ReplyWriter) {
    let (reader, writer) = stream.into_split();

    (CommandStream::new(reader), ReplyWriter::new(writer))
}

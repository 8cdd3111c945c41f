use tokio::net::TcpStream;

use crate::{command, reply};

use super::common::{JsonLineReader, JsonLineWriter};

/// [ReplyStream] is a stream of [crate::reply::Reply]s sent by the room store
///
/// # Cancel Safety
///
/// This stream is cancel-safe, meaning that it can be used in [tokio::select]
/// without the risk of missing replies.
pub type ReplyStream = JsonLineReader<reply::Reply>;

/// [CommandWriter] writes [crate::command::StoreCommand]s to the room store
pub type CommandWriter = JsonLineWriter<command::StoreCommand>;

/// Splits a TCP stream into a stream of replies and a command writer.
///
/// # Arguments
///
/// - `stream` - A [TcpStream] to split
pub fn split_tcp_stream(stream: TcpStream) -> (ReplyStream, CommandWriter) {
    let (reader, writer) = stream.into_split();

    (ReplyStream::new(reader), CommandWriter::new(writer))
}

//! Helpers for moving between in-memory buffers and [`ByteStream`]s.

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures::{future, stream};

use docstore_core::traits::storage::ByteStream;

/// Wrap a buffer as a single-chunk stream.
pub fn from_bytes(data: Bytes) -> ByteStream {
    Box::pin(stream::once(future::ready(Ok::<_, std::io::Error>(data))))
}

/// Drain a stream into one contiguous buffer.
pub async fn collect(mut stream: ByteStream) -> Result<Bytes, std::io::Error> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_joins_chunks() {
        let chunks: Vec<Result<Bytes, std::io::Error>> =
            vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"cd"))];
        let joined = collect(Box::pin(stream::iter(chunks))).await.unwrap();
        assert_eq!(&joined[..], b"abcd");
    }

    #[tokio::test]
    async fn test_collect_propagates_error() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(std::io::Error::other("reset")),
        ];
        assert!(collect(Box::pin(stream::iter(chunks))).await.is_err());
    }
}

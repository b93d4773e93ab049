//! One-shot JSON request/response over a connected stream socket.
//!
//! Both peripheral links speak the same framing: one JSON document per
//! write, one per read, at most 4 KiB each.

use std::io::{self, ErrorKind};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

/// Upper bound on a single request or response document.
pub const MAX_FRAME: usize = 4096;

/// Send one request document and wait for the peer's single response.
pub async fn roundtrip(stream: &mut UnixStream, request: &[u8]) -> io::Result<Vec<u8>> {
    stream.write_all(request).await?;

    let mut buf = vec![0u8; MAX_FRAME];
    let n = stream.read(&mut buf).await?;
    if n == 0 {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            "peer closed the connection",
        ));
    }
    buf.truncate(n);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exchanges_one_document() {
        let (mut client, mut server) = UnixStream::pair().expect("socket pair");

        let peer = tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_FRAME];
            let n = server.read(&mut buf).await.expect("read request");
            assert_eq!(&buf[..n], br#"{"cmd":"ping"}"#);
            server
                .write_all(br#"{"status":"ok"}"#)
                .await
                .expect("write response");
        });

        let response = roundtrip(&mut client, br#"{"cmd":"ping"}"#)
            .await
            .expect("roundtrip");
        assert_eq!(response, br#"{"status":"ok"}"#);

        peer.await.expect("peer task");
    }

    #[tokio::test]
    async fn closed_peer_is_an_error() {
        let (mut client, server) = UnixStream::pair().expect("socket pair");
        drop(server);

        let result = roundtrip(&mut client, b"{}").await;
        assert!(result.is_err());
    }
}

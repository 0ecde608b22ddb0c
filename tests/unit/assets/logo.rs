use std::{
    io::{Cursor, Read as _, Write as _},
    net::TcpListener,
    sync::Arc,
};

use base64::Engine as _;

use super::*;

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn data_uri_decodes_base64_payload() {
    let uri = format!("data:image/png;base64,{}", BASE64.encode(b"hello"));
    assert_eq!(decode_data_uri(&uri).unwrap(), b"hello");
}

#[test]
fn data_uri_survives_plus_to_space_decoding() {
    let encoded = BASE64.encode([0xfbu8, 0xef, 0xff]);
    assert!(encoded.contains('+') || encoded.contains('/'));
    let mangled = format!("data:image/png;base64,{}", encoded.replace('+', " "));
    assert_eq!(decode_data_uri(&mangled).unwrap(), vec![0xfb, 0xef, 0xff]);
}

#[test]
fn non_base64_data_uri_is_rejected() {
    assert!(matches!(
        decode_data_uri("data:text/plain,hello"),
        Err(CardError::Asset(_))
    ));
    assert!(decode_data_uri("data:image/png;base64").is_err());
}

#[tokio::test]
async fn byte_logos_resolve_without_network() {
    let fetcher = LogoFetcher::default();
    let img = fetcher
        .resolve(Some(&LogoRef::Bytes(Arc::new(tiny_png()))))
        .await
        .unwrap();
    assert_eq!((img.width, img.height), (2, 1));
}

#[tokio::test]
async fn data_uri_logos_resolve() {
    let fetcher = LogoFetcher::new(DEFAULT_LOGO_TIMEOUT, DEFAULT_LOGO_MAX_BYTES).unwrap();
    let uri = format!("data:image/png;base64,{}", BASE64.encode(tiny_png()));
    assert!(fetcher.resolve(Some(&LogoRef::Url(uri))).await.is_some());
}

#[tokio::test]
async fn failures_degrade_to_none() {
    let fetcher = LogoFetcher::new(Duration::from_millis(200), 16).unwrap();
    assert!(fetcher.resolve(None).await.is_none());
    assert!(
        fetcher
            .resolve(Some(&LogoRef::Bytes(Arc::new(vec![0; 64]))))
            .await
            .is_none()
    );
    assert!(
        fetcher
            .resolve(Some(&LogoRef::Bytes(Arc::new(vec![1, 2, 3]))))
            .await
            .is_none()
    );
    assert!(
        fetcher
            .resolve(Some(&LogoRef::Url("http://127.0.0.1:9/logo.png".to_string())))
            .await
            .is_none()
    );
}

/// Serve one chunked HTTP response with no `Content-Length`; returns its URL.
fn serve_chunked(chunks: usize, chunk_len: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else { return };
        let mut req = Vec::new();
        let mut buf = [0u8; 512];
        while !req.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => req.extend_from_slice(&buf[..n]),
            }
        }
        let head = "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
        if stream.write_all(head.as_bytes()).is_err() {
            return;
        }
        let data = vec![7u8; chunk_len];
        for _ in 0..chunks {
            let frame = [format!("{chunk_len:x}\r\n").as_bytes(), &data, b"\r\n"].concat();
            if stream.write_all(&frame).is_err() {
                return;
            }
        }
        let _ = stream.write_all(b"0\r\n\r\n");
    });
    format!("http://{addr}/logo.png")
}

#[tokio::test]
async fn chunked_bodies_within_the_cap_are_read_fully() {
    let fetcher = LogoFetcher::new(Duration::from_secs(2), 4096).unwrap();
    let url = serve_chunked(4, 256);
    let bytes = fetcher.fetch(&LogoRef::Url(url)).await.unwrap();
    assert_eq!(bytes, vec![7u8; 1024]);
}

#[tokio::test]
async fn chunked_bodies_over_the_cap_stop_early() {
    let fetcher = LogoFetcher::new(Duration::from_secs(2), 4096).unwrap();
    let url = serve_chunked(256, 1024);
    let err = fetcher.fetch(&LogoRef::Url(url)).await.unwrap_err();
    assert!(matches!(err, CardError::Asset(_)));
    assert!(err.to_string().contains("exceeds 4096 bytes"), "{err}");
}

//! # クライアント IP エクストラクタ
//!
//! 共有記録に保存する送信元 IP を取り出す。
//!
//! `X-Forwarded-For` の先頭、なければ接続元ソケットアドレスを使う。
//! ソケットアドレスは `into_make_service_with_connect_info::<SocketAddr>()` で起動した場合のみ得られる。

use std::{
    convert::Infallible,
    net::{IpAddr, SocketAddr},
};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// 送信元 IP（判別できなければ `None`）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get(FORWARDED_FOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Self(forwarded.or(peer)))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    async fn extract(request: Request<()>) -> ClientIp {
        let (mut parts, ()) = request.into_parts();
        ClientIp::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[rstest]
    #[case("203.0.113.7", "203.0.113.7")]
    #[case("203.0.113.7, 10.0.0.1", "203.0.113.7")]
    #[case(" 2001:db8::1 ,10.0.0.1", "2001:db8::1")]
    #[tokio::test]
    async fn x_forwarded_forの先頭を使う(#[case] header: &str, #[case] expected: &str) {
        let request = Request::builder()
            .header(FORWARDED_FOR_HEADER, header)
            .body(())
            .unwrap();

        assert_eq!(extract(request).await, ClientIp(Some(expected.parse().unwrap())));
    }

    #[tokio::test]
    async fn ヘッダーがなければ接続元アドレスを使う() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 10], 51000))));

        assert_eq!(
            extract(request).await,
            ClientIp(Some("192.0.2.10".parse().unwrap()))
        );
    }

    #[tokio::test]
    async fn 不正なヘッダーで接続元もなければnone() {
        let request = Request::builder()
            .header(FORWARDED_FOR_HEADER, "unknown")
            .body(())
            .unwrap();

        assert_eq!(extract(request).await, ClientIp(None));
    }
}

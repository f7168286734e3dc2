use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    extract::{ConnectInfo, Request},
    middleware::{from_fn, Next},
    Router,
};
use tracing::{debug, error, warn};

use crate::RestServerRealIpConfig;

pub fn add<S: Clone + Send + Sync + 'static>(
    real_ip_config: Option<Arc<RestServerRealIpConfig>>,
) -> impl FnOnce(Router<S>) -> Router<S> {
    |router| {
        router.layer(from_fn(move |mut request: Request, next: Next| {
            match ClientIp::from_request(&request, real_ip_config.as_deref()) {
                Some(client_ip) => {
                    request.extensions_mut().insert(client_ip);
                }
                None => error!("connection info missing from request"),
            }
            next.run(request)
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientIp(pub IpAddr);

impl ClientIp {
    fn from_request(
        request: &Request,
        real_ip_config: Option<&RestServerRealIpConfig>,
    ) -> Option<Self> {
        let client_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()?
            .ip();

        let Some(RestServerRealIpConfig { header, set_from }) = real_ip_config else {
            return Some(Self(client_ip));
        };

        let header_value = request.headers().get(header);

        if *set_from != client_ip {
            if let Some(header_value) = header_value {
                debug!(%client_ip, ?header_value, "ignoring real ip header value from untrusted source");
            }
            return Some(Self(client_ip));
        }

        let Some(header_value) = header_value else {
            warn!(%client_ip, "real ip header not found");
            return Some(Self(client_ip));
        };

        let Some(real_ip) = header_value
            .to_str()
            .ok()
            .and_then(|real_ip| real_ip.trim().parse().ok())
        else {
            error!(%client_ip, ?header_value, "failed to parse real ip header value");
            return Some(Self(client_ip));
        };

        Some(Self(real_ip))
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use axum::body::Body;
    use portfolio_demo::{CLIENT_IP, OTHER_CLIENT_IP};

    use super::*;

    const PROXY_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn config() -> RestServerRealIpConfig {
        RestServerRealIpConfig {
            header: "X-Real-Ip".into(),
            set_from: PROXY_IP,
        }
    }

    fn request(peer: IpAddr, real_ip: Option<&str>) -> Request {
        let mut request = Request::get("/")
            .body(Body::empty())
            .unwrap();
        if let Some(real_ip) = real_ip {
            request
                .headers_mut()
                .insert("X-Real-Ip", real_ip.parse().unwrap());
        }
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::new(peer, 4242)));
        request
    }

    #[test]
    fn without_config() {
        let request = request(CLIENT_IP, Some("198.51.100.42"));
        let result = ClientIp::from_request(&request, None);
        assert_eq!(result, Some(ClientIp(CLIENT_IP)));
    }

    #[test]
    fn trusted_proxy() {
        let request = request(PROXY_IP, Some("198.51.100.42"));
        let result = ClientIp::from_request(&request, Some(&config()));
        assert_eq!(result, Some(ClientIp(OTHER_CLIENT_IP)));
    }

    #[test]
    fn untrusted_source() {
        let request = request(CLIENT_IP, Some("198.51.100.42"));
        let result = ClientIp::from_request(&request, Some(&config()));
        assert_eq!(result, Some(ClientIp(CLIENT_IP)));
    }

    #[test]
    fn invalid_header() {
        let request = request(PROXY_IP, Some("not an ip"));
        let result = ClientIp::from_request(&request, Some(&config()));
        assert_eq!(result, Some(ClientIp(PROXY_IP)));
    }

    #[test]
    fn missing_connect_info() {
        let request = Request::get("/").body(Body::empty()).unwrap();
        let result = ClientIp::from_request(&request, None);
        assert_eq!(result, None);
    }
}

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use http::header::HOST;
use http::Request;
use rand::{rngs::ThreadRng, CryptoRng, RngCore};

pub fn generate_nonce() -> String {
    URL_SAFE_NO_PAD.encode(get_random_values::<_, 16>(&mut ThreadRng::default()))
}

pub fn get_random_values<R, const LEN: usize>(rng: &mut R) -> [u8; LEN]
where
    R: RngCore + CryptoRng,
{
    let mut bytes = [0u8; LEN];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// `scheme://host[:port]` of the request, from its URI or else its `Host` header.
pub fn root_url<B>(request: &Request<B>) -> Option<String> {
    let uri = request.uri();
    if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
        return Some(format!("{scheme}://{authority}"));
    }
    let host = request.headers().get(HOST)?.to_str().ok()?;
    let scheme = if is_loopback_host(host) { "http" } else { "https" };
    Some(format!("{scheme}://{host}"))
}

/// Local development runs on plain http against a loopback address.
pub fn is_local_dev(root_url: &str) -> bool {
    root_url.starts_with("http://localhost:") || root_url.starts_with("http://127.0.0.1:")
}

fn is_loopback_host(host: &str) -> bool {
    host.starts_with("localhost:") || host.starts_with("127.0.0.1:")
}

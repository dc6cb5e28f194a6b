const fn server_host() -> &'static str {
    if let Some(host) = option_env!("DISPATCH_SERVER_HOST") {
        host
    } else {
        "localhost"
    }
}

const fn server_port() -> u16 {
    if let Some(port) = option_env!("DISPATCH_SERVER_PORT") {
        const_str::parse!(port, u16)
    } else {
        3000
    }
}

const fn server_secure() -> bool {
    if let Some(secure) = option_env!("DISPATCH_SERVER_SECURE") {
        const_str::eq_ignore_ascii_case!(secure, "true") || const_str::equal!(secure, "1")
    } else {
        false
    }
}

const fn server_http_proto() -> &'static str {
    if server_secure() { "https" } else { "http" }
}

const SERVER_HOST: &str = server_host();
const SERVER_PORT: u16 = server_port();
const SERVER_HTTP_PROTO: &str = server_http_proto();

const SERVER_SOCKET: &str = const_str::concat!(SERVER_HOST, ":", SERVER_PORT);

const SERVER_HTTP_URL: &str = const_str::concat!(SERVER_HTTP_PROTO, "://", SERVER_SOCKET);

const SEARCH_PATH: &str = "/buscar-ambulancia";

const SEARCH_URL: &str = const_str::concat!(SERVER_HTTP_URL, SEARCH_PATH);

/// URL of the dispatch service's search endpoint, fixed at compile time
pub const fn search_url() -> &'static str {
    SEARCH_URL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_shape() {
        let url = search_url();
        assert!(
            url.starts_with("http://") || url.starts_with("https://"),
            "{url} has no scheme"
        );
        assert!(url.ends_with("/buscar-ambulancia"), "{url} has the wrong path");
    }
}

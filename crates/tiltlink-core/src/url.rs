//! Collector endpoint parsing.

pub const DEFAULT_HTTP_PORT: u16 = 80;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UrlError {
    /// No `scheme://` prefix.
    MissingScheme,
    /// Anything other than plain `http`.
    UnsupportedScheme,
    EmptyHost,
    /// Userinfo, a second port or other delimiters inside the host.
    InvalidHost,
    InvalidPort,
}

/// Parsed `http://host[:port][/path][?query]` endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CollectorUrl {
    host: &'static str,
    port: u16,
    path: &'static str,
    query: &'static str,
}

impl CollectorUrl {
    pub fn parse(url: &'static str) -> Result<Self, UrlError> {
        let rest = match url.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("http") => rest,
            Some(_) => return Err(UrlError::UnsupportedScheme),
            None => return Err(UrlError::MissingScheme),
        };

        let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, target) = rest.split_at(authority_end);

        let (path, query) = match target.find('?') {
            Some(split) => target.split_at(split),
            None => (target, ""),
        };
        let path = if path.is_empty() { "/" } else { path };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| UrlError::InvalidPort)?;
                if port == 0 {
                    return Err(UrlError::InvalidPort);
                }
                (host, port)
            }
            None => (authority, DEFAULT_HTTP_PORT),
        };

        if host.is_empty() {
            return Err(UrlError::EmptyHost);
        }
        if host.contains(['@', ':', '?', '#']) {
            return Err(UrlError::InvalidHost);
        }

        Ok(Self {
            host,
            port,
            path,
            query,
        })
    }

    pub fn host(&self) -> &'static str {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Absolute path of the request target; never empty.
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Query string including its leading `?`, or empty.
    pub fn query(&self) -> &'static str {
        self.query
    }
}

/// Placeholder used when the empty domain has to be shown to a person.
pub const EMPTY_DOMAIN_LABEL: &str = "(none)";

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Derives the network location (host, plus port when one is written) of `url`.
///
/// The authority is taken as written: host case, explicit ports and
/// non-ASCII hosts are kept, so `http://a.com:80` and `http://a.com` are
/// different domains. Credentials before `@` are dropped. Total: anything
/// without a `//` authority yields an empty string.
pub fn domain_of(url: &str) -> String {
    let url = url.trim();
    let after_scheme = match url.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => url,
    };
    let Some(authority) = after_scheme.strip_prefix("//") else {
        return String::new();
    };

    let end = authority.find(['/', '?', '#']).unwrap_or(authority.len());
    let netloc = &authority[..end];
    let host = netloc.rsplit_once('@').map_or(netloc, |(_, host)| host);
    host.to_string()
}

pub fn display_domain(domain: &str) -> &str {
    if domain.is_empty() {
        EMPTY_DOMAIN_LABEL
    } else {
        domain
    }
}

pub fn redact_domain(domain: &str) -> String {
    if domain.is_empty() {
        return EMPTY_DOMAIN_LABEL.to_string();
    }

    let (host, port) = match domain.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => (host, Some(port)),
        _ => (domain, None),
    };

    let parts: Vec<&str> = host.split('.').collect();
    let redacted = if parts.len() <= 1 {
        host.to_string()
    } else if parts[parts.len() - 2].len() <= 3 {
        format!("???.{}", parts[parts.len() - 1])
    } else {
        let masked: Vec<String> = parts[..parts.len() - 1]
            .iter()
            .map(|part| "*".repeat(part.len()))
            .collect();
        format!("{}.{}", masked.join("."), parts[parts.len() - 1])
    };

    match port {
        Some(port) => format!("{}:{}", redacted, port),
        None => redacted,
    }
}

use hyper::{header::COOKIE, HeaderMap, StatusCode};

/// Extracts the session ID from the `sid` cookie.
pub fn extract_session(headers: &HeaderMap) -> Result<[u8; 16], StatusCode> {
    let sid = headers
        .get(COOKIE)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .as_bytes()
        .split(|&byte| byte == b';')
        .filter_map(|section| {
            let section = section.strip_prefix(b" ").unwrap_or(section);
            let mid = section.iter().position(|&byte| byte == b'=')?;
            let (key, rest) = section.split_at(mid);
            Some((key, &rest[1..]))
        })
        .find_map(|(key, value)| (key == b"sid").then_some(value))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let mut id = [0; 16];
    hex::decode_to_slice(sid, &mut id).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok(id)
}

/// First creates a "salted session" by appending the session ID with a nonce.
/// The result is then hashed with the Blake3 hashing algorithm. This function
/// returns the resulting [`Hasher`](blake3::Hasher). See the linked
/// documentation for more details on retrieving the digest.
pub fn hash_session_salted_with_nonce(session: &[u8; 16], nonce: u64) -> blake3::Hasher {
    let mut hasher = blake3::Hasher::new();
    hasher.update(session).update(&nonce.to_be_bytes());
    hasher
}

#[cfg(test)]
mod tests {
    use super::{extract_session, hash_session_salted_with_nonce};
    use hyper::{header::COOKIE, HeaderMap, StatusCode};

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie.parse().unwrap());
        headers
    }

    #[test]
    fn extracts_the_sid_cookie() {
        let parsed = extract_session(&headers("sid=000102030405060708090a0b0c0d0e0f")).unwrap();
        assert_eq!(parsed, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn skips_unrelated_cookies() {
        let parsed = extract_session(&headers("theme=dark; sid=ffffffffffffffffffffffffffffffff; lang=en")).unwrap();
        assert_eq!(parsed, [0xff; 16]);
    }

    #[test]
    fn rejects_missing_sessions() {
        assert_eq!(extract_session(&HeaderMap::new()).unwrap_err(), StatusCode::UNAUTHORIZED);
        assert_eq!(extract_session(&headers("theme=dark")).unwrap_err(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn rejects_malformed_session_ids() {
        assert_eq!(extract_session(&headers("sid=zz")).unwrap_err(), StatusCode::BAD_REQUEST);
        assert_eq!(extract_session(&headers("sid=00ff")).unwrap_err(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn hash_depends_on_the_nonce() {
        let session = [42; 16];
        let one = hash_session_salted_with_nonce(&session, 1).finalize();
        let two = hash_session_salted_with_nonce(&session, 2).finalize();
        assert_ne!(one, two);
        assert_eq!(one, hash_session_salted_with_nonce(&session, 1).finalize());
    }
}

use mac_address::get_mac_address;

/// MAC of the primary network interface, `AA:BB:CC:DD:EE:FF`. The platform
/// binds every session to this value, so login cannot proceed without it.
pub fn device_mac() -> Result<String, String> {
    match get_mac_address() {
        Ok(Some(mac)) => {
            let formatted = sanitize_mac(&mac.to_string());
            if is_valid_mac(&formatted) {
                Ok(formatted)
            } else {
                Err(format!("unexpected MAC address format: {formatted:?}"))
            }
        }
        Ok(None) => Err("no network interface with a MAC address".to_string()),
        Err(e) => Err(format!("could not read MAC address: {e}")),
    }
}

/// Keep only hex digits and separators. Some drivers decorate the address
/// with an interface suffix the platform would reject.
pub fn sanitize_mac(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_hexdigit() || *c == ':' || *c == '-')
        .collect()
}

/// Six octet pairs separated by `:` or `-`.
pub fn is_valid_mac(mac: &str) -> bool {
    let bytes = mac.as_bytes();
    if bytes.len() != 17 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| {
        if i % 3 == 2 {
            *b == b':' || *b == b'-'
        } else {
            b.is_ascii_hexdigit()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_colon_and_dash_separators() {
        assert!(is_valid_mac("AA:BB:CC:DD:EE:FF"));
        assert!(is_valid_mac("aa:bb:cc:dd:ee:ff"));
        assert!(is_valid_mac("AA-BB-CC-DD-EE-FF"));
        assert!(is_valid_mac("AA:BB-CC:DD-EE:FF"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_mac(""));
        assert!(!is_valid_mac("AA:BB:CC:DD:EE"));
        assert!(!is_valid_mac("AA:BB:CC:DD:EE:FF:00"));
        assert!(!is_valid_mac("AABBCCDDEEFF"));
        assert!(!is_valid_mac("GG:BB:CC:DD:EE:FF"));
        assert!(!is_valid_mac("AA:BB:CC:DD:EE:F"));
    }

    #[test]
    fn sanitize_strips_decorations() {
        assert_eq!(sanitize_mac(" aa:bb:cc:dd:ee:ff\n"), "aa:bb:cc:dd:ee:ff");
        assert_eq!(sanitize_mac("\"AA:BB:CC:DD:EE:FF\""), "AA:BB:CC:DD:EE:FF");
        assert_eq!(sanitize_mac("AA-BB-CC-DD-EE-FF\r\n"), "AA-BB-CC-DD-EE-FF");
    }
}

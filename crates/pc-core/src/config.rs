//! Typed configuration surface (§6.1).

use serde::{Deserialize, Serialize};

use crate::error::{ClipError, ClipResult};

/// The partner's address: either a literal socket address, or a discovery
/// id to be resolved via `AddressDiscovery::discover`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartnerAddress {
    /// A `host:port` pair, used directly to connect.
    Socket(String),
    /// A discovery id with no explicit port; resolved at connect time.
    Discovery(String),
}

impl PartnerAddress {
    /// Parses a `partner_address` config value.
    ///
    /// A value with no `:` is a bare discovery id. A value containing `:` is
    /// only accepted as a literal `host:port` socket address when the part
    /// after the last `:` is a valid port number; this rejects the ambiguous
    /// shape of a discovery id with a stray port suffix (e.g. `desk-1:abc`)
    /// eagerly instead of letting it through as a host string that can never
    /// resolve.
    pub fn parse(raw: &str) -> ClipResult<Self> {
        match raw.rsplit_once(':') {
            None => Ok(PartnerAddress::Discovery(raw.to_string())),
            Some((host, port)) => {
                if host.is_empty() || port.parse::<u16>().is_err() {
                    return Err(ClipError::InvalidConfiguration(format!(
                        "'{raw}' is neither a bare discovery id nor a valid host:port address"
                    )));
                }
                Ok(PartnerAddress::Socket(raw.to_string()))
            }
        }
    }
}

/// Recognized configuration options (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Listen endpoint for the data server.
    pub host_address: String,
    /// Remote endpoint, either `host:port` or a bare discovery id.
    pub partner_address: String,
    /// Reserved: parsed but never applied to the wire (see design notes).
    #[serde(default)]
    pub compression_level: u8,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            host_address: "0.0.0.0:40121".to_string(),
            partner_address: String::new(),
            compression_level: 0,
        }
    }
}

impl Configuration {
    /// Parses a TOML document into a `Configuration`.
    pub fn from_toml_str(s: &str) -> ClipResult<Self> {
        toml::from_str(s)
            .map_err(|e| ClipError::InvalidConfiguration(format!("malformed configuration: {e}")))
    }

    /// Resolves `partner_address` into its socket-or-discovery form.
    ///
    /// Rejects the two invalid shapes described in §4.6: an empty partner
    /// address, and a discovery id with a stray, non-numeric port suffix
    /// (e.g. `desk-1:abc`) — the one case that field can't tell apart from a
    /// genuine `host:port` pair by shape alone, so it's caught eagerly here
    /// rather than surfacing later as an unresolvable connect failure.
    pub fn partner(&self) -> ClipResult<PartnerAddress> {
        if self.partner_address.is_empty() {
            return Err(ClipError::InvalidConfiguration(
                "partner_address must not be empty".to_string(),
            ));
        }
        PartnerAddress::parse(&self.partner_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_socket_address() {
        assert_eq!(
            PartnerAddress::parse("192.168.1.50:40121").unwrap(),
            PartnerAddress::Socket("192.168.1.50:40121".to_string())
        );
    }

    #[test]
    fn parses_bare_discovery_id() {
        assert_eq!(
            PartnerAddress::parse("desk-1").unwrap(),
            PartnerAddress::Discovery("desk-1".to_string())
        );
    }

    #[test]
    fn rejects_discovery_id_with_non_numeric_port_suffix() {
        let err = PartnerAddress::parse("desk-1:abc").unwrap_err();
        assert!(matches!(err, ClipError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_colon_with_empty_host() {
        let err = PartnerAddress::parse(":40121").unwrap_err();
        assert!(matches!(err, ClipError::InvalidConfiguration(_)));
    }

    #[test]
    fn default_has_no_partner_address() {
        let config = Configuration::default();
        assert!(config.partner().is_err());
    }

    #[test]
    fn loads_from_toml() {
        let toml = r#"
            host_address = "0.0.0.0:40121"
            partner_address = "192.168.1.50:40121"
            compression_level = 3
        "#;
        let config = Configuration::from_toml_str(toml).unwrap();
        assert_eq!(config.host_address, "0.0.0.0:40121");
        assert_eq!(config.compression_level, 3);
        assert!(matches!(config.partner().unwrap(), PartnerAddress::Socket(_)));
    }
}

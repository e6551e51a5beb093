use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
        }
    }
}

/// Defaults, then `PORT` (port only), then `MOCK_BIND` (full address).
pub fn load_settings() -> Settings {
    from_vars(env::var("PORT").ok(), env::var("MOCK_BIND").ok())
}

fn from_vars(port: Option<String>, bind: Option<String>) -> Settings {
    let mut settings = Settings::default();
    if let Some(port) = port {
        settings.bind_addr = format!("127.0.0.1:{port}");
    }
    if let Some(bind) = bind {
        settings.bind_addr = bind;
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_port_3000() {
        assert_eq!(from_vars(None, None).bind_addr, "127.0.0.1:3000");
    }

    #[test]
    fn port_overrides_default() {
        assert_eq!(from_vars(Some("8080".into()), None).bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn bind_wins_over_port() {
        let settings = from_vars(Some("8080".into()), Some("0.0.0.0:9000".into()));
        assert_eq!(settings.bind_addr, "0.0.0.0:9000");
    }
}

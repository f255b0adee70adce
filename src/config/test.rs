#[cfg(test)]
mod tests {
    use crate::config::HubConfig;
    use crate::error::HubError;
    use std::io::Write;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = HubConfig::from_toml("").unwrap();
        assert_eq!(config, HubConfig::default());
        assert_eq!(config.ws_path, "/ws");
        assert_eq!(config.outbound_buffer, 64);
        assert!(config.leave_on_disconnect);
        assert_eq!(config.redirect_url, "/");
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = HubConfig::from_toml(
            r#"
            port = 9000
            ws_path = "/signal"
            leave_on_disconnect = false
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.ws_path, "/signal");
        assert!(!config.leave_on_disconnect);
        assert_eq!(config.bind, "0.0.0.0");
    }

    #[test]
    fn test_rejects_zero_buffer() {
        let result = HubConfig::from_toml("outbound_buffer = 0");
        assert!(matches!(result, Err(HubError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_relative_ws_path() {
        let result = HubConfig::from_toml(r#"ws_path = "ws""#);
        assert!(matches!(result, Err(HubError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_ws_path_on_health_route() {
        let result = HubConfig::from_toml(r#"ws_path = "/health""#);
        assert!(matches!(result, Err(HubError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = HubConfig::from_toml("port = \"not a number\"");
        assert!(matches!(result, Err(HubError::ConfigParse(_))));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("telehub-config-{}.toml", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "port = 7001").unwrap();
            writeln!(file, "redirect_url = \"/appointments\"").unwrap();
        }
        let config = HubConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.port, 7001);
        assert_eq!(config.redirect_url, "/appointments");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("telehub-config-does-not-exist.toml");
        let result = HubConfig::from_file(&path);
        assert!(matches!(result, Err(HubError::Io(_))));
    }
}

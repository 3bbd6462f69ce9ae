use url::Url;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: Url,
}

impl Config {
    pub fn from_window() -> Config {
        let location = leptos::window().location();
        let origin = location.origin().unwrap_or_default();
        let search = location.search().unwrap_or_default();
        Config::resolve(&origin, &search)
    }

    /// `?backend=` in the page URL overrides the default backend base.
    fn resolve(origin: &str, search: &str) -> Config {
        let override_base = Url::parse(&format!("{origin}{search}"))
            .ok()
            .and_then(|url| {
                url.query_pairs()
                    .find(|(key, _)| key == "backend")
                    .and_then(|(_, value)| Url::parse(&ensure_trailing_slash(&value)).ok())
            });
        let api_base = override_base
            .unwrap_or_else(|| Url::parse(DEFAULT_API_BASE).expect("default base parses"));
        Config { api_base }
    }
}

// `Url::join` treats the last path segment as a file unless it ends in '/'.
fn ensure_trailing_slash(raw: &str) -> String {
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_an_override() {
        let config = Config::resolve("http://localhost:5173", "");
        assert_eq!(config.api_base.as_str(), DEFAULT_API_BASE);
    }

    #[test]
    fn query_parameter_overrides_the_base() {
        let config = Config::resolve(
            "http://localhost:5173",
            "?backend=https://chat.example.com/api",
        );
        assert_eq!(config.api_base.as_str(), "https://chat.example.com/api/");
    }

    #[test]
    fn malformed_override_falls_back_to_the_default() {
        let config = Config::resolve("http://localhost:5173", "?backend=not a url");
        assert_eq!(config.api_base.as_str(), DEFAULT_API_BASE);
    }
}

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "geosafe", version, about = "GeoSafe warehouse and safe-zone map")]
pub struct CliArgs {
    /// Print a map data report and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the backend base URL
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Starting latitude
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub lat: Option<String>,

    /// Starting longitude
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub lng: Option<String>,

    /// Starting zoom level (1-18)
    #[arg(long, value_name = "LEVEL")]
    pub zoom: Option<String>,

    /// Override the log file path
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,
}

impl CliArgs {
    /// Skip the interactive map when asked to, or when there is no terminal
    /// to draw it on. The map is drawn on stderr, so stdout may be piped.
    pub const fn wants_headless(&self, stderr_is_tty: bool) -> bool {
        self.headless || self.json || !stderr_is_tty
    }

    /// Flag values that win over the environment, keyed by variable name.
    pub fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(url) = &self.api_url {
            overrides.push(("GEOSAFE_API_BASE_URL", url.clone()));
        }
        if let Some(lat) = &self.lat {
            overrides.push(("GEOSAFE_CENTER_LAT", lat.clone()));
        }
        if let Some(lng) = &self.lng {
            overrides.push(("GEOSAFE_CENTER_LNG", lng.clone()));
        }
        if let Some(zoom) = &self.zoom {
            overrides.push(("GEOSAFE_ZOOM", zoom.clone()));
        }
        if let Some(path) = &self.log_file {
            overrides.push(("GEOSAFE_LOG_FILE", path.clone()));
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_become_overrides() {
        let args = CliArgs::try_parse_from([
            "geosafe",
            "--api-url",
            "http://api.example:9000",
            "--lat",
            "-33.9",
            "--lng",
            "151.2",
            "--zoom",
            "9",
        ])
        .unwrap();

        let overrides = args.overrides();
        assert!(overrides.contains(&("GEOSAFE_API_BASE_URL", "http://api.example:9000".to_string())));
        assert!(overrides.contains(&("GEOSAFE_CENTER_LAT", "-33.9".to_string())));
        assert!(overrides.contains(&("GEOSAFE_CENTER_LNG", "151.2".to_string())));
        assert!(overrides.contains(&("GEOSAFE_ZOOM", "9".to_string())));
        assert!(!args.headless);
    }

    #[test]
    fn headless_json_flags() {
        let args = CliArgs::try_parse_from(["geosafe", "--headless", "--json", "--debug"]).unwrap();
        assert!(args.headless && args.json && args.debug);
        assert!(args.overrides().is_empty());
        assert!(args.wants_headless(true));
    }

    #[test]
    fn piped_stdout_keeps_the_interactive_map() {
        let args = CliArgs::try_parse_from(["geosafe"]).unwrap();
        assert!(!args.wants_headless(true));
        assert!(args.wants_headless(false));
    }
}

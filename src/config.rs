use regex::Regex;
use serde::Deserialize;
use std::error::Error;

fn default_accounts_db_path() -> String {
    "sqlite:///var/gatepost/accounts.db".into()
}

fn default_posts_db_path() -> String {
    "sqlite:///var/gatepost/posts.db".into()
}

fn default_idle_timeout_secs() -> u64 {
    600
}

fn default_utc_offset_hours() -> i32 {
    8
}

fn default_extension_days() -> i64 {
    30
}

fn default_site_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".into())
}

// Secrets reach the config file as $ENV{NAME} or $FILE{path} placeholders,
// substituted before the TOML is parsed.
fn expand_placeholders(text: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let re = Regex::new(r"\$(ENV|FILE)\{([^}]+)\}")?;
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let m = caps.get(0).unwrap();
        out.push_str(&text[last..m.start()]);
        if &caps[1] == "ENV" {
            out.push_str(&std::env::var(&caps[2])?);
        } else {
            let contents = std::fs::read_to_string(&caps[2])?;
            out.push_str(contents.trim_end_matches('\n'));
        }
        last = m.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

#[derive(Deserialize, Clone)]
pub struct Config {
    pub addr: String,
    #[serde(default = "default_site_name")]
    pub site_name: String,
    #[serde(default = "default_accounts_db_path")]
    pub accounts_db_path: String,
    #[serde(default = "default_posts_db_path")]
    pub posts_db_path: String,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Fixed UTC offset applied to every date decision the service makes.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    /// Days granted by EXTEND when the operator gives no count.
    #[serde(default = "default_extension_days")]
    pub default_extension_days: i64,
    /// Permit USER/PASS on connections without TLS.
    #[serde(default)]
    pub allow_auth_insecure: bool,
    /// Off-platform payment pointer shown to lapsed members.
    #[serde(default)]
    pub payment_url: Option<String>,
    pub operator: OperatorConfig,
    #[serde(default)]
    pub tls_addr: Option<String>,
    #[serde(default)]
    pub tls_cert: Option<String>,
    #[serde(default)]
    pub tls_key: Option<String>,
    #[serde(default)]
    pub image_host: Option<ImageHostConfig>,
}

/// The fixed operator credential pair. Not stored as an account row;
/// checked by plain string equality before the account store is consulted.
#[derive(Deserialize, Clone)]
pub struct OperatorConfig {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Clone)]
pub struct ImageHostConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// `$ENV{NAME}` and `$FILE{path}` placeholders are expanded before
    /// parsing, so store URIs and the operator password never need to be
    /// written into the file itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let text = std::fs::read_to_string(path)?;
        let text = expand_placeholders(&text)?;
        let cfg: Config = toml::from_str(&text)?;
        Ok(cfg)
    }

    /// Update runtime-adjustable values from a new configuration.
    /// Listener addresses, store paths and the operator credential only
    /// change on restart.
    pub fn update_runtime(&mut self, other: Config) {
        self.idle_timeout_secs = other.idle_timeout_secs;
        self.default_extension_days = other.default_extension_days;
        self.allow_auth_insecure = other.allow_auth_insecure;
        self.payment_url = other.payment_url;
        self.tls_cert = other.tls_cert;
        self.tls_key = other.tls_key;
        self.image_host = other.image_host;
    }
}

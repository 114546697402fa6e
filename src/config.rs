use std::env;
use std::path::PathBuf;

#[derive(Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub port: u16,
    /// Directory holding the writable user-memory file. Defaults to the
    /// platform temp dir — on serverless hosts that is the only writable path.
    pub memory_dir: PathBuf,
    /// Optional overrides for the provider defaults.
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            groq_api_key: env::var("GROQ_API_KEY").expect("GROQ_API_KEY must be set"),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            memory_dir: env::var("MEMORY_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            model: env::var("GROQ_MODEL").ok(),
            endpoint: env::var("GROQ_ENDPOINT").ok(),
        }
    }
}

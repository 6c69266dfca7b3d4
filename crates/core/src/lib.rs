pub mod compare;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod parse;
pub mod returns;
pub mod time;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub data_provider_base_url: Option<String>,
        pub data_provider_timeout_secs: Option<u64>,
        pub data_provider_retries: Option<u32>,
        pub log_file: Option<PathBuf>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                data_provider_base_url: non_empty_var("DATA_PROVIDER_BASE_URL"),
                data_provider_timeout_secs: parsed_var("DATA_PROVIDER_TIMEOUT_SECS")?,
                data_provider_retries: parsed_var("DATA_PROVIDER_RETRIES")?,
                log_file: non_empty_var("FOLIO_LOG_FILE").map(PathBuf::from),
            })
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    fn parsed_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        non_empty_var(key)
            .map(|s| s.trim().parse::<T>())
            .transpose()
            .with_context(|| format!("{key} is not a valid number"))
    }
}

#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser)]
pub struct AppConfig {
    // production or development
    #[clap(long, env, value_enum)]
    pub cargo_env: CargoEnv,

    // bind address for the app
    #[clap(long, env, default_value = "0.0.0.0")]
    pub host: String,

    // port that the app will bind to
    #[clap(long, env, default_value = "8000")]
    pub port: u16,

    // browser-looking identity for outbound fetches, some hosts refuse the
    // default reqwest one outright
    #[clap(
        long,
        env,
        default_value = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
    )]
    pub user_agent: String,

    // referer sent with every page fetch
    #[clap(long, env, default_value = "https://animedub.pro/")]
    pub referer: String,

    // accept header sent alongside the browser identity
    #[clap(
        long,
        env,
        default_value = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
    )]
    pub accept: String,

    // accept-language sent alongside the browser identity
    #[clap(long, env, default_value = "en-US,en;q=0.5")]
    pub accept_language: String,

    // where /scrape/{slug} requests get expanded to; {slug} is substituted
    #[clap(
        long,
        env,
        default_value = "https://zpjid.com/bkg/{slug}?ref=animedub.pro"
    )]
    pub slug_url_template: String,

    // first fetch attempt gives up after this many seconds
    #[clap(long, env, default_value = "30")]
    pub fetch_timeout_secs: u64,

    // the single retry after a timeout gets this much longer budget
    #[clap(long, env, default_value = "60")]
    pub retry_timeout_secs: u64,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,
}

impl Default for AppConfig {
    // defaults aren't really needed here but it's here as a bad fallback
    fn default() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            host: "0.0.0.0".to_string(),
            port: 8000,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            referer: "https://animedub.pro/".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            slug_url_template: "https://zpjid.com/bkg/{slug}?ref=animedub.pro".to_string(),
            fetch_timeout_secs: 30,
            retry_timeout_secs: 60,
            sentry_dsn: None,
        }
    }
}

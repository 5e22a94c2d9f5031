use domain::gateway::oauth::slack::{SlackOAuthClient, SlackOAuthUrls};
use domain::gateway::oauth::OAuthProvider;
use log::{info, warn};
use service::config::Config;
use service::logging::Logger;

/// Boot entry point: validates the process environment before anything else
/// runs. An invalid configuration prints every violation and aborts with a
/// non-zero exit status so the deployment never serves traffic on a partial
/// config.
fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid environment configuration:");
            for (field, reason) in &err.violations {
                eprintln!("  {field}: {reason}");
            }
            std::process::exit(1);
        }
    };

    Logger::init_logger(&config);

    info!(
        "Environment validated for {} mode",
        config.environment()
    );

    match SlackOAuthClient::from_config(&config, SlackOAuthUrls::default()) {
        Ok(client) => info!("{} identity provider configured", client.provider().as_str()),
        Err(_) => warn!("Slack identity provider not configured; member sign-in is disabled"),
    }

    if config.sentry_dsn().is_none() {
        info!("Error reporting is disabled (no SENTRY_DSN)");
    }

    info!("Startup checks complete");
}

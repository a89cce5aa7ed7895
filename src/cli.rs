use clap::Parser;
use disaster_alerts::config::{AppConfig, ProvisionedSubscription, PushConfig};
use disaster_alerts::types::events::Category;
use disaster_alerts::types::push::Permission;
use std::net::SocketAddr;
use time::Duration;

pub(crate) enum RunOutcome {
    Serve(AppConfig),
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    match resolve_config(cli) {
        Ok(config) => RunOutcome::Serve(config),
        Err(err) => {
            eprintln!("error: {err}");
            RunOutcome::Exit(2)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "disaster-alerts",
    version,
    about = "Keeps disaster alerts current and serves them to a local UI"
)]
struct Cli {
    #[arg(long, env = "DISASTER_ALERTS_BASE_URL")]
    base_url: String,
    #[arg(
        long = "category",
        env = "DISASTER_ALERTS_CATEGORIES",
        value_delimiter = ',',
        default_value = "earthquake"
    )]
    categories: Vec<String>,
    #[arg(long, env = "DISASTER_ALERTS_PAGE_SIZE", default_value_t = 10)]
    page_size: usize,
    #[arg(long, env = "DISASTER_ALERTS_POLL_INTERVAL", default_value = "30s")]
    poll_interval: String,
    #[arg(long, env = "DISASTER_ALERTS_LISTEN", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,
    #[arg(long, env = "DISASTER_ALERTS_VAPID_PUBLIC_KEY")]
    vapid_public_key: Option<String>,
    #[arg(long, env = "DISASTER_ALERTS_PUSH_ENDPOINT")]
    push_endpoint: Option<String>,
    #[arg(long, env = "DISASTER_ALERTS_PUSH_P256DH")]
    push_p256dh: Option<String>,
    #[arg(long, env = "DISASTER_ALERTS_PUSH_AUTH")]
    push_auth: Option<String>,
    #[arg(
        long,
        env = "DISASTER_ALERTS_NOTIFICATION_PERMISSION",
        default_value = "default"
    )]
    notification_permission: String,
    #[arg(long, env = "DISASTER_ALERTS_GRANT_ON_REQUEST")]
    grant_on_request: bool,
}

fn resolve_config(cli: Cli) -> Result<AppConfig, String> {
    let base_url = cli.base_url.trim();
    if base_url.is_empty() {
        return Err("base url cannot be empty".to_string());
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(format!("base url '{base_url}' must start with http:// or https://"));
    }
    if cli.page_size == 0 {
        return Err("page size must be greater than 0".to_string());
    }

    let mut categories: Vec<Category> = Vec::new();
    for name in &cli.categories {
        let category = Category::new(name.trim());
        if category.as_str().is_empty() {
            return Err("category names cannot be empty".to_string());
        }
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    let poll_interval = parse_poll_interval(&cli.poll_interval)?;
    let push = resolve_push_config(&cli)?;

    Ok(AppConfig {
        base_url: base_url.to_string(),
        categories,
        page_size: cli.page_size,
        poll_interval,
        listen: cli.listen,
        vapid_public_key: cli.vapid_public_key,
        push,
    })
}

fn resolve_push_config(cli: &Cli) -> Result<PushConfig, String> {
    let permission = cli.notification_permission.parse::<Permission>()?;
    let subscription = match (&cli.push_endpoint, &cli.push_p256dh, &cli.push_auth) {
        (Some(endpoint), Some(p256dh), Some(auth)) => {
            if endpoint.trim().is_empty() || p256dh.trim().is_empty() || auth.trim().is_empty() {
                return Err("push endpoint, p256dh and auth cannot be empty".to_string());
            }
            Some(ProvisionedSubscription {
                endpoint: endpoint.trim().to_string(),
                p256dh: p256dh.trim().to_string(),
                auth: auth.trim().to_string(),
            })
        }
        (None, None, None) => None,
        _ => {
            return Err(
                "push subscription is incomplete; --push-endpoint, --push-p256dh and --push-auth go together"
                    .to_string(),
            );
        }
    };

    Ok(PushConfig {
        subscription,
        permission,
        grant_on_request: cli.grant_on_request,
    })
}

fn parse_poll_interval(raw: &str) -> Result<std::time::Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("poll interval cannot be empty".to_string());
    }

    let (amount, unit) = match value.chars().last() {
        Some(ch) if ch.is_ascii_alphabetic() => {
            (&value[..value.len() - 1], ch.to_ascii_lowercase())
        }
        _ => (value, 's'),
    };

    let amount: i64 = amount
        .parse()
        .map_err(|_| format!("invalid poll interval '{value}'; expected <number>[s|m|h]"))?;

    if amount <= 0 {
        return Err("poll interval must be greater than 0".to_string());
    }

    let interval = match unit {
        's' => Duration::seconds(amount),
        'm' => Duration::minutes(amount),
        'h' => Duration::hours(amount),
        _ => {
            return Err(format!(
                "invalid poll interval '{value}'; expected <number>[s|m|h]"
            ));
        }
    };
    std::time::Duration::try_from(interval)
        .map_err(|_| format!("poll interval '{value}' is out of range"))
}

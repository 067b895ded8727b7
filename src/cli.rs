use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "PacketShare gift claimer (login + popup claim + countdown-driven rescheduling)")]
pub struct Args {

    #[arg(long, env = "EMAIL", hide_env_values = true)]
    pub email: String,


    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    pub password: String,


    #[arg(long, env = "NOTIFY_URL")]
    pub notify_url: Option<String>,


    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://127.0.0.1:9515")]
    pub webdriver_url: String,


    #[arg(long, default_value_t = true)]
    pub headless: bool,
}

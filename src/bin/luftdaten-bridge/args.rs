use chrono_tz::Tz;
use clap::Parser;
use luftdaten_bridge::accessory::DEFAULT_NAME;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "LUFTDATEN_HOST")]
    pub host: String,

    #[arg(long, env = "LUFTDATEN_NAME", default_value = DEFAULT_NAME)]
    pub name: String,

    #[arg(long, default_value_t = 80)]
    pub port: u16,

    #[arg(long, default_value_t = 60)]
    pub interval_secs: u64,

    #[arg(long, env = "TZ", default_value = "UTC")]
    pub timezone: Tz,
}

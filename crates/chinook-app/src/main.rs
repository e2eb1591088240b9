use anyhow::{bail, Result};

use chinook_app::Session;
use chinook_core::Config;
use chinook_weather::{resorts_by_province, Location, PROVINCE_ORDER};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    chinook_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    tracing::info!(config_dir = %config.config_dir.display(), "Chinook starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let session = Session::new(config)?;

    match args.first().map(String::as_str) {
        Some("--resorts") => {
            for province in PROVINCE_ORDER {
                let resorts = resorts_by_province(province);
                if resorts.is_empty() {
                    continue;
                }
                println!("{}", province);
                for resort in resorts {
                    println!("  {:<22} {} ({} runs)", resort.id, resort.name, resort.total_runs);
                }
            }
        }
        Some("--resort") => {
            let Some(id) = args.get(1) else {
                bail!("usage: chinook --resort <id>");
            };
            print_ski_report(&session, id).await?;
        }
        Some(query) => {
            let results = session.search(query).await?;
            let Some(location) = results.into_iter().next() else {
                bail!("no match for '{}'", query);
            };
            print_forecast(&session, location).await?;
        }
        None => {
            bail!("usage: chinook <city> | --resort <id> | --resorts");
        }
    }

    Ok(())
}

async fn print_forecast(session: &Session, location: Location) -> Result<()> {
    let name = location.name.clone();
    let admin1 = location.admin1.clone();
    session.select_location(location).await?;

    let data = session.data();
    let Some(forecast) = data.forecast else {
        bail!("forecast unavailable");
    };

    match admin1 {
        Some(admin1) => println!("{}, {}", name, admin1),
        None => println!("{}", name),
    }
    println!(
        "  {} {}  {}°C (feels like {}°C), wind {} km/h",
        forecast.current.info.icon,
        forecast.current.info.label,
        forecast.current.temp,
        forecast.current.feels_like,
        forecast.current.wind_speed,
    );

    for alert in &data.alerts {
        println!("  ⚠ [{:?}] {}", alert.severity, alert.event);
    }

    println!();
    for day in &forecast.daily {
        println!(
            "  {}  {}  {:>3}° / {:>3}°  precip {}%",
            day.date, day.info.icon, day.temp_max, day.temp_min, day.precip_prob_max
        );
    }

    Ok(())
}

async fn print_ski_report(session: &Session, resort_id: &str) -> Result<()> {
    let report = session.ski_report(resort_id).await?;

    println!(
        "Conditions: {} (score {}, ~{:.0}% of runs open)",
        report.conditions.tier.label(),
        report.conditions.score,
        report.conditions.open_fraction * 100.0,
    );
    println!(
        "  base {} cm, fresh 24h {} cm, temp {}°C, wind {} km/h",
        report.snow_depth_cm, report.fresh_snow_24h_cm, report.current_temp, report.avg_wind
    );

    println!();
    for day in &report.daily {
        println!(
            "  {}  {}  {:>3}° / {:>3}°  snow {} cm",
            day.date, day.info.icon, day.temp_max, day.temp_min, day.snowfall_sum_cm
        );
    }

    Ok(())
}

use chrono::Utc;
use opentsdb_client::{Client, ClientConfig, ClientError, Datum, LineSocket, QuerySpec, Settings};
use rand::Rng;
use serde_json::Value;
use tracing::info;

const USAGE: &str = "usage: opentsdb-cli <url|query|aggregators|metrics|config|version|dropcaches|datum> [metric]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "url".to_string());
    let metric = args.next().unwrap_or_else(|| "cpu.utilization".to_string());

    let settings = Settings::from_env();
    info!("Using TSDB at {}:{}", settings.host, settings.port);

    match command.as_str() {
        "url" => {
            let config = build_query_config(&settings, &metric)?;
            println!("Query URL: {}", config.url()?);
            println!("Template:  {}", config.template()?.as_str());
        }
        "query" => {
            let config = build_query_config(&settings, &metric)?;
            println!("Query URL: {}", config.url()?);
            let client = Client::from_settings(&settings, config)?;
            report(client.get().await);
        }
        "aggregators" => report(endpoint_client(&settings)?.aggregators().await),
        "metrics" => report(endpoint_client(&settings)?.suggest_metrics(settings.suggest_max).await),
        "config" => report(endpoint_client(&settings)?.server_config().await),
        "version" => report(endpoint_client(&settings)?.version().await),
        "dropcaches" => report(endpoint_client(&settings)?.drop_caches().await),
        "datum" => send_data(&settings, &metric).await?,
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}

/// The last 12 seconds, ending a minute ago, for one metric across all tag values.
fn build_query_config(settings: &Settings, metric: &str) -> Result<ClientConfig, ClientError> {
    let end = Utc::now().timestamp_millis() - 60_000;
    let start = end - 12_000;

    let mut query = QuerySpec::new_metric();
    query
        .set_metric(metric)?
        .set_aggregator("avg")?
        .set_rate(false)
        .set_tag("tag", "*")?;

    let mut config = settings.client_config();
    config
        .set_ms_resolution(true)
        .set_arrays_output(true)
        .set_tsuids_output(true)
        .set_annotations("none")?
        .set_queries(vec![query])?
        .set_start(start)?
        .set_end(end)?;
    Ok(config)
}

fn endpoint_client(settings: &Settings) -> Result<Client, ClientError> {
    Client::from_settings(settings, settings.client_config())
}

fn report(result: Result<Value, ClientError>) {
    match result {
        Ok(data) => println!("{}", data),
        Err(e) => {
            let status = e.status().map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
            eprintln!("Error ({}): {}", status, e);
        }
    }
}

/// Writes 100 random data points, one every 10ms of timestamp.
async fn send_data(settings: &Settings, metric: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = rand::thread_rng();
    let now = Utc::now().timestamp_millis();

    let mut datum = Datum::new();
    datum.set_metric(metric)?.set_tag("beep", "boop").set_tag("foo", "bar");

    let mut data = Vec::with_capacity(100);
    for i in 0..100 {
        datum.set_timestamp(now + i * 10)?.set_value(rng.gen_range(0.0..1.0))?;
        data.push(datum.clone());
    }

    println!("{}", opentsdb_client::datum::to_batch(&data)?);

    let mut socket = LineSocket::new();
    socket.set_host(settings.host.clone()).set_port(settings.port);
    socket.connect().await?;
    socket.put_batch(&data).await?;
    socket.close().await?;

    info!("Sent {} data points", data.len());
    Ok(())
}

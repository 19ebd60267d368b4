mod display;
mod llm;
mod params;
mod request;
mod timetable;
mod web;

use llm::GeminiClient;
use params::{validate_parameters, ScheduleParameters};
use request::{build_brief, build_response_schema};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Missing credentials for the generation service are fatal at startup
    let client = GeminiClient::from_env()?;

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args.get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        println!("Starting web server on port {}...", port);
        println!("Access the site at http://localhost:{}", port);

        web::start_server(port, client).await?;
        return Ok(());
    }

    // CLI mode: one generation from a parameters JSON file
    let params_path = args.get(1).map(|s| s.as_str()).unwrap_or("parameters.json");
    let text = std::fs::read_to_string(params_path)?;
    let params: ScheduleParameters = serde_json::from_str(&text)?;
    validate_parameters(&params)?;

    println!(
        "Requesting a timetable for {} classes ({} rooms, {} days, {} sessions per day)...",
        params.total_classes(),
        params.room_count,
        params.active_days().len(),
        params.sessions_per_day
    );

    let brief = build_brief(&params);
    let schema = build_response_schema(&params);
    let table = client.generate_timetable(&brief, &schema, &params).await?;

    display::print_timetable(&table, &params);

    if let Some(out_path) = args.get(2) {
        display::write_timetable_to_file(&table, &params, out_path)?;
        println!("\nTimetable saved to {}", out_path);
    }

    Ok(())
}

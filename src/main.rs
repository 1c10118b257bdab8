use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};
use log::{error, LevelFilter};
use std::process;

use rasteroverlay::commands::{CommandFactory, OverlayCommandFactory};
use rasteroverlay::errors::OverlayError;
use rasteroverlay::utils::logger::Logger;

fn main() {
    let matches = ClapCommand::new("rasteroverlay")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Turn a GeoTIFF into a display image and a georeferenced map overlay")
        .arg(
            Arg::new("input")
                .help("Input GeoTIFF file")
                .required_unless_present("locate")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Directory for the image, map and metadata files")
                .value_name("DIR")
                .default_value("."),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML file overriding the built-in configuration")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("opacity")
                .long("opacity")
                .help("Overlay opacity in [0, 1]; defaults to map.opacity")
                .value_name("F")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("inspect")
                .long("inspect")
                .help("Print bounds and EPSG code without decoding pixels")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("locate")
                .long("locate")
                .help("Resolve a project location instead of processing a raster")
                .action(ArgAction::SetTrue)
                .requires_all(["country", "state", "city", "project"]),
        )
        .arg(Arg::new("country").long("country").value_name("COUNTRY"))
        .arg(Arg::new("state").long("state").value_name("STATE"))
        .arg(Arg::new("city").long("city").value_name("CITY"))
        .arg(Arg::new("project").long("project").value_name("PROJECT"))
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("progress")
                .long("progress")
                .help("Show a progress bar while decoding")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") { LevelFilter::Debug } else { LevelFilter::Info };

    let logger = match Logger::new("rasteroverlay.log") {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = Logger::init_global_logger("rasteroverlay-global.log", level) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = OverlayCommandFactory::new();
    let result = factory
        .create_command(&matches, &logger)
        .and_then(|command| command.execute());

    if let Err(e) = result {
        fail(&e);
    }
}

/// Print the JSON error response and exit non-zero
fn fail(e: &OverlayError) -> ! {
    error!("{}", e);
    match serde_json::to_string_pretty(&e.to_response()) {
        Ok(json) => println!("{}", json),
        Err(_) => eprintln!("Error: {}", e),
    }
    process::exit(1);
}

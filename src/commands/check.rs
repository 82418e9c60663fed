use crate::libs::config::Config;
use crate::libs::geo::Coordinate;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Latitude of the position to check (degrees)
    #[arg(allow_negative_numbers = true)]
    latitude: f64,

    /// Longitude of the position to check (degrees)
    #[arg(allow_negative_numbers = true)]
    longitude: f64,
}

/// Prints the distance to the museum and whether the position is inside.
/// Nothing is stored and no notification is sent.
pub fn cmd(args: CheckArgs) -> Result<()> {
    let geofence = Config::load()?.geofence_config()?;
    let position = Coordinate::new(args.latitude, args.longitude);
    let distance = geofence.distance_formula.distance(position, geofence.target);

    if distance <= geofence.radius_meters {
        msg_print!(Message::PositionInside {
            distance,
            radius: geofence.radius_meters,
        });
    } else {
        msg_print!(Message::PositionOutside {
            distance,
            radius: geofence.radius_meters,
        });
    }
    Ok(())
}

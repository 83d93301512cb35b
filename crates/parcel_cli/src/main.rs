//! Parcel tracker demo entry point.
//!
//! # Responsibility
//! - Wire configuration, logging, database bootstrap and the parcel service.
//! - Walk one parcel through its lifecycle and print the client's parcels.

use log::{error, info};
use parcel_core::db::open_db;
use parcel_core::{
    init_logging, ClientId, Parcel, ParcelService, SqliteParcelStore, TrackerConfig,
};
use std::error::Error;
use std::process::ExitCode;

const DEMO_CLIENT: ClientId = 1;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("parcel_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = TrackerConfig::from_env()?;
    init_logging(&config.log)?;
    info!(
        "event=cli_run module=cli status=start version={} db_path={}",
        parcel_core::core_version(),
        config.db_path.display()
    );

    let conn = open_db(&config.db_path)?;
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn)?);

    let parcel = service.register(DEMO_CLIENT, "Pseudo city, Pseudo street, 1")?;
    println!("registered {}", describe(&parcel));

    let new_address = "Pseudo city, Pseudo street, 2";
    service.change_address(parcel.number, new_address)?;
    println!("parcel {} address changed to {new_address}", parcel.number);

    let status = service.next_status(parcel.number)?;
    println!("parcel {} status changed to {status}", parcel.number);

    println!("parcels of client {DEMO_CLIENT}:");
    for parcel in service.client_parcels(DEMO_CLIENT)? {
        println!("  {}", describe(&parcel));
    }

    // Sent parcels survive deletion; only the registered one goes away.
    let disposable = service.register(DEMO_CLIENT, "Pseudo city, Pseudo street, 3")?;
    service.delete(parcel.number)?;
    service.delete(disposable.number)?;

    println!("parcels of client {DEMO_CLIENT} after delete:");
    for parcel in service.client_parcels(DEMO_CLIENT)? {
        println!("  {}", describe(&parcel));
    }

    info!("event=cli_run module=cli status=ok");
    Ok(())
}

fn describe(parcel: &Parcel) -> String {
    format!(
        "parcel {} for client {}: address={} status={} created_at={}",
        parcel.number, parcel.client, parcel.address, parcel.status, parcel.created_at
    )
}

#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use mongodb::Client;
use rocket::{Build, Rocket};

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod voting;

use config::{ConfigFairing, DatabaseFairing};
use logging::LoggerFairing;

/// The database that stores all application data.
pub const DATABASE: &str = "matdan";

/// Construct the server. Config loading, the database connection, index
/// creation, and election seeding all happen at ignition via fairings.
pub fn build() -> Rocket<Build> {
    rocket(DatabaseFairing::from_config())
}

/// Construct the server against an existing connection and database name,
/// bypassing `db_uri`. Used by tests to point each test at its own database.
pub fn rocket_for_db(client: Client, db_name: &str) -> Rocket<Build> {
    rocket(DatabaseFairing::for_db(client, db_name))
}

fn rocket(database: DatabaseFairing) -> Rocket<Build> {
    rocket::build()
        .attach(ConfigFairing)
        .attach(database)
        .attach(LoggerFairing)
        .mount("/", api::routes())
}

/// Connect to the database server named by the rocket config.
#[cfg(test)]
async fn db_client() -> Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    Client::with_uri_str(&db_uri)
        .await
        .expect("Could not connect to the database")
}

/// A fresh database name, so concurrently running tests never collide.
#[cfg(test)]
fn database() -> String {
    format!("test{}", rand::random::<u32>())
}

use std::time::Duration;

use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::cache::DashboardCache;
use crate::model::db::election::ensure_elections_exist;
use crate::model::mongodb::ensure_indexes_exist;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    cache_ttl: u32,
    cache_capacity: usize,
}

impl Config {
    /// How long a cached dashboard stays servable, in seconds.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl.into())
    }

    /// Upper bound on cached dashboard entries.
    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }
}

/// A fairing that loads the application config and puts it, along with the
/// dashboard cache it parameterises, into managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        let cache = DashboardCache::new(config.cache_capacity(), config.cache_ttl());
        rocket = rocket.manage(cache).manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
}

/// A fairing that connects to MongoDB, performs any setup necessary, and
/// places both a `Client` and a `Database` into managed state.
pub struct DatabaseFairing {
    /// A pre-established connection, bypassing `db_uri`. Tests use this to
    /// point the application at a throwaway database.
    prepared: Option<(MongoClient, String)>,
}

impl DatabaseFairing {
    /// Connect according to the application config.
    pub fn from_config() -> Self {
        Self { prepared: None }
    }

    /// Use an existing connection and database name.
    pub fn for_db(client: MongoClient, db_name: &str) -> Self {
        Self {
            prepared: Some((client, db_name.to_string())),
        }
    }
}

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let (client, db_name) = match &self.prepared {
            Some((client, db_name)) => (client.clone(), db_name.clone()),
            None => {
                // Load the config.
                let config = match rocket.figment().extract::<DbConfig>() {
                    Ok(config) => config,
                    Err(e) => {
                        error!("Failed to load database config");
                        rocket::config::pretty_print_error(e);
                        return Err(rocket);
                    }
                };
                info!("Loaded database config, connecting...");
                // Construct the connection.
                let client = match MongoClient::with_uri_str(config.db_uri).await {
                    Ok(client) => client,
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                };
                (client, crate::DATABASE.to_string())
            }
        };
        let db = client.database(&db_name);

        // Ensure the required indexes exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to prepare database indexes: {e}");
            return Err(rocket);
        }

        // Ensure every election document exists.
        if let Err(e) = ensure_elections_exist(&db).await {
            error!("Failed to seed elections: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

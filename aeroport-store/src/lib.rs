pub mod app_config;
pub mod database;
pub mod airport_repo;

pub use airport_repo::PgAirportRepository;
pub use database::DbClient;

use std::env;

use warp::Filter;

type DynError = Box<dyn std::error::Error>;

mod error;
mod filters;
mod handlers;
mod line;
mod models;
mod tasks;

#[tokio::main]
async fn main() -> Result<(), DynError> {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "booking_notify=debug");
    }
    pretty_env_logger::init();

    let state = models::state_from_env()?;
    let addr = state.config.listen;

    let api = filters::app(state);

    let routes = api.with(warp::log("booking_notify"));

    log::info!("listening at: {}", addr);

    warp::serve(routes).run(addr).await;
    Ok(())
}

use super::handlers;
use super::models::State;
use warp::Filter;

pub fn app(
    state: State,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    post_booking(state)
}

/// The body is taken raw so that malformed JSON is answered by the handler
/// instead of a rejection.
pub fn post_booking(
    state: State,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("webhook")
        .and(warp::post())
        .and(warp::body::bytes())
        .and(with_state(state))
        .and_then(handlers::booking)
}

fn with_state(
    state: State,
) -> impl Filter<Extract = (State,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || state.clone())
}

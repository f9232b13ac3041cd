// Recoverable error taxonomy for the router. A single bad sink among many
// is logged and skipped rather than raised; these variants are only
// returned from `Router::fan_out_route` when the whole call has nothing
// left to route.
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum RouteError {
    NoPath,
    InvalidEndpoint,
    EmptyInput,
}

pub type RouteResult<T> = Result<T, RouteError>;

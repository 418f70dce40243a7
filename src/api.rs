//! Request/response contract. A [`request::SolveRequest`] carries a wire
//! method name plus the union of every method's parameters;
//! [`dispatch::solve_request`] validates the fields the selected method
//! needs, runs the solver and assembles a [`response::SolveResponse`] with
//! the iteration history and a chart description. Errors never escape as
//! panics; they become `{ "error": ... }` payloads.

pub mod dispatch;
pub mod plot;
pub mod request;
pub mod response;

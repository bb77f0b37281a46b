// Controller REST API surface.
//
// `client` owns transport mechanics and the session token; `auth` and
// `inventory` add the token exchange and the read-only queries as inherent
// methods so each file stays focused on one part of the API.

pub mod auth;
pub mod client;
pub mod inventory;
pub mod models;

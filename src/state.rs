use crate::{
    db::{DbPool, OrmConn},
    services::stripe::StripeClient,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub stripe: StripeClient,
}

#![allow(dead_code)]

use std::sync::Once;

use sqexpr::query::builder::{column_ref, entity, measure_ref};
use sqexpr::query::{FederatedSchema, SqExpr};
use tracing_subscriber::EnvFilter;

pub const SALES_SCHEMA: &str = include_str!("../fixtures/sales_schema.toml");

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("sqexpr=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    });
}

pub fn sales_schema() -> FederatedSchema {
    FederatedSchema::from_toml_str(SALES_SCHEMA).expect("fixture parses")
}

pub fn sales() -> SqExpr {
    entity("s", "Sales", None)
}

pub fn column(name: &str) -> SqExpr {
    column_ref(sales(), name)
}

pub fn measure(name: &str) -> SqExpr {
    measure_ref(sales(), name)
}

pub mod account;
pub mod calldata;
pub mod config;
pub mod error;
pub mod order_flow;
pub mod rpc;
pub mod search;
pub mod snip12;
pub mod typed_data;
pub mod types;

// Re-export commonly used types
pub use account::{AccountProvider, LocalAccount, VerifyingContract};
pub use calldata::{
    cancel_order_calldata, fulfill_order_calldata, order_parameters_calldata,
    register_order_calldata,
};
pub use config::{AccountCredentials, MarketplaceConfig};
pub use error::{MarketplaceError, Result};
pub use order_flow::{validity_window, OrderPreparer};
pub use rpc::StarknetRpcClient;
pub use search::{
    find_dialect, find_dialect_parallel, DialectMatch, DialectSearch, DialectSpace, MatchDetails,
    SearchOutcome,
};
pub use snip12::{
    domain_hash, felt_to_hex, order_hash, order_hash_breakdown, parse_felt, DialectConfig,
    DomainConfig, HashPrimitive, OrderHashBreakdown, WideUint,
};
pub use typed_data::TypedOrderPayload;
pub use types::{
    ConsiderationItem, ItemDraft, ItemType, OfferItem, OrderDraft, OrderParameters, Signature,
    SignedOrder,
};

/// Initialize logging for the library
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

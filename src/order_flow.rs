use std::sync::Arc;

use tracing::{error, info, warn};

use crate::account::{AccountProvider, VerifyingContract};
use crate::error::{MarketplaceError, Result};
use crate::snip12::{encode_domain_value, felt_to_hex, DialectConfig};
use crate::typed_data::TypedOrderPayload;
use crate::types::{OrderParameters, SignedOrder};

/// Signs orders under a pinned dialect once the contract agrees on the hash
///
/// A hash the contract does not reproduce is never sent to the account for
/// signing. Collaborator failures abort the attempt without retries.
pub struct OrderPreparer {
    dialect: DialectConfig,
    account: Arc<dyn AccountProvider>,
    contract: Arc<dyn VerifyingContract>,
}

impl OrderPreparer {
    pub fn new(
        dialect: DialectConfig,
        account: Arc<dyn AccountProvider>,
        contract: Arc<dyn VerifyingContract>,
    ) -> Self {
        Self {
            dialect,
            account,
            contract,
        }
    }

    pub async fn prepare(&self, draft: OrderParameters) -> Result<SignedOrder> {
        draft.validate()?;

        let expected_chain = encode_domain_value(&self.dialect.domain.chain_id)?;
        let chain_id = self.account.chain_id().await?;
        if chain_id != expected_chain {
            warn!(
                "Account is on chain {}, dialect is pinned to {}",
                felt_to_hex(&chain_id),
                self.dialect.domain.chain_id
            );
            return Err(MarketplaceError::Precondition(format!(
                "chain id {} does not match domain chain {}",
                felt_to_hex(&chain_id),
                self.dialect.domain.chain_id
            )));
        }

        let signer = self.account.address();
        let nonce = self.account.get_nonce(signer).await?;
        let parameters = draft.with_nonce(nonce);

        let payload = TypedOrderPayload::new(self.dialect.clone(), parameters)?;
        let reported = self
            .contract
            .get_order_hash(&payload.parameters, signer)
            .await?;

        if reported != payload.order_hash {
            error!(
                "Order hash mismatch under {}: computed {}, contract {}",
                self.dialect,
                felt_to_hex(&payload.order_hash),
                felt_to_hex(&reported)
            );
            return Err(MarketplaceError::DialectMismatch {
                computed: felt_to_hex(&payload.order_hash),
                reported: felt_to_hex(&reported),
            });
        }

        let signature = self.account.sign(&payload).await?;
        info!(
            "Signed order {} with nonce {}",
            felt_to_hex(&payload.order_hash),
            felt_to_hex(&nonce)
        );

        Ok(SignedOrder {
            parameters: payload.parameters,
            order_hash: payload.order_hash,
            signature,
        })
    }
}

/// Unix timestamps for an order opening now and lasting `ttl_secs`
pub fn validity_window(now: u64, ttl_secs: u64) -> (u64, u64) {
    (now, now.saturating_add(ttl_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snip12::tests::{canonical_dialect, reference_order};
    use crate::snip12::{
        encode_short_string, order_hash, public_key_from_private, sign_order_hash,
        verify_order_signature, HashPrimitive,
    };
    use crate::types::Signature;
    use async_trait::async_trait;
    use starknet_crypto::Felt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PRIVATE_KEY: u64 = 0x0bad_c0ffee;

    struct MockAccount {
        address: Felt,
        chain_id: Felt,
        nonce: Option<Felt>,
        sign_calls: AtomicUsize,
    }

    impl MockAccount {
        fn mainnet() -> Self {
            Self {
                address: reference_order().offerer,
                chain_id: encode_short_string("SN_MAIN").unwrap(),
                nonce: Some(Felt::from(3u64)),
                sign_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AccountProvider for MockAccount {
        fn address(&self) -> Felt {
            self.address
        }

        async fn get_nonce(&self, _account: Felt) -> Result<Felt> {
            self.nonce
                .ok_or_else(|| MarketplaceError::Rpc("node unavailable".to_string()))
        }

        async fn chain_id(&self) -> Result<Felt> {
            Ok(self.chain_id)
        }

        async fn sign(&self, payload: &TypedOrderPayload) -> Result<Signature> {
            self.sign_calls.fetch_add(1, Ordering::SeqCst);
            sign_order_hash(&Felt::from(PRIVATE_KEY), &payload.order_hash)
        }
    }

    /// Contract hashing under its own dialect
    struct MockContract {
        dialect: DialectConfig,
        calls: AtomicUsize,
    }

    impl MockContract {
        fn new(dialect: DialectConfig) -> Self {
            Self {
                dialect,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl VerifyingContract for MockContract {
        async fn get_order_hash(&self, parameters: &OrderParameters, _signer: Felt) -> Result<Felt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            order_hash(&self.dialect, parameters)
        }
    }

    fn draft() -> OrderParameters {
        OrderParameters {
            start_time: 1_700_000_000,
            ..reference_order()
        }
    }

    #[tokio::test]
    async fn test_prepare_signs_when_contract_agrees() {
        let account = Arc::new(MockAccount::mainnet());
        let contract = Arc::new(MockContract::new(canonical_dialect()));
        let preparer = OrderPreparer::new(canonical_dialect(), account.clone(), contract.clone());

        let signed = preparer.prepare(draft()).await.unwrap();

        assert_eq!(signed.parameters.nonce, Felt::from(3u64));
        assert_eq!(
            signed.order_hash,
            order_hash(&canonical_dialect(), &signed.parameters).unwrap()
        );
        let public_key = public_key_from_private(&Felt::from(PRIVATE_KEY));
        assert!(verify_order_signature(&public_key, &signed.order_hash, &signed.signature).unwrap());
        assert_eq!(account.sign_calls.load(Ordering::SeqCst), 1);
        assert_eq!(contract.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mismatch_never_requests_signature() {
        let account = Arc::new(MockAccount::mainnet());
        let contract_dialect = DialectConfig {
            primitive: HashPrimitive::Pedersen,
            ..canonical_dialect()
        };
        let contract = Arc::new(MockContract::new(contract_dialect));
        let preparer = OrderPreparer::new(canonical_dialect(), account.clone(), contract);

        let result = preparer.prepare(draft()).await;

        assert!(matches!(
            result,
            Err(MarketplaceError::DialectMismatch { .. })
        ));
        assert_eq!(account.sign_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_chain_is_a_precondition_failure() {
        let account = Arc::new(MockAccount {
            chain_id: encode_short_string("SN_SEPOLIA").unwrap(),
            ..MockAccount::mainnet()
        });
        let contract = Arc::new(MockContract::new(canonical_dialect()));
        let preparer = OrderPreparer::new(canonical_dialect(), account, contract.clone());

        let result = preparer.prepare(draft()).await;

        assert!(matches!(result, Err(MarketplaceError::Precondition(_))));
        assert_eq!(contract.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_nonce_failure_aborts() {
        let account = Arc::new(MockAccount {
            nonce: None,
            ..MockAccount::mainnet()
        });
        let contract = Arc::new(MockContract::new(canonical_dialect()));
        let preparer = OrderPreparer::new(canonical_dialect(), account.clone(), contract.clone());

        let result = preparer.prepare(draft()).await;

        assert!(matches!(result, Err(MarketplaceError::Rpc(_))));
        assert_eq!(contract.calls.load(Ordering::SeqCst), 0);
        assert_eq!(account.sign_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_inverted_window_rejected_before_any_call() {
        let account = Arc::new(MockAccount::mainnet());
        let contract = Arc::new(MockContract::new(canonical_dialect()));
        let preparer = OrderPreparer::new(canonical_dialect(), account, contract.clone());

        let mut order = draft();
        order.end_time = order.start_time;
        let result = tokio_test::block_on(preparer.prepare(order));

        assert!(matches!(result, Err(MarketplaceError::InvalidOrder(_))));
        assert_eq!(contract.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_validity_window() {
        assert_eq!(validity_window(100, 60), (100, 160));
        assert_eq!(validity_window(u64::MAX, 1).1, u64::MAX);
    }
}

mod common;

use common::*;
use ethers::types::U256;
use sender_fees::client::METHOD_GAS_PRICE;
use sender_fees::{
    CallRequest, ClientError, EstimationStats, FeeEstimator, FeeModel, FeePricing,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn call(fallback_gas_limit: u64) -> CallRequest {
    CallRequest::new(sender(), target(), payload()).with_fallback_gas_limit(fallback_gas_limit)
}

#[tokio::test]
async fn test_estimate_fee_routes_by_model() {
    let estimator = FeeEstimator::new(
        MockChainClient::new().with_gas_price(7).with_gas_tip_cap(2),
        5u64,
    );

    let legacy = estimator.estimate_fee(FeeModel::Legacy, &call(0)).await.unwrap();
    assert_eq!(
        legacy.pricing(),
        FeePricing::Legacy {
            gas_price: U256::from(7u64)
        }
    );

    let dynamic = estimator
        .estimate_fee(FeeModel::DynamicFee, &call(0))
        .await
        .unwrap();
    assert_eq!(
        dynamic.pricing(),
        FeePricing::Dynamic {
            gas_tip_cap: U256::from(2u64),
            gas_fee_cap: U256::from(12u64),
        }
    );

    assert_eq!(estimator.client().price_calls(), 1);
    assert_eq!(estimator.client().tip_calls(), 1);
}

#[tokio::test]
async fn test_gas_limit_is_padded_estimate_or_fallback() {
    for raw in [1u64, 9, 21_000, 53_333, 100_000, 7_654_321] {
        let estimator = FeeEstimator::new(MockChainClient::new().with_estimate(raw), 0u64);
        for model in [FeeModel::Legacy, FeeModel::DynamicFee] {
            let fee = estimator.estimate_fee(model, &call(0)).await.unwrap();
            assert_eq!(fee.gas_limit(), raw * 12 / 10);
        }
    }

    let estimator = FeeEstimator::new(MockChainClient::new().failing_estimate(), 0u64);
    for model in [FeeModel::Legacy, FeeModel::DynamicFee] {
        let fee = estimator.estimate_fee(model, &call(300_000)).await.unwrap();
        assert_eq!(fee.gas_limit(), 300_000);
    }
}

#[tokio::test]
async fn test_value_forwarded_to_simulation() {
    let estimator = FeeEstimator::new(MockChainClient::new(), 0u64);
    let request = call(0).with_value(U256::exp10(18));

    estimator
        .estimate_fee(FeeModel::DynamicFee, &request)
        .await
        .unwrap();

    assert_eq!(estimator.client().estimate_calls()[0].value, U256::exp10(18));
}

#[tokio::test]
async fn test_cancellation_token_reaches_client() {
    let cancel = CancellationToken::new();
    let estimator =
        FeeEstimator::new(MockChainClient::new(), 0u64).with_cancellation(cancel.clone());
    cancel.cancel();

    let result = estimator.estimate_fee(FeeModel::Legacy, &call(21_000)).await;

    assert_eq!(
        result,
        Err(ClientError::Cancelled {
            method: METHOD_GAS_PRICE
        })
    );
    assert!(estimator.client().estimate_calls().is_empty());
}

#[tokio::test]
async fn test_shared_stats() {
    let stats = Arc::new(EstimationStats::new());
    let ok = FeeEstimator::new(MockChainClient::new(), 0u64).with_stats(stats.clone());
    let degraded = FeeEstimator::new(MockChainClient::new().failing_estimate(), 0u64)
        .with_stats(stats.clone());

    ok.estimate_fee(FeeModel::Legacy, &call(0)).await.unwrap();
    degraded
        .estimate_fee(FeeModel::DynamicFee, &call(21_000))
        .await
        .unwrap();
    degraded
        .estimate_fee(FeeModel::DynamicFee, &call(0))
        .await
        .unwrap_err();

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.quotes.estimated, 1);
    assert_eq!(snapshot.quotes.fallback, 1);
    assert_eq!(snapshot.failures.limit_estimation, 2);
    assert_eq!(snapshot.failures.price_suggestion, 0);
}

#[tokio::test]
async fn test_concurrent_estimations_share_estimator() {
    let estimator = Arc::new(FeeEstimator::new(MockChainClient::new(), 4u64));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let estimator = estimator.clone();
            tokio::spawn(async move {
                let model = if i % 2 == 0 {
                    FeeModel::Legacy
                } else {
                    FeeModel::DynamicFee
                };
                estimator.estimate_fee(model, &call(0)).await
            })
        })
        .collect();

    for handle in handles {
        let fee = handle.await.unwrap().unwrap();
        assert_eq!(fee.gas_limit(), 120_000);
    }
    assert_eq!(estimator.stats().estimated(), 8);
    assert_eq!(estimator.client().estimate_calls().len(), 8);
}

#[tokio::test]
async fn test_estimator_fallback_applies_when_request_has_none() {
    let estimator = FeeEstimator::new(MockChainClient::new().failing_estimate(), 5u64)
        .with_fallback_gas_limit(250_000);

    let fee = estimator.estimate_fee(FeeModel::Legacy, &call(0)).await.unwrap();
    assert_eq!(fee.gas_limit(), 250_000);
    assert!(fee.used_fallback());

    let fee = estimator
        .estimate_fee(FeeModel::DynamicFee, &call(21_000))
        .await
        .unwrap();
    assert_eq!(fee.gas_limit(), 21_000);
}

#[tokio::test]
async fn test_estimator_without_fallback_still_fails_hard() {
    let estimator = FeeEstimator::new(MockChainClient::new().failing_estimate(), 5u64);
    assert_eq!(estimator.fallback_gas_limit(), 0);

    let result = estimator.estimate_fee(FeeModel::Legacy, &call(0)).await;
    assert_eq!(result, Err(estimate_error()));
}

#[tokio::test]
async fn test_configured_fee_model() {
    let estimator = FeeEstimator::new(MockChainClient::new().with_gas_price(7), 5u64)
        .with_fee_model(FeeModel::Legacy);

    let fee = estimator.estimate_configured_fee(&call(0)).await.unwrap();
    assert_eq!(fee.fee_model(), FeeModel::Legacy);
    assert_eq!(fee.gas_price(), Some(U256::from(7u64)));

    let estimator = FeeEstimator::new(MockChainClient::new(), 5u64);
    let fee = estimator.estimate_configured_fee(&call(0)).await.unwrap();
    assert_eq!(fee.fee_model(), FeeModel::DynamicFee);
}

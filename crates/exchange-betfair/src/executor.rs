//! Best-effort order execution against Betfair.

use crate::client::BetfairClient;
use crate::types::{
    CancelInstruction, CancelOrdersRequest, InstructionReport, LimitOrder, PlaceInstruction,
    PlaceOrdersRequest, ReplaceInstruction, ReplaceOrdersRequest,
};
use bet_hedge_core::{ExecutionGateway, ExecutionPlan, ExecutionReport, Order};
use async_trait::async_trait;
use tracing::{info, warn};

/// Executes cancel/replace/place plans one instruction at a time.
///
/// Execution is deliberately non-transactional: a rejected instruction is
/// logged and counted, and the remaining instructions still run.
pub struct BetfairExecutor<'a> {
    client: &'a BetfairClient,
}

impl<'a> BetfairExecutor<'a> {
    #[must_use]
    pub fn new(client: &'a BetfairClient) -> Self {
        Self { client }
    }

    async fn cancel_one(&self, order: &Order) -> bool {
        let Some(bet_id) = &order.bet_id else {
            warn!(market_id = %order.market_id, "cancel skipped: order has no bet id");
            return false;
        };
        let request = CancelOrdersRequest {
            market_id: order.market_id.clone(),
            instructions: vec![CancelInstruction {
                bet_id: bet_id.clone(),
                size_reduction: None,
            }],
        };
        self.submit("cancelOrders", &request, &order.market_id).await
    }

    async fn replace_one(&self, order: &Order) -> bool {
        let Some(bet_id) = &order.bet_id else {
            warn!(market_id = %order.market_id, "replace skipped: order has no bet id");
            return false;
        };
        let request = ReplaceOrdersRequest {
            market_id: order.market_id.clone(),
            instructions: vec![ReplaceInstruction {
                bet_id: bet_id.clone(),
                new_price: order.price,
            }],
        };
        self.submit("replaceOrders", &request, &order.market_id).await
    }

    async fn place_one(&self, order: &Order) -> bool {
        let request = PlaceOrdersRequest {
            market_id: order.market_id.clone(),
            instructions: vec![PlaceInstruction {
                selection_id: order.selection_id,
                side: order.side.as_str().to_string(),
                order_type: "LIMIT".to_string(),
                limit_order: LimitOrder {
                    // Exchange granularity: sizes go out at one decimal.
                    size: (order.size_remaining * 10.0).round() / 10.0,
                    price: order.price,
                    persistence_type: "LAPSE".to_string(),
                },
            }],
        };
        self.submit("placeOrders", &request, &order.market_id).await
    }

    async fn submit<Req: serde::Serialize>(
        &self,
        method: &str,
        request: &Req,
        market_id: &str,
    ) -> bool {
        match self.client.call::<_, InstructionReport>(method, request).await {
            Ok(report) if report.is_success() => true,
            Ok(report) => {
                warn!(%market_id, method, status = %report.status, "instruction rejected");
                false
            }
            Err(err) => {
                warn!(%market_id, method, error = %err, "instruction failed");
                false
            }
        }
    }
}

#[async_trait]
impl ExecutionGateway for BetfairExecutor<'_> {
    async fn execute(&self, plan: &ExecutionPlan) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for order in &plan.cancel {
            if self.cancel_one(order).await {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
        }
        for order in &plan.replace {
            if self.replace_one(order).await {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
        }
        for order in &plan.place {
            if self.place_one(order).await {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "execution pass complete"
        );
        report
    }
}

use crate::api::{RefundRequest, TransactionQueryParams, TransactionStatus, TransactionsResponse};
use crate::console::AdminConsole;
use crate::errors::ApiError;
use crate::query_cache::TRANSACTION_KEYS;

pub struct Transactions<'a> {
    console: &'a AdminConsole,
}

impl<'a> Transactions<'a> {
    pub(super) fn new(console: &'a AdminConsole) -> Self {
        Self { console }
    }

    pub async fn list(
        &self,
        page: u32,
        limit: u32,
        status: Option<TransactionStatus>,
    ) -> Result<TransactionsResponse, ApiError> {
        let params = TransactionQueryParams {
            page,
            limit,
            status,
        };
        let client = &self.console.client;
        self.console
            .query(TRANSACTION_KEYS.list(&params), || {
                client.list_transactions(&params)
            })
            .await
    }

    /// Asks the backend to refund, the whole amount unless `amount` is given
    pub async fn refund(
        &self,
        id: &str,
        amount: Option<f64>,
        reason: Option<String>,
    ) -> Result<serde_json::Value, ApiError> {
        let refund = RefundRequest { amount, reason };
        match self.console.client.refund_transaction(id, &refund).await {
            Ok(outcome) => {
                self.console.mutation_succeeded(
                    "Refund initiated successfully",
                    &TRANSACTION_KEYS.lists(),
                );
                Ok(outcome)
            }
            Err(err) if err.is_unauthorized() => {
                self.console.session.handle_unauthorized();
                Err(err)
            }
            Err(err) => {
                tracing::error!("Refund of {} failed {}", id, err);
                let reason = err.user_message(&err.to_string());
                self.console
                    .notifier
                    .error(&format!("Refund failed: {}", reason));
                Err(err)
            }
        }
    }
}

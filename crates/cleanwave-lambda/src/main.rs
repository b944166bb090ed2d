//! AWS Lambda entry point.

use cleanwave_core::Config;
use cleanwave_infra::init_telemetry;
use cleanwave_lambda::{handle_event, AppContext, HandlerResponse};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    init_telemetry(config.log_format)?;

    let ctx = Arc::new(AppContext::from_config(config).await?);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let ctx = Arc::clone(&ctx);
        async move {
            let (payload, context) = event.into_parts();
            let response: HandlerResponse = handle_event(&ctx, payload, &context.request_id).await;
            Ok::<_, Error>(response)
        }
    }))
    .await
}
